use anyhow::Context;
use clap::Parser;
use quickcalc::config::cli::read_input;
use quickcalc::utils::error::{CalcError, ErrorSeverity};
use quickcalc::utils::{logger, validation::Validate};
use quickcalc::{CalcConfig, CalcEngine, CalculatorRequest, CliConfig, Command, CALCULATOR_NAMES};
use serde::Serialize;

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

fn exit_code(error: &CalcError) -> i32 {
    match error.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn load_config(cli: &CliConfig) -> quickcalc::Result<CalcConfig> {
    let config = match &cli.config {
        Some(path) => CalcConfig::from_file(path)?,
        None => CalcConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn read_request(input: &str) -> anyhow::Result<CalculatorRequest> {
    let body = read_input(input).with_context(|| format!("failed to read request from '{}'", input))?;
    serde_json::from_str(&body).with_context(|| format!("'{}' is not a valid calculator request", input))
}

fn report_failure(error: &CalcError, pretty: bool) -> i32 {
    tracing::error!(
        "Calculation failed: {} (Category: {:?}, Severity: {:?})",
        error,
        error.category(),
        error.severity()
    );
    tracing::debug!("Recovery suggestion: {}", error.recovery_suggestion());
    if let Err(e) = print_json(&error.report(), pretty) {
        eprintln!("{}", error.user_friendly_message());
        eprintln!("failed to print error report: {}", e);
    }
    exit_code(error)
}

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if let Err(e) = cli.validate() {
        eprintln!("{}", e.user_friendly_message());
        eprintln!("Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e).max(1));
        }
    };

    if cli.json_logs || config.json_logging() {
        logger::init_json_logger(cli.verbose, config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }
    tracing::debug!("CLI config: {:?}", cli);

    let engine = CalcEngine::new(config);
    let outcome = match &cli.command {
        Command::List => {
            for name in CALCULATOR_NAMES {
                println!("{}", name);
            }
            return Ok(());
        }
        Command::Run { input } => {
            let request = read_request(input)?;
            engine
                .run(&request)
                .map(|response| print_json(&response, cli.pretty))
        }
        Command::Export { input, output } => {
            let request = read_request(input)?;
            engine.export(&request, output).map(|path| {
                println!("{}", path.display());
                Ok(())
            })
        }
    };

    match outcome {
        Ok(printed) => printed,
        Err(e) => {
            let code = report_failure(&e, cli.pretty);
            if code > 0 {
                std::process::exit(code);
            }
            Ok(())
        }
    }
}
