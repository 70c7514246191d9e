use crate::utils::error::{CalcError, Result};
use crate::utils::validation::Validate;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "quickcalc")]
#[command(about = "Everyday calculators driven by JSON requests")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the available calculators
    List,
    /// Run one request and print the result as JSON
    Run {
        /// Request file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
    },
    /// Run one request and write its table as CSV
    Export {
        /// Request file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Output file or directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

impl Command {
    pub fn input(&self) -> Option<&str> {
        match self {
            Command::List => None,
            Command::Run { input } | Command::Export { input, .. } => Some(input.as_str()),
        }
    }
}

/// Reads a request body from a file path, or stdin for `-`.
pub fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        return Ok(body);
    }
    Ok(std::fs::read_to_string(input)?)
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.config {
            if !path.is_file() {
                return Err(CalcError::ConfigError {
                    message: format!("config file '{}' does not exist", path.display()),
                });
            }
        }

        if let Some(input) = self.command.input() {
            if input.trim().is_empty() {
                return Err(CalcError::MissingField {
                    field: "input".to_string(),
                });
            }
        }

        if let Command::Export { output, .. } = &self.command {
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                if !parent.exists() {
                    return Err(CalcError::InvalidConfigValueError {
                        field: "output".to_string(),
                        value: output.display().to_string(),
                        reason: "parent directory does not exist".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = CliConfig::try_parse_from(["quickcalc", "--pretty", "run", "--input", "request.json"]).unwrap();
        assert!(cli.pretty);
        assert!(!cli.verbose);
        assert_eq!(cli.command.input(), Some("request.json"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = CliConfig::try_parse_from(["quickcalc", "export", "-i", "-", "-o", "out.csv", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Export { input, output } => {
                assert_eq!(input, "-");
                assert_eq!(output, PathBuf::from("out.csv"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_missing_config_file_fails_validation() {
        let cli = CliConfig::try_parse_from(["quickcalc", "--config", "/nonexistent/quickcalc.toml", "list"]).unwrap();
        assert!(matches!(cli.validate(), Err(CalcError::ConfigError { .. })));
    }

    #[test]
    fn test_read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(&path, "{}").unwrap();
        assert_eq!(read_input(path.to_str().unwrap()).unwrap(), "{}");
    }
}
