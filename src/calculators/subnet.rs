use crate::config::CalcConfig;
use crate::domain::model::Capped;
use crate::domain::ports::{Calculator, TabularResult};
use crate::utils::error::{CalcError, Result};
use crate::utils::export::rows_to_csv;
use crate::utils::validation::validate_range;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Subnet mask as a CIDR prefix length or dotted-quad text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaskInput {
    Prefix(u8),
    Dotted(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetInput {
    pub address: String,
    pub mask: MaskInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IpClass {
    A,
    B,
    C,
    #[serde(rename = "D (Multicast)")]
    D,
    #[serde(rename = "E (Reserved)")]
    E,
    Loopback,
    #[serde(rename = "Invalid")]
    ThisNetwork,
}

impl IpClass {
    pub fn of(address: Ipv4Addr) -> Self {
        match address.octets()[0] {
            0 => IpClass::ThisNetwork,
            1..=126 => IpClass::A,
            127 => IpClass::Loopback,
            128..=191 => IpClass::B,
            192..=223 => IpClass::C,
            224..=239 => IpClass::D,
            _ => IpClass::E,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiblingSubnet {
    pub network: Ipv4Addr,
    pub broadcast: Ipv4Addr,
    pub contains_address: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubnetResult {
    pub address: Ipv4Addr,
    pub prefix: u8,
    pub subnet_mask: Ipv4Addr,
    pub wildcard_mask: Ipv4Addr,
    pub network: Ipv4Addr,
    pub broadcast: Ipv4Addr,
    pub first_host: Ipv4Addr,
    pub last_host: Ipv4Addr,
    pub total_addresses: u64,
    pub usable_hosts: u64,
    pub total_subnets: u64,
    pub class: IpClass,
    pub is_private: bool,
    pub sibling_subnets: Capped<SiblingSubnet>,
}

pub fn parse_address(field: &str, raw: &str) -> Result<Ipv4Addr> {
    raw.trim().parse::<Ipv4Addr>().map_err(|_| CalcError::InvalidAddress {
        value: raw.to_string(),
        reason: format!("{} must be four octets between 0 and 255", field),
    })
}

pub fn mask_from_prefix(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p.min(32))),
    }
}

/// Prefix length of a dotted mask. Non-contiguous masks are rejected.
pub fn prefix_from_mask(mask: Ipv4Addr) -> Result<u8> {
    let bits = u32::from(mask);
    let host_bits = !bits;
    if host_bits & host_bits.wrapping_add(1) != 0 {
        return Err(CalcError::InvalidAddress {
            value: mask.to_string(),
            reason: "subnet mask bits must be contiguous".to_string(),
        });
    }
    Ok(bits.count_ones() as u8)
}

fn resolve_prefix(mask: &MaskInput) -> Result<u8> {
    match mask {
        MaskInput::Prefix(prefix) => validate_range("mask", *prefix, 0, 32),
        MaskInput::Dotted(text) => {
            let text = text.trim();
            match text.strip_prefix('/') {
                Some(prefix) => {
                    let prefix = prefix.parse::<u8>().map_err(|_| CalcError::ParseError {
                        field: "mask".to_string(),
                        value: text.to_string(),
                    })?;
                    validate_range("mask", prefix, 0, 32)
                }
                None => prefix_from_mask(parse_address("mask", text)?),
            }
        }
    }
}

/// Usable host range for a network. /31 links use both addresses and /32 is a single host.
fn host_range(network: u32, broadcast: u32, prefix: u8) -> (u32, u32, u64) {
    match prefix {
        32 => (network, network, 1),
        31 => (network, broadcast, 2),
        p => (network + 1, broadcast - 1, (1u64 << (32 - p)) - 2),
    }
}

impl Calculator for SubnetInput {
    type Output = SubnetResult;

    fn compute(&self, config: &CalcConfig) -> Result<SubnetResult> {
        let address = parse_address("address", &self.address)?;
        let prefix = resolve_prefix(&self.mask)?;

        let ip = u32::from(address);
        let mask = mask_from_prefix(prefix);
        let wildcard = !mask;
        let network = ip & mask;
        let broadcast = network | wildcard;
        let (first_host, last_host, usable_hosts) = host_range(network, broadcast, prefix);
        let block_size = 1u64 << (32 - prefix);

        let enclosing_prefix = prefix.saturating_sub(8);
        let block_start = u64::from(ip & mask_from_prefix(enclosing_prefix));
        let sibling_count = 1usize << (prefix - enclosing_prefix);
        let sibling_subnets = Capped::build(sibling_count, config.limits.max_subnet_rows, |i| {
            let start = block_start + i as u64 * block_size;
            let end = start + block_size - 1;
            SiblingSubnet {
                network: Ipv4Addr::from(start as u32),
                broadcast: Ipv4Addr::from(end as u32),
                contains_address: start == u64::from(network),
            }
        });

        Ok(SubnetResult {
            address,
            prefix,
            subnet_mask: Ipv4Addr::from(mask),
            wildcard_mask: Ipv4Addr::from(wildcard),
            network: Ipv4Addr::from(network),
            broadcast: Ipv4Addr::from(broadcast),
            first_host: Ipv4Addr::from(first_host),
            last_host: Ipv4Addr::from(last_host),
            total_addresses: block_size,
            usable_hosts,
            total_subnets: 1u64 << prefix,
            class: IpClass::of(address),
            is_private: address.is_private() || address.is_loopback(),
            sibling_subnets,
        })
    }
}

#[derive(Debug, Serialize)]
struct SubnetCsvRow {
    #[serde(rename = "Network")]
    network: String,
    #[serde(rename = "Broadcast")]
    broadcast: String,
    #[serde(rename = "Range")]
    range: String,
}

impl TabularResult for SubnetResult {
    fn export_name(&self) -> &'static str {
        "subnets.csv"
    }

    fn to_csv(&self) -> Result<String> {
        let rows: Vec<SubnetCsvRow> = self
            .sibling_subnets
            .rows
            .iter()
            .map(|s| SubnetCsvRow {
                network: s.network.to_string(),
                broadcast: s.broadcast.to_string(),
                range: format!("{} - {}", s.network, s.broadcast),
            })
            .collect();
        rows_to_csv(&rows)
    }
}
