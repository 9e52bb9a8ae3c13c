//! IPv4 subnet arithmetic.

use std::net::Ipv4Addr;

use thiserror::Error;

pub const MAX_LISTED_SUBNETS: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubnetError {
    #[error("enter an address as `a.b.c.d/prefix` or `a.b.c.d mask`")]
    Format,
    #[error("`{0}` is not a valid IPv4 address")]
    Address(String),
    #[error("prefix must be between 0 and 32, got `{0}`")]
    Prefix(String),
    #[error("`{0}` is not a contiguous netmask")]
    Mask(String),
    #[error("new prefix /{new} must be between /{current} and /32")]
    SplitPrefix { current: u8, new: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressClass {
    A,
    B,
    C,
    D,
    E,
}

impl AddressClass {
    fn of(address: Ipv4Addr) -> Self {
        match address.octets()[0] {
            0..=127 => Self::A,
            128..=191 => Self::B,
            192..=223 => Self::C,
            224..=239 => Self::D,
            _ => Self::E,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D (multicast)",
            Self::E => "E (reserved)",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubnetInfo {
    pub address: Ipv4Addr,
    pub prefix: u8,
    pub network: Ipv4Addr,
    pub broadcast: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub wildcard: Ipv4Addr,
    pub first_host: Ipv4Addr,
    pub last_host: Ipv4Addr,
    pub total_addresses: u64,
    pub usable_hosts: u64,
    pub class: AddressClass,
    pub private: bool,
}

impl SubnetInfo {
    pub fn new(address: Ipv4Addr, prefix: u8) -> Self {
        let mask = prefix_mask(prefix);
        let raw = u32::from(address);
        let network = raw & mask;
        let broadcast = network | !mask;
        let total_addresses = 1u64 << (32 - u32::from(prefix));
        let (first_host, last_host, usable_hosts) = match prefix {
            32 => (network, network, 1),
            31 => (network, broadcast, 2),
            _ => (network + 1, broadcast - 1, total_addresses - 2),
        };
        Self {
            address,
            prefix,
            network: network.into(),
            broadcast: broadcast.into(),
            mask: mask.into(),
            wildcard: (!mask).into(),
            first_host: first_host.into(),
            last_host: last_host.into(),
            total_addresses,
            usable_hosts,
            class: AddressClass::of(address),
            private: address.is_private(),
        }
    }

    pub fn cidr(&self) -> String {
        format!("{}/{}", self.network, self.prefix)
    }

    /// `11111111.11111111.11111111.00000000`
    pub fn binary_mask(&self) -> String {
        self.mask
            .octets()
            .iter()
            .map(|octet| format!("{octet:08b}"))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Divides this network into `/new_prefix` blocks. Returns the total
    /// count and at most [`MAX_LISTED_SUBNETS`] of them.
    pub fn split(&self, new_prefix: u8) -> Result<(u64, Vec<SubnetInfo>), SubnetError> {
        if new_prefix < self.prefix || new_prefix > 32 {
            return Err(SubnetError::SplitPrefix {
                current: self.prefix,
                new: new_prefix,
            });
        }
        let count = 1u64 << u32::from(new_prefix - self.prefix);
        let step = 1u64 << (32 - u32::from(new_prefix));
        let base = u64::from(u32::from(self.network));
        let listed = (0..count.min(MAX_LISTED_SUBNETS as u64))
            .map(|index| {
                let start = (base + index * step) as u32;
                SubnetInfo::new(start.into(), new_prefix)
            })
            .collect();
        Ok((count, listed))
    }
}

fn prefix_mask(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p)),
    }
}

fn mask_prefix(mask: Ipv4Addr) -> Option<u8> {
    let raw = u32::from(mask);
    let ones = raw.leading_ones();
    (raw.checked_shl(ones).unwrap_or(0) == 0).then_some(ones as u8)
}

fn parse_address(value: &str) -> Result<Ipv4Addr, SubnetError> {
    value
        .trim()
        .parse()
        .map_err(|_| SubnetError::Address(value.trim().to_string()))
}

/// Accepts `192.168.1.10/24`, `192.168.1.10 255.255.255.0` or a bare
/// address, which is treated as `/32`.
pub fn parse(input: &str) -> Result<SubnetInfo, SubnetError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SubnetError::Format);
    }

    if let Some((address, prefix)) = input.split_once('/') {
        let address = parse_address(address)?;
        let digits = prefix.trim();
        let prefix = Some(digits)
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse::<u8>().ok())
            .filter(|p| *p <= 32)
            .ok_or_else(|| SubnetError::Prefix(digits.to_string()))?;
        return Ok(SubnetInfo::new(address, prefix));
    }

    let mut parts = input.split_whitespace();
    let address = parse_address(parts.next().ok_or(SubnetError::Format)?)?;
    let prefix = match parts.next() {
        Some(mask) => {
            let parsed = parse_address(mask).map_err(|_| SubnetError::Mask(mask.to_string()))?;
            mask_prefix(parsed).ok_or_else(|| SubnetError::Mask(mask.to_string()))?
        }
        None => 32,
    };
    if parts.next().is_some() {
        return Err(SubnetError::Format);
    }
    Ok(SubnetInfo::new(address, prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_c_slash_24() {
        let info = parse("192.168.1.10/24").unwrap();
        assert_eq!(info.network, Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(info.broadcast, Ipv4Addr::new(192, 168, 1, 255));
        assert_eq!(info.mask, Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(info.wildcard, Ipv4Addr::new(0, 0, 0, 255));
        assert_eq!(info.first_host, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(info.last_host, Ipv4Addr::new(192, 168, 1, 254));
        assert_eq!(info.usable_hosts, 254);
        assert_eq!(info.total_addresses, 256);
        assert_eq!(info.class, AddressClass::C);
        assert!(info.private);
        assert_eq!(info.cidr(), "192.168.1.0/24");
        assert_eq!(info.binary_mask(), "11111111.11111111.11111111.00000000");
    }

    #[test]
    fn dotted_mask_input() {
        let info = parse("10.20.30.40 255.255.240.0").unwrap();
        assert_eq!(info.prefix, 20);
        assert_eq!(info.network, Ipv4Addr::new(10, 20, 16, 0));
        assert!(matches!(
            parse("10.0.0.1 255.0.255.0"),
            Err(SubnetError::Mask(_))
        ));
    }

    #[test]
    fn edge_prefixes() {
        assert_eq!(parse("10.0.0.0/31").unwrap().usable_hosts, 2);
        let host = parse("8.8.8.8/32").unwrap();
        assert_eq!(host.usable_hosts, 1);
        assert_eq!(host.first_host, host.last_host);
        assert!(!host.private);
        let all = parse("0.0.0.0/0").unwrap();
        assert_eq!(all.total_addresses, 1 << 32);
        assert_eq!(all.broadcast, Ipv4Addr::new(255, 255, 255, 255));
        assert_eq!(parse("1.2.3.4").unwrap().prefix, 32);
    }

    #[test]
    fn invalid_inputs() {
        assert_eq!(parse(""), Err(SubnetError::Format));
        assert!(matches!(parse("300.1.1.1/24"), Err(SubnetError::Address(_))));
        assert!(matches!(parse("1.1.1.1/33"), Err(SubnetError::Prefix(_))));
        assert!(matches!(parse("10.0.0.1/+24"), Err(SubnetError::Prefix(_))));
    }

    #[test]
    fn split_into_smaller_networks() {
        let info = parse("192.168.0.0/24").unwrap();
        let (count, subnets) = info.split(26).unwrap();
        assert_eq!(count, 4);
        assert_eq!(subnets[1].network, Ipv4Addr::new(192, 168, 0, 64));
        assert_eq!(subnets[3].broadcast, Ipv4Addr::new(192, 168, 0, 255));

        let (count, subnets) = parse("10.0.0.0/8").unwrap().split(24).unwrap();
        assert_eq!(count, 65_536);
        assert_eq!(subnets.len(), MAX_LISTED_SUBNETS);
        assert!(info.split(20).is_err());
    }
}
