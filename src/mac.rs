//! Colon-hex MAC address codec.
//!
//! Only ':' is accepted as a separator. `AA-BB-CC-DD-EE-FF` is rejected
//! rather than normalised.

use pnet::util::MacAddr;

use crate::error::{Error, Result};

const MAC_PARTS: usize = 6;

fn parse_part(part: &str) -> Result<u8> {
    let invalid = || Error::InvalidFormat { what: "MAC address part", value: part.to_string() };

    // from_str_radix alone would let "+f" through
    if part.is_empty() || part.len() > 2 || !part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    u8::from_str_radix(part, 16).map_err(|_| invalid())
}

/// Parses `AA:BB:CC:DD:EE:FF` (any case) into a MAC address.
pub fn parse(input: &str) -> Result<MacAddr> {
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() != MAC_PARTS {
        return Err(Error::InvalidFormat { what: "MAC address", value: input.to_string() });
    }

    let mut octets = [0u8; MAC_PARTS];
    for (octet, part) in octets.iter_mut().zip(&parts) {
        *octet = parse_part(part)?;
    }

    let [a, b, c, d, e, f] = octets;
    Ok(MacAddr::new(a, b, c, d, e, f))
}

pub fn octets(mac: MacAddr) -> [u8; MAC_PARTS] {
    [mac.0, mac.1, mac.2, mac.3, mac.4, mac.5]
}

/// Canonical upper-case form.
pub fn format(mac: MacAddr) -> String {
    octets(mac)
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}
