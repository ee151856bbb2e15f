//! Local IPv4 address discovery and broadcast address derivation.
//!
//! Interface order comes from the OS and is not stable across platforms.
//! "First local address" is only a best-effort default; an explicit
//! broadcast or local address is the reliable path.

use std::net::Ipv4Addr;

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

use crate::error::{Error, Result};

fn ipv4_nets(iface: &NetworkInterface) -> impl Iterator<Item = &Ipv4Network> {
    iface.ips.iter().filter_map(|net| match net {
        IpNetwork::V4(v4) => Some(v4),
        IpNetwork::V6(_) => None,
    })
}

fn is_lan_unicast(ip: Ipv4Addr) -> bool {
    !(ip.is_loopback() || ip.is_unspecified() || ip.is_multicast() || ip.is_broadcast())
}

fn local_ipv4_addresses_in(interfaces: &[NetworkInterface]) -> Vec<Ipv4Addr> {
    interfaces
        .iter()
        .filter(|iface| iface.is_up() && !iface.is_loopback())
        .flat_map(|iface| ipv4_nets(iface))
        .map(|net| net.ip())
        .filter(|ip| is_lan_unicast(*ip))
        .collect()
}

fn subnet_mask_in(interfaces: &[NetworkInterface], address: Ipv4Addr) -> Option<Ipv4Addr> {
    interfaces
        .iter()
        .flat_map(|iface| ipv4_nets(iface))
        .find(|net| net.ip() == address)
        .map(|net| net.mask())
}

fn broadcast_address_in(interfaces: &[NetworkInterface], address: Option<Ipv4Addr>) -> Result<Ipv4Addr> {
    let address = match address {
        Some(address) => address,
        None => *local_ipv4_addresses_in(interfaces)
            .first()
            .ok_or(Error::NoLocalAddress)?,
    };

    let mask = subnet_mask_in(interfaces, address).ok_or(Error::SubnetMaskNotFound(address))?;
    log::debug!("local address {} has subnet mask {}", address, mask);

    Ok(broadcast_for(address, mask))
}

/// Every IPv4 unicast address on up, non-loopback interfaces, in discovery order.
pub fn local_ipv4_addresses() -> Vec<Ipv4Addr> {
    local_ipv4_addresses_in(&datalink::interfaces())
}

/// Subnet mask of the interface entry carrying exactly `address`.
pub fn subnet_mask_for(address: Ipv4Addr) -> Option<Ipv4Addr> {
    subnet_mask_in(&datalink::interfaces(), address)
}

/// Broadcast address for `address`, or for the first local address if none is given.
pub fn broadcast_address(address: Option<Ipv4Addr>) -> Result<Ipv4Addr> {
    broadcast_address_in(&datalink::interfaces(), address)
}

pub fn broadcast_for(address: Ipv4Addr, mask: Ipv4Addr) -> Ipv4Addr {
    let ip = address.octets();
    let mask = mask.octets();

    let mut broadcast = [0u8; 4];
    for (i, octet) in broadcast.iter_mut().enumerate() {
        *octet = ip[i] | !mask[i];
    }

    Ipv4Addr::from(broadcast)
}
