use std::io;
use std::net::Ipv4Addr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed MAC or IPv4 address text.
    #[error("invalid {what} format: '{value}'")]
    InvalidFormat { what: &'static str, value: String },

    #[error("{what} out of range: {value}")]
    OutOfRange { what: &'static str, value: i64 },

    #[error("{0} is required")]
    MissingRequiredField(&'static str),

    #[error("no local IPv4 address found")]
    NoLocalAddress,

    #[error("can't find subnet mask for IP address '{0}'")]
    SubnetMaskNotFound(Ipv4Addr),

    #[error("interrupted before the magic packet was sent")]
    Interrupted,

    #[error("failed to send magic packet: {0}")]
    MagicPacketSendFailed(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
