//! Wake-on-LAN: send a magic packet and optionally wait for the host to come up.

pub mod config;
pub mod console;
pub mod error;
pub mod liveness;
pub mod mac;
pub mod netinfo;
pub mod packet;
pub mod wake;
