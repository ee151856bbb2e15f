use std::net::Ipv4Addr;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;
use pnet::util::MacAddr;

use crate::error::{Error, Result};
use crate::mac;
use crate::packet::DEFAULT_PORT;

pub const DEFAULT_TIMEOUT_SECS: i64 = 300;

/// Raw command line. Range and format checks happen in `WakeRequest::try_from`
/// so that every malformed value is reported the same way.
#[derive(Parser, Debug)]
#[command(version, about = "Wake a host on the local network with a Wake-on-LAN magic packet")]
pub struct Cli {
    /// The MAC address of the target host (AA:BB:CC:DD:EE:FF).
    #[arg(short = 'm', long = "mac_address", visible_alias = "mac-address", value_name = "MAC")]
    pub mac_address: Option<String>,

    /// The hostname or IP address of the target host, used to check whether it is up.
    #[arg(short = 'H', long)]
    pub hostname: Option<String>,

    /// The broadcast address. Default is derived from the first local IPv4 address.
    #[arg(short, long, value_name = "IPV4")]
    pub broadcast: Option<String>,

    /// Local IPv4 address to derive the broadcast address from.
    #[arg(short, long, value_name = "IPV4", conflicts_with = "broadcast")]
    pub local_address: Option<String>,

    /// Destination UDP port.
    #[arg(short, long, default_value_t = DEFAULT_PORT as i64, allow_negative_numbers = true)]
    pub port: i64,

    /// Maximum time in seconds to wait for the host to boot up.
    #[arg(short, long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS, allow_negative_numbers = true)]
    pub timeout: i64,

    /// Do not wait for the host to boot up.
    #[arg(short, long, default_value_t = false)]
    pub no_wait: bool,

    /// Run without output.
    #[arg(short, long, default_value_t = false)]
    pub silent: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.silent {
            return LevelFilter::Off;
        }

        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Everything one invocation needs, validated up front.
#[derive(Debug, Clone)]
pub struct WakeRequest {
    pub mac: MacAddr,
    pub hostname: Option<String>,
    pub broadcast: Option<Ipv4Addr>,
    pub local_address: Option<Ipv4Addr>,
    pub port: u16,
    pub wait: bool,
    pub timeout: Duration,
    pub silent: bool,
}

fn parse_ipv4(what: &'static str, value: &str) -> Result<Ipv4Addr> {
    value
        .parse()
        .map_err(|_| Error::InvalidFormat { what, value: value.to_string() })
}

impl TryFrom<&Cli> for WakeRequest {
    type Error = Error;

    fn try_from(cli: &Cli) -> Result<Self> {
        let mac = cli
            .mac_address
            .as_deref()
            .ok_or(Error::MissingRequiredField("MAC address"))
            .and_then(mac::parse)?;

        let broadcast = cli
            .broadcast
            .as_deref()
            .map(|b| parse_ipv4("broadcast address", b))
            .transpose()?;

        let local_address = cli
            .local_address
            .as_deref()
            .map(|l| parse_ipv4("local address", l))
            .transpose()?;

        let port = u16::try_from(cli.port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or(Error::OutOfRange { what: "port", value: cli.port })?;

        if cli.timeout <= 0 {
            return Err(Error::OutOfRange { what: "timeout", value: cli.timeout });
        }

        Ok(Self {
            mac,
            hostname: cli.hostname.clone().filter(|h| !h.is_empty()),
            broadcast,
            local_address,
            port,
            wait: !cli.no_wait,
            timeout: Duration::from_secs(cli.timeout as u64),
            silent: cli.silent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(args: &[&str]) -> Result<WakeRequest> {
        let cli = Cli::try_parse_from(std::iter::once("wol-tool").chain(args.iter().copied())).unwrap();
        WakeRequest::try_from(&cli)
    }

    #[test]
    fn test_defaults() {
        let req = request(&["-m", "AA:BB:CC:DD:EE:FF"]).unwrap();
        assert_eq!(mac::format(req.mac), "AA:BB:CC:DD:EE:FF");
        assert_eq!(req.port, 9);
        assert_eq!(req.timeout, Duration::from_secs(300));
        assert!(req.wait);
        assert!(!req.silent);
        assert!(req.hostname.is_none());
        assert!(req.broadcast.is_none());
    }

    #[test]
    fn test_all_options() {
        let req = request(&[
            "--mac_address", "aa:bb:cc:dd:ee:ff",
            "--hostname", "nas.local",
            "--broadcast", "192.168.1.255",
            "--port", "7",
            "--timeout", "60",
            "--no-wait",
            "--silent",
        ])
        .unwrap();

        assert_eq!(req.hostname.as_deref(), Some("nas.local"));
        assert_eq!(req.broadcast, Some(Ipv4Addr::new(192, 168, 1, 255)));
        assert_eq!(req.port, 7);
        assert_eq!(req.timeout, Duration::from_secs(60));
        assert!(!req.wait);
        assert!(req.silent);
    }

    #[test]
    fn test_mac_alias() {
        assert!(request(&["--mac-address", "aa:bb:cc:dd:ee:ff"]).is_ok());
    }

    #[test]
    fn test_missing_mac() {
        assert!(matches!(request(&["-H", "nas"]), Err(Error::MissingRequiredField(_))));
    }

    #[test]
    fn test_bad_mac() {
        assert!(matches!(request(&["-m", "AA-BB-CC-DD-EE-FF"]), Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_bad_broadcast() {
        let res = request(&["-m", "aa:bb:cc:dd:ee:ff", "-b", "192.168.1"]);
        assert!(matches!(res, Err(Error::InvalidFormat { what: "broadcast address", .. })));
    }

    #[test]
    fn test_port_range() {
        for port in ["0", "70000", "-1"] {
            let res = request(&["-m", "aa:bb:cc:dd:ee:ff", "-p", port]);
            assert!(matches!(res, Err(Error::OutOfRange { what: "port", .. })), "{port}");
        }
        assert_eq!(request(&["-m", "aa:bb:cc:dd:ee:ff", "-p", "65535"]).unwrap().port, 65535);
    }

    #[test]
    fn test_timeout_range() {
        for timeout in ["0", "-5"] {
            let res = request(&["-m", "aa:bb:cc:dd:ee:ff", "-t", timeout]);
            assert!(matches!(res, Err(Error::OutOfRange { what: "timeout", .. })), "{timeout}");
        }
    }

    #[test]
    fn test_broadcast_conflicts_with_local_address() {
        let res = Cli::try_parse_from(["wol-tool", "-m", "aa:bb:cc:dd:ee:ff", "-b", "10.255.255.255", "-l", "10.0.0.5"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::try_parse_from(["wol-tool", "-vv"]).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::Debug);
        let cli = Cli::try_parse_from(["wol-tool", "-v", "-s"]).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::Off);
    }
}
