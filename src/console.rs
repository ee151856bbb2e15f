use std::io::{self, Write};

use colored::Colorize;

const RULE: &str = "--------------------------------------------------------------------------------";

/// User-facing output on stdout. Everything is dropped when silent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    silent: bool,
}

impl Console {
    pub fn new(silent: bool) -> Self {
        Self { silent }
    }

    pub fn silent() -> Self {
        Self::new(true)
    }

    pub fn banner(&self) {
        self.line(RULE);
        self.line(format!(" {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")));
        self.line("");
        self.line(" Sends a Wake-on-LAN magic packet to wake up the target host.");
        self.line(RULE);
        self.line("");
    }

    pub fn line(&self, msg: impl AsRef<str>) {
        if !self.silent {
            println!("{}", msg.as_ref());
        }
    }

    /// Writes without a newline and flushes, for progress output.
    pub fn inline(&self, msg: impl AsRef<str>) {
        if !self.silent {
            print!("{}", msg.as_ref());
            io::stdout().flush().ok();
        }
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.line(msg.as_ref().cyan().to_string());
    }

    pub fn warning(&self, msg: impl AsRef<str>) {
        self.line(msg.as_ref().yellow().to_string());
    }
}
