//! Pre-check, send, then poll until the host answers or the timeout passes.

use std::net::Ipv4Addr;
use std::process::ExitCode;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::WakeRequest;
use crate::console::Console;
use crate::error::{Error, Result};
use crate::liveness::LivenessChecker;
use crate::mac;
use crate::netinfo;
use crate::packet::MagicPacketSender;

/// Minimum spacing between the starts of two probes.
pub const PROBE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub enum WakeOutcome {
    /// Packet sent, nothing to wait for.
    Sent,
    AlreadyUp,
    WokeWithinTimeout(Duration),
    TimedOut,
    /// Interrupted while polling; the packet did go out.
    Cancelled(Duration),
    Failed(Error),
}

impl WakeOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            WakeOutcome::Sent | WakeOutcome::WokeWithinTimeout(_) => 0,
            WakeOutcome::Failed(_) => 1,
            WakeOutcome::AlreadyUp => 2,
            WakeOutcome::TimedOut | WakeOutcome::Cancelled(_) => 3,
        }
    }
}

impl From<&WakeOutcome> for ExitCode {
    fn from(outcome: &WakeOutcome) -> Self {
        ExitCode::from(outcome.exit_code())
    }
}

pub struct Waker<L, S> {
    liveness: L,
    sender: S,
    console: Console,
    cancel: CancellationToken,
}

impl<L: LivenessChecker, S: MagicPacketSender> Waker<L, S> {
    pub fn new(liveness: L, sender: S, console: Console, cancel: CancellationToken) -> Self {
        Self { liveness, sender, console, cancel }
    }

    pub async fn run(&self, req: &WakeRequest) -> WakeOutcome {
        if let Some(host) = req.hostname.as_deref() {
            if self.liveness.is_alive(host).await {
                log::info!("{} answered the pre-check, not sending", host);
                self.console.line(format!("{} is already up.", host));
                return WakeOutcome::AlreadyUp;
            }
        }

        // nothing has gone out yet, so a pending Ctrl-C aborts cleanly
        if self.cancel.is_cancelled() {
            log::debug!("cancelled before sending");
            return WakeOutcome::Failed(Error::Interrupted);
        }

        if let Err(e) = self.send(req).await {
            log::debug!("wake aborted: {:?}", e);
            return WakeOutcome::Failed(e);
        }

        match req.hostname.as_deref() {
            Some(host) if req.wait => self.poll(host, req.timeout).await,
            _ => WakeOutcome::Sent,
        }
    }

    async fn send(&self, req: &WakeRequest) -> Result<()> {
        let broadcast: Ipv4Addr = match req.broadcast {
            Some(broadcast) => broadcast,
            None => netinfo::broadcast_address(req.local_address)?,
        };

        self.console.line(format!(
            "Sending magic packet to broadcast address {}:{}, targeting MAC {}.",
            broadcast,
            req.port,
            mac::format(req.mac)
        ));
        self.sender.send(req.mac, broadcast, req.port).await?;
        self.console.line("Magic packet sent.");
        self.console.line("");

        Ok(())
    }

    async fn poll(&self, host: &str, timeout: Duration) -> WakeOutcome {
        let start = Instant::now();
        let mut ticker = tokio::time::interval(PROBE_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.console.inline(format!("Checking host({}) status", host));
        let mut attempts: u32 = 0;

        loop {
            let alive = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    let elapsed = start.elapsed();
                    self.console.line("");
                    self.console.warning(format!("Cancelled after {} seconds.", elapsed.as_secs()));
                    return WakeOutcome::Cancelled(elapsed);
                }
                alive = async {
                    ticker.tick().await;
                    self.liveness.is_alive(host).await
                } => alive,
            };
            attempts += 1;

            let elapsed = start.elapsed();
            if alive {
                log::info!("{} answered after {} probe(s)", host, attempts);
                self.console.line("");
                self.console.success(format!("{} is up.", host));
                self.console.success(format!("It took {} seconds to boot.", elapsed.as_secs()));
                return WakeOutcome::WokeWithinTimeout(elapsed);
            }

            if elapsed > timeout {
                log::info!("{} silent after {} probe(s)", host, attempts);
                self.console.line("");
                self.console.warning(format!(
                    "Reached timeout ({} seconds). Host did not respond.",
                    timeout.as_secs()
                ));
                return WakeOutcome::TimedOut;
            }

            self.console.inline(".");
        }
    }
}
