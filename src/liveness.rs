use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

/// Per-attempt reply timeout handed to `ping`.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Extra time given to the `ping` process itself before it is killed.
const PROBE_GRACE: Duration = Duration::from_millis(1000);

#[async_trait]
pub trait LivenessChecker {
    /// True only when the host answered. Every failure reads as "not alive".
    async fn is_alive(&self, host: &str) -> bool;
}

/// Probes with the system `ping` binary, one echo request per call.
#[derive(Debug, Default)]
pub struct Ping;

impl Ping {
    fn args(host: &str) -> Vec<String> {
        let timeout_ms = PROBE_TIMEOUT.as_millis();

        #[cfg(target_os = "windows")]
        let args = vec!["-n".to_string(), "1".to_string(), "-w".to_string(), timeout_ms.to_string()];

        // macOS takes -W in milliseconds
        #[cfg(target_os = "macos")]
        let args = vec!["-c".to_string(), "1".to_string(), "-W".to_string(), timeout_ms.to_string()];

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        let args = vec![
            "-c".to_string(),
            "1".to_string(),
            "-W".to_string(),
            timeout_ms.div_ceil(1000).to_string(),
        ];

        let mut args = args;
        args.push(host.to_string());
        args
    }
}

/// Whether ping's stdout carries an actual echo reply.
///
/// Windows `ping` exits 0 on "Destination host unreachable" relayed by the
/// local stack, so only a line with a TTL counts there.
fn is_echo_reply(stdout: &str) -> bool {
    stdout.lines().any(|line| line.to_ascii_uppercase().contains("TTL="))
}

fn confirms_alive(success: bool, stdout: &str) -> bool {
    success && (!cfg!(target_os = "windows") || is_echo_reply(stdout))
}

#[async_trait]
impl LivenessChecker for Ping {
    async fn is_alive(&self, host: &str) -> bool {
        // a leading '-' would be read as an option by ping
        if host.is_empty() || host.starts_with('-') {
            log::debug!("refusing to probe '{}'", host);
            return false;
        }

        let probe = Command::new("ping")
            .args(Self::args(host))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(PROBE_TIMEOUT + PROBE_GRACE, probe).await {
            Ok(Ok(output)) => {
                log::trace!("ping {} exited with {}", host, output.status);
                confirms_alive(output.status.success(), &String::from_utf8_lossy(&output.stdout))
            }
            Ok(Err(e)) => {
                log::debug!("unable to run ping for {}: {}", host, e);
                false
            }
            Err(_) => {
                log::trace!("ping {} timed out", host);
                false
            }
        }
    }
}
