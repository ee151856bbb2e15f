use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

use wol_tool::config::{Cli, WakeRequest};
use wol_tool::console::Console;
use wol_tool::liveness::Ping;
use wol_tool::packet::UdpSender;
use wol_tool::wake::{WakeOutcome, Waker};

const EXIT_USAGE: u8 = 1;

fn usage() -> String {
    Cli::command().render_help().to_string()
}

fn parse_cli() -> Result<Cli, ExitCode> {
    Cli::try_parse().map_err(|e| {
        let console = Console::new(false);
        match e.kind() {
            ErrorKind::DisplayHelp => {
                console.banner();
                e.print().ok();
                ExitCode::SUCCESS
            }
            ErrorKind::DisplayVersion => {
                e.print().ok();
                ExitCode::SUCCESS
            }
            _ => {
                console.banner();
                e.print().ok();
                console.line("");
                console.line(usage());
                ExitCode::from(EXIT_USAGE)
            }
        }
    })
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let console = Console::new(cli.silent);

    let req = match WakeRequest::try_from(&cli) {
        Ok(req) => req,
        Err(e) => {
            console.banner();
            console.line(e.to_string());
            console.line("");
            console.line(usage());
            return Ok(ExitCode::from(EXIT_USAGE));
        }
    };
    log::debug!("{:?}", req);

    console.banner();

    let cancel_token = CancellationToken::new();
    let sigint_token = cancel_token.clone();
    ctrlc::set_handler(move || {
        log::debug!("received SIGINT");
        sigint_token.cancel();
    })
    .context("failed to install SIGINT handler")?;

    let waker = Waker::new(Ping, UdpSender, console, cancel_token);
    let outcome = waker.run(&req).await;
    if let WakeOutcome::Failed(e) = &outcome {
        console.line(e.to_string());
    }

    Ok(ExitCode::from(&outcome))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match parse_cli() {
        Ok(cli) => cli,
        Err(code) => return code,
    };

    SimpleLogger::new().with_level(cli.log_level()).init().ok();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::from(EXIT_USAGE)
        }
    }
}
