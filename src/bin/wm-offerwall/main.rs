//! wm-offerwall CLI entry point.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wm_offerwall::{
    create_event_channel, tool, CustomChoice, HttpPaymentVerifier, InitializeParams,
    InitializeResponse, LinkRelations, OfferwallConfig, PageEvent, PageEventsSender, TracingView,
};

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = cli.to_config()?;

    let (filter, invalid_level) = match EnvFilter::try_new(&config.log_level) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new("info"), Some(e)),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Some(e) = invalid_level {
        warn!("Invalid log level {:?} ({e}), using info", config.log_level);
    }

    info!("wm-offerwall v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Serve => {
            tool::serve(&config.tool, async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Ctrl-C received, shutting down");
                }
            })
            .await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Watch {
            link_rels,
            language,
        } => watch(&config, link_rels, language).await,
        Command::PrintConfig => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Run initialization and, if needed, the payment prompt over stdin events.
async fn watch(
    config: &OfferwallConfig,
    link_rels: Vec<String>,
    language: Option<String>,
) -> color_eyre::Result<ExitCode> {
    let verifier = Arc::new(HttpPaymentVerifier::new(&config.verifier)?);
    let probe = Box::new(LinkRelations::new(link_rels));
    let mut choice = CustomChoice::new(verifier, probe, config.retry);

    let (events_tx, events_rx) = create_event_channel();
    tokio::spawn(read_events(events_tx));

    let params = InitializeParams {
        offerwall_language_code: language,
    };
    match choice.initialize(&params, events_rx).await {
        InitializeResponse::CustomChoiceDisabled => {
            warn!("Custom choice disabled for this page");
            return Ok(ExitCode::FAILURE);
        }
        InitializeResponse::AccessGranted => return Ok(ExitCode::SUCCESS),
        InitializeResponse::AccessNotGranted => {}
    }

    let prompt = choice.prompt();
    let cancel = prompt.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let outcome = prompt.run(&mut TracingView::new()).await;
    info!("Prompt finished: {outcome:?}");

    Ok(if outcome.is_granted() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Forward newline-delimited JSON events from stdin to the page channel.
async fn read_events(events_tx: PageEventsSender) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => {}
            Ok(Some(line)) => {
                let _ = events_tx.send(PageEvent::from_json(&line));
            }
            Ok(None) => {
                info!("Event input closed");
                break;
            }
            Err(e) => {
                warn!("Failed to read event input: {e}");
                break;
            }
        }
    }
}
