//! # rosshow Main Entry Point
//!
//! Parses arguments, connects the bus feed and runs one viewing session.

use anyhow::Result;
use rosshow::cmd_args::CommandLineArgs;
use rosshow::config;
use rosshow::viewer::io::{StdinByteStream, TerminalRenderStream};
use rosshow::{Bus, DispatchError, JsonLinesFeed, ViewerController, ViewerOptions};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let args = CommandLineArgs::parse();

    let Some(stream) = args.stream() else {
        // A missing topic is not treated as a failure.
        println!("{}", CommandLineArgs::help());
        std::process::exit(0);
    };

    if let Err(e) = config::init_logging() {
        eprintln!("warning: {e:#}");
    }

    match run(stream, &args).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            let code = match e.downcast_ref::<DispatchError>() {
                Some(dispatch) => {
                    eprintln!("{dispatch}");
                    dispatch.exit_code()
                }
                None => {
                    eprintln!("error: {e:#}");
                    1
                }
            };
            tracing::error!(error = %e, "session failed");
            std::process::exit(code);
        }
    }
}

async fn run(stream: &str, args: &CommandLineArgs) -> Result<()> {
    let bus = Bus::new();
    // Without a source the bus stays empty and dispatch reports the topic as unpublished.
    let feed = match JsonLinesFeed::spawn(args.bus_path(), bus.clone()) {
        Ok(feed) => {
            tracing::info!(bus = %feed.path().display(), "bus source opened");
            Some(feed)
        }
        Err(e) => {
            tracing::warn!(error = %e, "no bus source");
            None
        }
    };
    tracing::info!(stream, "starting viewer");

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("SIGINT received, shutting down");
            signal_token.cancel();
        }
    });

    let controller = ViewerController::new(ViewerOptions::from_args(stream, args), bus);
    let report = controller
        .run(StdinByteStream::new()?, TerminalRenderStream::new(), cancel)
        .await?;

    tracing::info!(
        schema = %report.schema,
        frames = report.frames,
        pump_exit = ?report.pump_exit,
        "viewer stopped"
    );
    if let Some(feed) = feed {
        feed.stop();
    }
    Ok(())
}
