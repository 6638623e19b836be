//! browser-relay
//!
//! Entry point invoked by the desktop app. Prints exactly one JSON record:
//! the command's result on stdout, or an error record on stderr when the
//! command could not produce one.

use std::process::ExitCode;

use browser_relay::cli::{init_logging, record_style_for, Cli};
use browser_relay::report::emit_failure;
use clap::error::ErrorKind;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args: Vec<String> = std::env::args_os()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let cli = match Cli::try_parse_from(args.clone()) {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => e.exit(),
            _ => return emit_failure(record_style_for(&args), e.to_string().trim_end()),
        },
    };
    init_logging(cli.debug);

    let style = cli.command.record_style();
    match cli.command.run(cli.debug).await {
        Ok(report) => report.emit(),
        Err(e) => {
            tracing::error!("{e:#}");
            emit_failure(style, &format!("{e:#}"))
        }
    }
}
