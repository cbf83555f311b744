mod args;
mod input;
mod output;

use anyhow::{Context, Result};
use futures::StreamExt;
use mailprobe::VerificationPipeline;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Commands};
use crate::output::Reporter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let addresses = match &cli.cmd {
        Some(Commands::Check { email }) => vec![email.trim().to_string()],
        None if cli.has_input() => input::read_addresses(&cli).await?,
        None => {
            Cli::clap_command().print_help()?;
            println!();
            return Ok(());
        }
    };

    // check always shows its single verdict
    let show_all = cli.all || cli.cmd.is_some();
    let mut reporter = Reporter::new(&cli, show_all)?;

    let pipeline = VerificationPipeline::from_system_conf(cli.probe.to_config())
        .context("initialise DNS resolver from system configuration")?;

    let mut verdicts = std::pin::pin!(pipeline.verify_batch(addresses));
    while let Some((index, verdict)) = verdicts.next().await {
        reporter.record(index, verdict)?;
    }

    let summary = reporter.finish()?;
    info!(
        total = summary.total(),
        reachable = summary.reachable,
        unreachable = summary.unreachable,
        indeterminate = summary.indeterminate,
        "done"
    );

    if !summary.all_reachable() {
        std::process::exit(2);
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mailprobe={level},mailprobe_cli={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
