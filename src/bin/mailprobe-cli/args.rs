use std::time::Duration;

use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand};
use mailprobe::VerificationConfig;

#[derive(Parser)]
#[command(name = "mailprobe-cli", version)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// read addresses from a file (one per line)
    #[arg(long, short = 'i')]
    pub input: Option<String>,

    /// read addresses from stdin (one per line)
    #[arg(long)]
    pub stdin: bool,

    /// human|list: append non-reachable addresses; json|ndjson|csv: write the report
    #[arg(long)]
    pub out: Option<String>,

    /// format: human|list|json|ndjson|csv
    #[arg(long, default_value = "human")]
    pub format: String,

    /// also report reachable addresses
    #[arg(long)]
    pub all: bool,

    #[command(flatten)]
    pub probe: ProbeArgs,

    /// -v: info, -vv: debug (RUST_LOG wins when set)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// verify a single address
    Check { email: String },
}

#[derive(Args)]
pub struct ProbeArgs {
    /// TCP connect timeout (ms)
    #[arg(long = "connect-timeout", default_value_t = 5_000, global = true)]
    pub connect_timeout_ms: u64,

    /// SMTP dialogue deadline per exchanger (ms)
    #[arg(long = "probe-timeout", default_value_t = 10_000, global = true)]
    pub probe_timeout_ms: u64,

    /// MX lookup timeout (ms)
    #[arg(long = "resolve-timeout", default_value_t = 5_000, global = true)]
    pub resolve_timeout_ms: u64,

    /// verifications in flight
    #[arg(
        long = "max-concurrency",
        short = 'j',
        default_value_t = 8,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..),
        global = true
    )]
    pub max_concurrency: usize,

    /// probe at most this many exchangers per address
    #[arg(
        long = "max-mx",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..),
        global = true
    )]
    pub max_mx: Option<usize>,

    /// stop after the MX lookup: a domain with exchangers counts as reachable
    #[arg(long = "mx-only", global = true)]
    pub mx_only: bool,

    /// name announced in EHLO
    #[arg(long, global = true)]
    pub helo: Option<String>,

    /// MAIL FROM envelope sender
    #[arg(long = "from", global = true)]
    pub mail_from: Option<String>,

    #[arg(long, default_value_t = 25, global = true)]
    pub port: u16,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    pub fn has_input(&self) -> bool {
        self.stdin || self.input.is_some()
    }
}

impl ProbeArgs {
    pub fn to_config(&self) -> VerificationConfig {
        let defaults = VerificationConfig::default();
        VerificationConfig {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
            resolve_timeout: Duration::from_millis(self.resolve_timeout_ms),
            max_concurrency: self.max_concurrency,
            max_exchangers: self.max_mx,
            probe_smtp: !self.mx_only,
            port: self.port,
            helo_domain: self.helo.clone().unwrap_or(defaults.helo_domain),
            mail_from: self.mail_from.clone().unwrap_or(defaults.mail_from),
        }
    }
}
