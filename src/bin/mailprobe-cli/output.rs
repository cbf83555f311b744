use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::Write as _;

use anyhow::{Context, Result, bail};
use mailprobe::{VerdictStatus, VerificationVerdict};

use crate::args::Cli;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Human,
    List,
    Json,
    Ndjson,
    Csv,
}

impl Format {
    pub fn parse(s: &str) -> Result<Self> {
        let format = match s {
            "human" => Self::Human,
            "list" => Self::List,
            "json" => Self::Json,
            "ndjson" => Self::Ndjson,
            "csv" => Self::Csv,
            other => bail!("unknown --format '{other}', use: human|list|json|ndjson|csv"),
        };
        match format {
            Self::Json | Self::Ndjson if !cfg!(feature = "with-serde") => {
                bail!("format={s} requires the 'with-serde' feature")
            }
            Self::Csv if !cfg!(feature = "with-csv") => {
                bail!("format=csv requires the 'with-csv' feature")
            }
            _ => Ok(format),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub reachable: usize,
    pub unreachable: usize,
    pub indeterminate: usize,
}

impl Summary {
    fn add(&mut self, status: VerdictStatus) {
        match status {
            VerdictStatus::Reachable => self.reachable += 1,
            VerdictStatus::Unreachable => self.unreachable += 1,
            VerdictStatus::Indeterminate => self.indeterminate += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.reachable + self.unreachable + self.indeterminate
    }

    pub fn all_reachable(&self) -> bool {
        self.unreachable == 0 && self.indeterminate == 0
    }
}

/// Receives verdicts in completion order. `human` and `list` rows are
/// written as they arrive; report formats are buffered and written in input
/// order by [`finish`](Self::finish).
pub struct Reporter {
    format: Format,
    out: Option<String>,
    show_all: bool,
    appender: Option<File>,
    buffered: Vec<(usize, VerificationVerdict)>,
    summary: Summary,
}

impl Reporter {
    pub fn new(cli: &Cli, show_all: bool) -> Result<Self> {
        let format = Format::parse(&cli.format)?;
        let appender = match (&cli.out, format) {
            (Some(path), Format::Human | Format::List) => Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("open {path} for append"))?,
            ),
            _ => None,
        };
        Ok(Self {
            format,
            out: cli.out.clone(),
            show_all,
            appender,
            buffered: Vec::new(),
            summary: Summary::default(),
        })
    }

    pub fn record(&mut self, index: usize, verdict: VerificationVerdict) -> Result<()> {
        self.summary.add(verdict.status);

        if let Some(file) = self.appender.as_mut() {
            if !verdict.is_reachable() {
                writeln!(file, "{}", verdict.address)?;
                file.flush()?;
            }
        }

        if verdict.is_reachable() && !self.show_all {
            return Ok(());
        }
        match self.format {
            Format::Human => println!("{}", render_human(&verdict)),
            // with --out the file is the list
            Format::List if self.appender.is_none() => println!("{}", verdict.address),
            Format::List => {}
            Format::Json | Format::Ndjson | Format::Csv => self.buffered.push((index, verdict)),
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<Summary> {
        self.buffered.sort_by_key(|(index, _)| *index);
        let rows: Vec<&VerificationVerdict> = self.buffered.iter().map(|(_, v)| v).collect();
        let out = self.out.as_deref();
        match self.format {
            #[cfg(feature = "with-serde")]
            Format::Json => write_json(&rows, out)?,
            #[cfg(feature = "with-serde")]
            Format::Ndjson => write_ndjson(&rows, out)?,
            #[cfg(feature = "with-csv")]
            Format::Csv => write_csv(&rows, out)?,
            _ => {
                let _ = (rows, out);
            }
        }
        Ok(self.summary)
    }
}

pub fn render_human(verdict: &VerificationVerdict) -> String {
    let tag = match verdict.status {
        VerdictStatus::Reachable => "[OK]",
        VerdictStatus::Unreachable => "[UNREACHABLE]",
        VerdictStatus::Indeterminate => "[INDETERMINATE]",
    };
    let mut line = format!("{tag:<15} {}", verdict.address);
    if verdict.is_reachable() {
        if let Some(mx) = &verdict.exchanger {
            let _ = write!(line, " via {mx}");
        }
        return line;
    }

    let _ = write!(line, " :: {}", verdict.reason);
    if let Some(mx) = &verdict.exchanger {
        let _ = write!(line, " at {mx}");
    }
    if let Some(detail) = &verdict.detail {
        let _ = write!(line, "; {detail}");
    }
    line
}

#[cfg(feature = "with-serde")]
fn write_json(rows: &[&VerificationVerdict], out: Option<&str>) -> Result<()> {
    let s = serde_json::to_string_pretty(rows)?;
    if let Some(path) = out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(feature = "with-serde")]
fn write_ndjson(rows: &[&VerificationVerdict], out: Option<&str>) -> Result<()> {
    if let Some(path) = out {
        let mut buf = Vec::new();
        for row in rows {
            let line = serde_json::to_string(row)?;
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
        }
        write_all_atomically(path, &buf)?;
    } else {
        for row in rows {
            println!("{}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

#[cfg(feature = "with-csv")]
const CSV_HEADER: [&str; 6] = ["address", "status", "reason", "code", "exchanger", "detail"];

#[cfg(feature = "with-csv")]
fn write_csv(rows: &[&VerificationVerdict], out: Option<&str>) -> Result<()> {
    if let Some(path) = out {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(CSV_HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        let data = wtr.into_inner()?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        wtr.write_record(CSV_HEADER)?;
        for row in rows {
            wtr.write_record(csv_record(row))?;
        }
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(feature = "with-csv")]
fn csv_record(verdict: &VerificationVerdict) -> [String; 6] {
    use mailprobe::VerdictReason;

    let reason = match verdict.reason {
        VerdictReason::Accepted => "accepted",
        VerdictReason::MxFound => "mx_found",
        VerdictReason::InvalidFormat => "invalid_format",
        VerdictReason::NoMailRoute => "no_mail_route",
        VerdictReason::Rejected { .. } => "rejected",
        VerdictReason::AllExchangersUnreachable => "all_exchangers_unreachable",
    };
    [
        verdict.address.clone(),
        verdict.status.to_string(),
        reason.to_string(),
        verdict
            .rejection_code()
            .map(|code| code.to_string())
            .unwrap_or_default(),
        verdict.exchanger.clone().unwrap_or_default(),
        verdict.detail.clone().unwrap_or_default(),
    ]
}

#[cfg(any(feature = "with-serde", feature = "with-csv"))]
fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    let tmp = format!("{path}.tmp");
    {
        let mut f = File::create(&tmp).with_context(|| format!("create {tmp}"))?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}
