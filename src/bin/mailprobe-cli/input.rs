use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::args::Cli;

/// Collects the addresses named by `--input` and/or `--stdin`, file first.
pub async fn read_addresses(cli: &Cli) -> Result<Vec<String>> {
    let mut addresses = Vec::new();
    if let Some(path) = &cli.input {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("open {path}"))?;
        addresses.extend(read_lines(file).await.with_context(|| format!("read {path}"))?);
    }
    if cli.stdin {
        addresses.extend(read_lines(tokio::io::stdin()).await.context("read stdin")?);
    }
    Ok(addresses)
}

/// One address per line; surrounding whitespace is trimmed and blank lines skipped.
async fn read_lines<R>(source: R) -> std::io::Result<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(source).lines();
    let mut out = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            out.push(trimmed.to_string());
        }
    }
    Ok(out)
}
