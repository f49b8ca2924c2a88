//! Streaming HTTP downloads into memory.

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{Error, Result};

/// Fetches `url` fully into memory, reporting progress unless `quiet` is
/// set (batch/CI runs). Payloads are archives or single binaries, small
/// enough that buffering beats managing temp files before verification.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    label: &str,
    quiet: bool,
) -> Result<Vec<u8>> {
    tracing::debug!("fetching {}", url);

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let total_size = response.content_length().unwrap_or(0);
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(total_size)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Downloading {}", label));

    let mut data = Vec::with_capacity(total_size as usize);
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        data.extend_from_slice(&chunk);
        pb.set_position(data.len() as u64);
    }

    pb.finish_and_clear();
    Ok(data)
}
