use std::{
    io::{Read, Seek, SeekFrom},
    path::Path,
    time::Duration,
};

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use zip::ZipArchive;

/// HTTP body reader that reports progress while it is consumed.
pub struct RemoteFile {
    response: reqwest::blocking::Response,
    current_size: u64,
    pbar: Option<ProgressBar>,
}
impl RemoteFile {
    pub fn with_pbar(url: &str) -> Result<Self> {
        Self::with_config(url, 3600, true)
    }
    pub fn with_config(url: &str, timeout: u64, pbar: bool) -> Result<Self> {
        let client = reqwest::blocking::Client::new();
        let response = client
            .get(url)
            .timeout(Duration::from_secs(timeout))
            .send()?;
        if !response.status().is_success() {
            bail!("failed to download {}: {}", url, response.status());
        }

        let pbar = if pbar {
            let pbar = match response.content_length() {
                Some(total_size) => ProgressBar::new(total_size),
                None => ProgressBar::new_spinner(),
            };
            pbar.set_style(ProgressStyle::default_bar()
                .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
                .progress_chars("#>-"));
            pbar.set_message(format!("Downloading {}", url));
            Some(pbar)
        } else {
            None
        };
        Ok(Self {
            response,
            current_size: 0,
            pbar,
        })
    }
    fn update(&mut self, size: usize) {
        self.current_size += size as u64;
        if let Some(pbar) = &self.pbar {
            pbar.set_position(self.current_size);
        }
    }
}

impl Read for RemoteFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let size = self.response.read(buf)?;
        self.update(size);
        if size == 0 {
            if let Some(pbar) = &self.pbar {
                pbar.finish();
            }
        }
        Ok(size)
    }
}

pub fn download_and_extract<P: AsRef<Path>>(url: &str, path: P) -> Result<()> {
    info!(url, path = %path.as_ref().display(), "downloading archive");
    let mut remote_file = RemoteFile::with_pbar(url)?;
    let mut archive = tempfile::tempfile()?;
    std::io::copy(&mut remote_file, &mut archive)?;
    archive.seek(SeekFrom::Start(0))?;

    let mut archive = ZipArchive::new(&archive)?;
    archive.extract(path)?;
    Ok(())
}
