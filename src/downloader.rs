//! Image download for qualifying discoveries.
//!
//! Fetches the best available image url for a recorded discovery and saves
//! it under the task folder as `{query}_{score}_{index:04}.{ext}`. Download
//! failures never affect recording; the caller logs and moves on.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::engine::types::DiscoveryRecord;

/// User agent presented to the image CDN, matching the browser session
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

const IMAGE_REFERER: &str = "https://www.pinterest.com/";

pub struct ImageDownloader {
    client: reqwest::Client,
    dir: PathBuf,
    query: String,
}

impl ImageDownloader {
    pub fn new(dir: impl Into<PathBuf>, query: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CHROME_USER_AGENT));
        headers.insert(REFERER, HeaderValue::from_static(IMAGE_REFERER));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build image download client")?;
        Ok(Self {
            client,
            dir: dir.into(),
            query: query.into(),
        })
    }

    /// Fetch the record's image and save it; returns the saved path
    pub async fn fetch(&self, record: &DiscoveryRecord) -> Result<PathBuf> {
        debug!("downloading image: {}", record.image_url);
        let response = self
            .client
            .get(&record.image_url)
            .send()
            .await
            .with_context(|| format!("request failed for {}", record.image_url))?
            .error_for_status()
            .with_context(|| format!("server rejected {}", record.image_url))?;

        let ext = extension_for(
            response.headers().get(reqwest::header::CONTENT_TYPE),
            &record.image_url,
        );
        let stem = sanitize_filename::sanitize(format!(
            "{}_{}_{:04}",
            self.query.replace(' ', "_"),
            record.score,
            record.index
        ));

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("failed to read image body from {}", record.image_url))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create download dir {}", self.dir.display()))?;
        let path = self.dir.join(format!("{stem}.{ext}"));
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("failed to write image file {}", path.display()))?;
        Ok(path)
    }
}

/// File extension for the saved image: content-type first, then the url
/// path, then jpg.
fn extension_for(content_type: Option<&HeaderValue>, image_url: &str) -> &'static str {
    match content_type.and_then(|v| v.to_str().ok()) {
        Some(ct) if ct.contains("png") => return "png",
        Some(ct) if ct.contains("webp") => return "webp",
        Some(ct) if ct.contains("gif") => return "gif",
        Some(ct) if ct.contains("jpeg") || ct.contains("jpg") => return "jpg",
        _ => {}
    }
    let from_path = url::Url::parse(image_url)
        .ok()
        .and_then(|u| u.path().rsplit('.').next().map(str::to_ascii_lowercase));
    match from_path.as_deref() {
        Some("png") => "png",
        Some("webp") => "webp",
        Some("gif") => "gif",
        _ => "jpg",
    }
}
