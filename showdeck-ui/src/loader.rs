//! Archive document loading with session-scoped caching
//!
//! The document is fetched and validated at most once per page session.
//! Success is cached and returned on every later call; failure is cached
//! too and re-surfaced without refetching; the loader never silently
//! retries. `reset` clears both caches (used by tests and manual refresh).

use std::path::PathBuf;

use tracing::{debug, info};

use showdeck_common::{ArchiveDocument, Error, Result};

/// Where the archive document comes from
#[derive(Debug, Clone)]
pub enum ArchiveSource {
    /// Local file (the fetch tooling writes `data/archives.json`)
    File(PathBuf),
    /// HTTP(S) endpoint serving the same document
    Http(String),
    /// Literal JSON text, for tests
    Inline(String),
}

impl ArchiveSource {
    /// Guess file-vs-HTTP from a CLI argument
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            ArchiveSource::Http(arg.to_string())
        } else {
            ArchiveSource::File(PathBuf::from(arg))
        }
    }
}

/// Failure snapshot kept for the rest of the session
#[derive(Debug, Clone)]
struct CachedFailure {
    kind: FailureKind,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureKind {
    Fetch,
    HttpStatus(u16),
    Parse,
    Schema,
}

impl CachedFailure {
    fn capture(error: &Error) -> Self {
        let kind = match error {
            Error::HttpStatus(status) => FailureKind::HttpStatus(*status),
            Error::Parse(_) => FailureKind::Parse,
            Error::Schema(_) => FailureKind::Schema,
            _ => FailureKind::Fetch,
        };
        Self {
            kind,
            message: error.to_string(),
        }
    }

    fn to_error(&self) -> Error {
        match self.kind {
            FailureKind::HttpStatus(status) => Error::HttpStatus(status),
            FailureKind::Schema => Error::Schema(self.message.clone()),
            FailureKind::Parse | FailureKind::Fetch => Error::Fetch(self.message.clone()),
        }
    }
}

/// Session-scoped archive loader
#[derive(Debug)]
pub struct ArchiveLoader {
    source: ArchiveSource,
    cached: Option<std::result::Result<ArchiveDocument, CachedFailure>>,
    fetch_count: u64,
}

impl ArchiveLoader {
    pub fn new(source: ArchiveSource) -> Self {
        Self {
            source,
            cached: None,
            fetch_count: 0,
        }
    }

    /// Number of actual fetches performed (at most one per reset)
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count
    }

    /// Fetch, parse, and validate the document; cached after the first call
    pub async fn load(&mut self) -> Result<ArchiveDocument> {
        if let Some(cached) = &self.cached {
            return match cached {
                Ok(doc) => {
                    debug!("Archive document served from cache");
                    Ok(doc.clone())
                }
                Err(failure) => Err(failure.to_error()),
            };
        }

        self.fetch_count += 1;
        let result = self.fetch_and_parse().await;
        match result {
            Ok(doc) => {
                info!(
                    audio = doc.audio.len(),
                    video = doc.video.len(),
                    "Archive document loaded"
                );
                self.cached = Some(Ok(doc.clone()));
                Ok(doc)
            }
            Err(e) => {
                self.cached = Some(Err(CachedFailure::capture(&e)));
                Err(e)
            }
        }
    }

    async fn fetch_and_parse(&self) -> Result<ArchiveDocument> {
        let text = match &self.source {
            ArchiveSource::File(path) => std::fs::read_to_string(path)
                .map_err(|e| Error::Fetch(format!("{}: {}", path.display(), e)))?,
            ArchiveSource::Http(url) => {
                let response = reqwest::get(url)
                    .await
                    .map_err(|e| Error::Fetch(e.to_string()))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(Error::HttpStatus(status.as_u16()));
                }
                response
                    .text()
                    .await
                    .map_err(|e| Error::Fetch(e.to_string()))?
            }
            ArchiveSource::Inline(text) => text.clone(),
        };
        ArchiveDocument::from_json(&text)
    }

    /// Clear both the success and failure caches
    pub fn reset(&mut self) {
        self.cached = None;
    }
}
