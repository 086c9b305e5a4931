//! Share link construction and the layered copy fallback chain
//!
//! Building a link clones the current location and overwrites a single
//! query parameter; live-stream shares also pin the fragment to the
//! live-streams section. Delivery walks a fallback chain: native share
//! sheet (user cancellation counts as success), async clipboard, hidden
//! text-area selection copy, and finally a blocking prompt. Each stage is a
//! capability trait so headless runs and tests plug in doubles.

use tracing::debug;

use showdeck_common::Result;

use crate::url::PageUrl;

/// What a share link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareKind {
    Audio,
    Video,
    Stream,
}

impl ShareKind {
    /// Query parameter the deep link is carried in
    pub fn param_name(&self) -> &'static str {
        match self {
            ShareKind::Audio => "audio",
            ShareKind::Video => "video",
            ShareKind::Stream => "stream",
        }
    }
}

/// Build a shareable deep-link URL from the current location
pub fn build_share_url(current: &PageUrl, kind: ShareKind, key: &str) -> PageUrl {
    let mut url = current.clone();
    url.set_param(kind.param_name(), key);
    if kind == ShareKind::Stream {
        // Stream shares land the recipient on the live section directly
        url.fragment = Some("live-streams".to_string());
    }
    url
}

/// Result of offering a link to the native share sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// Sheet accepted the link
    Shared,
    /// User dismissed the sheet; treated as success, not an error
    Cancelled,
    /// Sheet failed; fall through to the clipboard chain
    Failed(String),
}

/// Native share sheet capability
pub trait ShareSheet: Send {
    fn share(&mut self, url: &str) -> ShareOutcome;
}

/// Async clipboard write capability
pub trait ClipboardWriter: Send {
    fn write(&mut self, text: &str) -> Result<()>;
}

/// Hidden-textarea select-and-copy fallback
pub trait ManualCopy: Send {
    /// Returns false if the copy command was rejected
    fn copy_via_selection(&mut self, text: &str) -> bool;
}

/// Last-resort blocking prompt showing the text for manual copying
pub trait Prompt: Send {
    fn prompt(&mut self, text: &str);
}

/// Which stage of the chain delivered the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPath {
    ShareSheet,
    Clipboard,
    ManualSelection,
    Prompt,
    /// No capability present at all (headless run without a prompt)
    None,
}

/// The available delivery capabilities, each optional
#[derive(Default)]
pub struct ShareChannels {
    pub sheet: Option<Box<dyn ShareSheet>>,
    pub clipboard: Option<Box<dyn ClipboardWriter>>,
    pub manual: Option<Box<dyn ManualCopy>>,
    pub prompt: Option<Box<dyn Prompt>>,
}

impl ShareChannels {
    /// Walk the fallback chain until one stage delivers the text
    pub fn deliver(&mut self, text: &str) -> CopyPath {
        if let Some(sheet) = self.sheet.as_mut() {
            match sheet.share(text) {
                ShareOutcome::Shared | ShareOutcome::Cancelled => return CopyPath::ShareSheet,
                ShareOutcome::Failed(reason) => {
                    debug!(reason, "Share sheet failed, trying clipboard");
                }
            }
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            match clipboard.write(text) {
                Ok(()) => return CopyPath::Clipboard,
                Err(e) => {
                    debug!(error = %e, "Clipboard write rejected, trying selection copy");
                }
            }
        }
        if let Some(manual) = self.manual.as_mut() {
            if manual.copy_via_selection(text) {
                return CopyPath::ManualSelection;
            }
            debug!("Selection copy command failed, falling back to prompt");
        }
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.prompt(text);
            return CopyPath::Prompt;
        }
        CopyPath::None
    }
}

impl std::fmt::Debug for ShareChannels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareChannels")
            .field("sheet", &self.sheet.is_some())
            .field("clipboard", &self.clipboard.is_some())
            .field("manual", &self.manual.is_some())
            .field("prompt", &self.prompt.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_url_overwrites_single_param() {
        let current = PageUrl::parse("/?audio=old#audio-archives");
        let url = build_share_url(&current, ShareKind::Audio, "/dj/new-mix/");
        assert_eq!(url.param("audio"), Some("/dj/new-mix/"));
        assert_eq!(url.render().matches("audio=").count(), 1);
        // Fragment untouched for non-stream shares
        assert_eq!(url.fragment.as_deref(), Some("audio-archives"));
    }

    #[test]
    fn test_stream_share_forces_live_fragment() {
        let current = PageUrl::parse("/?audio=x#video-archives");
        let url = build_share_url(&current, ShareKind::Stream, "kick");
        assert_eq!(url.param("stream"), Some("kick"));
        assert_eq!(url.fragment.as_deref(), Some("live-streams"));
    }

    #[test]
    fn test_empty_chain_reports_none() {
        let mut channels = ShareChannels::default();
        assert_eq!(channels.deliver("x"), CopyPath::None);
    }
}
