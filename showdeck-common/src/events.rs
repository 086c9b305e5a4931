//! UI lifecycle event types
//!
//! Components report state transitions on a broadcast channel so observers
//! (logging, the CLI summary, tests) can watch the page lifecycle without
//! reaching into component internals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{MediaKind, Platform};

/// Page lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiEvent {
    /// Archive document loaded and validated
    ArchiveLoaded {
        audio_count: usize,
        video_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// Archive document failed to load; failure is cached for the session
    ArchiveLoadFailed {
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Active section changed
    SectionChanged {
        from: String,
        to: String,
        animated: bool,
        timestamp: DateTime<Utc>,
    },

    /// An embed was created for an archive item
    EmbedMounted {
        element_id: String,
        platform: Platform,
        timestamp: DateTime<Utc>,
    },

    /// An embed was halted and its source captured for later restore
    EmbedUnloaded {
        element_id: String,
        timestamp: DateTime<Utc>,
    },

    /// A previously unloaded embed was restored
    EmbedReloaded {
        element_id: String,
        timestamp: DateTime<Utc>,
    },

    /// A year group was materialized (placeholders and observers created)
    YearGroupMaterialized {
        kind: MediaKind,
        label: String,
        item_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A far-off-screen year group was torn down to reclaim memory
    YearGroupFreed {
        kind: MediaKind,
        label: String,
        timestamp: DateTime<Utc>,
    },

    /// Active live-stream platform changed
    StreamSwitched {
        from: String,
        to: String,
        timestamp: DateTime<Utc>,
    },

    /// A share link was placed on the clipboard (any successful path)
    ShareLinkCopied {
        url: String,
        timestamp: DateTime<Utc>,
    },
}

impl UiEvent {
    /// Event name for logging and diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            UiEvent::ArchiveLoaded { .. } => "ArchiveLoaded",
            UiEvent::ArchiveLoadFailed { .. } => "ArchiveLoadFailed",
            UiEvent::SectionChanged { .. } => "SectionChanged",
            UiEvent::EmbedMounted { .. } => "EmbedMounted",
            UiEvent::EmbedUnloaded { .. } => "EmbedUnloaded",
            UiEvent::EmbedReloaded { .. } => "EmbedReloaded",
            UiEvent::YearGroupMaterialized { .. } => "YearGroupMaterialized",
            UiEvent::YearGroupFreed { .. } => "YearGroupFreed",
            UiEvent::StreamSwitched { .. } => "StreamSwitched",
            UiEvent::ShareLinkCopied { .. } => "ShareLinkCopied",
        }
    }
}
