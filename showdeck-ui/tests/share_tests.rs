//! Share delivery chain tests
//!
//! The fallback order, user cancellation counting as success, and the
//! confirmation toast appearing exactly when some stage delivered the link.

use showdeck_common::config::SiteConfig;
use showdeck_ui::share::{CopyPath, ShareChannels, ShareKind, ShareOutcome};
use showdeck_ui::testing::{
    new_log, CallLog, RecordingSdk, ScriptedClipboard, ScriptedManualCopy, ScriptedPrompt,
    ScriptedShareSheet,
};
use showdeck_ui::url::PageUrl;
use showdeck_ui::UiEngine;

fn engine_with_channels(channels: ShareChannels) -> UiEngine {
    UiEngine::with_url(
        SiteConfig::default(),
        Box::new(RecordingSdk::new(new_log())),
        channels,
        PageUrl::parse("/#audio-archives"),
    )
}

fn full_chain(log: &CallLog, outcome: ShareOutcome, clipboard_fail: bool, manual_fail: bool) -> ShareChannels {
    ShareChannels {
        sheet: Some(Box::new(ScriptedShareSheet {
            log: log.clone(),
            outcome,
        })),
        clipboard: Some(Box::new(ScriptedClipboard {
            log: log.clone(),
            fail: clipboard_fail,
        })),
        manual: Some(Box::new(ScriptedManualCopy {
            log: log.clone(),
            fail: manual_fail,
        })),
        prompt: Some(Box::new(ScriptedPrompt { log: log.clone() })),
    }
}

fn toast_visible(engine: &UiEngine) -> bool {
    engine
        .doc
        .by_id("toast")
        .map(|n| engine.doc.has_class(n, "visible"))
        .unwrap_or(false)
}

#[test]
fn test_sheet_success_stops_the_chain() {
    let log = new_log();
    let channels = full_chain(&log, ShareOutcome::Shared, false, false);
    let mut engine = engine_with_channels(channels);

    let path = engine.share_link(ShareKind::Audio, "/dj/mix/");
    assert_eq!(path, CopyPath::ShareSheet);
    assert!(toast_visible(&engine));

    let entries = log.lock().unwrap().clone();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].starts_with("sheet:"));
    assert!(entries[0].contains("audio="));
}

#[test]
fn test_sheet_cancellation_counts_as_delivered() {
    let log = new_log();
    let channels = full_chain(&log, ShareOutcome::Cancelled, false, false);
    let mut engine = engine_with_channels(channels);

    let path = engine.share_link(ShareKind::Audio, "/dj/mix/");
    assert_eq!(path, CopyPath::ShareSheet);
    assert!(toast_visible(&engine));
    // Nothing fell through to the clipboard
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn test_sheet_failure_falls_through_to_clipboard() {
    let log = new_log();
    let channels = full_chain(
        &log,
        ShareOutcome::Failed("no sheet".to_string()),
        false,
        false,
    );
    let mut engine = engine_with_channels(channels);

    let path = engine.share_link(ShareKind::Audio, "/dj/mix/");
    assert_eq!(path, CopyPath::Clipboard);
    assert!(toast_visible(&engine));
}

#[test]
fn test_chain_walks_to_prompt_when_everything_fails() {
    let log = new_log();
    let channels = full_chain(&log, ShareOutcome::Failed("no sheet".to_string()), true, true);
    let mut engine = engine_with_channels(channels);

    let path = engine.share_link(ShareKind::Video, "v-42");
    assert_eq!(path, CopyPath::Prompt);
    assert!(toast_visible(&engine));

    let entries = log.lock().unwrap().clone();
    assert!(entries.iter().any(|e| e == "clipboard-rejected"));
    assert!(entries.iter().any(|e| e == "manual-failed"));
    assert!(entries.iter().any(|e| e.starts_with("prompt:")));
}

#[test]
fn test_no_capabilities_means_no_toast() {
    let mut engine = engine_with_channels(ShareChannels::default());
    let path = engine.share_link(ShareKind::Audio, "/dj/mix/");
    assert_eq!(path, CopyPath::None);
    assert!(!toast_visible(&engine));
}

#[test]
fn test_stream_share_pins_live_fragment_in_delivered_url() {
    let log = new_log();
    let channels = ShareChannels {
        sheet: None,
        clipboard: Some(Box::new(ScriptedClipboard {
            log: log.clone(),
            fail: false,
        })),
        manual: None,
        prompt: None,
    };
    let mut engine = engine_with_channels(channels);

    let path = engine.share_link(ShareKind::Stream, "kick");
    assert_eq!(path, CopyPath::Clipboard);

    let entries = log.lock().unwrap().clone();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].contains("stream=kick"));
    assert!(entries[0].ends_with("#live-streams"));
}
