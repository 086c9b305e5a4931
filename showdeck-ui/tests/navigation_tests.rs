//! Section navigator tests
//!
//! Exclusivity of the active marker, the audio-archives reset affordance,
//! URL parameter bookkeeping, history-driven transitions, and the unload/
//! reload handoff between sections.

use chrono::{DateTime, Utc};

use showdeck_common::config::{
    SiteConfig, SECTION_AUDIO_ARCHIVES, SECTION_LIVE_STREAMS, SECTION_VIDEO_ARCHIVES,
};
use showdeck_common::{ArchiveDocument, ArchiveItem, MediaKind, Platform};
use showdeck_ui::archive::HIGHLIGHT_CLASS;
use showdeck_ui::dom::ScrollTarget;
use showdeck_ui::embed::RECOVER_ATTR;
use showdeck_ui::observer::ViewportSignal;
use showdeck_ui::share::ShareChannels;
use showdeck_ui::testing::{new_log, RecordingSdk};
use showdeck_ui::url::PageUrl;
use showdeck_ui::UiEngine;

fn audio_item(key: &str, created: &str) -> ArchiveItem {
    ArchiveItem {
        platform: Platform::Hearthis,
        title: format!("Track {}", key),
        url: format!("https://hearthis.at/dj/{}/", key),
        embed_url: Some(format!("https://app.hearthis.at/embed/{}/", key)),
        key: Some(key.to_string()),
        created_time: Some(
            DateTime::parse_from_rfc3339(created)
                .unwrap()
                .with_timezone(&Utc),
        ),
        play_count: 0,
        listener_count: 0,
        favorite_count: 0,
        repost_count: 0,
    }
}

fn engine_at(url: &str) -> UiEngine {
    UiEngine::with_url(
        SiteConfig::default(),
        Box::new(RecordingSdk::new(new_log())),
        ShareChannels::default(),
        PageUrl::parse(url),
    )
}

fn active_sections(engine: &UiEngine) -> Vec<String> {
    engine
        .config
        .sections
        .iter()
        .filter(|id| {
            engine
                .doc
                .by_id(id)
                .map(|n| engine.doc.has_class(n, "active"))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

fn active_nav_controls(engine: &UiEngine) -> Vec<String> {
    engine
        .config
        .sections
        .iter()
        .filter(|id| {
            engine
                .doc
                .by_id(&format!("nav-{}", id))
                .map(|n| engine.doc.has_class(n, "active"))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

#[test]
fn test_exactly_one_active_section_after_any_sequence() {
    let mut engine = engine_at("/#live-streams");
    let sequence = [
        (SECTION_AUDIO_ARCHIVES, true),
        (SECTION_AUDIO_ARCHIVES, true), // duplicate
        (SECTION_VIDEO_ARCHIVES, false),
        ("merch", true), // unknown
        (SECTION_LIVE_STREAMS, true),
        ("about", false),
    ];
    for (id, animate) in sequence {
        engine.switch_section(id, animate);
        engine.advance_time(1_000);
        assert_eq!(active_sections(&engine).len(), 1, "after switch to {}", id);
        assert_eq!(active_nav_controls(&engine).len(), 1);
    }
    assert_eq!(active_sections(&engine), vec!["about".to_string()]);
    assert_eq!(engine.active_section(), "about");
}

#[test]
fn test_unknown_section_is_a_logged_noop() {
    let mut engine = engine_at("/#live-streams");
    let before = engine.doc.mutation_count;
    engine.switch_section("merch", true);
    assert_eq!(engine.doc.mutation_count, before);
    assert_eq!(engine.active_section(), SECTION_LIVE_STREAMS);
}

#[test]
fn test_audio_reactivation_resets_deep_link_state() {
    let mut engine = engine_at("/?audio=k1#audio-archives");
    let doc = ArchiveDocument {
        audio: vec![audio_item("k1", "2024-03-01T00:00:00Z")],
        video: vec![],
    };
    engine.attach_archives(&doc);

    let item_element = engine
        .renderer
        .item_element_for(MediaKind::Audio, "k1")
        .unwrap();
    let node = engine.doc.by_id(&item_element).unwrap();
    assert!(engine.doc.has_class(node, HIGHLIGHT_CLASS));
    assert_eq!(engine.url().param("audio"), Some("k1"));

    // Re-activating the already-active audio section is the reset affordance
    engine.switch_section(SECTION_AUDIO_ARCHIVES, true);
    assert_eq!(engine.url().param("audio"), None);
    let node = engine.doc.by_id(&item_element).unwrap();
    assert!(!engine.doc.has_class(node, HIGHLIGHT_CLASS));
    assert_eq!(engine.doc.last_scroll, Some(ScrollTarget::Top));
    // Still the active section; this was not a transition
    assert_eq!(engine.active_section(), SECTION_AUDIO_ARCHIVES);
}

#[test]
fn test_leaving_video_archives_clears_video_param() {
    let mut engine = engine_at("/?video=v1#video-archives");
    assert_eq!(engine.active_section(), SECTION_VIDEO_ARCHIVES);
    engine.switch_section(SECTION_AUDIO_ARCHIVES, true);
    assert_eq!(engine.url().param("video"), None);
    assert_eq!(engine.url().fragment.as_deref(), Some(SECTION_AUDIO_ARCHIVES));
}

#[test]
fn test_no_scroll_flag_follows_live_section() {
    let mut engine = engine_at("/#live-streams");
    let body = engine.doc.body();
    assert!(engine.doc.has_class(body, "no-scroll"));

    engine.switch_section(SECTION_AUDIO_ARCHIVES, true);
    let body = engine.doc.body();
    assert!(!engine.doc.has_class(body, "no-scroll"));

    engine.switch_section(SECTION_LIVE_STREAMS, true);
    let body = engine.doc.body();
    assert!(engine.doc.has_class(body, "no-scroll"));
}

#[test]
fn test_history_back_replays_previous_section_without_animation() {
    let mut engine = engine_at("/#live-streams");
    engine.switch_section(SECTION_AUDIO_ARCHIVES, true);
    engine.switch_section(SECTION_VIDEO_ARCHIVES, true);
    assert_eq!(engine.active_section(), SECTION_VIDEO_ARCHIVES);

    engine.history_back();
    assert_eq!(engine.active_section(), SECTION_AUDIO_ARCHIVES);

    engine.history_back();
    assert_eq!(engine.active_section(), SECTION_LIVE_STREAMS);

    engine.history_forward();
    assert_eq!(engine.active_section(), SECTION_AUDIO_ARCHIVES);
}

#[test]
fn test_section_switch_unloads_and_reloads_media() {
    let mut engine = engine_at("/#audio-archives");
    let doc = ArchiveDocument {
        audio: vec![audio_item("k2", "2024-06-01T00:00:00Z")],
        video: vec![],
    };
    engine.attach_archives(&doc);

    // Mount the item's embed via its viewport observer
    let placeholder = engine
        .renderer
        .item_element_for(MediaKind::Audio, "k2")
        .unwrap();
    engine.viewport_signal(ViewportSignal::Entered {
        target: placeholder,
    });
    let embed_id = engine
        .embeds
        .state("k2")
        .unwrap()
        .mounted_element_id
        .clone()
        .unwrap();
    let node = engine.doc.by_id(&embed_id).unwrap();
    let original_src = engine.doc.attr(node, "src").unwrap().to_string();

    // Leaving the section halts the embed
    engine.switch_section(SECTION_VIDEO_ARCHIVES, true);
    let node = engine.doc.by_id(&embed_id).unwrap();
    assert_eq!(engine.doc.attr(node, "src"), Some(""));
    assert_eq!(
        engine.doc.attr(node, RECOVER_ATTR),
        Some(original_src.as_str())
    );

    // Returning restores it after the deferred assignment fires
    engine.switch_section(SECTION_AUDIO_ARCHIVES, true);
    engine.advance_time(1_000);
    let node = engine.doc.by_id(&embed_id).unwrap();
    assert_eq!(engine.doc.attr(node, "src"), Some(original_src.as_str()));
}

#[test]
fn test_history_return_to_deep_link_keeps_single_embed() {
    let mut engine = engine_at("/?audio=k1#audio-archives");
    let doc = ArchiveDocument {
        audio: vec![audio_item("k1", "2024-03-01T00:00:00Z")],
        video: vec![],
    };
    engine.attach_archives(&doc);
    engine.advance_time(1_000);

    let item_element = engine
        .renderer
        .item_element_for(MediaKind::Audio, "k1")
        .unwrap();
    let item_node = engine.doc.by_id(&item_element).unwrap();
    let iframe = engine.doc.descendants_by_tag(item_node, "iframe")[0];
    let original_src = engine.doc.attr(iframe, "src").unwrap().to_string();

    // Leave (unloads the embed, its node stays) and come back via history
    engine.switch_section(SECTION_VIDEO_ARCHIVES, true);
    engine.history_back();
    engine.advance_time(1_000);

    // One live embed per item, restored to its original source
    let item_node = engine.doc.by_id(&item_element).unwrap();
    let iframes = engine.doc.descendants_by_tag(item_node, "iframe");
    assert_eq!(iframes.len(), 1);
    assert_eq!(
        engine.doc.attr(iframes[0], "src"),
        Some(original_src.as_str())
    );
    assert_eq!(engine.active_section(), SECTION_AUDIO_ARCHIVES);
}

#[test]
fn test_animated_return_resolves_pending_deep_link() {
    let mut engine = engine_at("/?audio=k1#audio-archives");
    let doc = ArchiveDocument {
        audio: vec![audio_item("k1", "2024-03-01T00:00:00Z")],
        video: vec![],
    };
    engine.attach_archives(&doc);
    engine.advance_time(1_000);

    // The audio param survives a detour through a non-video section
    engine.switch_section("about", true);
    assert_eq!(engine.url().param("audio"), Some("k1"));
    engine.switch_section(SECTION_AUDIO_ARCHIVES, true);
    engine.advance_time(1_000);

    let item_element = engine
        .renderer
        .item_element_for(MediaKind::Audio, "k1")
        .unwrap();
    assert_eq!(
        engine.doc.last_scroll,
        Some(ScrollTarget::Element(item_element.clone()))
    );
    let item_node = engine.doc.by_id(&item_element).unwrap();
    assert_eq!(engine.doc.descendants_by_tag(item_node, "iframe").len(), 1);
    assert!(engine.doc.has_class(item_node, HIGHLIGHT_CLASS));
}

#[test]
fn test_missing_section_container_abandons_switch() {
    let mut engine = engine_at("/#live-streams");
    // Known to config but never built into the page skeleton
    engine.config.sections.push("ghost".to_string());
    let before_active = engine.active_section().to_string();
    engine.switch_section("ghost", true);
    assert_eq!(engine.active_section(), before_active);
}
