//! Page orchestration engine
//!
//! **Module structure:**
//! - `mod.rs`: construction, page skeleton, viewport dispatch, logical time
//! - `sections.rs`: section navigator (active-section state machine)
//! - `streams.rs`: live-stream tab controller
//! - `sharing.rs`: share-link building and the copy fallback chain
//!
//! One engine instance owns every piece of page state; nothing is module
//! level, so tests construct as many independent engines as they need.

mod sections;
mod sharing;
mod streams;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::warn;

use showdeck_common::config::{SiteConfig, SECTION_AUDIO_ARCHIVES, SECTION_LIVE_STREAMS, SECTION_VIDEO_ARCHIVES};
use showdeck_common::events::UiEvent;
use showdeck_common::{ArchiveDocument, MediaKind};

use crate::archive::{list_container_id, ArchiveRenderer};
use crate::dom::Document;
use crate::embed::EmbedManager;
use crate::observer::{ObserverKind, ObserverRegistry, ViewportSignal};
use crate::share::ShareChannels;
use crate::timers::{DeferredAction, TimerQueue};
use crate::url::{History, PageUrl};
use crate::widget::WidgetSdk;

/// Navigation control id for a section
pub fn nav_control_id(section: &str) -> String {
    format!("nav-{}", section)
}

/// The page: one instance per session
pub struct UiEngine {
    pub config: SiteConfig,
    pub doc: Document,
    pub timers: TimerQueue,
    pub observers: ObserverRegistry,
    pub embeds: EmbedManager,
    pub renderer: ArchiveRenderer,
    share: ShareChannels,
    history: History,
    active_section: String,
    active_stream: String,
    events: broadcast::Sender<UiEvent>,
}

impl UiEngine {
    pub fn new(config: SiteConfig, sdk: Box<dyn WidgetSdk>, share: ShareChannels) -> Self {
        Self::with_url(config, sdk, share, PageUrl::new("/"))
    }

    /// Build the page skeleton with an explicit initial location.
    ///
    /// The initial section comes from the URL fragment when it names a
    /// known section, otherwise from configuration.
    pub fn with_url(
        config: SiteConfig,
        sdk: Box<dyn WidgetSdk>,
        share: ShareChannels,
        initial_url: PageUrl,
    ) -> Self {
        let (events, _) = broadcast::channel(100);

        let active_section = initial_url
            .fragment
            .as_deref()
            .filter(|f| config.is_known_section(f))
            .unwrap_or(&config.default_section)
            .to_string();

        let active_stream = initial_url
            .param("stream")
            .filter(|s| matches!(*s, "kick" | "twitch"))
            .unwrap_or(config.stream.primary.as_str())
            .to_string();

        let embeds = EmbedManager::new(
            sdk,
            config.embed.vk_language.clone(),
            config.timing.reload_delay_ms,
            events.clone(),
        );
        let renderer = ArchiveRenderer::new(config.timing.scroll_delay_ms, events.clone());

        let mut engine = Self {
            config,
            doc: Document::new(),
            timers: TimerQueue::new(),
            observers: ObserverRegistry::new(),
            embeds,
            renderer,
            share,
            history: History::new(initial_url),
            active_section,
            active_stream,
            events,
        };
        engine.build_page();
        engine
    }

    /// Subscribe to the lifecycle event stream
    pub fn subscribe_events(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    pub fn active_section(&self) -> &str {
        &self.active_section
    }

    pub fn active_stream(&self) -> &str {
        &self.active_stream
    }

    pub fn url(&self) -> &PageUrl {
        self.history.current()
    }

    /// Create the fixed element skeleton the components render into
    fn build_page(&mut self) {
        let body = self.doc.body();

        let nav = self.doc.create_with_id("nav", "main-nav");
        self.doc.append_child(body, nav);
        for section_id in self.config.sections.clone() {
            let control = self
                .doc
                .create_with_id("a", &nav_control_id(&section_id));
            self.doc.add_class(control, "nav-link");
            self.doc.set_text(control, &section_id);
            self.doc.append_child(nav, control);
        }

        for section_id in self.config.sections.clone() {
            let section = self.doc.create_with_id("section", &section_id);
            self.doc.add_class(section, "section");
            self.doc.append_child(body, section);

            match section_id.as_str() {
                SECTION_LIVE_STREAMS => self.build_stream_section(section),
                SECTION_AUDIO_ARCHIVES => {
                    let list = self
                        .doc
                        .create_with_id("div", list_container_id(MediaKind::Audio));
                    self.doc.add_class(list, "archive-list");
                    self.doc.append_child(section, list);
                }
                SECTION_VIDEO_ARCHIVES => {
                    let list = self
                        .doc
                        .create_with_id("div", list_container_id(MediaKind::Video));
                    self.doc.add_class(list, "archive-list");
                    self.doc.append_child(section, list);
                }
                _ => {}
            }
        }

        let toast = self.doc.create_with_id("div", "toast");
        self.doc.add_class(toast, "toast");
        self.doc.append_child(body, toast);

        // Mark the initial section and stream active
        let active = self.active_section.clone();
        if let Some(node) = self.doc.by_id(&active) {
            self.doc.add_class(node, "active");
            self.doc.set_style(node, "opacity", "1");
        }
        if let Some(control) = self.doc.by_id(&nav_control_id(&active)) {
            self.doc.add_class(control, "active");
        }
        if active == SECTION_LIVE_STREAMS {
            let body = self.doc.body();
            self.doc.add_class(body, "no-scroll");
        }
        self.activate_initial_stream();
    }

    /// Hand the loaded archive document to the renderer and resolve any
    /// deep link carried in the URL.
    pub fn attach_archives(&mut self, document: &ArchiveDocument) {
        self.renderer
            .render(&mut self.doc, &mut self.observers, MediaKind::Audio, &document.audio);
        self.renderer
            .render(&mut self.doc, &mut self.observers, MediaKind::Video, &document.video);

        let _ = self.events.send(UiEvent::ArchiveLoaded {
            audio_count: document.audio.len(),
            video_count: document.video.len(),
            timestamp: Utc::now(),
        });

        let url = self.history.current().clone();
        for (kind, param) in [(MediaKind::Audio, "audio"), (MediaKind::Video, "video")] {
            if let Some(key) = url.param(param) {
                let key = key.to_string();
                self.renderer.resolve_deep_link(
                    &mut self.doc,
                    &mut self.observers,
                    &mut self.embeds,
                    &mut self.timers,
                    kind,
                    &key,
                );
            }
        }
    }

    /// Render a cached load failure inline; the page stays usable
    pub fn render_archive_error(&mut self, message: &str) {
        for kind in [MediaKind::Audio, MediaKind::Video] {
            let Some(container) = self.doc.by_id(list_container_id(kind)) else {
                continue;
            };
            self.doc.remove_children(container);
            let error = self.doc.create_element("div");
            self.doc.add_class(error, "load-error");
            self.doc
                .set_text(error, &format!("Could not load archives: {}", message));
            self.doc.append_child(container, error);
        }
        let _ = self.events.send(UiEvent::ArchiveLoadFailed {
            message: message.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Dispatch a viewport intersection report to the armed observers
    pub fn viewport_signal(&mut self, signal: ViewportSignal) {
        let target = signal.target().to_string();
        let kinds = self.observers.kinds_for(&target);
        if kinds.is_empty() {
            return;
        }
        match signal {
            ViewportSignal::Entered { .. } => {
                if kinds.contains(&ObserverKind::YearLoad) {
                    self.renderer
                        .on_group_enter(&mut self.doc, &mut self.observers, &target);
                }
                if kinds.contains(&ObserverKind::ItemLoad) {
                    self.renderer.on_item_enter(
                        &mut self.doc,
                        &mut self.observers,
                        &mut self.embeds,
                        &target,
                    );
                }
            }
            ViewportSignal::Exited {
                distance_viewports, ..
            } => {
                if kinds.contains(&ObserverKind::YearUnload) {
                    let threshold = self.config.embed.unload_distance_viewports;
                    self.renderer.on_group_exit(
                        &mut self.doc,
                        &mut self.observers,
                        &mut self.embeds,
                        &target,
                        distance_viewports,
                        threshold,
                    );
                }
            }
        }
    }

    /// Advance logical time and run every due deferred action.
    ///
    /// Each action re-checks current DOM state when it fires; actions whose
    /// target vanished in the meantime are dropped.
    pub fn advance_time(&mut self, delta_ms: u64) {
        for action in self.timers.advance(delta_ms) {
            match action {
                DeferredAction::AssignIframeSource { element_id, src } => {
                    self.embeds
                        .complete_deferred_assign(&mut self.doc, &element_id, &src);
                }
                DeferredAction::SetOpacity { element_id, value } => {
                    if let Some(node) = self.doc.by_id(&element_id) {
                        self.doc.set_style(node, "opacity", &value);
                    }
                }
                DeferredAction::ScrollToItem { element_id } => {
                    if self.doc.by_id(&element_id).is_some() {
                        self.doc.scroll_to_element(&element_id);
                    } else {
                        warn!(element_id, "Deep-link scroll target disappeared");
                    }
                }
            }
        }
    }

    /// Run every pending deferred action immediately
    pub fn flush_timers(&mut self) {
        let pending = self.timers.pending_count();
        if pending > 0 {
            // Far enough to cover every configured delay
            self.advance_time(60_000);
        }
    }
}

impl std::fmt::Debug for UiEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiEngine")
            .field("active_section", &self.active_section)
            .field("active_stream", &self.active_stream)
            .field("observers", &self.observers.len())
            .finish()
    }
}
