//! Section navigator: the active-section state machine
//!
//! Transitions come from navigation control activation, browser
//! back/forward, and the initial URL hash. Every real transition unloads
//! the outgoing section's media, fades, flips active markers, reloads the
//! incoming section's media, and bookkeeps URL parameters. Re-activating
//! the audio archives while already active is a deliberate reset
//! affordance rather than a transition.

use chrono::Utc;
use tracing::{debug, info, warn};

use showdeck_common::config::{SECTION_AUDIO_ARCHIVES, SECTION_LIVE_STREAMS, SECTION_VIDEO_ARCHIVES};
use showdeck_common::events::UiEvent;
use showdeck_common::MediaKind;

use crate::archive::list_container_id;
use crate::timers::DeferredAction;
use crate::url::PageUrl;

use super::{nav_control_id, UiEngine};

impl UiEngine {
    /// Switch the visible section. `animate` is false for history- or
    /// hash-driven transitions. Entering an archive section whose URL still
    /// carries a deep-link parameter resolves the link instead of scrolling
    /// to the top.
    pub fn switch_section(&mut self, id: &str, animate: bool) {
        self.switch_section_inner(id, animate, true);
    }

    /// Browser back: replay the previous history entry without pushing
    pub fn history_back(&mut self) {
        if let Some(url) = self.history.back() {
            self.apply_popstate(url);
        }
    }

    /// Browser forward
    pub fn history_forward(&mut self) {
        if let Some(url) = self.history.forward() {
            self.apply_popstate(url);
        }
    }

    fn apply_popstate(&mut self, url: PageUrl) {
        let section = url
            .fragment
            .as_deref()
            .filter(|f| self.config.is_known_section(f))
            .unwrap_or(&self.config.default_section)
            .to_string();
        self.switch_section_inner(&section, false, false);
    }

    fn switch_section_inner(&mut self, id: &str, animate: bool, push_history: bool) {
        if !self.config.is_known_section(id) {
            warn!(section = id, "Unknown section id, ignoring switch request");
            return;
        }

        if id == self.active_section {
            if id == SECTION_AUDIO_ARCHIVES {
                // Idempotent reset affordance: clear the deep link, drop the
                // highlight, and return to the top of the list.
                debug!("Audio archives re-activated, resetting deep-link state");
                let mut url = self.history.current().clone();
                url.clear_param("audio");
                self.history.replace(url);
                self.renderer.clear_highlight(&mut self.doc);
                self.doc.scroll_to_top();
            }
            return;
        }

        let outgoing = self.active_section.clone();
        let Some(incoming_node) = self.doc.by_id(id) else {
            warn!(section = id, "Section container missing, abandoning switch");
            return;
        };
        let Some(outgoing_node) = self.doc.by_id(&outgoing) else {
            warn!(section = %outgoing, "Outgoing section container missing, abandoning switch");
            return;
        };

        // Halt the outgoing section's media before anything moves
        for container in self.media_containers(&outgoing) {
            self.embeds.unload_container(&mut self.doc, &container);
        }

        // URL bookkeeping: leaving the video archives drops its deep link
        let mut url = self.history.current().clone();
        if outgoing == SECTION_VIDEO_ARCHIVES {
            url.clear_param("video");
        }
        url.fragment = Some(id.to_string());

        // Fade out / fade in; markers flip immediately so exactly one
        // section is active at every observable point.
        self.doc.remove_class(outgoing_node, "active");
        self.doc.set_style(outgoing_node, "opacity", "0");
        self.doc.add_class(incoming_node, "active");
        if animate {
            self.doc.set_style(incoming_node, "opacity", "0");
            self.timers.schedule(
                self.config.timing.transition_ms,
                DeferredAction::SetOpacity {
                    element_id: id.to_string(),
                    value: "1".to_string(),
                },
            );
        } else {
            self.doc.set_style(incoming_node, "opacity", "1");
        }

        // Restore the incoming section's media
        for container in self.media_containers(id) {
            self.embeds
                .reload_container(&mut self.doc, &mut self.timers, &container);
        }

        // Navigation control markers
        if let Some(control) = self.doc.by_id(&nav_control_id(&outgoing)) {
            self.doc.remove_class(control, "active");
        }
        if let Some(control) = self.doc.by_id(&nav_control_id(id)) {
            self.doc.add_class(control, "active");
        }

        // The live section is full-viewport; page scrolling is suppressed
        let body = self.doc.body();
        if id == SECTION_LIVE_STREAMS {
            self.doc.add_class(body, "no-scroll");
        } else {
            self.doc.remove_class(body, "no-scroll");
        }

        self.active_section = id.to_string();
        if push_history {
            self.history.push(url.clone());
        } else {
            self.history.replace(url.clone());
        }

        // Scroll to top unless a deep link asks for a specific item
        let deep_link = match id {
            SECTION_AUDIO_ARCHIVES => url.param("audio").map(|k| (MediaKind::Audio, k.to_string())),
            SECTION_VIDEO_ARCHIVES => url.param("video").map(|k| (MediaKind::Video, k.to_string())),
            _ => None,
        };
        match deep_link {
            Some((kind, key)) => {
                self.renderer.resolve_deep_link(
                    &mut self.doc,
                    &mut self.observers,
                    &mut self.embeds,
                    &mut self.timers,
                    kind,
                    &key,
                );
            }
            None => self.doc.scroll_to_top(),
        }

        info!(from = %outgoing, to = id, animate, "Section switched");
        let _ = self.events.send(UiEvent::SectionChanged {
            from: outgoing,
            to: id.to_string(),
            animated: animate,
            timestamp: Utc::now(),
        });
    }

    /// Element ids holding media for a section; unload/reload walk these
    fn media_containers(&self, section: &str) -> Vec<String> {
        match section {
            SECTION_AUDIO_ARCHIVES => vec![list_container_id(MediaKind::Audio).to_string()],
            SECTION_VIDEO_ARCHIVES => vec![list_container_id(MediaKind::Video).to_string()],
            SECTION_LIVE_STREAMS => vec![
                format!("{}-player", self.active_stream),
                "stream-chat".to_string(),
            ],
            _ => Vec::new(),
        }
    }
}
