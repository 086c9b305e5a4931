//! Per-item embed state tracking and lifecycle operations
//!
//! The manager must be able to reverse every mount exactly: unload captures
//! the live source into a recoverable attribute and blanks it to halt
//! playback; reload restores from the capture by swapping in a fresh iframe
//! node and assigning the source after a minimal delay (reassigning a live
//! cross-origin iframe's source is not reliable). Unload is idempotent: a
//! second call never overwrites the captured original with a blank value.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use showdeck_common::events::UiEvent;
use showdeck_common::{ArchiveItem, Platform};

use crate::dom::{Document, NodeId};
use crate::timers::{DeferredAction, TimerQueue};
use crate::widget::{WidgetHandle, WidgetSdk};

use super::urls::{ensure_lang_param, mixcloud_player_url};

/// Attribute holding an iframe's original source across unload cycles
pub const RECOVER_ATTR: &str = "data-recover-src";

/// Per-archive-item runtime state, created on first mount
#[derive(Debug, Clone)]
pub struct EmbedState {
    /// True while a live embed exists for this item
    pub loaded: bool,
    /// Element id of the mounted iframe, kept across unload/reload
    pub mounted_element_id: Option<String>,
    /// Source produced by the original mount; preserved across cycles
    pub source_url: String,
    /// True when the platform uses a native widget bound to the iframe
    pub has_widget: bool,
}

/// Lifecycle call counters, for diagnostics and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbedStats {
    pub mounts: u64,
    pub unloads: u64,
    pub reloads: u64,
    pub frees: u64,
}

/// Owns every embed's state and the widget handle map.
///
/// The handle map is the only truly shared mutable structure in the page
/// and is touched exclusively by the manager's own methods.
pub struct EmbedManager {
    sdk: Box<dyn WidgetSdk>,
    vk_language: String,
    reload_delay_ms: u64,
    states: HashMap<String, EmbedState>,
    handles: HashMap<String, Box<dyn WidgetHandle>>,
    by_element: HashMap<String, String>,
    stats: EmbedStats,
    events: broadcast::Sender<UiEvent>,
}

impl EmbedManager {
    pub fn new(
        sdk: Box<dyn WidgetSdk>,
        vk_language: String,
        reload_delay_ms: u64,
        events: broadcast::Sender<UiEvent>,
    ) -> Self {
        Self {
            sdk,
            vk_language,
            reload_delay_ms,
            states: HashMap::new(),
            handles: HashMap::new(),
            by_element: HashMap::new(),
            stats: EmbedStats::default(),
            events,
        }
    }

    /// Stable key for an item's state record
    pub fn state_key(item: &ArchiveItem) -> String {
        item.key.clone().unwrap_or_else(|| item.url.clone())
    }

    pub fn state(&self, key: &str) -> Option<&EmbedState> {
        self.states.get(key)
    }

    pub fn stats(&self) -> EmbedStats {
        self.stats
    }

    /// Create an embed for `item` inside the container.
    ///
    /// Returns the mounted iframe's element id, or None when nothing was
    /// rendered (unknown platform, missing embed URL or container). Every
    /// failure path degrades: the overall render never fails because one
    /// embed could not be built.
    pub fn mount(
        &mut self,
        doc: &mut Document,
        item: &ArchiveItem,
        container_id: &str,
    ) -> Option<String> {
        let key = Self::state_key(item);
        if let Some(state) = self.states.get(&key) {
            if let Some(existing) = &state.mounted_element_id {
                if doc.by_id(existing).is_some() {
                    // An iframe for this item is still in the tree, loaded
                    // or merely unloaded. Restoring it is reload's job; a
                    // second mount would leave two embeds in one slot.
                    return Some(existing.clone());
                }
            }
        }

        let Some(container) = doc.by_id(container_id) else {
            warn!(container_id, "Embed container missing, skipping mount");
            return None;
        };

        let src = match &item.platform {
            Platform::Mixcloud => mixcloud_player_url(&item.url),
            Platform::Hearthis => match &item.embed_url {
                Some(url) => url.clone(),
                None => {
                    warn!(title = %item.title, "hearthis item without embedUrl");
                    return None;
                }
            },
            Platform::Vk => match &item.embed_url {
                Some(url) => ensure_lang_param(url, &self.vk_language),
                None => {
                    warn!(title = %item.title, "vk item without embedUrl");
                    return None;
                }
            },
            Platform::Other(name) => {
                warn!(platform = %name, title = %item.title, "Unsupported platform, no embed rendered");
                return None;
            }
        };

        let element_id = format!("embed-{}", Uuid::new_v4());
        let iframe = self.build_iframe(doc, &element_id, &src);
        doc.append_child(container, iframe);

        let mut has_widget = false;
        if item.platform == Platform::Mixcloud {
            match self.sdk.bind(&element_id, &src) {
                Ok(handle) => {
                    self.handles.insert(element_id.clone(), handle);
                    has_widget = true;
                }
                Err(e) => {
                    warn!(error = %e, "Widget SDK bind failed, using plain iframe fallback");
                }
            }
        }

        self.states.insert(
            key.clone(),
            EmbedState {
                loaded: true,
                mounted_element_id: Some(element_id.clone()),
                source_url: src,
                has_widget,
            },
        );
        self.by_element.insert(element_id.clone(), key);
        self.stats.mounts += 1;
        let _ = self.events.send(UiEvent::EmbedMounted {
            element_id: element_id.clone(),
            platform: item.platform.clone(),
            timestamp: Utc::now(),
        });
        Some(element_id)
    }

    fn build_iframe(&self, doc: &mut Document, element_id: &str, src: &str) -> NodeId {
        let iframe = doc.create_with_id("iframe", element_id);
        doc.set_attr(iframe, "src", src);
        doc.set_attr(iframe, "allow", "autoplay; encrypted-media");
        doc.set_attr(iframe, "frameborder", "0");
        doc.set_attr(iframe, "loading", "lazy");
        iframe
    }

    /// Halt one embed: pause and release its widget handle, capture the
    /// live source once, then blank it. The node stays in the tree.
    pub fn unload_element(&mut self, doc: &mut Document, element_id: &str) {
        let Some(node) = doc.by_id(element_id) else {
            return;
        };

        if let Some(mut handle) = self.handles.remove(element_id) {
            if let Err(e) = handle.pause() {
                warn!(element_id, error = %e, "Widget pause failed, continuing unload");
            }
            handle.dispose();
        }

        let current_src = doc.attr(node, "src").unwrap_or("").to_string();
        if current_src.is_empty() {
            // Already unloaded; leave the captured source untouched
            return;
        }
        if doc.attr(node, RECOVER_ATTR).is_none() {
            doc.set_attr(node, RECOVER_ATTR, &current_src);
        }
        doc.set_attr(node, "src", "");

        if let Some(key) = self.by_element.get(element_id) {
            if let Some(state) = self.states.get_mut(key) {
                state.loaded = false;
            }
        }
        self.stats.unloads += 1;
        let _ = self.events.send(UiEvent::EmbedUnloaded {
            element_id: element_id.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Unload every iframe under a container
    pub fn unload_container(&mut self, doc: &mut Document, container_id: &str) {
        let Some(container) = doc.by_id(container_id) else {
            debug!(container_id, "Unload target container missing");
            return;
        };
        let iframes: Vec<String> = doc
            .descendants_by_tag(container, "iframe")
            .into_iter()
            .filter_map(|n| doc.element_id(n).map(str::to_string))
            .collect();
        for element_id in iframes {
            self.unload_element(doc, &element_id);
        }
    }

    /// Restore a previously unloaded embed.
    ///
    /// The iframe node is replaced with a fresh one carrying the same
    /// attributes; the recovered source is assigned via a deferred action
    /// so the node is attached before it starts loading. An embed that is
    /// still showing is left alone.
    pub fn reload_element(&mut self, doc: &mut Document, timers: &mut TimerQueue, element_id: &str) {
        let Some(node) = doc.by_id(element_id) else {
            return;
        };
        let current_src = doc.attr(node, "src").unwrap_or("");
        if !current_src.is_empty() {
            // Already loaded; reload must not duplicate the embed
            return;
        }
        let Some(recovered) = doc.attr(node, RECOVER_ATTR).map(str::to_string) else {
            return;
        };
        let Some(parent) = doc.parent(node) else {
            return;
        };

        // Fresh node: reassigning a blanked cross-origin iframe's source in
        // place does not reliably restart the player.
        let attrs: Vec<(String, String)> = doc
            .node(node)
            .attrs
            .iter()
            .filter(|(name, _)| name.as_str() != "src")
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        let fresh = doc.create_with_id("iframe", element_id);
        for (name, value) in &attrs {
            doc.set_attr(fresh, name, value);
        }
        doc.set_attr(fresh, "src", "");
        doc.replace_child(parent, node, fresh);

        timers.schedule(
            self.reload_delay_ms,
            DeferredAction::AssignIframeSource {
                element_id: element_id.to_string(),
                src: recovered,
            },
        );
    }

    /// Reload every unloaded iframe under a container
    pub fn reload_container(
        &mut self,
        doc: &mut Document,
        timers: &mut TimerQueue,
        container_id: &str,
    ) {
        let Some(container) = doc.by_id(container_id) else {
            debug!(container_id, "Reload target container missing");
            return;
        };
        let iframes: Vec<String> = doc
            .descendants_by_tag(container, "iframe")
            .into_iter()
            .filter_map(|n| doc.element_id(n).map(str::to_string))
            .collect();
        for element_id in iframes {
            self.reload_element(doc, timers, &element_id);
        }
    }

    /// Complete a deferred source assignment.
    ///
    /// Re-checks current DOM state before acting: if the element vanished
    /// or an intervening unload/reload already ran, the stale action is
    /// dropped rather than resurrecting a dead iframe.
    pub fn complete_deferred_assign(&mut self, doc: &mut Document, element_id: &str, src: &str) {
        let Some(node) = doc.by_id(element_id) else {
            debug!(element_id, "Deferred source assign target gone, dropping");
            return;
        };
        let current = doc.attr(node, "src").unwrap_or("");
        if !current.is_empty() {
            return;
        }
        // Always read the most recently captured source, never the one the
        // action was scheduled with, so rapid unload/reload sequences stay
        // ordered.
        let effective = doc
            .attr(node, RECOVER_ATTR)
            .map(str::to_string)
            .unwrap_or_else(|| src.to_string());
        doc.set_attr(node, "src", &effective);

        let mut rebind = false;
        if let Some(key) = self.by_element.get(element_id) {
            if let Some(state) = self.states.get_mut(key) {
                state.loaded = true;
                rebind = state.has_widget;
            }
        }
        if rebind {
            // Native widgets are never trusted to resume from a pause;
            // tear-down happened at unload, so bind a new wrapper here.
            match self.sdk.bind(element_id, &effective) {
                Ok(handle) => {
                    self.handles.insert(element_id.to_string(), handle);
                }
                Err(e) => {
                    warn!(error = %e, "Widget rebind failed, plain iframe keeps playing");
                }
            }
        }
        self.stats.reloads += 1;
        let _ = self.events.send(UiEvent::EmbedReloaded {
            element_id: element_id.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Tear down everything under a container and forget its state.
    ///
    /// This is the one path that removes DOM nodes: freeing an off-screen
    /// year group's content so it can be re-materialized later.
    pub fn free_container(&mut self, doc: &mut Document, container_id: &str) {
        let Some(container) = doc.by_id(container_id) else {
            return;
        };
        let iframes: Vec<String> = doc
            .descendants_by_tag(container, "iframe")
            .into_iter()
            .filter_map(|n| doc.element_id(n).map(str::to_string))
            .collect();
        for element_id in &iframes {
            if let Some(mut handle) = self.handles.remove(element_id) {
                if let Err(e) = handle.pause() {
                    warn!(element_id, error = %e, "Widget pause failed during free");
                }
                handle.dispose();
            }
            if let Some(key) = self.by_element.remove(element_id) {
                self.states.remove(&key);
            }
        }
        doc.remove_children(container);
        self.stats.frees += 1;
    }

    /// Whether a mounted element currently shows a live embed
    pub fn is_loaded(&self, element_id: &str) -> bool {
        self.by_element
            .get(element_id)
            .and_then(|key| self.states.get(key))
            .map(|s| s.loaded)
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for EmbedManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbedManager")
            .field("states", &self.states.len())
            .field("handles", &self.handles.len())
            .field("stats", &self.stats)
            .finish()
    }
}
