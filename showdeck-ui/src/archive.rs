//! Archive list rendering with progressive load and unload
//!
//! Each year group gets a lazy section: a heading plus an items body that
//! starts empty. A load observer materializes the body (placeholders and
//! per-item observers) when the group approaches the viewport; an unload
//! observer frees a materialized body once the group is roughly two
//! viewport heights away, unless it holds the deep-linked item. The first
//! (newest) group is materialized eagerly so the initial paint is never
//! empty.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use showdeck_common::events::UiEvent;
use showdeck_common::groups::{group_by_year, YearGroup};
use showdeck_common::{ArchiveItem, MediaKind};

use crate::dom::Document;
use crate::embed::EmbedManager;
use crate::observer::{ObserverKind, ObserverRegistry};
use crate::timers::{DeferredAction, TimerQueue};

/// Container ids the renderer populates
pub const AUDIO_LIST_ID: &str = "audio-archives-list";
pub const VIDEO_LIST_ID: &str = "video-archives-list";

/// Class marking the deep-linked item
pub const HIGHLIGHT_CLASS: &str = "highlighted";

/// One year group's render state
#[derive(Debug)]
struct GroupSlot {
    kind: MediaKind,
    label: String,
    /// Outer section element (observer target)
    element_id: String,
    /// Inner body element whose children are created and freed
    body_id: String,
    materialized: bool,
    items: Vec<ArchiveItem>,
}

/// Builds and maintains the year-grouped archive lists
pub struct ArchiveRenderer {
    groups: Vec<GroupSlot>,
    /// item element id -> (group index, item index)
    item_index: HashMap<String, (usize, usize)>,
    highlighted: Option<(MediaKind, String)>,
    scroll_delay_ms: u64,
    events: broadcast::Sender<UiEvent>,
}

/// Container id for one archive list
pub fn list_container_id(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Audio => AUDIO_LIST_ID,
        MediaKind::Video => VIDEO_LIST_ID,
    }
}

fn slug(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash && !out.is_empty() {
            out.push('-');
            last_dash = true;
        }
    }
    out.trim_end_matches('-').to_string()
}

fn group_element_id(kind: MediaKind, group: &YearGroup) -> String {
    format!("{}-year-{}", kind, group.label().to_lowercase())
}

fn item_element_id(kind: MediaKind, item: &ArchiveItem, position: usize) -> String {
    match &item.key {
        Some(key) if !key.is_empty() => format!("item-{}-{}", kind, slug(key)),
        _ => format!("item-{}-{}", kind, position),
    }
}

impl ArchiveRenderer {
    pub fn new(scroll_delay_ms: u64, events: broadcast::Sender<UiEvent>) -> Self {
        Self {
            groups: Vec::new(),
            item_index: HashMap::new(),
            highlighted: None,
            scroll_delay_ms,
            events,
        }
    }

    pub fn highlighted(&self) -> Option<&(MediaKind, String)> {
        self.highlighted.as_ref()
    }

    /// Build the year sections for one archive list.
    ///
    /// Recomputes the whole partition; the previous render state for this
    /// kind is discarded. An empty archive renders a single "no items"
    /// placeholder and registers no observers.
    pub fn render(
        &mut self,
        doc: &mut Document,
        observers: &mut ObserverRegistry,
        kind: MediaKind,
        items: &[ArchiveItem],
    ) {
        let container_id = list_container_id(kind);
        let Some(container) = doc.by_id(container_id) else {
            warn!(container_id, "Archive container missing, skipping render");
            return;
        };

        // Drop render state from a previous pass over this kind; the item
        // index is rebuilt wholesale once the new groups are in place.
        self.groups.retain(|g| g.kind != kind);
        doc.remove_children(container);

        if items.is_empty() {
            let empty = doc.create_element("div");
            doc.add_class(empty, "empty-archive");
            doc.set_text(empty, "No items yet.");
            doc.append_child(container, empty);
            info!(%kind, "Archive list is empty, rendered placeholder");
            return;
        }

        let first_index = self.groups.len();
        for group in group_by_year(items) {
            let element_id = group_element_id(kind, &group);
            let body_id = format!("{}-body", element_id);

            let section = doc.create_with_id("section", &element_id);
            doc.add_class(section, "year-group");
            let heading = doc.create_element("h2");
            doc.set_text(heading, &group.label());
            doc.append_child(section, heading);
            let body = doc.create_with_id("div", &body_id);
            doc.add_class(body, "year-items");
            doc.append_child(section, body);
            doc.append_child(container, section);

            observers.register(&element_id, ObserverKind::YearLoad);
            observers.register(&element_id, ObserverKind::YearUnload);

            self.groups.push(GroupSlot {
                kind,
                label: group.label(),
                element_id,
                body_id,
                materialized: false,
                items: group.items,
            });
        }

        // Rebuild the item index for any materialized groups that survived
        self.rebuild_item_index();

        // Eager first paint: the newest group never waits for an observer
        self.materialize(doc, observers, first_index);
    }

    fn rebuild_item_index(&mut self) {
        self.item_index.clear();
        for (gi, slot) in self.groups.iter().enumerate() {
            if !slot.materialized {
                continue;
            }
            for (ii, item) in slot.items.iter().enumerate() {
                self.item_index
                    .insert(item_element_id(slot.kind, item, ii), (gi, ii));
            }
        }
    }

    /// Index of the group slot whose outer element is `target`
    fn group_index(&self, target: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.element_id == target)
    }

    /// Create item placeholders and arm their one-shot load observers
    pub fn materialize(
        &mut self,
        doc: &mut Document,
        observers: &mut ObserverRegistry,
        group_index: usize,
    ) {
        let Some(slot) = self.groups.get(group_index) else {
            return;
        };
        if slot.materialized {
            return;
        }
        let Some(body) = doc.by_id(&slot.body_id) else {
            warn!(body_id = %slot.body_id, "Year group body missing, cannot materialize");
            return;
        };

        let kind = slot.kind;
        let label = slot.label.clone();
        let items = slot.items.clone();
        for (ii, item) in items.iter().enumerate() {
            let element_id = item_element_id(kind, item, ii);
            let placeholder = doc.create_with_id("div", &element_id);
            doc.add_class(placeholder, "archive-item");
            let title = doc.create_element("span");
            doc.set_text(title, &item.title);
            doc.append_child(placeholder, title);
            doc.append_child(body, placeholder);

            observers.register(&element_id, ObserverKind::ItemLoad);
            self.item_index.insert(element_id, (group_index, ii));
        }
        self.groups[group_index].materialized = true;

        debug!(%kind, label = %label, items = items.len(), "Year group materialized");
        let _ = self.events.send(UiEvent::YearGroupMaterialized {
            kind,
            label,
            item_count: items.len(),
            timestamp: Utc::now(),
        });
    }

    /// A year group entered the extended viewport
    pub fn on_group_enter(
        &mut self,
        doc: &mut Document,
        observers: &mut ObserverRegistry,
        target: &str,
    ) {
        if let Some(index) = self.group_index(target) {
            self.materialize(doc, observers, index);
        }
    }

    /// An item placeholder came near the viewport: mount its embed and
    /// retire the one-shot observer.
    pub fn on_item_enter(
        &mut self,
        doc: &mut Document,
        observers: &mut ObserverRegistry,
        embeds: &mut EmbedManager,
        target: &str,
    ) {
        let Some((gi, ii)) = self.item_index.get(target).copied() else {
            return;
        };
        let item = self.groups[gi].items[ii].clone();
        embeds.mount(doc, &item, target);
        observers.unregister(target, ObserverKind::ItemLoad);
    }

    /// A year group left the viewport by `distance_viewports`.
    ///
    /// Frees the group's subtree when it is far enough away, already
    /// materialized, and not holding the highlighted item. The group can be
    /// re-materialized later by its still-armed load observer.
    pub fn on_group_exit(
        &mut self,
        doc: &mut Document,
        observers: &mut ObserverRegistry,
        embeds: &mut EmbedManager,
        target: &str,
        distance_viewports: f32,
        unload_distance: f32,
    ) {
        let Some(index) = self.group_index(target) else {
            return;
        };
        if distance_viewports < unload_distance {
            return;
        }
        if !self.groups[index].materialized {
            return;
        }
        if self.group_holds_highlight(index) {
            debug!(target, "Group holds the highlighted item, exempt from unload");
            return;
        }

        let kind = self.groups[index].kind;
        let label = self.groups[index].label.clone();
        let body_id = self.groups[index].body_id.clone();

        // Retire per-item observers before the nodes go away
        let item_ids: Vec<String> = self.groups[index]
            .items
            .iter()
            .enumerate()
            .map(|(ii, item)| item_element_id(kind, item, ii))
            .collect();
        for id in &item_ids {
            observers.unregister_target(id);
            self.item_index.remove(id);
        }

        embeds.free_container(doc, &body_id);
        self.groups[index].materialized = false;

        info!(%kind, label = %label, "Year group freed");
        let _ = self.events.send(UiEvent::YearGroupFreed {
            kind,
            label,
            timestamp: Utc::now(),
        });
    }

    fn group_holds_highlight(&self, index: usize) -> bool {
        let Some((kind, key)) = &self.highlighted else {
            return false;
        };
        let slot = &self.groups[index];
        slot.kind == *kind && slot.items.iter().any(|i| i.key.as_deref() == Some(key))
    }

    /// Resolve a deep link: force-materialize the owning group (bypassing
    /// the viewport trigger), mount the item's embed, mark it highlighted,
    /// and schedule the scroll once materialization has settled.
    pub fn resolve_deep_link(
        &mut self,
        doc: &mut Document,
        observers: &mut ObserverRegistry,
        embeds: &mut EmbedManager,
        timers: &mut TimerQueue,
        kind: MediaKind,
        key: &str,
    ) {
        let Some((gi, ii)) = self.find_item(kind, key) else {
            warn!(%kind, key, "Deep-linked item not found in archive");
            return;
        };

        self.materialize(doc, observers, gi);
        doc.scroll_to_element(&self.groups[gi].element_id);

        let item = self.groups[gi].items[ii].clone();
        let element_id = item_element_id(kind, &item, ii);
        if let Some(embed_id) = embeds.mount(doc, &item, &element_id) {
            // The mount may have found a still-present but unloaded iframe
            // (section switch captured its source); restore it. A freshly
            // built or already-live embed makes this a no-op.
            embeds.reload_element(doc, timers, &embed_id);
        }
        observers.unregister(&element_id, ObserverKind::ItemLoad);

        if let Some(node) = doc.by_id(&element_id) {
            doc.add_class(node, HIGHLIGHT_CLASS);
        }
        self.highlighted = Some((kind, key.to_string()));

        timers.schedule(
            self.scroll_delay_ms,
            DeferredAction::ScrollToItem {
                element_id,
            },
        );
    }

    /// Remove the highlight marker and its unload exemption
    pub fn clear_highlight(&mut self, doc: &mut Document) {
        if let Some((kind, key)) = self.highlighted.take() {
            if let Some((gi, ii)) = self.find_item(kind, &key) {
                let element_id = item_element_id(kind, &self.groups[gi].items[ii], ii);
                if let Some(node) = doc.by_id(&element_id) {
                    doc.remove_class(node, HIGHLIGHT_CLASS);
                }
            }
        }
    }

    fn find_item(&self, kind: MediaKind, key: &str) -> Option<(usize, usize)> {
        for (gi, slot) in self.groups.iter().enumerate() {
            if slot.kind != kind {
                continue;
            }
            for (ii, item) in slot.items.iter().enumerate() {
                if item.key.as_deref() == Some(key) {
                    return Some((gi, ii));
                }
            }
        }
        None
    }

    /// Element id of the item a deep link key resolves to, if rendered
    pub fn item_element_for(&self, kind: MediaKind, key: &str) -> Option<String> {
        self.find_item(kind, key)
            .map(|(gi, ii)| item_element_id(kind, &self.groups[gi].items[ii], ii))
    }

    /// Labels of currently materialized groups, for diagnostics
    pub fn materialized_labels(&self, kind: MediaKind) -> Vec<String> {
        self.groups
            .iter()
            .filter(|g| g.kind == kind && g.materialized)
            .map(|g| g.label.clone())
            .collect()
    }

    /// Outer element id of the group owning `key`, if any
    pub fn group_element_for(&self, kind: MediaKind, key: &str) -> Option<String> {
        self.find_item(kind, key)
            .map(|(gi, _)| self.groups[gi].element_id.clone())
    }
}

impl std::fmt::Debug for ArchiveRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveRenderer")
            .field("groups", &self.groups.len())
            .field("highlighted", &self.highlighted)
            .finish()
    }
}
