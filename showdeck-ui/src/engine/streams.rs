//! Live-stream tab controller
//!
//! Two platforms share the live section; exactly one is active. Switching
//! unloads the active player, flips tab and player markers, points the
//! shared chat panel at the new platform, and restores the new player from
//! its captured source or builds a fresh embed from the configured default
//! channel.

use chrono::Utc;
use tracing::{debug, info, warn};

use showdeck_common::config::StreamConfig;
use showdeck_common::events::UiEvent;

use crate::dom::NodeId;

use super::UiEngine;

/// Player container id for a platform
pub fn player_container_id(platform: &str) -> String {
    format!("{}-player", platform)
}

/// Player iframe id for a platform
pub fn stream_embed_id(platform: &str) -> String {
    format!("{}-stream-embed", platform)
}

/// Tab control id for a platform
pub fn stream_tab_id(platform: &str) -> String {
    format!("stream-tab-{}", platform)
}

/// Default player URL for a platform's configured channel
pub fn stream_embed_url(config: &StreamConfig, platform: &str) -> String {
    match platform {
        "kick" => format!("https://player.kick.com/{}?autoplay=true", config.kick_channel),
        _ => format!(
            "https://player.twitch.tv/?channel={}&parent={}",
            config.twitch_channel, config.twitch_parent
        ),
    }
}

/// Chat panel URL for a platform's configured channel
pub fn chat_embed_url(config: &StreamConfig, platform: &str) -> String {
    match platform {
        "kick" => format!("https://kick.com/{}/chatroom", config.kick_channel),
        _ => format!(
            "https://www.twitch.tv/embed/{}/chat?parent={}",
            config.twitch_channel, config.twitch_parent
        ),
    }
}

fn is_valid_platform(platform: &str) -> bool {
    matches!(platform, "kick" | "twitch")
}

impl UiEngine {
    /// Build the live section's fixed children: tab controls, one player
    /// container per platform, and the shared chat panel.
    pub(super) fn build_stream_section(&mut self, section: NodeId) {
        let tabs = self.doc.create_with_id("div", "stream-tabs");
        self.doc.append_child(section, tabs);
        for platform in ["kick", "twitch"] {
            let tab = self.doc.create_with_id("button", &stream_tab_id(platform));
            self.doc.add_class(tab, "stream-tab");
            self.doc.set_text(tab, platform);
            self.doc.append_child(tabs, tab);

            let player = self
                .doc
                .create_with_id("div", &player_container_id(platform));
            self.doc.add_class(player, "stream-player");
            self.doc.append_child(section, player);
        }
        let chat = self.doc.create_with_id("div", "stream-chat");
        self.doc.add_class(chat, "stream-chat");
        self.doc.append_child(section, chat);
    }

    /// Mark the initial platform active and mount its player and chat
    pub(super) fn activate_initial_stream(&mut self) {
        let platform = self.active_stream.clone();
        if let Some(tab) = self.doc.by_id(&stream_tab_id(&platform)) {
            self.doc.add_class(tab, "active");
        }
        if let Some(player) = self.doc.by_id(&player_container_id(&platform)) {
            self.doc.add_class(player, "active");
        }
        self.mount_stream_player(&platform);
        self.mount_chat(&platform);
    }

    fn mount_stream_player(&mut self, platform: &str) {
        let Some(container) = self.doc.by_id(&player_container_id(platform)) else {
            warn!(platform, "Stream player container missing");
            return;
        };
        let iframe = self
            .doc
            .create_with_id("iframe", &stream_embed_id(platform));
        let src = stream_embed_url(&self.config.stream, platform);
        self.doc.set_attr(iframe, "src", &src);
        self.doc.set_attr(iframe, "allow", "autoplay; fullscreen");
        self.doc.set_attr(iframe, "frameborder", "0");
        self.doc.append_child(container, iframe);
    }

    fn mount_chat(&mut self, platform: &str) {
        let Some(chat) = self.doc.by_id("stream-chat") else {
            warn!("Chat panel container missing");
            return;
        };
        let iframe = self.doc.create_with_id("iframe", "stream-chat-embed");
        self.doc
            .set_attr(iframe, "src", &chat_embed_url(&self.config.stream, platform));
        self.doc.set_attr(iframe, "frameborder", "0");
        self.doc.append_child(chat, iframe);
    }

    /// Switch the active live-stream platform.
    ///
    /// A no-op for an invalid target or the already-active platform: no
    /// DOM mutation, no unload or reload.
    pub fn switch_stream(&mut self, target: &str) {
        if !is_valid_platform(target) {
            warn!(target, "Unknown stream platform, ignoring switch");
            return;
        }
        if target == self.active_stream {
            debug!(target, "Stream platform already active");
            return;
        }

        let outgoing = self.active_stream.clone();

        // Halt the active player; its source is captured for a later return
        self.embeds
            .unload_element(&mut self.doc, &stream_embed_id(&outgoing));

        // Flip tab and player markers
        for (platform, active) in [(outgoing.as_str(), false), (target, true)] {
            if let Some(tab) = self.doc.by_id(&stream_tab_id(platform)) {
                if active {
                    self.doc.add_class(tab, "active");
                } else {
                    self.doc.remove_class(tab, "active");
                }
            }
            if let Some(player) = self.doc.by_id(&player_container_id(platform)) {
                if active {
                    self.doc.add_class(player, "active");
                } else {
                    self.doc.remove_class(player, "active");
                }
            }
        }

        // The shared chat panel follows the active platform
        if let Some(chat_iframe) = self.doc.by_id("stream-chat-embed") {
            let url = chat_embed_url(&self.config.stream, target);
            self.doc.set_attr(chat_iframe, "src", &url);
        } else {
            self.mount_chat(target);
        }

        // Restore the target player from its captured source, or build a
        // fresh embed from the configured default channel
        if self.doc.by_id(&stream_embed_id(target)).is_some() {
            let embed_id = stream_embed_id(target);
            self.embeds
                .reload_element(&mut self.doc, &mut self.timers, &embed_id);
        } else {
            self.mount_stream_player(target);
        }

        self.active_stream = target.to_string();
        info!(from = %outgoing, to = target, "Stream platform switched");
        let _ = self.events.send(UiEvent::StreamSwitched {
            from: outgoing,
            to: target.to_string(),
            timestamp: Utc::now(),
        });
    }
}
