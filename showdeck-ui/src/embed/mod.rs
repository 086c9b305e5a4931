//! Media embed lifecycle
//!
//! Creates, lazily loads, unloads, and reloads third-party player embeds
//! per platform: mixcloud via a native widget bound to an iframe, hearthis
//! and vk as plain iframes. Owns all per-item runtime state and the map
//! from mounted element id to widget handle; no other component reads it.

mod manager;
mod urls;

pub use manager::{EmbedManager, EmbedStats, EmbedState, RECOVER_ATTR};
pub use urls::{ensure_lang_param, mixcloud_player_url};
