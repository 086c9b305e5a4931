//! Share-link delivery and the on-screen confirmation toast

use chrono::Utc;
use tracing::info;

use showdeck_common::events::UiEvent;

use crate::share::{build_share_url, CopyPath, ShareKind};

use super::UiEngine;

impl UiEngine {
    /// Build a deep link for `kind`/`key` and push it through the copy
    /// fallback chain. Any successful path surfaces the confirmation toast.
    pub fn share_link(&mut self, kind: ShareKind, key: &str) -> CopyPath {
        let url = build_share_url(self.history.current(), kind, key);
        let text = url.render();
        let path = self.share.deliver(&text);

        if path != CopyPath::None {
            self.show_toast("Link copied");
            info!(url = %text, ?path, "Share link delivered");
            let _ = self.events.send(UiEvent::ShareLinkCopied {
                url: text,
                timestamp: Utc::now(),
            });
        }
        path
    }

    fn show_toast(&mut self, message: &str) {
        if let Some(toast) = self.doc.by_id("toast") {
            self.doc.set_text(toast, message);
            self.doc.add_class(toast, "visible");
        }
    }
}
