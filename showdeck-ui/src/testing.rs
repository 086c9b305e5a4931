//! Recording doubles for the widget SDK and share capabilities
//!
//! These implement the same traits the real page wires in, but append every
//! interaction to a shared log so tests can assert exact call sequences
//! without loading any embed scripts.

use std::sync::{Arc, Mutex};

use showdeck_common::{Error, Result};

use crate::share::{ClipboardWriter, ManualCopy, Prompt, ShareOutcome, ShareSheet};
use crate::widget::{WidgetHandle, WidgetSdk};

/// Shared interaction log
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

fn record(log: &CallLog, entry: String) {
    log.lock().expect("call log poisoned").push(entry);
}

/// Widget SDK double: records binds and hands out recording handles
pub struct RecordingSdk {
    pub log: CallLog,
    /// When true every bind fails, exercising the iframe fallback path
    pub fail_bind: bool,
    /// When true handles fail their pause call (unload must continue)
    pub fail_pause: bool,
}

impl RecordingSdk {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_bind: false,
            fail_pause: false,
        }
    }
}

impl WidgetSdk for RecordingSdk {
    fn bind(&self, iframe_element_id: &str, _src: &str) -> Result<Box<dyn WidgetHandle>> {
        if self.fail_bind {
            record(&self.log, format!("bind-failed:{}", iframe_element_id));
            return Err(Error::Internal("scripted bind failure".to_string()));
        }
        record(&self.log, format!("bind:{}", iframe_element_id));
        Ok(Box::new(RecordingHandle {
            element_id: iframe_element_id.to_string(),
            log: self.log.clone(),
            fail_pause: self.fail_pause,
        }))
    }
}

/// Handle double recording pause/dispose calls
pub struct RecordingHandle {
    element_id: String,
    log: CallLog,
    fail_pause: bool,
}

impl WidgetHandle for RecordingHandle {
    fn pause(&mut self) -> Result<()> {
        if self.fail_pause {
            record(&self.log, format!("pause-failed:{}", self.element_id));
            return Err(Error::Internal("scripted pause failure".to_string()));
        }
        record(&self.log, format!("pause:{}", self.element_id));
        Ok(())
    }

    fn dispose(&mut self) {
        record(&self.log, format!("dispose:{}", self.element_id));
    }
}

/// Share sheet double with a scripted outcome
pub struct ScriptedShareSheet {
    pub log: CallLog,
    pub outcome: ShareOutcome,
}

impl ShareSheet for ScriptedShareSheet {
    fn share(&mut self, url: &str) -> ShareOutcome {
        record(&self.log, format!("sheet:{}", url));
        self.outcome.clone()
    }
}

/// Clipboard double; rejects when `fail` is set
pub struct ScriptedClipboard {
    pub log: CallLog,
    pub fail: bool,
}

impl ClipboardWriter for ScriptedClipboard {
    fn write(&mut self, text: &str) -> Result<()> {
        if self.fail {
            record(&self.log, "clipboard-rejected".to_string());
            return Err(Error::Internal("clipboard permission denied".to_string()));
        }
        record(&self.log, format!("clipboard:{}", text));
        Ok(())
    }
}

/// Selection-copy double; fails when `fail` is set
pub struct ScriptedManualCopy {
    pub log: CallLog,
    pub fail: bool,
}

impl ManualCopy for ScriptedManualCopy {
    fn copy_via_selection(&mut self, text: &str) -> bool {
        if self.fail {
            record(&self.log, "manual-failed".to_string());
            return false;
        }
        record(&self.log, format!("manual:{}", text));
        true
    }
}

/// Blocking-prompt double
pub struct ScriptedPrompt {
    pub log: CallLog,
}

impl Prompt for ScriptedPrompt {
    fn prompt(&mut self, text: &str) {
        record(&self.log, format!("prompt:{}", text));
    }
}
