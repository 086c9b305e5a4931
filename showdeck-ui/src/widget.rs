//! Native widget SDK abstraction
//!
//! The mixcloud player exposes a script-provided widget wrapper bound to an
//! iframe. The orchestration layer only ever needs two capabilities from
//! the resulting handle (pause before unload, dispose on teardown), so the
//! SDK is modeled as a trait pair with pluggable implementations: the real
//! page binds the script SDK, a headless run uses `SdkUnavailable`, and
//! tests use the recording double in `testing`.

use showdeck_common::Result;

/// Opaque handle into a bound platform widget
pub trait WidgetHandle: Send {
    /// Ask the widget to pause playback. Errors are swallowed and logged by
    /// the caller; a failed pause never blocks an unload.
    fn pause(&mut self) -> Result<()>;

    /// Release the widget. Called exactly once, after which the handle is
    /// dropped.
    fn dispose(&mut self);
}

/// Factory binding a widget wrapper to an existing iframe element
pub trait WidgetSdk: Send {
    /// Bind the platform widget to the iframe with the given element id.
    /// An error means the SDK script is unavailable or threw; the caller
    /// degrades to a plain iframe embed.
    fn bind(&self, iframe_element_id: &str, src: &str) -> Result<Box<dyn WidgetHandle>>;
}

/// SDK stand-in for environments without the platform script loaded.
/// Every bind fails, which exercises the plain-iframe fallback path.
pub struct SdkUnavailable;

impl WidgetSdk for SdkUnavailable {
    fn bind(&self, _iframe_element_id: &str, _src: &str) -> Result<Box<dyn WidgetHandle>> {
        Err(showdeck_common::Error::Internal(
            "widget SDK not loaded".to_string(),
        ))
    }
}
