//! Page URL and history model
//!
//! Deep links live in the query string (`audio=<key>`, `video=<key>`,
//! `stream=<platform>`) and the fragment names a section. `PageUrl` keeps
//! parameters as an ordered list with single-occurrence semantics: setting a
//! parameter overwrites every prior occurrence. `History` models the browser
//! back/forward stack the navigator drives on popstate.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Parsed page location: path, query parameters, fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrl {
    pub path: String,
    params: Vec<(String, String)>,
    pub fragment: Option<String>,
}

impl PageUrl {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            params: Vec::new(),
            fragment: None,
        }
    }

    /// Parse `path?k=v&k2=v2#frag`
    pub fn parse(raw: &str) -> Self {
        let (rest, fragment) = match raw.split_once('#') {
            Some((r, f)) if !f.is_empty() => (r, Some(f.to_string())),
            Some((r, _)) => (r, None),
            None => (raw, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((p, q)) => (p, q),
            None => (rest, ""),
        };
        let mut params = Vec::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            params.push((percent_decode(k), percent_decode(v)));
        }
        Self {
            path: path.to_string(),
            params,
            fragment,
        }
    }

    /// First value for a parameter, if present
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set a parameter, overwriting every existing occurrence
    pub fn set_param(&mut self, name: &str, value: &str) {
        self.params.retain(|(k, _)| k != name);
        self.params.push((name.to_string(), value.to_string()));
    }

    /// Remove a parameter entirely
    pub fn clear_param(&mut self, name: &str) {
        self.params.retain(|(k, _)| k != name);
    }

    pub fn render(&self) -> String {
        let mut out = self.path.clone();
        if !self.params.is_empty() {
            out.push('?');
            let query: Vec<String> = self
                .params
                .iter()
                .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
                .collect();
            out.push_str(&query.join("&"));
        }
        if let Some(frag) = &self.fragment {
            out.push('#');
            out.push_str(frag);
        }
        out
    }
}

impl std::fmt::Display for PageUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Characters escaped in page-level query components. Deep-link keys carry
/// `/` and `:` (canonical platform URLs), which stay readable in the
/// address bar, so they are left verbatim here.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/')
    .remove(b':');

/// Percent-encoding for query components
pub fn percent_encode(raw: &str) -> String {
    utf8_percent_encode(raw, QUERY_COMPONENT).to_string()
}

/// Lenient decoding: `+` means space, malformed escapes pass through
fn percent_decode(raw: &str) -> String {
    let normalized = raw.replace('+', " ");
    percent_decode_str(&normalized).decode_utf8_lossy().into_owned()
}

/// Browser-style history stack
#[derive(Debug)]
pub struct History {
    entries: Vec<PageUrl>,
    index: usize,
}

impl History {
    pub fn new(initial: PageUrl) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
        }
    }

    pub fn current(&self) -> &PageUrl {
        &self.entries[self.index]
    }

    /// Push a new entry, discarding any forward entries
    pub fn push(&mut self, url: PageUrl) {
        self.entries.truncate(self.index + 1);
        self.entries.push(url);
        self.index = self.entries.len() - 1;
    }

    /// Replace the current entry without growing the stack
    pub fn replace(&mut self, url: PageUrl) {
        self.entries[self.index] = url;
    }

    /// Step back; returns the new current entry (a popstate payload)
    pub fn back(&mut self) -> Option<PageUrl> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].clone())
    }

    /// Step forward; returns the new current entry
    pub fn forward(&mut self) -> Option<PageUrl> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_render_round_trip() {
        let url = PageUrl::parse("/index.html?audio=%2Fdj%2Fmix%2F&stream=kick#live-streams");
        assert_eq!(url.path, "/index.html");
        assert_eq!(url.param("audio"), Some("/dj/mix/"));
        assert_eq!(url.param("stream"), Some("kick"));
        assert_eq!(url.fragment.as_deref(), Some("live-streams"));

        let rendered = url.render();
        let back = PageUrl::parse(&rendered);
        assert_eq!(back, url);
    }

    #[test]
    fn test_set_param_overwrites_all_occurrences() {
        let mut url = PageUrl::parse("/?audio=a&audio=b");
        url.set_param("audio", "c");
        assert_eq!(url.param("audio"), Some("c"));
        assert_eq!(url.render().matches("audio=").count(), 1);
    }

    #[test]
    fn test_clear_param() {
        let mut url = PageUrl::parse("/?audio=a&stream=kick");
        url.clear_param("audio");
        assert_eq!(url.param("audio"), None);
        assert_eq!(url.param("stream"), Some("kick"));
    }

    #[test]
    fn test_malformed_escape_before_multibyte_char_is_lenient() {
        // A truncated escape directly followed by a multibyte character
        // must parse, with the bad escape passed through literally.
        let url = PageUrl::parse("/?q=%aé");
        assert_eq!(url.param("q"), Some("%aé"));
    }

    #[test]
    fn test_plus_decodes_to_space() {
        let url = PageUrl::parse("/?q=a+b&keep=%2B");
        assert_eq!(url.param("q"), Some("a b"));
        assert_eq!(url.param("keep"), Some("+"));
    }

    #[test]
    fn test_empty_fragment_is_none() {
        let url = PageUrl::parse("/page#");
        assert_eq!(url.fragment, None);
    }

    #[test]
    fn test_history_back_and_forward() {
        let mut history = History::new(PageUrl::parse("/#live-streams"));
        history.push(PageUrl::parse("/#audio-archives"));
        history.push(PageUrl::parse("/#video-archives"));

        let back = history.back().unwrap();
        assert_eq!(back.fragment.as_deref(), Some("audio-archives"));
        let fwd = history.forward().unwrap();
        assert_eq!(fwd.fragment.as_deref(), Some("video-archives"));
        assert!(history.forward().is_none());
    }

    #[test]
    fn test_history_push_discards_forward_entries() {
        let mut history = History::new(PageUrl::parse("/#a"));
        history.push(PageUrl::parse("/#b"));
        history.back();
        history.push(PageUrl::parse("/#c"));
        assert!(history.forward().is_none());
        assert_eq!(history.current().fragment.as_deref(), Some("c"));
    }
}
