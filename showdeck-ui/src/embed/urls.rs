//! Embed URL construction and normalization

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Mixcloud player endpoint for a canonical upload URL.
///
/// The widget iframe takes the upload's canonical URL in the `feed`
/// parameter, percent-encoded.
pub fn mixcloud_player_url(canonical_url: &str) -> String {
    format!(
        "https://player-widget.mixcloud.com/widget/iframe/?feed={}",
        percent_encode_component(canonical_url)
    )
}

/// Ensure a `lang` query parameter is present exactly once.
///
/// A URL that already carries one is passed through unchanged; one without
/// it gains a single instance. Used for vk embeds, whose player otherwise
/// picks a language from the viewer's cookies.
pub fn ensure_lang_param(embed_url: &str, lang: &str) -> String {
    let (without_fragment, fragment) = match embed_url.split_once('#') {
        Some((u, f)) => (u, Some(f)),
        None => (embed_url, None),
    };
    let has_lang = without_fragment
        .split_once('?')
        .map(|(_, query)| {
            query
                .split('&')
                .any(|pair| pair.split_once('=').map(|(k, _)| k).unwrap_or(pair) == "lang")
        })
        .unwrap_or(false);

    let mut out = if has_lang {
        without_fragment.to_string()
    } else {
        let separator = if without_fragment.contains('?') { '&' } else { '?' };
        format!("{}{}lang={}", without_fragment, separator, lang)
    };
    if let Some(f) = fragment {
        out.push('#');
        out.push_str(f);
    }
    out
}

/// Stricter than the page-level query set: values embedded inside another
/// URL's query must escape `/` and `:` as well.
const FEED_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn percent_encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, FEED_COMPONENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixcloud_player_url_encodes_feed() {
        let url = mixcloud_player_url("https://www.mixcloud.com/dj/friday-session/");
        assert_eq!(
            url,
            "https://player-widget.mixcloud.com/widget/iframe/?feed=https%3A%2F%2Fwww.mixcloud.com%2Fdj%2Ffriday-session%2F"
        );
    }

    #[test]
    fn test_lang_param_added_exactly_once() {
        let url = ensure_lang_param("https://vk.com/video_ext.php?oid=-1&id=2", "en");
        assert_eq!(url.matches("lang=").count(), 1);
        assert!(url.ends_with("&lang=en"));
    }

    #[test]
    fn test_existing_lang_param_passes_through_unchanged() {
        let original = "https://vk.com/video_ext.php?oid=-1&id=2&lang=de";
        assert_eq!(ensure_lang_param(original, "en"), original);
    }

    #[test]
    fn test_lang_param_on_bare_url_uses_question_mark() {
        assert_eq!(
            ensure_lang_param("https://vk.com/video_ext.php", "en"),
            "https://vk.com/video_ext.php?lang=en"
        );
    }

    #[test]
    fn test_lang_value_is_not_mistaken_for_key() {
        // `hl=lang` style values must not satisfy the check
        let url = ensure_lang_param("https://vk.com/video_ext.php?title=lang", "en");
        assert!(url.contains("lang=en"));
    }

    #[test]
    fn test_fragment_survives_normalization() {
        let url = ensure_lang_param("https://vk.com/video_ext.php?oid=1#t=30", "en");
        assert_eq!(url, "https://vk.com/video_ext.php?oid=1&lang=en#t=30");
    }
}
