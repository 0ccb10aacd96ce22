//! Viewer-request stage: tag crawler traffic for prerendering.
//!
//! # Responsibilities
//! - Read `user-agent` and `host`; do nothing when either is absent
//! - Classify the request as a prerender candidate
//! - Attach the three marker headers to candidates
//!
//! # Design Decisions
//! - Candidate = (bot user-agent OR escaped-fragment query) AND NOT static asset
//! - Never fails: malformed input degrades to a pass-through
//! - Only the marker headers are written; everything else is left alone
//! - Marker headers arriving from the client are dropped before classifying,
//!   so the routing stage only ever sees markers this stage wrote

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{PrerenderToken, TaggerConfig};
use crate::edge::{HeadersExt, RequestRecord};
use crate::handler::{EdgeHandler, Stage};
use crate::markers;
use crate::routing::cachebuster::{CacheBuster, WallClock};
use crate::routing::matcher::{
    ExtensionMatcher, Matcher, MatcherError, SignatureMatcher, SubstringMatcher,
};

/// Error raised while building a [`BotTagger`].
#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("prerender token is not configured (set the {env} environment variable)")]
    MissingToken { env: String },

    #[error(transparent)]
    Matcher(#[from] MatcherError),
}

/// What the tagger decided for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    /// `user-agent` or `host` absent; request untouched.
    MissingHeaders,
    /// Neither a bot nor an escaped-fragment request.
    NotCandidate,
    /// Would be a candidate, but the URI names a static asset.
    StaticAsset,
    /// Marker headers attached.
    Tagged,
}

/// Marks requests from crawlers and link-preview bots so the origin-request
/// stage can send them to the prerender service.
pub struct BotTagger {
    token: PrerenderToken,
    signatures: SignatureMatcher,
    static_assets: ExtensionMatcher,
    escaped_fragment: SubstringMatcher,
    cache_buster: Arc<dyn CacheBuster>,
}

impl BotTagger {
    /// Compile the classification policy. Fails if no token was resolved.
    pub fn from_config(config: &TaggerConfig) -> Result<Self, TaggerError> {
        let token = config
            .token
            .clone()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| TaggerError::MissingToken {
                env: config.token_env.clone(),
            })?;

        Ok(Self {
            token,
            signatures: SignatureMatcher::new(&config.bot_signatures)?,
            static_assets: ExtensionMatcher::new(&config.static_extensions)?,
            escaped_fragment: SubstringMatcher::new(config.escaped_fragment_marker.as_str()),
            cache_buster: Arc::new(WallClock),
        })
    }

    /// Replace the cache-buster source.
    pub fn with_cache_buster(mut self, cache_buster: impl CacheBuster + 'static) -> Self {
        self.cache_buster = Arc::new(cache_buster);
        self
    }

    /// Decide without mutating.
    pub fn classify(&self, request: &RequestRecord) -> TagOutcome {
        let (Some(user_agent), Some(_)) = (
            request.headers.first_value(markers::USER_AGENT),
            request.headers.first_value(markers::HOST),
        ) else {
            return TagOutcome::MissingHeaders;
        };

        let candidate = self.signatures.matches(user_agent)
            || self.escaped_fragment.matches(&request.querystring);
        if !candidate {
            TagOutcome::NotCandidate
        } else if self.static_assets.matches(&request.uri) {
            TagOutcome::StaticAsset
        } else {
            TagOutcome::Tagged
        }
    }

    /// Strip inbound marker headers, classify and, for candidates, attach
    /// fresh marker headers.
    pub fn tag(&self, request: &mut RequestRecord) -> TagOutcome {
        let forged = markers::MARKERS
            .iter()
            .fold(false, |forged, marker| request.headers.unset(*marker) || forged);
        let outcome = self.classify(request);

        if outcome == TagOutcome::Tagged {
            let host = request
                .headers
                .first_value(markers::HOST)
                .unwrap_or_default()
                .to_string();
            let headers = &mut request.headers;
            headers.set(markers::PRERENDER_TOKEN, self.token.expose());
            headers.set(markers::PRERENDER_HOST, host);
            headers.set(markers::PRERENDER_CACHEBUSTER, self.cache_buster.next_value());
        }

        tracing::debug!(
            uri = %request.uri,
            outcome = ?outcome,
            forged_markers = forged,
            "Viewer request classified"
        );
        outcome
    }
}

impl fmt::Debug for BotTagger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotTagger")
            .field("token", &self.token)
            .field("signatures", &self.signatures)
            .field("static_assets", &self.static_assets)
            .field("escaped_fragment", &self.escaped_fragment)
            .finish_non_exhaustive()
    }
}

impl EdgeHandler for BotTagger {
    fn stage(&self) -> Stage {
        Stage::ViewerRequest
    }

    fn handle(&self, mut request: RequestRecord) -> RequestRecord {
        self.tag(&mut request);
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::HeaderEntry;

    struct Fixed(&'static str);

    impl CacheBuster for Fixed {
        fn next_value(&self) -> String {
            self.0.to_string()
        }
    }

    fn tagger() -> BotTagger {
        let config = TaggerConfig {
            token: Some(PrerenderToken::new("test-token")),
            ..TaggerConfig::default()
        };
        BotTagger::from_config(&config)
            .unwrap()
            .with_cache_buster(Fixed("1700000000000"))
    }

    fn request(user_agent: &str, uri: &str, query: &str) -> RequestRecord {
        RequestRecord::new(uri, query)
            .with_header("Host", "example.com")
            .with_header("User-Agent", user_agent)
    }

    #[test]
    fn test_tags_googlebot() {
        let tagger = tagger();
        let mut req = request("Mozilla/5.0 (compatible; Googlebot/2.1)", "/about", "");

        assert_eq!(tagger.tag(&mut req), TagOutcome::Tagged);
        assert_eq!(
            req.headers.get("x-prerender-token"),
            Some(&vec![HeaderEntry::new("X-Prerender-Token", "test-token")])
        );
        assert_eq!(
            req.headers.get("x-prerender-host"),
            Some(&vec![HeaderEntry::new("X-Prerender-Host", "example.com")])
        );
        assert_eq!(
            req.headers.get("x-prerender-cachebuster"),
            Some(&vec![HeaderEntry::new("X-Prerender-Cachebuster", "1700000000000")])
        );
    }

    #[test]
    fn test_generic_bot_substring() {
        let tagger = tagger();
        let mut req = request("SomeCrawlerBOT/0.1", "/", "");

        assert_eq!(tagger.tag(&mut req), TagOutcome::Tagged);
    }

    #[test]
    fn test_missing_headers_untouched() {
        let tagger = tagger();

        let mut no_host = RequestRecord::new("/about", "").with_header("User-Agent", "Googlebot");
        let before = no_host.clone();
        assert_eq!(tagger.tag(&mut no_host), TagOutcome::MissingHeaders);
        assert_eq!(no_host, before);

        let mut no_ua = RequestRecord::new("/about", "_escaped_fragment_=")
            .with_header("Host", "example.com");
        let before = no_ua.clone();
        assert_eq!(tagger.tag(&mut no_ua), TagOutcome::MissingHeaders);
        assert_eq!(no_ua, before);
    }

    #[test]
    fn test_empty_header_list_is_missing() {
        let tagger = tagger();
        let mut req = request("Googlebot", "/about", "");
        req.headers.insert("user-agent".into(), Vec::new());

        assert_eq!(tagger.tag(&mut req), TagOutcome::MissingHeaders);
        assert!(!req.headers.contains_key("x-prerender-token"));
    }

    #[test]
    fn test_static_assets_skipped() {
        let tagger = tagger();

        for uri in ["/static/app.js", "/IMG.PNG", "/fonts/icons.woff2", "/feed.rss"] {
            let mut req = request("Googlebot/2.1", uri, "");
            assert_eq!(tagger.tag(&mut req), TagOutcome::StaticAsset, "{}", uri);
            assert!(!req.headers.contains_key("x-prerender-token"));
        }
    }

    #[test]
    fn test_escaped_fragment_with_browser() {
        let tagger = tagger();
        let mut req = request(
            "Mozilla/5.0 (Macintosh) Safari/605.1.15",
            "/app",
            "_escaped_fragment_=/products",
        );

        assert_eq!(tagger.tag(&mut req), TagOutcome::Tagged);
        assert!(req.headers.contains_key("x-prerender-host"));
    }

    #[test]
    fn test_browser_not_candidate() {
        let tagger = tagger();
        let mut req = request("Mozilla/5.0 (X11; Linux x86_64) Firefox/121.0", "/about", "q=1");
        let before = req.clone();

        assert_eq!(tagger.tag(&mut req), TagOutcome::NotCandidate);
        assert_eq!(req, before);
    }

    #[test]
    fn test_other_headers_preserved() {
        let tagger = tagger();
        let mut req = request("Twitterbot/1.0", "/post/1", "").with_header("Accept", "text/html");

        tagger.tag(&mut req);

        assert_eq!(req.headers.len(), 6);
        assert_eq!(
            req.headers.get("accept"),
            Some(&vec![HeaderEntry::new("Accept", "text/html")])
        );
        assert_eq!(
            req.headers.get("host"),
            Some(&vec![HeaderEntry::new("Host", "example.com")])
        );
    }

    #[test]
    fn test_client_markers_dropped() {
        let tagger = tagger();
        let clean = request("Mozilla/5.0 (X11; Linux x86_64) Firefox/121.0", "/about", "");
        let mut forged = clean
            .clone()
            .with_header("X-Prerender-Token", "guess")
            .with_header("X-Prerender-Host", "attacker.example");

        assert_eq!(tagger.tag(&mut forged), TagOutcome::NotCandidate);
        assert_eq!(forged, clean);
    }

    #[test]
    fn test_client_markers_dropped_without_host() {
        let tagger = tagger();
        let mut forged = RequestRecord::new("/", "")
            .with_header("User-Agent", "curl/8.0")
            .with_header("X-Prerender-Host", "attacker.example");

        assert_eq!(tagger.tag(&mut forged), TagOutcome::MissingHeaders);
        assert!(!forged.headers.contains_key("x-prerender-host"));
    }

    #[test]
    fn test_client_markers_replaced_when_tagged() {
        let tagger = tagger();
        let mut req = request("Googlebot/2.1", "/", "")
            .with_header("X-Prerender-Host", "attacker.example")
            .with_header("X-Prerender-Cachebuster", "0");

        assert_eq!(tagger.tag(&mut req), TagOutcome::Tagged);
        assert_eq!(req.headers.first_value(markers::PRERENDER_HOST), Some("example.com"));
        assert_eq!(
            req.headers.first_value(markers::PRERENDER_CACHEBUSTER),
            Some("1700000000000")
        );
    }

    #[test]
    fn test_missing_token_rejected() {
        let err = BotTagger::from_config(&TaggerConfig::default()).unwrap_err();

        assert!(matches!(err, TaggerError::MissingToken { ref env } if env == "PRERENDER_TOKEN"));
    }

    #[test]
    fn test_custom_policy() {
        let config = TaggerConfig {
            token: Some(PrerenderToken::new("t")),
            bot_signatures: vec!["mastodon".into()],
            static_extensions: vec!["html".into()],
            ..TaggerConfig::default()
        };
        let tagger = BotTagger::from_config(&config).unwrap();

        assert_eq!(tagger.classify(&request("Googlebot", "/", "")), TagOutcome::NotCandidate);
        assert_eq!(tagger.classify(&request("Mastodon/4.2", "/", "")), TagOutcome::Tagged);
        assert_eq!(
            tagger.classify(&request("Mastodon/4.2", "/index.HTML", "")),
            TagOutcome::StaticAsset
        );
    }

    #[test]
    fn test_decision_logged_without_token() {
        #[derive(Clone, Default)]
        struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

        impl std::io::Write for Captured {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tagger().tag(&mut request("Googlebot/2.1", "/about", ""));
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("Tagged"), "{}", logs);
        assert!(!logs.contains("test-token"), "{}", logs);
    }

    #[test]
    fn test_debug_hides_token() {
        assert!(!format!("{:?}", tagger()).contains("test-token"));
    }
}
