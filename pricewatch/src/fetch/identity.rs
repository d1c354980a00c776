//! Browser identity profiles sent with each attempt.

use rand::seq::SliceRandom;
use rand::Rng;

/// User agent plus header set presented to a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProfile {
    /// Short name used in logs and attempt records.
    pub name: String,
    /// `User-Agent` value.
    pub user_agent: String,
    /// Remaining headers, in send order.
    pub headers: Vec<(String, String)>,
}

const BASELINE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const BASIC_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

const ROTATION_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:122.0) Gecko/20100101 Firefox/122.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:122.0) Gecko/20100101 Firefox/122.0",
];

// Accept-Encoding is left to the HTTP client so it can decode what it advertises.
const BASELINE_HEADERS: &[(&str, &str)] = &[
    ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7"),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("DNT", "1"),
    ("Upgrade-Insecure-Requests", "1"),
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-Site", "none"),
    ("Sec-Fetch-User", "?1"),
    ("Cache-Control", "max-age=0"),
];

const ROTATION_HEADER_SETS: &[&[(&str, &str)]] = &[
    &[
        ("Accept-Language", "en-US,en;q=0.9,hi;q=0.8"),
        ("sec-ch-ua", r#""Not_A Brand";v="8", "Chromium";v="120", "Google Chrome";v="120""#),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", r#""Windows""#),
    ],
    &[
        ("Accept-Language", "en-IN,en;q=0.9,hi;q=0.8"),
        ("sec-ch-ua", r#""Not_A Brand";v="8", "Chromium";v="121", "Google Chrome";v="121""#),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", r#""macOS""#),
    ],
];

fn owned(headers: &[(&str, &str)]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

impl IdentityProfile {
    /// Desktop Chrome with a full navigation header set.
    #[must_use]
    pub fn baseline() -> Self {
        Self {
            name: "baseline".to_string(),
            user_agent: BASELINE_USER_AGENT.to_string(),
            headers: owned(BASELINE_HEADERS),
        }
    }

    /// User agent only; sent after a 403.
    #[must_use]
    pub fn basic() -> Self {
        Self {
            name: "basic".to_string(),
            user_agent: BASIC_USER_AGENT.to_string(),
            headers: Vec::new(),
        }
    }

    /// Mobile Safari, used for alternate surfaces.
    #[must_use]
    pub fn mobile() -> Self {
        Self {
            name: "mobile".to_string(),
            user_agent: MOBILE_USER_AGENT.to_string(),
            headers: owned(&[(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )]),
        }
    }

    /// Replaces or appends a header.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    /// Every header to send, `User-Agent` first.
    #[must_use]
    pub fn to_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(self.headers.len() + 1);
        headers.push(("User-Agent".to_string(), self.user_agent.clone()));
        headers.extend(self.headers.iter().cloned());
        headers
    }
}

/// The pool rotated through on retries.
#[derive(Debug, Clone, Default)]
pub struct IdentityPool;

impl IdentityPool {
    /// Number of distinct user agents in the pool.
    #[must_use]
    pub fn user_agent_count(&self) -> usize {
        ROTATION_USER_AGENTS.len()
    }

    /// Builds a rotated identity: baseline headers, a random user agent, a
    /// random header set and a `Referer` pointing at the site's own root.
    pub fn rotate<R: Rng>(&self, rng: &mut R, domain: &str) -> IdentityProfile {
        let mut profile = IdentityProfile::baseline();

        let ua_index = rng.gen_range(0..ROTATION_USER_AGENTS.len());
        profile.user_agent = ROTATION_USER_AGENTS[ua_index].to_string();

        if let Some(set) = ROTATION_HEADER_SETS.choose(rng) {
            for (name, value) in *set {
                profile.set_header(name, *value);
            }
        }

        profile.set_header("Referer", format!("https://{domain}/"));
        profile.name = format!("rotated-{ua_index}");
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_baseline_has_navigation_headers() {
        let headers = IdentityProfile::baseline().to_headers();
        assert_eq!(headers[0].0, "User-Agent");
        assert!(headers.iter().any(|(k, v)| k == "Sec-Fetch-Mode" && v == "navigate"));
        assert!(!headers.iter().any(|(k, _)| k == "Referer"));
    }

    #[test]
    fn test_basic_is_user_agent_only() {
        let headers = IdentityProfile::basic().to_headers();
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_rotate_adds_referer_and_header_set() {
        let mut rng = StdRng::seed_from_u64(7);
        let profile = IdentityPool.rotate(&mut rng, "flipkart.com");

        assert!(profile.name.starts_with("rotated-"));
        assert!(ROTATION_USER_AGENTS.contains(&profile.user_agent.as_str()));
        assert!(profile
            .headers
            .iter()
            .any(|(k, v)| k == "Referer" && v == "https://flipkart.com/"));
        assert!(profile.headers.iter().any(|(k, _)| k == "sec-ch-ua-platform"));
        // Header sets override rather than duplicate.
        let languages = profile
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("Accept-Language"))
            .count();
        assert_eq!(languages, 1);
    }
}
