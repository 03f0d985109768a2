use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/**
    A cookie as stored in a session: name, value and the domain it is sent to.
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    /// Absent for session cookies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    fn matches(&self, host: &str) -> bool {
        host == self.domain
            || host
                .strip_suffix(self.domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }
}

/// Longest `Max-Age` honoured, 400 days. Larger values are clamped.
const MAX_AGE_LIMIT: i64 = 400 * 24 * 60 * 60;

/**
    Parse an `Expires` attribute. Accepts the HTTP date format and the
    older dash-separated variant (`Wed, 21-Oct-2015 07:28:00 GMT`).
*/
fn parse_expires(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc2822(&value.replacen('-', " ", 2)))
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/**
    Cookies accumulated from `Set-Cookie` response headers.

    Paths and secure flags are ignored. `Max-Age` takes precedence over
    `Expires`; a cookie whose expiry has passed is removed from the jar and
    never sent again.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /**
        Record one `Set-Cookie` header value received from `url`.
        Malformed values are ignored.
    */
    pub fn absorb(&mut self, url: &Url, set_cookie: &str) {
        self.absorb_at(url, set_cookie, Utc::now());
    }

    fn absorb_at(&mut self, url: &Url, set_cookie: &str, now: DateTime<Utc>) {
        let Some(host) = url.host_str() else {
            return;
        };

        let mut parts = set_cookie.split(';');
        let Some((name, value)) = parts.next().and_then(|p| p.split_once('=')) else {
            return;
        };
        let name = name.trim();
        if name.is_empty() {
            return;
        }

        let mut domain = host.to_ascii_lowercase();
        let mut max_age = None;
        let mut expires = None;
        for attribute in parts {
            let (key, val) = attribute.split_once('=').unwrap_or((attribute, ""));
            let key = key.trim();
            if key.eq_ignore_ascii_case("domain") {
                let val = val.trim().trim_start_matches('.');
                if !val.is_empty() {
                    domain = val.to_ascii_lowercase();
                }
            } else if key.eq_ignore_ascii_case("max-age") {
                if let Ok(seconds) = val.trim().parse::<i64>() {
                    max_age = Some(now + Duration::seconds(seconds.clamp(0, MAX_AGE_LIMIT)));
                }
            } else if key.eq_ignore_ascii_case("expires") {
                expires = parse_expires(val);
            }
        }

        let cookie = Cookie {
            name: name.to_owned(),
            value: value.trim().to_owned(),
            domain,
            expires: max_age.or(expires),
        };

        self.cookies.retain(|c| !(c.name == cookie.name && c.domain == cookie.domain));
        if !cookie.is_expired(now) {
            self.cookies.push(cookie);
        }
    }

    /**
        Build the `Cookie` request header for `url`, if any cookie applies.
    */
    pub fn header_for(&self, url: &Url) -> Option<String> {
        self.header_at(url, Utc::now())
    }

    fn header_at(&self, url: &Url, now: DateTime<Utc>) -> Option<String> {
        let host = url.host_str()?.to_ascii_lowercase();
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|c| c.matches(&host) && !c.is_expired(now))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        (!pairs.is_empty()).then(|| pairs.join("; "))
    }
}
