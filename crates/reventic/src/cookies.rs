//! Cookie storage used to persist visitor identity.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// How long a written cookie should live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieExpiry {
    /// Expires when the browser session ends.
    Session,
    /// Expires after the given duration.
    MaxAge(Duration),
}

impl CookieExpiry {
    /// Absolute expiry as a unix timestamp in seconds, `0` for session cookies.
    pub fn as_wire_expiry(&self, now: SystemTime) -> u64 {
        match self {
            CookieExpiry::Session => 0,
            CookieExpiry::MaxAge(age) => now
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs()
                .saturating_add(age.as_secs()),
        }
    }
}

/// Key/value storage for identity cookies.
///
/// Implement this over whatever cookie jar your HTTP stack exposes.
/// [`MemoryCookieStore`] covers the common server case of reading the
/// incoming `Cookie` header and emitting `Set-Cookie` headers.
pub trait CookieStore {
    /// Read a cookie value.
    fn get(&self, name: &str) -> Option<String>;

    /// Write a cookie value.
    fn set(&mut self, name: &str, value: &str, expiry: CookieExpiry);
}

impl<S: CookieStore + ?Sized> CookieStore for &mut S {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn set(&mut self, name: &str, value: &str, expiry: CookieExpiry) {
        (**self).set(name, value, expiry)
    }
}

/// In-memory cookie store.
#[derive(Debug, Clone, Default)]
pub struct MemoryCookieStore {
    values: HashMap<String, String>,
    writes: Vec<(String, CookieExpiry)>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from an incoming `Cookie` request header.
    ///
    /// Values are percent-decoded; a value that does not decode is kept as-is.
    pub fn from_cookie_header(header: &str) -> Self {
        let values = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                let value = value.trim().trim_matches('"');
                let value = urlencoding::decode(value)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| value.to_string());
                Some((name.to_string(), value))
            })
            .collect();

        Self {
            values,
            writes: Vec::new(),
        }
    }

    /// Expiry of the most recent write to `name`, if it was written.
    pub fn expiry(&self, name: &str) -> Option<CookieExpiry> {
        self.writes
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, expiry)| *expiry)
    }

    /// `Set-Cookie` header values for every cookie written since creation.
    ///
    /// Values are percent-encoded.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        let mut seen: Vec<(&str, CookieExpiry)> = Vec::new();
        for (name, expiry) in self.writes.iter().rev() {
            if seen.iter().any(|(n, _)| *n == name.as_str()) {
                continue;
            }
            seen.push((name.as_str(), *expiry));
        }
        seen.reverse();

        seen.into_iter()
            .filter_map(|(name, expiry)| {
                let value = urlencoding::encode(self.values.get(name)?);
                Some(match expiry {
                    CookieExpiry::Session => format!("{name}={value}; Path=/"),
                    CookieExpiry::MaxAge(age) => {
                        format!("{name}={value}; Path=/; Max-Age={}", age.as_secs())
                    }
                })
            })
            .collect()
    }
}

impl CookieStore for MemoryCookieStore {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &str, expiry: CookieExpiry) {
        self.values.insert(name.to_string(), value.to_string());
        self.writes.push((name.to_string(), expiry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cookie_header() {
        let store = MemoryCookieStore::from_cookie_header("reventic=abc; rev-session=\"xyz\"; junk");

        assert_eq!(store.get("reventic").as_deref(), Some("abc"));
        assert_eq!(store.get("rev-session").as_deref(), Some("xyz"));
        assert!(store.get("junk").is_none());
        assert!(store.set_cookie_headers().is_empty());
    }

    #[test]
    fn test_set_cookie_headers_latest_write_wins() {
        let mut store = MemoryCookieStore::new();
        store.set("reventic", "u1", CookieExpiry::MaxAge(Duration::from_secs(60)));
        store.set("rev-session", "s1", CookieExpiry::Session);
        store.set("reventic", "u2", CookieExpiry::MaxAge(Duration::from_secs(120)));

        assert_eq!(
            store.set_cookie_headers(),
            vec![
                "rev-session=s1; Path=/".to_string(),
                "reventic=u2; Path=/; Max-Age=120".to_string(),
            ]
        );
        assert_eq!(
            store.expiry("reventic"),
            Some(CookieExpiry::MaxAge(Duration::from_secs(120)))
        );
        assert_eq!(store.expiry("rev-session"), Some(CookieExpiry::Session));
        assert!(store.expiry("other").is_none());
    }

    #[test]
    fn test_wire_expiry() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000);

        assert_eq!(CookieExpiry::Session.as_wire_expiry(now), 0);
        assert_eq!(
            CookieExpiry::MaxAge(Duration::from_secs(500)).as_wire_expiry(now),
            1_500
        );
    }

    #[test]
    fn test_wire_expiry_saturates() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000);

        assert_eq!(CookieExpiry::MaxAge(Duration::MAX).as_wire_expiry(now), u64::MAX);
    }

    #[test]
    fn test_values_are_encoded_and_decoded() {
        let id = "u1; Domain=evil.example";

        let mut store = MemoryCookieStore::new();
        store.set("reventic", id, CookieExpiry::Session);

        let headers = store.set_cookie_headers();
        assert_eq!(headers, vec!["reventic=u1%3B%20Domain%3Devil.example; Path=/".to_string()]);

        let (pair, _) = headers[0].split_once("; Path").unwrap();
        let reread = MemoryCookieStore::from_cookie_header(pair);
        assert_eq!(reread.get("reventic").as_deref(), Some(id));
    }

    #[test]
    fn test_undecodable_value_kept_raw() {
        let store = MemoryCookieStore::from_cookie_header("reventic=%FF%FE");
        assert_eq!(store.get("reventic").as_deref(), Some("%FF%FE"));
    }

    #[test]
    fn test_mut_ref_store() {
        fn write<S: CookieStore>(mut store: S) {
            store.set("a", "b", CookieExpiry::Session);
        }

        let mut store = MemoryCookieStore::new();
        write(&mut store);
        assert_eq!(store.get("a").as_deref(), Some("b"));
    }
}
