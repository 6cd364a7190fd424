//! Visitor identity carried between requests in cookies.

use crate::cookies::{CookieExpiry, CookieStore};
use std::time::Duration;
use tracing::debug;

/// Cookie holding the user id.
pub const USER_ID_COOKIE: &str = "reventic";

/// Cookie holding the session id.
pub const SESSION_ID_COOKIE: &str = "rev-session";

/// Lifetime of the user id cookie (ten years).
pub const USER_ID_MAX_AGE: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// User and session ids for the current visitor.
///
/// Ids are only ever replaced, never cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    user_id: Option<String>,
    session_id: Option<String>,
}

impl Identity {
    /// Read ids from the identity cookies. Missing or empty cookies are absent.
    pub fn load(store: &impl CookieStore) -> Self {
        Self {
            user_id: non_empty(store.get(USER_ID_COOKIE)),
            session_id: non_empty(store.get(SESSION_ID_COOKIE)),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Replace the user id and persist it for ten years.
    pub fn update_user_id(&mut self, store: &mut impl CookieStore, user_id: String) {
        debug!(user_id = %user_id, "updating user id");
        store.set(USER_ID_COOKIE, &user_id, CookieExpiry::MaxAge(USER_ID_MAX_AGE));
        self.user_id = Some(user_id);
    }

    /// Replace the session id and persist it as a session cookie.
    pub fn update_session_id(&mut self, store: &mut impl CookieStore, session_id: String) {
        debug!(session_id = %session_id, "updating session id");
        store.set(SESSION_ID_COOKIE, &session_id, CookieExpiry::Session);
        self.session_id = Some(session_id);
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
