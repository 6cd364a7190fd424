//! Reventic analytics SDK for Rust.
//!
//! # Example
//!
//! ```rust,ignore
//! use reventic::{MemoryCookieStore, RequestContext, Tracker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), reventic::Error> {
//!     let store = MemoryCookieStore::from_cookie_header("reventic=u_123; rev-session=s_456");
//!     let context = RequestContext::new().remote_addr("203.0.113.7");
//!
//!     let mut tracker = Tracker::configure("key_xxx", false, store, &context)?;
//!
//!     tracker.track_event("signup")
//!         .property("plan", "pro")
//!         .send()
//!         .await?;
//!
//!     tracker.user()
//!         .property("email", "user@example.com")
//!         .send()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod builders;
mod client;
mod config;
mod cookies;
mod error;
mod identity;
mod origin_ip;
mod transport;
pub mod types;

pub use builders::EVENT_NAME_KEY;
pub use client::{SendableTrack, SendableUserUpdate, Tracker};
pub use config::{Config, TrackerBuilder, DEFAULT_TIMEOUT, DEMO_API_URL, PRODUCTION_API_URL};
pub use cookies::{CookieExpiry, CookieStore, MemoryCookieStore};
pub use error::Error;
pub use identity::{Identity, SESSION_ID_COOKIE, USER_ID_COOKIE, USER_ID_MAX_AGE};
pub use origin_ip::{is_public_ipv4, RequestContext};
pub use types::{ApiResponse, Endpoint, OutboundRequest, Properties};
