//! Reventic tracker implementation.

use crate::builders::{event_properties, TrackBuilder, UserUpdateBuilder};
use crate::config::{Config, TrackerBuilder};
use crate::cookies::{CookieStore, MemoryCookieStore};
use crate::identity::Identity;
use crate::origin_ip::RequestContext;
use crate::transport::HttpTransport;
use crate::types::{ApiResponse, Endpoint, OutboundRequest, Properties};
use crate::Error;
use tracing::{debug, instrument};

/// Reventic analytics tracker.
///
/// Create one tracker per visitor (per incoming request on a server). The
/// visitor's user and session ids are read from the cookie store when the
/// tracker is built and written back whenever the API returns new ones.
///
/// # Example
///
/// ```rust,no_run
/// use reventic::{MemoryCookieStore, RequestContext, Tracker};
///
/// # async fn example() -> Result<(), reventic::Error> {
/// let store = MemoryCookieStore::from_cookie_header("reventic=u_123");
/// let context = RequestContext::new().remote_addr("203.0.113.7");
///
/// let mut tracker = Tracker::configure("key_xxx", false, store, &context)?;
///
/// tracker.track_event("signup")
///     .property("plan", "pro")
///     .send()
///     .await?;
///
/// // Forward refreshed identity cookies to the browser.
/// for header in tracker.store().set_cookie_headers() {
///     println!("Set-Cookie: {header}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Tracker<S = MemoryCookieStore> {
    config: Config,
    api_key: Option<String>,
    identity: Identity,
    origin_ip: Option<String>,
    store: S,
    transport: HttpTransport,
}

impl Tracker {
    /// Create a new builder.
    pub fn builder() -> TrackerBuilder {
        TrackerBuilder::new()
    }
}

impl TrackerBuilder {
    /// Build the tracker over the given cookie store.
    pub fn build<S: CookieStore>(self, store: S) -> Result<Tracker<S>, Error> {
        let config = self.build_config()?;
        let transport = HttpTransport::new(&config)?;
        let identity = Identity::load(&store);
        let origin_ip = self.request_context.origin_ip();

        debug!(
            base_url = %config.base_url(),
            has_user_id = identity.user_id().is_some(),
            has_session_id = identity.session_id().is_some(),
            "tracker configured"
        );

        Ok(Tracker {
            config,
            api_key: self.api_key,
            identity,
            origin_ip,
            store,
            transport,
        })
    }
}

impl<S: CookieStore> Tracker<S> {
    /// Create a tracker for the production API, or the demo API when `demo` is set.
    pub fn configure(
        api_key: impl Into<String>,
        demo: bool,
        store: S,
        context: &RequestContext,
    ) -> Result<Self, Error> {
        TrackerBuilder::new()
            .api_key(api_key)
            .demo(demo)
            .request_context(context.clone())
            .build(store)
    }

    /// Get the tracker configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the API key.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = Some(api_key.into());
    }

    /// Whether a non-empty API key is set.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Current user id.
    pub fn user_id(&self) -> Option<&str> {
        self.identity.user_id()
    }

    /// Current session id.
    pub fn session_id(&self) -> Option<&str> {
        self.identity.session_id()
    }

    /// Origin IP resolved when the tracker was built.
    pub fn origin_ip(&self) -> Option<&str> {
        self.origin_ip.as_deref()
    }

    /// The cookie store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the tracker, returning the cookie store.
    pub fn into_store(self) -> S {
        self.store
    }

    // ============================================
    // TRACK
    // ============================================

    /// Track an event. `event_name` replaces any `name` key in `properties`.
    pub async fn track(
        &mut self,
        event_name: impl Into<String>,
        properties: Properties,
    ) -> Result<ApiResponse, Error> {
        self.execute(event_properties(event_name, properties), Endpoint::Event)
            .await
    }

    /// Start building a tracked event.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use reventic::Tracker;
    /// # async fn example(tracker: &mut Tracker) -> Result<(), reventic::Error> {
    /// tracker.track_event("feature_used")
    ///     .property("feature", "export")
    ///     .send()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn track_event(&mut self, event_name: impl Into<String>) -> SendableTrack<'_, S> {
        SendableTrack {
            builder: TrackBuilder::new(event_name),
            tracker: self,
        }
    }

    // ============================================
    // USER
    // ============================================

    /// Update properties of the current user.
    pub async fn update_user(&mut self, properties: Properties) -> Result<ApiResponse, Error> {
        self.execute(properties, Endpoint::User).await
    }

    /// Start building a user update.
    pub fn user(&mut self) -> SendableUserUpdate<'_, S> {
        SendableUserUpdate {
            builder: UserUpdateBuilder::new(),
            tracker: self,
        }
    }

    // ============================================
    // EXECUTE
    // ============================================

    /// Post `data` to `endpoint` and refresh identity from the response.
    ///
    /// Fails with [`Error::MissingCredential`] before any request is made
    /// when no API key is set. Identity is only updated once the response
    /// has been decoded.
    #[instrument(skip_all, fields(endpoint = %endpoint))]
    pub async fn execute(
        &mut self,
        data: Properties,
        endpoint: Endpoint,
    ) -> Result<ApiResponse, Error> {
        let api_key = match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => return Err(Error::MissingCredential),
        };

        let payload = OutboundRequest {
            properties: data,
            api_key,
            user_id: self.identity.user_id().map(String::from),
            session_id: self.identity.session_id().map(String::from),
            rev_ip: self.origin_ip.clone(),
        };

        let response = self.transport.send(endpoint, &payload).await?;

        if let Some(user_id) = response.user_id() {
            self.identity.update_user_id(&mut self.store, user_id);
        }
        if let Some(session_id) = response.session_id() {
            self.identity.update_session_id(&mut self.store, session_id);
        }

        Ok(response)
    }
}

// ============================================
// SENDABLE WRAPPERS
// ============================================

/// Sendable track builder.
pub struct SendableTrack<'a, S> {
    builder: TrackBuilder,
    tracker: &'a mut Tracker<S>,
}

impl<'a, S: CookieStore> SendableTrack<'a, S> {
    /// Add a property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.builder = self.builder.property(key, value);
        self
    }

    /// Add several properties at once.
    pub fn properties(mut self, properties: Properties) -> Self {
        self.builder = self.builder.properties(properties);
        self
    }

    /// Send the event.
    pub async fn send(self) -> Result<ApiResponse, Error> {
        let (endpoint, properties) = self.builder.build();
        self.tracker.execute(properties, endpoint).await
    }
}

/// Sendable user update builder.
pub struct SendableUserUpdate<'a, S> {
    builder: UserUpdateBuilder,
    tracker: &'a mut Tracker<S>,
}

impl<'a, S: CookieStore> SendableUserUpdate<'a, S> {
    /// Add a property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.builder = self.builder.property(key, value);
        self
    }

    /// Add several properties at once.
    pub fn properties(mut self, properties: Properties) -> Self {
        self.builder = self.builder.properties(properties);
        self
    }

    /// Send the update.
    pub async fn send(self) -> Result<ApiResponse, Error> {
        let (endpoint, properties) = self.builder.build();
        self.tracker.execute(properties, endpoint).await
    }
}
