//! Payload builders for the fluent API.

use crate::types::{Endpoint, Properties};
use serde_json::Value;

/// Property key carrying the event name.
pub const EVENT_NAME_KEY: &str = "name";

/// Merge the event name into caller properties. The explicit name always wins.
pub(crate) fn event_properties(
    event_name: impl Into<String>,
    mut properties: Properties,
) -> Properties {
    properties.insert(EVENT_NAME_KEY.into(), Value::String(event_name.into()));
    properties
}

// ============================================
// TRACK BUILDER
// ============================================

/// Builder for tracked events.
#[derive(Debug)]
pub struct TrackBuilder {
    event_name: String,
    properties: Properties,
}

impl TrackBuilder {
    pub(crate) fn new(event_name: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
            properties: Properties::new(),
        }
    }

    /// Add a property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Add several properties at once.
    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties.extend(properties);
        self
    }

    /// Build the endpoint and payload properties.
    pub(crate) fn build(self) -> (Endpoint, Properties) {
        (
            Endpoint::Event,
            event_properties(self.event_name, self.properties),
        )
    }
}

// ============================================
// USER UPDATE BUILDER
// ============================================

/// Builder for user updates.
#[derive(Debug, Default)]
pub struct UserUpdateBuilder {
    properties: Properties,
}

impl UserUpdateBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Add several properties at once.
    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties.extend(properties);
        self
    }

    pub(crate) fn build(self) -> (Endpoint, Properties) {
        (Endpoint::User, self.properties)
    }
}
