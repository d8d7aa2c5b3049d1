//! Login session state
//!
//! Persisted under the `authState` key in its own store so it never collides
//! with business data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The persisted login gate state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    #[serde(default)]
    pub is_authenticated: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl AuthState {
    /// A freshly logged-in session
    pub fn logged_in(username: impl Into<String>) -> Self {
        Self {
            is_authenticated: true,
            username: Some(username.into()),
            logged_in_at: Some(Utc::now()),
        }
    }
}
