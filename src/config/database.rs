//! Document store connection profiles.
//!
//! A base profile is merged with an overlay keyed by environment name.
//! Environments without an overlay use the base profile unchanged.

use serde::{Deserialize, Serialize};

/// Options handed to the driver when connecting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatabaseOptions {
    /// Maximum connections kept in the driver pool.
    pub pool_size: u32,

    /// Let the driver retry writes once on transient failures.
    pub retry_writes: bool,

    /// Database to use when the URI names none.
    pub db_name: Option<String>,

    /// Username for authentication.
    pub user: Option<String>,

    /// Password for authentication.
    pub pass: Option<String>,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            pool_size: 5,
            retry_writes: true,
            db_name: None,
            user: None,
            pass: None,
        }
    }
}

/// Partial options layered over the base profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseOverlay {
    pub db_name: Option<String>,
    pub user: Option<String>,
    pub pass: Option<String>,
}

impl DatabaseOptions {
    /// Apply an overlay. Fields the overlay leaves unset keep their value.
    pub fn merge(mut self, overlay: DatabaseOverlay) -> Self {
        if overlay.db_name.is_some() {
            self.db_name = overlay.db_name;
        }
        if overlay.user.is_some() {
            self.user = overlay.user;
        }
        if overlay.pass.is_some() {
            self.pass = overlay.pass;
        }
        self
    }

    /// Build the profile for `environment`, reading credentials through
    /// `lookup`.
    pub fn for_environment<F>(environment: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().merge(overlay_for(environment, lookup))
    }
}

fn overlay_for<F>(environment: &str, lookup: F) -> DatabaseOverlay
where
    F: Fn(&str) -> Option<String>,
{
    match environment {
        "development" => DatabaseOverlay {
            db_name: Some("todo_api_development".to_string()),
            user: lookup("DEV_MONGODB_USER"),
            pass: lookup("DEV_MONGODB_PASS"),
        },
        "production" => DatabaseOverlay {
            db_name: Some("todo_api_production".to_string()),
            user: lookup("PROD_MONGODB_USER"),
            pass: lookup("PROD_MONGODB_PASS"),
        },
        "test" => DatabaseOverlay {
            db_name: Some("todo_api_testing".to_string()),
            ..DatabaseOverlay::default()
        },
        _ => DatabaseOverlay::default(),
    }
}
