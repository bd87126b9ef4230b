#![deny(missing_docs)]

//! # Conversion Options
//!
//! Knobs shared by the extractor and the assembler. The CLI fills these from
//! flags and `MDOAS_*` environment variables.

/// Title emitted in `info.title` unless overridden.
pub const DEFAULT_TITLE: &str = "Zentao API";

/// Server URL emitted when the sidecar metadata has no usable URL.
pub const DEFAULT_SERVER_URL: &str = "http://192.168.0.72/zentao";

/// What to do when two distinct endpoints derive the same identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Append a numeric suffix (`getBugsId2`) and log a warning.
    #[default]
    Suffix,
    /// Abort assembly with `AppError::NameCollision`.
    Fail,
}

/// Configuration for a single conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Value of `info.title`.
    pub title: String,
    /// Fallback for `servers[0].url`.
    pub default_server_url: String,
    /// Whether a POST/PUT/PATCH page without a request example may borrow its
    /// response example as the request body example.
    pub response_example_fallback: bool,
    /// Identifier collision handling.
    pub collision_policy: CollisionPolicy,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            default_server_url: DEFAULT_SERVER_URL.to_string(),
            response_example_fallback: true,
            collision_policy: CollisionPolicy::default(),
        }
    }
}

impl ConvertOptions {
    /// Sets the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the fallback server URL.
    pub fn with_default_server_url(mut self, url: impl Into<String>) -> Self {
        self.default_server_url = url.into();
        self
    }

    /// Enables or disables the response-example-as-request heuristic.
    pub fn with_response_example_fallback(mut self, enabled: bool) -> Self {
        self.response_example_fallback = enabled;
        self
    }

    /// Sets the collision policy.
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ConvertOptions::default();
        assert_eq!(opts.title, "Zentao API");
        assert_eq!(opts.default_server_url, DEFAULT_SERVER_URL);
        assert!(opts.response_example_fallback);
        assert_eq!(opts.collision_policy, CollisionPolicy::Suffix);
    }

    #[test]
    fn test_builder_chain() {
        let opts = ConvertOptions::default()
            .with_title("Tracker")
            .with_default_server_url("https://tracker.local")
            .with_response_example_fallback(false)
            .with_collision_policy(CollisionPolicy::Fail);
        assert_eq!(opts.title, "Tracker");
        assert_eq!(opts.default_server_url, "https://tracker.local");
        assert!(!opts.response_example_fallback);
        assert_eq!(opts.collision_policy, CollisionPolicy::Fail);
    }
}
