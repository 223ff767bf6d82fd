use std::sync::Arc;
use std::time::Duration;

use coursekit_core::auth::{AuthStrategy, ConfigError};
use coursekit_core::entity::Entity;

use crate::prelude::{eprintln, *};

pub mod client;
pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

pub use client::{ApiError, ResourceClient, ResourceDescriptor, ResourceError};

/// Remote resource operations against one of the configured backends
#[derive(Debug, clap::Parser)]
#[command(name = "remote")]
#[command(about = "Remote REST resource operations (WordPress v2, Tutor v1)")]
pub struct App {
    /// Backend to address
    #[arg(value_enum)]
    pub backend: Backend,

    /// Endpoint path under the backend base URL (e.g. posts, tags, courses)
    pub endpoint: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List resources, filtered by query parameters
    #[clap(name = "list")]
    List(list::ListOptions),

    /// Get a single resource by id
    #[clap(name = "get")]
    Get(get::GetOptions),

    /// Create a resource from a JSON payload
    #[clap(name = "create")]
    Create(create::CreateOptions),

    /// Update a resource by id from a JSON payload
    #[clap(name = "update")]
    Update(update::UpdateOptions),

    /// Delete a resource by id
    #[clap(name = "delete")]
    Delete(delete::DeleteOptions),
}

/// The remote backends this tool knows how to authenticate against
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// WordPress REST v2, bearer token
    #[value(name = "wp")]
    WpV2,
    /// Tutor LMS v1, basic credentials
    #[value(name = "tutor")]
    TutorV1,
}

/// Remote configuration from environment variables
#[derive(Debug, Clone, Default)]
pub struct RemoteConfig {
    pub wp_v2_base_url: Option<String>,
    pub tutor_v1_base_url: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Load configuration from environment variables
    ///
    /// Nothing is validated here; [`RemoteConfig::descriptor`] checks only what
    /// the selected backend needs.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let timeout = var("COURSEKIT_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(Self::DEFAULT_TIMEOUT_SECS);

        Self {
            wp_v2_base_url: var("WP_V2_BASE_URL"),
            tutor_v1_base_url: var("TUTOR_V1_BASE_URL"),
            api_key: var("API_KEY"),
            api_secret: var("API_SECRET"),
            timeout: Duration::from_secs(timeout),
        }
    }

    /// Bind an endpoint of `backend` to its base URL and auth strategy
    pub fn descriptor(
        &self,
        backend: Backend,
        endpoint: &str,
    ) -> std::result::Result<ResourceDescriptor, ConfigError> {
        let key = self.api_key.clone().unwrap_or_default();

        let (base_url, auth) = match backend {
            Backend::WpV2 => (
                self.wp_v2_base_url
                    .as_deref()
                    .ok_or(ConfigError::Missing("WP_V2_BASE_URL"))?,
                AuthStrategy::bearer(key)?,
            ),
            Backend::TutorV1 => (
                self.tutor_v1_base_url
                    .as_deref()
                    .ok_or(ConfigError::Missing("TUTOR_V1_BASE_URL"))?,
                AuthStrategy::basic(key, self.api_secret.clone().unwrap_or_default())?,
            ),
        };

        ResourceDescriptor::new(base_url, endpoint, auth)
    }

    /// Build a typed client for an endpoint of `backend`
    pub fn client(&self, backend: Backend, endpoint: &str) -> Result<ResourceClient<Entity>> {
        let descriptor = self
            .descriptor(backend, endpoint)
            .map_err(|e| Error::Configuration(e.to_string()))?;

        ResourceClient::new(Arc::new(descriptor), self.timeout)
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
    }
}

/// Module entry point
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = RemoteConfig::from_env();
    // Configuration problems surface here, before any request is sent.
    let client = config.client(app.backend, &app.endpoint)?;

    if global.verbose {
        eprintln!(
            "Using {} ({:?})",
            client.descriptor().url(&Default::default()),
            client.descriptor().auth()
        );
    }

    match app.command {
        Commands::List(options) => list::handler(&client, options).await,
        Commands::Get(options) => get::handler(&client, options).await,
        Commands::Create(options) => create::handler(&client, options).await,
        Commands::Update(options) => update::handler(&client, options).await,
        Commands::Delete(options) => delete::handler(&client, options).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> RemoteConfig {
        RemoteConfig {
            wp_v2_base_url: Some("https://site.dev/wp-json/wp/v2".to_string()),
            tutor_v1_base_url: Some("https://site.dev/wp-json/tutor/v1".to_string()),
            api_key: Some("key".to_string()),
            api_secret: Some("secret".to_string()),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_wp_backend_uses_bearer() {
        let descriptor = sample_config().descriptor(Backend::WpV2, "posts").unwrap();

        assert_eq!(descriptor.base_url(), "https://site.dev/wp-json/wp/v2");
        assert_eq!(
            descriptor.auth(),
            &AuthStrategy::BearerToken {
                token: "key".to_string()
            }
        );
    }

    #[test]
    fn test_tutor_backend_uses_basic() {
        let descriptor = sample_config()
            .descriptor(Backend::TutorV1, "courses")
            .unwrap();

        assert_eq!(descriptor.base_url(), "https://site.dev/wp-json/tutor/v1");
        assert_eq!(
            descriptor.auth(),
            &AuthStrategy::BasicCredentials {
                key: "key".to_string(),
                secret: "secret".to_string()
            }
        );
    }

    #[test]
    fn test_missing_token_is_configuration_error() {
        let config = RemoteConfig {
            api_key: None,
            ..sample_config()
        };
        assert_eq!(
            config.descriptor(Backend::WpV2, "posts").unwrap_err(),
            ConfigError::Missing("bearer token")
        );
    }

    #[test]
    fn test_missing_base_url_is_configuration_error() {
        let config = RemoteConfig {
            tutor_v1_base_url: None,
            ..sample_config()
        };
        assert_eq!(
            config.descriptor(Backend::TutorV1, "courses").unwrap_err(),
            ConfigError::Missing("TUTOR_V1_BASE_URL")
        );
    }

    #[test]
    fn test_missing_secret_only_matters_for_tutor() {
        let config = RemoteConfig {
            api_secret: None,
            ..sample_config()
        };
        assert!(config.descriptor(Backend::WpV2, "posts").is_ok());
        assert_eq!(
            config.descriptor(Backend::TutorV1, "courses").unwrap_err(),
            ConfigError::Missing("basic auth secret")
        );
    }
}
