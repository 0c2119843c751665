//! The process composer.
//!
//! Builds the request-handling surface from a configuration, a database
//! manager and a route provider, connecting to the document store first when
//! the configuration asks for it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use axum::{middleware, routing::any, Router};
use thiserror::Error;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::loader::env_var;
use crate::config::schema::share;
use crate::config::{resolve_environment, AppConfig, ConfigError, ServerSettings, SharedConfig};
use crate::database::{Database, DatabaseArgs, DatabaseError};
use crate::http::middleware::cors_middleware;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::websocket::{self, WebSocketSlot, WEBSOCKET_PATH};
use crate::observability::metrics;
use crate::routing::{RouteProvider, TodoRouter};
use crate::todos::{InMemoryTodoRepository, MongoTodoRepository, TodoRepository};

/// Error type for application construction.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Optional collaborators for [`Application::new`].
#[derive(Default)]
pub struct ApplicationArgs {
    /// Feature toggles. Defaults to [`AppConfig::default`].
    pub config: Option<AppConfig>,
    /// Database manager. Defaults to a new [`Database`] for the environment.
    pub database: Option<Database>,
    /// Route provider. Defaults to [`TodoRouter`].
    pub router: Option<Arc<dyn RouteProvider>>,
    /// Environment label. Defaults to `APP_ENV`, then `development`.
    pub environment: Option<String>,
}

/// A fully composed application, ready to be handed to a `WebServer`.
pub struct Application {
    router: Router,
    config: SharedConfig,
    environment: String,
    settings: ServerSettings,
    database: Database,
    websocket: WebSocketSlot,
}

impl Application {
    /// Compose an application.
    ///
    /// With `database_enabled` the database is connected before anything
    /// else is built and a connection failure is returned as
    /// [`AppError::Database`].
    pub async fn new(args: ApplicationArgs) -> Result<Self, AppError> {
        let config = args.config.unwrap_or_default();
        let environment = resolve_environment(args.environment.as_deref(), env_var);
        let database = args.database.unwrap_or_else(|| {
            Database::with_args(DatabaseArgs {
                environment: Some(environment.clone()),
                ..Default::default()
            })
        });
        let provider = args
            .router
            .unwrap_or_else(|| default_route_provider(&config, &database));

        if config.database_enabled {
            database.establish_connection(None).await?;
        } else {
            tracing::warn!("Database is disabled, skipping connection");
        }

        let settings = match ServerSettings::from_env() {
            Ok(settings) => settings,
            Err(e) => {
                database.close().await;
                return Err(e.into());
            }
        };

        let websocket: WebSocketSlot = Arc::new(ArcSwapOption::empty());
        let router = build_router(&config, &settings, provider.as_ref(), &websocket);

        tracing::info!(
            environment = %environment,
            cors = config.cors_enabled,
            database = config.database_enabled,
            logs = config.logs_enabled,
            websocket = config.websocket_enabled,
            "Application composed"
        );

        Ok(Self {
            router,
            config: share(config),
            environment,
            settings,
            database,
            websocket,
        })
    }

    /// The composed request-handling surface.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        self.config.load_full()
    }

    /// Handle to the live configuration, shared with whoever holds it.
    pub fn shared_config(&self) -> SharedConfig {
        Arc::clone(&self.config)
    }

    /// Replace the configuration with an edited copy. Last write wins.
    ///
    /// Middleware selected at construction is not re-evaluated; the change
    /// is visible to checks made afterwards, such as WebSocket binding.
    pub fn update_config<F>(&self, edit: F)
    where
        F: Fn(&mut AppConfig),
    {
        self.config.rcu(|current| {
            let mut next = AppConfig::clone(current);
            edit(&mut next);
            next
        });
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn set_environment(&mut self, environment: impl Into<String>) {
        self.environment = environment.into();
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.settings.host = host.into();
    }

    pub fn set_port(&mut self, port: u16) {
        self.settings.port = port;
    }

    /// Directory on-disk resources are resolved against.
    pub fn root_path(&self) -> PathBuf {
        root_path()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Slot the `/ws` route serves from. Empty until a listener binds a
    /// WebSocket server into it.
    pub fn websocket_slot(&self) -> &WebSocketSlot {
        &self.websocket
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("environment", &self.environment)
            .field("settings", &self.settings)
            .field("config", &self.config())
            .field("database", &self.database)
            .finish()
    }
}

/// Crate root directory. Log files live under `{root}/logs`.
pub fn root_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn default_route_provider(config: &AppConfig, database: &Database) -> Arc<dyn RouteProvider> {
    let repository: Arc<dyn TodoRepository> = if config.database_enabled {
        Arc::new(MongoTodoRepository::new(database.clone()))
    } else {
        Arc::new(InMemoryTodoRepository::new())
    };
    Arc::new(TodoRouter::new(repository))
}

/// Attach the provider's router and the WebSocket upgrade route behind the
/// configured middleware.
#[allow(deprecated)]
fn build_router(
    config: &AppConfig,
    settings: &ServerSettings,
    provider: &dyn RouteProvider,
    slot: &WebSocketSlot,
) -> Router {
    let mut router = Router::new()
        .route(WEBSOCKET_PATH, any(websocket::upgrade_handler))
        .with_state(Arc::clone(slot))
        .fallback_service(provider.init());

    if config.cors_enabled {
        router = router.layer(middleware::from_fn(cors_middleware));
    }
    if config.metrics_enabled {
        router = router.layer(middleware::from_fn(metrics::track_requests));
    }

    router
        .layer(TimeoutLayer::new(Duration::from_secs(settings.request_timeout_secs)))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(set_request_id_layer())
}
