#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for Indonesian administrative boundaries.
//!
//! Serves the hierarchy registry, province district collections and merged
//! subdistrict collections as JSON, and the raw `GeoJSON` files under
//! `/data` when reading from a local directory. The server holds no
//! selection state; drill-down sessions live in the clients.

mod handlers;
pub mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use wilayah_loader::{CollectionLoader, DataLocation, LoaderConfig};
use wilayah_registry::HierarchyRegistry;

/// Shared application state.
pub struct AppState {
    /// Loader for every boundary collection; also owns the registry.
    pub loader: CollectionLoader,
}

impl AppState {
    #[must_use]
    pub const fn new(loader: CollectionLoader) -> Self {
        Self { loader }
    }

    /// The hierarchy registry.
    #[must_use]
    pub fn registry(&self) -> &HierarchyRegistry {
        self.loader.registry()
    }
}

/// Registers the `/api` routes.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/provinces", web::get().to(handlers::provinces))
            .route(
                "/provinces/{id}/districts",
                web::get().to(handlers::province_districts),
            )
            .route("/districts/{identifier}", web::get().to(handlers::district))
            .route(
                "/districts/{identifier}/subdistricts",
                web::get().to(handlers::subdistricts),
            )
            .route(
                "/resolve/district",
                web::post().to(handlers::resolve_district),
            ),
    );
}

/// Starts the API server, configured from the environment.
///
/// Initializes logging from `RUST_LOG` and delegates to [`serve`] with
/// [`LoaderConfig::from_env`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the registry or data source cannot
/// be set up, or the HTTP server fails to bind or run.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    serve(LoaderConfig::from_env()).await
}

/// Starts the API server with an explicit loader configuration.
///
/// Does not touch logging; the caller owns the logger. Binds to
/// `BIND_ADDR` (default `127.0.0.1`) and `PORT` (default `8080`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the registry or data source cannot
/// be set up, or the HTTP server fails to bind or run.
#[allow(clippy::future_not_send)]
pub async fn serve(config: LoaderConfig) -> std::io::Result<()> {
    log::info!("Loading hierarchy registry...");
    let registry = HierarchyRegistry::from_env().map_err(std::io::Error::other)?;
    log::info!(
        "Registry holds {} provinces and {} districts",
        registry.provinces().count(),
        registry.district_count()
    );

    let static_root = static_data_dir(&config.location);
    let loader = CollectionLoader::from_config(Arc::new(registry), config)
        .map_err(std::io::Error::other)?;
    let state = web::Data::new(AppState::new(loader));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        let app = App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api);

        match &static_root {
            Some(dir) => app.service(Files::new("/data", dir).show_files_listing()),
            None => app,
        }
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

/// Directory served under `/data`, when reading from disk.
fn static_data_dir(location: &DataLocation) -> Option<PathBuf> {
    match location {
        DataLocation::Dir(root) => Some(root.join("data")),
        DataLocation::Url(_) => None,
    }
}
