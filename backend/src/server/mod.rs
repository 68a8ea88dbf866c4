//! Server construction, migrations, and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, middleware, web};
use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use mockable::DefaultClock;

use backend::domain::ports::{
    FixtureAccountRepository, FixtureCatalogueRepository, FixtureCommentRepository,
    FixtureReviewRepository,
};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::inbound::http::configure_api;
use backend::outbound::persistence::{
    DieselAccountRepository, DieselCatalogueRepository, DieselCommentRepository,
    DieselReviewRepository,
};
#[cfg(debug_assertions)]
use backend::ApiDoc;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// SQL migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Apply any pending migrations against the given database.
///
/// Runs on a blocking thread with a dedicated synchronous connection, since
/// the migration harness is not async.
///
/// # Errors
///
/// Propagates connection and migration failures as [`std::io::Error`].
pub async fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let database_url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut conn = diesel::PgConnection::establish(&database_url)
            .map_err(|err| std::io::Error::other(format!("database connection failed: {err}")))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
        Ok(())
    })
    .await
    .map_err(|err| std::io::Error::other(format!("migration task panicked: {err}")))?
}

fn build_ports(config: &ServerConfig) -> HttpStatePorts {
    match &config.db_pool {
        Some(pool) => HttpStatePorts {
            accounts: Arc::new(DieselAccountRepository::new(pool.clone())),
            catalogue: Arc::new(DieselCatalogueRepository::new(pool.clone())),
            reviews: Arc::new(DieselReviewRepository::new(pool.clone())),
            comments: Arc::new(DieselCommentRepository::new(pool.clone())),
            mailer: config.mailer.clone(),
        },
        None => HttpStatePorts {
            accounts: Arc::new(FixtureAccountRepository::new()),
            catalogue: Arc::new(FixtureCatalogueRepository::new()),
            reviews: Arc::new(FixtureReviewRepository::new()),
            comments: Arc::new(FixtureCommentRepository::new()),
            mailer: config.mailer.clone(),
        },
    }
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(middleware::Compat::new(middleware::Logger::default()))
        .wrap(middleware::NormalizePath::trim())
        .configure(configure_api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: &ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(HttpState::new(
        build_ports(config),
        &config.secret,
        Arc::new(DefaultClock),
    ));
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(config.bind_addr())?
    .run();

    health_state.mark_ready();
    Ok(server)
}
