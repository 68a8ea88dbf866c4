//! Backend entry-point: configuration, tracing, and server start-up.

mod server;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use actix_web::web;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;
use uuid::Uuid;

use backend::inbound::http::health::HealthState;
use backend::outbound::mail::{HttpGatewayMailer, MailGatewayConfig};
use backend::outbound::persistence::{DbPool, PoolConfig};
use server::{ServerConfig, create_server, run_migrations};

/// Command-line and environment configuration.
#[derive(Debug, Parser)]
#[command(name = "backend", about = "Backlot content-review API server")]
struct Cli {
    /// Socket address to bind the HTTP listener to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: SocketAddr,

    /// PostgreSQL connection URL; omit to run on in-memory fixtures.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// File holding the secret that signs tokens and confirmation codes.
    #[arg(long, env = "TOKEN_SECRET_FILE", default_value = "/var/run/secrets/token_secret")]
    token_secret_file: PathBuf,

    /// Allow an ephemeral generated secret when the secret file is missing.
    #[arg(long, env = "TOKEN_ALLOW_EPHEMERAL")]
    token_allow_ephemeral: bool,

    /// Mail gateway endpoint; omit to log outbound mail instead.
    #[arg(long, env = "MAIL_GATEWAY_URL")]
    mail_gateway_url: Option<Url>,

    /// Sender address stamped on confirmation mail.
    #[arg(long, env = "MAIL_FROM", default_value = "noreply@backlot.invalid")]
    mail_from: String,
}

fn load_secret(cli: &Cli) -> std::io::Result<Vec<u8>> {
    match std::fs::read(&cli.token_secret_file) {
        Ok(bytes) if !bytes.is_empty() => Ok(bytes),
        Ok(_) => Err(std::io::Error::other(format!(
            "secret file {} is empty",
            cli.token_secret_file.display()
        ))),
        Err(err) => {
            if cfg!(debug_assertions) || cli.token_allow_ephemeral {
                warn!(
                    path = %cli.token_secret_file.display(),
                    error = %err,
                    "using ephemeral token secret (dev only); issued tokens die with the process",
                );
                let mut secret = Vec::with_capacity(32);
                secret.extend_from_slice(Uuid::new_v4().as_bytes());
                secret.extend_from_slice(Uuid::new_v4().as_bytes());
                Ok(secret)
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read token secret at {}: {err}",
                    cli.token_secret_file.display()
                )))
            }
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let secret = load_secret(&cli)?;

    let mut config = ServerConfig::new(cli.bind_addr, secret);

    if let Some(database_url) = &cli.database_url {
        run_migrations(database_url).await?;
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(|err| std::io::Error::other(err.to_string()))?;
        config = config.with_db_pool(pool);
    } else {
        warn!("no DATABASE_URL configured; running on in-memory fixture storage");
    }

    if let Some(endpoint) = cli.mail_gateway_url {
        let mailer = HttpGatewayMailer::new(MailGatewayConfig::new(endpoint, cli.mail_from))
            .map_err(|err| std::io::Error::other(err.to_string()))?;
        config = config.with_mailer(Arc::new(mailer));
    } else {
        warn!("no MAIL_GATEWAY_URL configured; confirmation codes go to the log");
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, &config)?;
    info!(bind_addr = %config.bind_addr(), "server started");
    server.await
}
