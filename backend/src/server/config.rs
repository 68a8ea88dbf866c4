//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use backend::domain::ports::{Mailer, TracingMailer};
use backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) secret: Vec<u8>,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) mailer: Arc<dyn Mailer>,
}

impl ServerConfig {
    /// Construct a server configuration from the bind address and the secret
    /// signing both access tokens and confirmation codes.
    ///
    /// Without further configuration the server runs on in-memory fixture
    /// storage and logs outbound mail instead of delivering it.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, secret: Vec<u8>) -> Self {
        Self {
            bind_addr,
            secret,
            db_pool: None,
            mailer: Arc::new(TracingMailer),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach a real mail transport.
    #[must_use]
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
