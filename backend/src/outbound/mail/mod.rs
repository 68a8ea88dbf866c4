//! Mail adapters implementing the `Mailer` port.

mod http_gateway;

pub use http_gateway::{HttpGatewayMailer, MailGatewayConfig};
