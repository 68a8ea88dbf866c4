//! Outbound adapters implementing the domain ports over real infrastructure.

pub mod mail;
pub mod persistence;
