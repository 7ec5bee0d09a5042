//! IMAP connection management.
//!
//! This module provides connection handling for IMAP servers, including:
//! - Configuration (host, port, security mode)
//! - TLS/plaintext stream abstraction
//! - Framed I/O for IMAP protocol
//! - Type-state connection wrapper
//! - IDLE support for real-time notifications

mod client;
mod config;
mod engine;
mod framed;
mod idle;
mod metrics;
mod pool;
mod stream;

pub use client::{Authenticated, Client, NotAuthenticated, Selected};
pub use config::{Config, ConfigBuilder, ConnectionConfig, ConnectionConfigBuilder, Security};
pub use engine::{Connection, HealthStatus};
pub use framed::{FramedStream, ResponseAccumulator};
pub use idle::{IdleEvent, IdleHandle};
pub use metrics::ConnectionMetrics;
pub use pool::{ConnectionPool, PoolKey, PooledConnection};
pub use stream::{ImapStream, connect_plain, connect_tls, create_tls_connector};
