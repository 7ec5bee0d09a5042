//! Connection configuration types.

use std::time::Duration;

/// Connection security mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// No encryption (port 143). **Not recommended for production.**
    None,
    /// Start with plaintext, upgrade with STARTTLS (port 143).
    StartTls,
    /// TLS from the start (port 993). **Recommended.**
    #[default]
    Implicit,
}

impl Security {
    /// Returns the default port for this security mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::None | Self::StartTls => 143,
            Self::Implicit => 993,
        }
    }
}

/// IMAP connection configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Security mode.
    pub security: Security,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Read/write timeout.
    pub io_timeout: Duration,
}

impl Config {
    /// Creates a new configuration with implicit TLS on port 993.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 993,
            security: Security::Implicit,
            connect_timeout: Duration::from_secs(30),
            io_timeout: Duration::from_secs(60),
        }
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(host)
    }
}

/// Builder for connection configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    host: String,
    port: Option<u16>,
    security: Security,
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl ConfigBuilder {
    /// Creates a new builder with the given hostname.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            security: Security::Implicit,
            connect_timeout: Duration::from_secs(30),
            io_timeout: Duration::from_secs(60),
        }
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the security mode.
    #[must_use]
    pub const fn security(mut self, security: Security) -> Self {
        self.security = security;
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the I/O timeout.
    #[must_use]
    pub const fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        Config {
            host: self.host,
            port: self.port.unwrap_or_else(|| self.security.default_port()),
            security: self.security,
            connect_timeout: self.connect_timeout,
            io_timeout: self.io_timeout,
        }
    }
}

/// Configuration for a managed, pooled, auto-reconnecting connection.
///
/// Unlike [`Config`], which only describes how to dial a socket, this type
/// carries everything the connection engine and pool need: credentials,
/// retry policy, and the intervals that drive keepalive and health checks.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Username for LOGIN.
    pub username: String,
    /// Password for LOGIN.
    pub password: String,
    /// Whether to use TLS (implicit TLS on `port`, otherwise plaintext).
    pub use_tls: bool,
    /// Connect and I/O timeout.
    pub timeout: Duration,
    /// Maximum reconnect attempts before giving up.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub retry_delay_initial: Duration,
    /// Whether retry delays grow exponentially (`initial * 2^(k-1)`, capped
    /// at `retry_delay_max`) or stay fixed at `retry_delay_initial`.
    pub retry_exponential_backoff: bool,
    /// Upper bound on the backoff delay.
    pub retry_delay_max: Duration,
    /// How often to send a NOOP to keep an idle connection alive.
    pub keepalive_interval: Duration,
    /// How often the pool probes idle connections for liveness.
    pub health_check_interval: Duration,
    /// Maximum idle connections retained per `(host, username)` pool key.
    pub pool_max_per_key: usize,
    /// Whether to record [`super::metrics::ConnectionMetrics`].
    pub enable_monitoring: bool,
}

impl ConnectionConfig {
    /// Creates a configuration builder with the documented defaults.
    #[must_use]
    pub fn builder(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::new(host, username, password)
    }

    /// Returns the delay to wait before the `attempt`-th retry (1-indexed).
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        if !self.retry_exponential_backoff || attempt <= 1 {
            return self.retry_delay_initial.min(self.retry_delay_max);
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        self.retry_delay_initial
            .saturating_mul(factor)
            .min(self.retry_delay_max)
    }

    /// Converts the dial-relevant fields into a low-level [`Config`].
    #[must_use]
    pub fn dial_config(&self) -> Config {
        Config {
            host: self.host.clone(),
            port: self.port,
            security: if self.use_tls {
                Security::Implicit
            } else {
                Security::None
            },
            connect_timeout: self.timeout,
            io_timeout: self.timeout,
        }
    }
}

/// Builder for [`ConnectionConfig`].
#[derive(Debug, Clone)]
pub struct ConnectionConfigBuilder {
    config: ConnectionConfig,
}

impl ConnectionConfigBuilder {
    /// Creates a new builder with spec-documented defaults.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            config: ConnectionConfig {
                host: host.into(),
                port: 993,
                username: username.into(),
                password: password.into(),
                use_tls: true,
                timeout: Duration::from_secs(30),
                max_retries: 3,
                retry_delay_initial: Duration::from_secs(1),
                retry_exponential_backoff: true,
                retry_delay_max: Duration::from_secs(30),
                keepalive_interval: Duration::from_secs(300),
                health_check_interval: Duration::from_secs(60),
                pool_max_per_key: 5,
                enable_monitoring: true,
            },
        }
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets whether TLS is used.
    #[must_use]
    pub const fn use_tls(mut self, use_tls: bool) -> Self {
        self.config.use_tls = use_tls;
        self
    }

    /// Sets the connect/I-O timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Sets the maximum number of reconnect attempts.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Sets the initial retry delay.
    #[must_use]
    pub const fn retry_delay_initial(mut self, delay: Duration) -> Self {
        self.config.retry_delay_initial = delay;
        self
    }

    /// Sets whether retry delays grow exponentially.
    #[must_use]
    pub const fn retry_exponential_backoff(mut self, enabled: bool) -> Self {
        self.config.retry_exponential_backoff = enabled;
        self
    }

    /// Sets the maximum retry delay.
    #[must_use]
    pub const fn retry_delay_max(mut self, delay: Duration) -> Self {
        self.config.retry_delay_max = delay;
        self
    }

    /// Sets the keepalive interval.
    #[must_use]
    pub const fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.config.keepalive_interval = interval;
        self
    }

    /// Sets the health-check interval.
    #[must_use]
    pub const fn health_check_interval(mut self, interval: Duration) -> Self {
        self.config.health_check_interval = interval;
        self
    }

    /// Sets the maximum pooled connections per `(host, username)` key.
    #[must_use]
    pub const fn pool_max_per_key(mut self, max: usize) -> Self {
        self.config.pool_max_per_key = max;
        self
    }

    /// Sets whether connection metrics are recorded.
    #[must_use]
    pub const fn enable_monitoring(mut self, enabled: bool) -> Self {
        self.config.enable_monitoring = enabled;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ConnectionConfig {
        self.config
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ports() {
        assert_eq!(Security::None.default_port(), 143);
        assert_eq!(Security::StartTls.default_port(), 143);
        assert_eq!(Security::Implicit.default_port(), 993);
    }

    #[test]
    fn test_config_new() {
        let config = Config::new("imap.example.com");
        assert_eq!(config.host, "imap.example.com");
        assert_eq!(config.port, 993);
        assert_eq!(config.security, Security::Implicit);
    }

    #[test]
    fn test_config_builder() {
        let config = Config::builder("imap.example.com")
            .port(993)
            .security(Security::Implicit)
            .connect_timeout(Duration::from_secs(10))
            .build();

        assert_eq!(config.host, "imap.example.com");
        assert_eq!(config.port, 993);
        assert_eq!(config.security, Security::Implicit);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_config_builder_default_port() {
        let config = Config::builder("imap.example.com")
            .security(Security::StartTls)
            .build();

        assert_eq!(config.port, 143);
    }

    #[test]
    fn test_connection_config_defaults() {
        let config = ConnectionConfig::builder("imap.example.com", "user", "pass").build();
        assert_eq!(config.port, 993);
        assert!(config.use_tls);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_initial, Duration::from_secs(1));
        assert!(config.retry_exponential_backoff);
        assert_eq!(config.retry_delay_max, Duration::from_secs(30));
        assert_eq!(config.keepalive_interval, Duration::from_secs(300));
        assert_eq!(config.health_check_interval, Duration::from_secs(60));
        assert_eq!(config.pool_max_per_key, 5);
        assert!(config.enable_monitoring);
    }

    #[test]
    fn test_connection_config_backoff_doubles_and_caps() {
        let config = ConnectionConfig::builder("imap.example.com", "user", "pass")
            .retry_delay_initial(Duration::from_secs(1))
            .retry_delay_max(Duration::from_secs(10))
            .build();

        assert_eq!(config.backoff_delay(1), Duration::from_secs(1));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(2));
        assert_eq!(config.backoff_delay(3), Duration::from_secs(4));
        assert_eq!(config.backoff_delay(4), Duration::from_secs(8));
        assert_eq!(config.backoff_delay(5), Duration::from_secs(10));
        assert_eq!(config.backoff_delay(10), Duration::from_secs(10));
    }

    #[test]
    fn test_connection_config_fixed_backoff() {
        let config = ConnectionConfig::builder("imap.example.com", "user", "pass")
            .retry_exponential_backoff(false)
            .retry_delay_initial(Duration::from_secs(2))
            .build();

        assert_eq!(config.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(config.backoff_delay(5), Duration::from_secs(2));
    }

    #[test]
    fn test_connection_config_dial_config() {
        let config = ConnectionConfig::builder("imap.example.com", "user", "pass")
            .port(1993)
            .build();
        let dial = config.dial_config();
        assert_eq!(dial.host, "imap.example.com");
        assert_eq!(dial.port, 1993);
        assert_eq!(dial.security, Security::Implicit);
    }
}
