//! Managed IMAP connection with automatic reconnection and metrics.
//!
//! This module provides [`Connection`], a wrapper around the type-state
//! [`Client`] that hides state transitions behind a simple API, retries
//! dropped connections with exponential backoff, and records
//! [`ConnectionMetrics`] along the way.
//!
//! ## Design
//!
//! `Connection` owns its `Client` behind an internal enum so that callers
//! never have to juggle type-state generics themselves; methods that need a
//! particular state reconnect/reselect transparently when `auto_reconnect`
//! is enabled.
//!
//! ## Example
//!
//! ```ignore
//! use imap_client::connection::{Connection, ConnectionConfig};
//!
//! let config = ConnectionConfig::builder("imap.example.com", "user@example.com", "password").build();
//! let mut conn = Connection::connect(config).await?;
//!
//! let folders = conn.list_folders().await?;
//! conn.select("INBOX").await?;
//! conn.health_check().await?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use super::client::{Authenticated, Client, NotAuthenticated, Selected};
use super::config::ConnectionConfig;
use super::metrics::ConnectionMetrics;
use super::{ImapStream, connect_plain, connect_tls};
use crate::command::{FetchItems, SearchCriteria, StoreAction};
use crate::command::serialize::write_search_criteria;
use crate::parser::FetchItem;
use crate::time::{Clock, SystemClock};
use crate::types::{Flag, ListResponse, MailboxStatus, SeqNum, SequenceSet, Uid, UidSet};
use crate::{Error, Result};

/// Current state of the connection.
enum ConnectionState {
    /// Not connected.
    Disconnected,
    /// Connected but not authenticated.
    Connected(Client<ImapStream, NotAuthenticated>),
    /// Authenticated.
    Authenticated(Client<ImapStream, Authenticated>),
    /// Mailbox selected.
    Selected(Client<ImapStream, Selected>),
}

/// Point-in-time health snapshot returned by [`Connection::health_check`].
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether the connection is currently connected (any state but disconnected).
    pub is_connected: bool,
    /// Capabilities advertised by the server in the current state.
    pub server_capabilities: Vec<crate::types::Capability>,
    /// Running average command response time, in milliseconds.
    pub average_response_time_ms: u64,
    /// Fraction of commands that completed without error, in `[0.0, 1.0]`.
    pub success_rate: f64,
    /// How long it has been since the connection last did anything, if it
    /// has ever recorded activity.
    pub idle_since_last_activity: Option<std::time::Duration>,
}

/// Managed IMAP connection with auto-reconnect, retry, and metrics.
///
/// Provides a simpler API than the raw [`Client`] type by managing state
/// transitions internally and transparently retrying on connection loss
/// using [`ConnectionConfig`]'s exponential backoff policy.
pub struct Connection {
    config: ConnectionConfig,
    state: ConnectionState,
    /// Last selected mailbox (for reconnection).
    last_mailbox: Option<String>,
    metrics: Arc<ConnectionMetrics>,
    clock: Box<dyn Clock>,
}

impl Connection {
    /// Creates a new connection and connects to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if connection or authentication fails after
    /// `config.max_retries` attempts.
    pub async fn connect(config: ConnectionConfig) -> Result<Self> {
        Self::connect_with_clock(config, Box::new(SystemClock)).await
    }

    /// Like [`Self::connect`] but with an injectable clock, for deterministic
    /// tests of the backoff schedule.
    pub async fn connect_with_clock(config: ConnectionConfig, clock: Box<dyn Clock>) -> Result<Self> {
        let metrics = Arc::new(ConnectionMetrics::new());
        let mut connection = Self {
            config,
            state: ConnectionState::Disconnected,
            last_mailbox: None,
            metrics,
            clock,
        };

        connection.do_reconnect_no_select().await?;
        Ok(connection)
    }

    /// Returns the metrics handle for this connection.
    ///
    /// The handle is shared (`Arc`) so it can be cloned out and read from a
    /// separate monitoring task.
    #[must_use]
    pub fn metrics(&self) -> Arc<ConnectionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Returns true if the connection is connected (any state but disconnected).
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        !matches!(self.state, ConnectionState::Disconnected)
    }

    /// Returns true if authenticated.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(
            self.state,
            ConnectionState::Authenticated(_) | ConnectionState::Selected(_)
        )
    }

    /// Returns the currently selected mailbox, if any.
    #[must_use]
    pub fn selected_mailbox(&self) -> Option<&str> {
        match &self.state {
            ConnectionState::Selected(client) => Some(client.mailbox()),
            _ => None,
        }
    }

    /// Sends a NOOP on the live connection to verify it is still alive and
    /// returns a snapshot of its health.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is down or the server does not
    /// respond with OK. Callers typically use a retriable error here
    /// ([`Error::is_retriable`]) as a signal to evict the connection from a
    /// pool.
    pub async fn health_check(&mut self) -> Result<HealthStatus> {
        let started = self.clock.now();
        let result = match &mut self.state {
            ConnectionState::Authenticated(client) => client.noop().await,
            ConnectionState::Selected(client) => client.noop().await,
            ConnectionState::Connected(client) => client.noop().await,
            ConnectionState::Disconnected => Err(Error::ConnectionLost("not connected".into())),
        };
        if self.config.enable_monitoring {
            self.metrics
                .record_command(self.clock.as_ref(), started, result.is_err());
        }
        result?;

        Ok(HealthStatus {
            is_connected: self.is_connected(),
            server_capabilities: self.capabilities().to_vec(),
            average_response_time_ms: u64::try_from(self.metrics.average_response_time().as_millis())
                .unwrap_or(u64::MAX),
            success_rate: self.metrics.success_rate(),
            idle_since_last_activity: self.metrics.idle_for(self.clock.as_ref()),
        })
    }

    /// Returns the server capability set advertised for the current state.
    #[must_use]
    pub fn capabilities(&self) -> &[crate::types::Capability] {
        match &self.state {
            ConnectionState::Selected(client) => client.capabilities(),
            ConnectionState::Authenticated(client) => client.capabilities(),
            ConnectionState::Connected(client) => client.capabilities(),
            ConnectionState::Disconnected => &[],
        }
    }

    /// Lists all folders.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn list_folders(&mut self) -> Result<Vec<ListResponse>> {
        self.execute_authenticated(async |client| client.list("", "*").await)
            .await
    }

    /// Selects a mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox cannot be selected.
    pub async fn select(&mut self, mailbox: &str) -> Result<MailboxStatus> {
        match &self.state {
            ConnectionState::Authenticated(_) | ConnectionState::Selected(_) => {}
            ConnectionState::Disconnected if self.config.max_retries > 0 => {
                self.do_reconnect_no_select().await?;
            }
            _ => return Err(Error::InvalidState("not authenticated".into())),
        }

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let started = self.clock.now();
            let result = self.try_select(mailbox).await;
            if self.config.enable_monitoring {
                self.metrics
                    .record_command(self.clock.as_ref(), started, result.is_err());
            }

            match result {
                Ok(status) => return Ok(status),
                Err(e) if e.is_retriable() && attempt <= self.config.max_retries => {
                    tracing::warn!(?e, attempt, mailbox, "select failed, reconnecting to retry");
                    self.do_reconnect_no_select().await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One attempt at `SELECT <mailbox>` against the current client, closing
    /// a previously selected mailbox first. Used by [`Self::select`]'s retry
    /// loop; a failure here leaves `state` `Disconnected` so the next attempt
    /// (after a reconnect) starts from a clean `Authenticated` client.
    async fn try_select(&mut self, mailbox: &str) -> Result<MailboxStatus> {
        let client = match std::mem::replace(&mut self.state, ConnectionState::Disconnected) {
            ConnectionState::Authenticated(c) => c,
            ConnectionState::Selected(c) => c.close().await?,
            _ => return Err(Error::InvalidState("not authenticated".into())),
        };

        let (selected, status) = client.select(mailbox).await?;
        self.state = ConnectionState::Selected(selected);
        self.last_mailbox = Some(mailbox.to_string());

        Ok(status)
    }

    /// Fetches messages by sequence numbers.
    ///
    /// # Errors
    ///
    /// Returns an error if not in selected state or fetch fails.
    pub async fn fetch(
        &mut self,
        sequence: &SequenceSet,
        items: FetchItems,
    ) -> Result<Vec<(SeqNum, Vec<FetchItem>)>> {
        self.execute_selected(async |client| client.fetch(sequence, items.clone()).await)
            .await
    }

    /// Fetches messages by UIDs.
    ///
    /// # Errors
    ///
    /// Returns an error if not in selected state or fetch fails.
    pub async fn uid_fetch(
        &mut self,
        uids: &UidSet,
        items: FetchItems,
    ) -> Result<Vec<(SeqNum, Vec<FetchItem>)>> {
        self.execute_selected(async |client| client.uid_fetch(uids, items.clone()).await)
            .await
    }

    /// Stores flags on messages.
    ///
    /// # Errors
    ///
    /// Returns an error if not in selected state or store fails.
    pub async fn store(
        &mut self,
        sequence: &SequenceSet,
        action: StoreAction,
    ) -> Result<Vec<(SeqNum, Vec<FetchItem>)>> {
        self.execute_selected(async |client| client.store(sequence, action.clone()).await)
            .await
    }

    /// Modifies message flags by UID.
    ///
    /// # Errors
    ///
    /// Returns an error if not in selected state or store fails.
    pub async fn uid_store(
        &mut self,
        uids: &UidSet,
        action: StoreAction,
    ) -> Result<Vec<(SeqNum, Vec<FetchItem>)>> {
        self.execute_selected(async |client| client.uid_store(uids, action.clone()).await)
            .await
    }

    /// Copies messages to another mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if not in selected state or copy fails.
    pub async fn copy(&mut self, sequence: &SequenceSet, mailbox: &str) -> Result<()> {
        self.execute_selected(async |client| client.copy(sequence, mailbox).await)
            .await
    }

    /// Copies messages to another mailbox by UID.
    ///
    /// # Errors
    ///
    /// Returns an error if not in selected state or copy fails.
    pub async fn uid_copy(&mut self, uids: &UidSet, mailbox: &str) -> Result<()> {
        self.execute_selected(async |client| client.uid_copy(uids, mailbox).await)
            .await
    }

    /// Moves messages to another mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if not in selected state or move fails.
    pub async fn r#move(&mut self, sequence: &SequenceSet, mailbox: &str) -> Result<()> {
        self.execute_selected(async |client| client.r#move(sequence, mailbox).await)
            .await
    }

    /// Moves messages to another mailbox by UID.
    ///
    /// Requires the server to advertise the MOVE capability (RFC 6851);
    /// callers without it should fall back to copy + store(\Deleted) +
    /// expunge, which is what [`crate::mailbox_service::MailboxService`]
    /// does automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if not in selected state or move fails.
    pub async fn uid_move(&mut self, uids: &UidSet, mailbox: &str) -> Result<()> {
        self.execute_selected(async |client| client.uid_move(uids, mailbox).await)
            .await
    }

    /// Enters IDLE mode on the current connection.
    ///
    /// `pub(crate)` because [`ConnectionState`] (and its `Selected` variant)
    /// is private to this module; [`crate::idle_monitor::IdleMonitor`] needs
    /// this narrow door through to the raw IDLE handshake without exposing
    /// the state enum itself.
    ///
    /// # Errors
    ///
    /// Returns an error if not in selected state or the server rejects IDLE.
    pub(crate) async fn enter_idle(&mut self) -> Result<super::idle::IdleHandle<'_, ImapStream>> {
        self.ensure_selected().await?;

        match &mut self.state {
            ConnectionState::Selected(client) => client.idle().await,
            _ => Err(Error::InvalidState("not in selected state".into())),
        }
    }

    /// Returns true if the server advertises the MOVE capability.
    #[must_use]
    pub fn supports_move(&self) -> bool {
        match &self.state {
            ConnectionState::Selected(client) => client.supports_move(),
            ConnectionState::Authenticated(client) => client.supports_move(),
            ConnectionState::Connected(client) => client.supports_move(),
            ConnectionState::Disconnected => false,
        }
    }

    /// Searches for messages matching `criteria`, returning matching UIDs.
    ///
    /// # Errors
    ///
    /// Returns an error if not in selected state or the search fails.
    pub async fn uid_search(&mut self, criteria: &SearchCriteria) -> Result<Vec<Uid>> {
        let mut buf = Vec::new();
        write_search_criteria(&mut buf, criteria);
        let rendered = String::from_utf8_lossy(&buf).into_owned();

        self.execute_selected(async |client| client.uid_search(&rendered).await)
            .await
    }

    /// Appends a message to `mailbox`.
    ///
    /// Returns the assigned `(UIDVALIDITY, UID)` when the server advertises
    /// UIDPLUS and signals it via `APPENDUID`.
    ///
    /// # Errors
    ///
    /// Returns an error if not authenticated or the append fails.
    pub async fn append(
        &mut self,
        mailbox: &str,
        flags: Option<Vec<Flag>>,
        message: &[u8],
    ) -> Result<Option<(crate::types::UidValidity, Uid)>> {
        if matches!(self.state, ConnectionState::Selected(_)) {
            return Err(Error::InvalidState(
                "append requires authenticated (not selected) state".into(),
            ));
        }

        self.execute_authenticated(async |client| {
            client.append(mailbox, flags.clone(), message).await
        })
        .await
    }

    /// Gets the status of a mailbox without affecting the currently selected
    /// mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if not authenticated or the command fails.
    pub async fn status(
        &mut self,
        mailbox: &str,
        items: Vec<crate::command::StatusAttribute>,
    ) -> Result<Vec<crate::parser::StatusItem>> {
        self.execute_any(
            async |client| client.status(mailbox, items.clone()).await,
            async |client| client.status(mailbox, items.clone()).await,
        )
        .await
    }

    /// Lists mailboxes matching `reference`/`pattern`.
    ///
    /// # Errors
    ///
    /// Returns an error if not authenticated or the command fails.
    pub async fn list(&mut self, reference: &str, pattern: &str) -> Result<Vec<ListResponse>> {
        self.execute_any(
            async |client| client.list(reference, pattern).await,
            async |client| client.list(reference, pattern).await,
        )
        .await
    }

    /// Creates a mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if not authenticated or the command fails.
    pub async fn create(&mut self, mailbox: &str) -> Result<()> {
        self.execute_any(
            async |client| client.create(mailbox).await,
            async |client| client.create(mailbox).await,
        )
        .await
    }

    /// Deletes a mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if not authenticated or the command fails.
    pub async fn delete(&mut self, mailbox: &str) -> Result<()> {
        self.execute_any(
            async |client| client.delete(mailbox).await,
            async |client| client.delete(mailbox).await,
        )
        .await
    }

    /// Renames a mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if not authenticated or the command fails.
    pub async fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        self.execute_any(
            async |client| client.rename(from, to).await,
            async |client| client.rename(from, to).await,
        )
        .await
    }

    /// Permanently removes `\Deleted` messages in `uids` by UID (RFC 4315
    /// `UID EXPUNGE`).
    ///
    /// # Errors
    ///
    /// Returns an error if not in selected state or expunge fails.
    pub async fn uid_expunge(&mut self, uids: &UidSet) -> Result<Vec<SeqNum>> {
        self.execute_selected(async |client| client.uid_expunge(uids).await)
            .await
    }

    /// Expunges deleted messages.
    ///
    /// # Errors
    ///
    /// Returns an error if not in selected state or expunge fails.
    pub async fn expunge(&mut self) -> Result<Vec<SeqNum>> {
        self.execute_selected(async |client| client.expunge().await)
            .await
    }

    /// Closes the current mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if not in selected state.
    pub async fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, ConnectionState::Disconnected) {
            ConnectionState::Selected(client) => {
                let authenticated = client.close().await?;
                self.state = ConnectionState::Authenticated(authenticated);
                self.last_mailbox = None;
                Ok(())
            }
            other => {
                self.state = other;
                Ok(())
            }
        }
    }

    /// Disconnects from the server.
    ///
    /// # Errors
    ///
    /// Returns an error if logout fails.
    pub async fn disconnect(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, ConnectionState::Disconnected) {
            ConnectionState::Selected(client) => {
                client.logout().await?;
            }
            ConnectionState::Authenticated(client) => {
                client.logout().await?;
            }
            ConnectionState::Connected(client) => {
                client.logout().await?;
            }
            ConnectionState::Disconnected => {}
        }
        self.last_mailbox = None;
        Ok(())
    }

    /// Attempts to reconnect to the server, restoring mailbox selection.
    ///
    /// # Errors
    ///
    /// Returns an error if reconnection fails after all configured attempts.
    pub async fn reconnect(&mut self) -> Result<()> {
        self.state = ConnectionState::Disconnected;
        let last_mailbox = self.last_mailbox.take();

        self.do_reconnect_no_select().await?;

        if let Some(mailbox) = last_mailbox {
            self.last_mailbox = Some(mailbox.clone());
            if let ConnectionState::Authenticated(client) =
                std::mem::replace(&mut self.state, ConnectionState::Disconnected)
            {
                match client.select(&mailbox).await {
                    Ok((selected, _status)) => {
                        self.state = ConnectionState::Selected(selected);
                    }
                    Err(e) => {
                        tracing::warn!(?e, mailbox, "failed to reselect mailbox after reconnect");
                        self.do_reconnect_no_select().await?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Reconnects without trying to restore mailbox selection (to avoid recursion).
    async fn do_reconnect_no_select(&mut self) -> Result<()> {
        for attempt in 1..=self.config.max_retries.max(1) {
            tracing::info!(attempt, "attempting to (re)connect");

            if self.config.enable_monitoring {
                self.metrics.record_connect_attempt();
            }

            if let Err(e) = self.do_connect().await {
                tracing::warn!(?e, "connection attempt failed");
                if self.config.enable_monitoring {
                    self.metrics.record_connect_failure();
                }
                if attempt == self.config.max_retries.max(1) {
                    return Err(e);
                }
                tokio::time::sleep(self.config.backoff_delay(attempt)).await;
                continue;
            }

            if let Err(e) = self.do_authenticate().await {
                tracing::warn!(?e, "authentication failed");
                if self.config.enable_monitoring {
                    self.metrics.record_connect_failure();
                }
                return Err(e);
            }

            if self.config.enable_monitoring {
                self.metrics.record_connect_success();
                self.metrics.touch(self.clock.as_ref());
            }

            return Ok(());
        }

        Err(Error::ConnectionLost(
            "max reconnection attempts exceeded".into(),
        ))
    }

    /// Runs a single-shot operation against the current `Selected` client,
    /// reconnecting (fresh TLS + LOGIN + reselect) and retrying up to
    /// `max_retries` times when the error is retriable
    /// ([`Error::is_retriable`]), and recording command metrics — including
    /// failed attempts — around every try. This is the retry wrapper every
    /// mailbox-scoped operation (`fetch`, `store`, `copy`, `move`, `search`,
    /// `expunge`, ...) routes through per the retry policy.
    async fn execute_selected<T>(
        &mut self,
        mut op: impl AsyncFnMut(&mut Client<ImapStream, Selected>) -> Result<T>,
    ) -> Result<T> {
        self.ensure_selected().await?;

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let started = self.clock.now();
            let result = match &mut self.state {
                ConnectionState::Selected(client) => op(client).await,
                _ => Err(Error::InvalidState("not in selected state".into())),
            };
            if self.config.enable_monitoring {
                self.metrics
                    .record_command(self.clock.as_ref(), started, result.is_err());
            }

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retriable() && attempt <= self.config.max_retries => {
                    tracing::warn!(?e, attempt, "operation failed, reconnecting to retry");
                    self.reconnect().await?;
                    self.ensure_selected().await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Like [`Self::execute_selected`] but for operations valid once
    /// authenticated, without requiring a mailbox to be selected
    /// (`list_folders`, `append`).
    async fn execute_authenticated<T>(
        &mut self,
        mut op: impl AsyncFnMut(&mut Client<ImapStream, Authenticated>) -> Result<T>,
    ) -> Result<T> {
        self.ensure_authenticated().await?;

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let started = self.clock.now();
            let result = match &mut self.state {
                ConnectionState::Authenticated(client) => op(client).await,
                _ => Err(Error::InvalidState("not authenticated".into())),
            };
            if self.config.enable_monitoring {
                self.metrics
                    .record_command(self.clock.as_ref(), started, result.is_err());
            }

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retriable() && attempt <= self.config.max_retries => {
                    tracing::warn!(?e, attempt, "operation failed, reconnecting to retry");
                    self.reconnect().await?;
                    self.ensure_authenticated().await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Like [`Self::execute_authenticated`] but for operations valid in
    /// either the `Authenticated` or `Selected` state (`STATUS`, `LIST`,
    /// `CREATE`, `DELETE`, `RENAME`): whichever state the connection is
    /// actually in (before and, after a retry, after reconnecting) decides
    /// which closure runs.
    async fn execute_any<T>(
        &mut self,
        mut on_authenticated: impl AsyncFnMut(&mut Client<ImapStream, Authenticated>) -> Result<T>,
        mut on_selected: impl AsyncFnMut(&mut Client<ImapStream, Selected>) -> Result<T>,
    ) -> Result<T> {
        self.ensure_authenticated().await?;

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let started = self.clock.now();
            let result = match &mut self.state {
                ConnectionState::Authenticated(client) => on_authenticated(client).await,
                ConnectionState::Selected(client) => on_selected(client).await,
                _ => Err(Error::InvalidState("not authenticated".into())),
            };
            if self.config.enable_monitoring {
                self.metrics
                    .record_command(self.clock.as_ref(), started, result.is_err());
            }

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retriable() && attempt <= self.config.max_retries => {
                    tracing::warn!(?e, attempt, "operation failed, reconnecting to retry");
                    self.reconnect().await?;
                    self.ensure_authenticated().await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    // === Private helpers ===

    async fn do_connect(&mut self) -> Result<()> {
        let dial = self.config.dial_config();
        let stream = if self.config.use_tls {
            connect_tls(&dial.host, dial.port).await?
        } else {
            connect_plain(&dial.host, dial.port).await?
        };
        let client = Client::from_stream(stream).await?;
        self.state = ConnectionState::Connected(client);
        Ok(())
    }

    async fn do_authenticate(&mut self) -> Result<()> {
        let ConnectionState::Connected(client) =
            std::mem::replace(&mut self.state, ConnectionState::Disconnected)
        else {
            return Err(Error::InvalidState("not connected".into()));
        };

        let authenticated = client
            .login(&self.config.username, &self.config.password)
            .await?;
        self.state = ConnectionState::Authenticated(authenticated);
        Ok(())
    }

    async fn ensure_authenticated(&mut self) -> Result<()> {
        match &self.state {
            ConnectionState::Authenticated(_) | ConnectionState::Selected(_) => Ok(()),
            ConnectionState::Disconnected => self.do_reconnect_no_select().await,
            _ => Err(Error::InvalidState("not authenticated".into())),
        }
    }

    async fn ensure_selected(&mut self) -> Result<()> {
        match &self.state {
            ConnectionState::Selected(_) => Ok(()),
            ConnectionState::Authenticated(_) => {
                if let Some(mailbox) = self.last_mailbox.clone() {
                    if let ConnectionState::Authenticated(client) =
                        std::mem::replace(&mut self.state, ConnectionState::Disconnected)
                    {
                        let (selected, _) = client.select(&mailbox).await?;
                        self.state = ConnectionState::Selected(selected);
                    }
                    Ok(())
                } else {
                    Err(Error::InvalidState("no mailbox selected".into()))
                }
            }
            ConnectionState::Disconnected => {
                self.reconnect().await?;
                if matches!(self.state, ConnectionState::Selected(_)) {
                    Ok(())
                } else {
                    Err(Error::InvalidState("no mailbox selected".into()))
                }
            }
            ConnectionState::Connected(_) => Err(Error::InvalidState("not authenticated".into())),
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.config.host)
            .field("connected", &self.is_connected())
            .field("authenticated", &self.is_authenticated())
            .field("selected_mailbox", &self.selected_mailbox())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_backoff_is_used_between_retries() {
        let config = ConnectionConfig::builder("imap.example.com", "user", "pass")
            .max_retries(4)
            .retry_delay_initial(Duration::from_millis(10))
            .retry_delay_max(Duration::from_millis(80))
            .build();

        assert_eq!(config.backoff_delay(1), Duration::from_millis(10));
        assert_eq!(config.backoff_delay(2), Duration::from_millis(20));
        assert_eq!(config.backoff_delay(3), Duration::from_millis(40));
        assert_eq!(config.backoff_delay(4), Duration::from_millis(80));
    }
}
