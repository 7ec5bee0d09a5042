//! Mailbox change monitoring built on IMAP IDLE (RFC 2177).
//!
//! [`IdleMonitor`] owns a selected [`Connection`] and turns the raw
//! untagged-response stream `IDLE` yields into UID-addressed
//! [`MonitorEvent`]s. Sequence numbers in `EXISTS`/`EXPUNGE`/`FETCH`
//! responses are never surfaced directly, since they shift under
//! concurrent expunges in ways a caller watching a mailbox over time
//! cannot safely interpret on its own.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::command::{FetchAttribute, FetchItems, SearchCriteria};
use crate::connection::{Connection, IdleEvent};
use crate::parser::FetchItem;
use crate::types::{Flags, SeqNum, SequenceSet, Uid};
use crate::{Error, Result};

/// RFC 2177 recommends re-issuing `IDLE` at least every 29 minutes; this
/// monitor refreshes a little earlier to leave margin for round-trip time.
const MAX_IDLE_DURATION: Duration = Duration::from_secs(28 * 60);

/// A mailbox change, resolved to a stable UID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// A message was added to the mailbox.
    NewMessage {
        /// UID of the new message.
        uid: Uid,
    },
    /// A message was permanently removed from the mailbox.
    DeletedMessage {
        /// UID of the removed message.
        uid: Uid,
    },
    /// A message's flags changed.
    FlagsChanged {
        /// UID of the message.
        uid: Uid,
        /// The message's current flags.
        flags: Flags,
    },
    /// The monitor could not attribute a change to a specific UID (for
    /// example after an IDLE failure forced a reconnect) and took a fresh
    /// snapshot instead. Callers should treat their view of the mailbox as
    /// stale and re-derive it (e.g. via a fresh search) rather than assume
    /// incremental events cover the gap.
    Resync,
}

/// Cooperative cancellation handle for [`IdleMonitor::next_events`].
///
/// Cloning shares the same underlying flag, so a handle can be moved to
/// another task while the monitor keeps running on its own.
#[derive(Debug, Clone)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    /// Requests that the monitor stop at its next opportunity.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns whether a stop has been requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Watches a selected mailbox for changes via IMAP IDLE.
pub struct IdleMonitor<'a> {
    connection: &'a mut Connection,
    known_uids: HashSet<u32>,
    stop: StopToken,
}

impl<'a> IdleMonitor<'a> {
    /// Selects `mailbox` on `connection` and takes an initial UID snapshot
    /// to diff future changes against.
    ///
    /// # Errors
    ///
    /// Returns an error if the `SELECT` or initial `UID SEARCH ALL` fails.
    pub async fn start(connection: &'a mut Connection, mailbox: &str) -> Result<Self> {
        connection
            .select(mailbox)
            .await
            .map_err(|e| e.into_operation(Error::MailboxSelection))?;

        let known_uids = Self::snapshot(connection).await?;

        Ok(Self {
            connection,
            known_uids,
            stop: StopToken(Arc::new(AtomicBool::new(false))),
        })
    }

    /// Returns a cloneable handle that can be used to stop the monitor from
    /// another task.
    #[must_use]
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Enters IDLE, waits for one server event, and returns the
    /// [`MonitorEvent`]s it implies.
    ///
    /// Re-enters IDLE automatically after `idle_timeout` (capped at 28
    /// minutes) with no event; callers should loop on this method. Returns
    /// an empty vec (without re-entering IDLE) once [`StopToken::stop`] has
    /// been called.
    ///
    /// If the IDLE handshake or the wait itself fails (connection drop,
    /// protocol error), the monitor reconnects, re-selects the mailbox, and
    /// takes a fresh snapshot, returning `[MonitorEvent::Resync]` rather
    /// than attempting to reconstruct what was missed.
    ///
    /// # Errors
    ///
    /// Returns an error if reconnection itself fails.
    pub async fn next_events(&mut self, idle_timeout: Duration) -> Result<Vec<MonitorEvent>> {
        if self.stop.is_stopped() {
            return Ok(Vec::new());
        }

        let wait = idle_timeout.min(MAX_IDLE_DURATION);

        let event = match self.connection.enter_idle().await {
            Ok(mut handle) => {
                let result = handle.wait(wait).await;
                if let Err(e) = handle.done().await {
                    tracing::warn!(?e, "DONE failed after IDLE wait");
                    return self.resync().await;
                }
                match result {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(?e, "IDLE wait failed");
                        return self.resync().await;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(?e, "failed to enter IDLE");
                return self.resync().await;
            }
        };

        match event {
            IdleEvent::Exists(_) | IdleEvent::Recent(_) | IdleEvent::Expunge(_) => {
                self.reconcile().await
            }
            IdleEvent::Fetch { seq, flags } => Ok(vec![self.resolve_flags_changed(seq, flags).await?]),
            IdleEvent::Timeout => Ok(Vec::new()),
        }
    }

    /// Reconnects, re-derives the selected mailbox, and takes a fresh
    /// snapshot, returning a single [`MonitorEvent::Resync`].
    async fn resync(&mut self) -> Result<Vec<MonitorEvent>> {
        self.connection.reconnect().await?;
        self.known_uids = Self::snapshot(self.connection).await?;
        Ok(vec![MonitorEvent::Resync])
    }

    /// Diffs a fresh `UID SEARCH ALL` against `known_uids`, emitting sorted
    /// `NewMessage`/`DeletedMessage` events and updating the snapshot.
    async fn reconcile(&mut self) -> Result<Vec<MonitorEvent>> {
        let current = Self::snapshot(self.connection).await?;

        let mut new_uids: Vec<u32> = current.difference(&self.known_uids).copied().collect();
        new_uids.sort_unstable();
        let mut removed_uids: Vec<u32> = self.known_uids.difference(&current).copied().collect();
        removed_uids.sort_unstable();

        let mut events = Vec::with_capacity(new_uids.len() + removed_uids.len());
        events.extend(
            removed_uids
                .into_iter()
                .filter_map(Uid::new)
                .map(|uid| MonitorEvent::DeletedMessage { uid }),
        );
        events.extend(
            new_uids
                .into_iter()
                .filter_map(Uid::new)
                .map(|uid| MonitorEvent::NewMessage { uid }),
        );

        self.known_uids = current;
        Ok(events)
    }

    /// Resolves a sequence-number `FETCH` event to a UID via a one-message
    /// `FETCH ... (UID)`, falling back to [`MonitorEvent::Resync`] if the
    /// sequence number no longer maps to anything (e.g. it was expunged
    /// between the event and this lookup).
    async fn resolve_flags_changed(&mut self, seq: SeqNum, flags: Flags) -> Result<MonitorEvent> {
        let Some(sequence) = SequenceSet::single(seq.get()) else {
            return Ok(MonitorEvent::Resync);
        };

        let rows = self
            .connection
            .fetch(&sequence, FetchItems::Items(vec![FetchAttribute::Uid]))
            .await
            .map_err(|e| e.into_operation(Error::Fetch))?;

        let uid = rows.into_iter().find_map(|(_, items)| {
            items.into_iter().find_map(|item| match item {
                FetchItem::Uid(uid) => Some(uid),
                _ => None,
            })
        });

        Ok(match uid {
            Some(uid) => MonitorEvent::FlagsChanged { uid, flags },
            None => MonitorEvent::Resync,
        })
    }

    /// Issues `UID SEARCH ALL` and returns the resulting UIDs as a set.
    async fn snapshot(connection: &mut Connection) -> Result<HashSet<u32>> {
        let uids = connection
            .uid_search(&SearchCriteria::All)
            .await
            .map_err(|e| e.into_operation(Error::Search))?;
        Ok(uids.into_iter().map(Uid::get).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn stop_token_reflects_stop_across_clones() {
        let token = StopToken(Arc::new(AtomicBool::new(false)));
        let other = token.clone();
        assert!(!token.is_stopped());
        other.stop();
        assert!(token.is_stopped());
    }

    #[test]
    fn max_idle_duration_is_capped_at_28_minutes() {
        assert_eq!(MAX_IDLE_DURATION, Duration::from_secs(28 * 60));
    }
}
