//! UID-centric mailbox operations: search, fetch, store, copy, move, append.
//!
//! [`MailboxService`] is a thin, non-owning wrapper over a selected
//! [`Connection`], matching [`crate::folder_service::FolderService`]'s shape:
//! it holds the connection exclusively for the duration of each call and
//! translates bare `NO`/`BAD` diagnostics into the typed errors callers
//! actually want to match on. Unlike the sequence-number operations still
//! exposed directly on [`crate::connection::Client`], every operation here is
//! UID-based — sequence numbers shift under concurrent expunges and this is
//! the service meant to be safe to hold across suspension points.

use crate::command::{FetchAttribute, FetchItems, SearchCriteria, StatusAttribute, StoreAction};
use crate::connection::Connection;
use crate::email::EmailSnapshot;
use crate::parser::StatusItem;
use crate::types::{Capability, Flag, Mailbox, MailboxStatus, MessageSet, Uid, UidValidity};
use crate::{Error, Result};

/// How [`MailboxService::uid_store`] combines the given flags with a
/// message's existing flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// `+FLAGS`: add the given flags, leaving others untouched.
    Add,
    /// `-FLAGS`: remove the given flags, leaving others untouched.
    Remove,
    /// `FLAGS`: replace the message's entire flag set with the given flags.
    Replace,
}

/// Result of [`MailboxService::process_messages_in_batches`].
///
/// A handler failure on one message never aborts the batch; every message is
/// still attempted and accounted for here.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Number of messages the handler processed without error.
    pub successful_messages: usize,
    /// Number of messages the handler rejected.
    pub failed_messages: usize,
    /// Per-UID errors, in the order encountered.
    pub errors: Vec<(Uid, Error)>,
}

/// UID-based mailbox operations for a [`Connection`].
///
/// Every method here requires (and will transparently (re)select, via
/// `Connection`) a selected mailbox.
pub struct MailboxService<'a> {
    connection: &'a mut Connection,
}

impl<'a> MailboxService<'a> {
    /// Wraps `connection` for UID-based mailbox operations.
    pub fn new(connection: &'a mut Connection) -> Self {
        Self { connection }
    }

    /// Selects a mailbox, recording its `UIDVALIDITY`/`UIDNEXT`/`EXISTS`/
    /// `RECENT`/`FLAGS`/`PERMANENTFLAGS`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MailboxSelection`] if the server rejects the `SELECT`.
    pub async fn select(&mut self, mailbox: &str) -> Result<MailboxStatus> {
        self.connection
            .select(mailbox)
            .await
            .map_err(|e| e.into_operation(Error::MailboxSelection))
    }

    /// Issues `STATUS` for `mailbox` without affecting the currently
    /// selected mailbox.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Status`] if the server rejects the command.
    pub async fn status(
        &mut self,
        mailbox: &str,
        items: Vec<StatusAttribute>,
    ) -> Result<Vec<StatusItem>> {
        self.connection
            .status(mailbox, items)
            .await
            .map_err(|e| e.into_operation(Error::Status))
    }

    /// Issues `UID SEARCH` and returns the matching UIDs as a `MessageSet`
    /// bound to the currently selected mailbox.
    ///
    /// Returns an empty (but valid) set, never an error, when nothing
    /// matches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Search`] if the server rejects the command, or
    /// [`Error::InvalidState`] if no mailbox is selected.
    pub async fn uid_search(&mut self, criteria: &SearchCriteria) -> Result<MessageSet> {
        let uids = self
            .connection
            .uid_search(criteria)
            .await
            .map_err(|e| e.into_operation(Error::Search))?;
        let mailbox = self
            .connection
            .selected_mailbox()
            .map(Mailbox::new)
            .ok_or_else(|| Error::InvalidState("no mailbox selected".to_string()))?;

        if uids.is_empty() {
            return Ok(MessageSet::empty(true, Some(mailbox)));
        }
        let ids: Vec<u32> = uids.into_iter().map(Uid::get).collect();
        MessageSet::from_search_result(&ids, mailbox)
    }

    /// Convenience wrapper around [`Self::uid_search`]; exists so callers
    /// porting a search-then-operate pattern have a name that matches their
    /// intent, not because the behavior differs.
    ///
    /// # Errors
    ///
    /// See [`Self::uid_search`].
    pub async fn create_message_set_from_search(
        &mut self,
        criteria: &SearchCriteria,
    ) -> Result<MessageSet> {
        self.uid_search(criteria).await
    }

    /// Issues `UID FETCH <set> (<parts>)`, assembling each response line
    /// into an [`EmailSnapshot`].
    ///
    /// `UID` is always added to `parts` even if the caller didn't ask for
    /// it, since every snapshot this method returns is later identified by
    /// UID. `PEEK` body-section variants never set `\Seen`.
    ///
    /// Results are sorted by UID ascending unless `preserve_server_order` is
    /// set, since the order untagged `FETCH` responses arrive in is not
    /// guaranteed to follow the requested set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `set` holds sequence numbers
    /// rather than UIDs, or [`Error::Fetch`] if the server rejects the
    /// command.
    pub async fn uid_fetch(
        &mut self,
        set: &MessageSet,
        parts: FetchItems,
        preserve_server_order: bool,
    ) -> Result<Vec<EmailSnapshot>> {
        Self::require_uid_set(set)?;
        if set.is_empty() {
            return Ok(Vec::new());
        }

        let attrs = Self::items_with_uid(parts);
        let uid_set = set.to_uid_set();
        let rows = self
            .connection
            .uid_fetch(&uid_set, FetchItems::Items(attrs))
            .await
            .map_err(|e| e.into_operation(Error::Fetch))?;

        let mut snapshots: Vec<EmailSnapshot> = rows
            .into_iter()
            .map(|(seq, items)| EmailSnapshot::assemble(seq, items))
            .collect();

        if !preserve_server_order {
            snapshots.sort_by_key(|snapshot| snapshot.uid);
        }

        Ok(snapshots)
    }

    /// Issues `UID STORE <set> (+|-|)FLAGS (<flags>)` per `mode`, returning
    /// the resulting flag set per message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `set` holds sequence numbers
    /// rather than UIDs, or [`Error::Store`] if the server rejects the
    /// command.
    pub async fn uid_store(
        &mut self,
        set: &MessageSet,
        flags: Vec<Flag>,
        mode: StoreMode,
    ) -> Result<Vec<EmailSnapshot>> {
        Self::require_uid_set(set)?;
        if set.is_empty() {
            return Ok(Vec::new());
        }

        let action = match mode {
            StoreMode::Add => StoreAction::AddFlags(flags),
            StoreMode::Remove => StoreAction::RemoveFlags(flags),
            StoreMode::Replace => StoreAction::SetFlags(flags),
        };

        let uid_set = set.to_uid_set();
        let rows = self
            .connection
            .uid_store(&uid_set, action)
            .await
            .map_err(|e| e.into_operation(Error::Store))?;

        Ok(rows
            .into_iter()
            .map(|(seq, items)| EmailSnapshot::assemble(seq, items))
            .collect())
    }

    /// Copies `set` to `target` via `UID COPY`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `set` holds sequence numbers
    /// rather than UIDs, or [`Error::Copy`] if the server rejects the
    /// command.
    pub async fn uid_copy(&mut self, set: &MessageSet, target: &str) -> Result<()> {
        Self::require_uid_set(set)?;
        if set.is_empty() {
            return Ok(());
        }
        let uid_set = set.to_uid_set();
        self.connection
            .uid_copy(&uid_set, target)
            .await
            .map_err(|e| e.into_operation(Error::Copy))
    }

    /// Moves `set` to `target`.
    ///
    /// Uses `UID MOVE` when the server advertises the extension (RFC 6851);
    /// otherwise emulates it with `UID COPY` + `UID STORE +FLAGS (\Deleted)`
    /// + [`Self::uid_expunge`].
    ///
    /// Atomicity is best-effort: if the `COPY` step fails, nothing was
    /// moved and the error surfaces directly as [`Error::Copy`]. If the
    /// `STORE` or expunge step fails after a successful `COPY`, the messages
    /// now exist in both mailboxes; this surfaces as
    /// [`Error::PartialOperation`] naming every UID in `set` as
    /// copied-but-not-removed, leaving reconciliation to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `set` holds sequence numbers
    /// rather than UIDs, [`Error::Copy`] if the copy step fails outright, or
    /// [`Error::PartialOperation`] if copy succeeded but cleanup did not.
    pub async fn uid_move(&mut self, set: &MessageSet, target: &str) -> Result<()> {
        Self::require_uid_set(set)?;
        if set.is_empty() {
            return Ok(());
        }
        let uid_set = set.to_uid_set();

        if self.connection.supports_move() {
            return self
                .connection
                .uid_move(&uid_set, target)
                .await
                .map_err(|e| e.into_operation(Error::Move));
        }

        self.connection
            .uid_copy(&uid_set, target)
            .await
            .map_err(|e| e.into_operation(Error::Copy))?;

        if let Err(e) = self
            .connection
            .uid_store(&uid_set, StoreAction::AddFlags(vec![Flag::Deleted]))
            .await
        {
            return Err(Self::partial_failure(set, e.into_operation(Error::Move)));
        }

        if let Err(e) = self.uid_expunge(set).await {
            return Err(Self::partial_failure(set, e));
        }

        Ok(())
    }

    /// Permanently removes `\Deleted` messages in `set`.
    ///
    /// Issues `UID EXPUNGE <set>` (RFC 4315) when the server advertises
    /// UIDPLUS; otherwise falls back to a plain `EXPUNGE`, which removes
    /// every `\Deleted` message in the mailbox, not just those in `set`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `set` holds sequence numbers
    /// rather than UIDs, or [`Error::Expunge`] if the server rejects the
    /// command.
    pub async fn uid_expunge(&mut self, set: &MessageSet) -> Result<()> {
        Self::require_uid_set(set)?;
        if set.is_empty() {
            return Ok(());
        }

        if self
            .connection
            .capabilities()
            .iter()
            .any(|c| matches!(c, Capability::UidPlus))
        {
            let uid_set = set.to_uid_set();
            self.connection
                .uid_expunge(&uid_set)
                .await
                .map_err(|e| e.into_operation(Error::Expunge))?;
        } else {
            tracing::debug!("server lacks UIDPLUS, falling back to a mailbox-wide EXPUNGE");
            self.connection
                .expunge()
                .await
                .map_err(|e| e.into_operation(Error::Expunge))?;
        }

        Ok(())
    }

    /// Appends `raw_rfc822` to `mailbox` using a synchronizing literal.
    ///
    /// Returns the assigned `(UIDVALIDITY, UID)` when the server advertises
    /// UIDPLUS and signals it via `APPENDUID`.
    ///
    /// `internaldate` is accepted for API symmetry but currently has no
    /// effect: the underlying `APPEND` does not yet serialize an
    /// `INTERNALDATE` override, so the server assigns its own.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Append`] if the server rejects the command.
    pub async fn append(
        &mut self,
        mailbox: &str,
        raw_rfc822: &[u8],
        flags: Option<Vec<Flag>>,
        internaldate: Option<&str>,
    ) -> Result<Option<(UidValidity, Uid)>> {
        if internaldate.is_some() {
            tracing::warn!("APPEND INTERNALDATE override requested but not supported; ignoring");
        }

        self.connection
            .append(mailbox, flags, raw_rfc822)
            .await
            .map_err(|e| e.into_operation(Error::Append))
    }

    /// Splits `set` into batches of at most `batch_size` messages, fetches
    /// each batch, and invokes `handler` once per message.
    ///
    /// A handler failure on one message is recorded and does not prevent
    /// the remaining messages in the batch (or subsequent batches) from
    /// being processed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `set` holds sequence numbers
    /// rather than UIDs, or propagates a `UID FETCH` failure for a batch
    /// (previously processed batches' results are lost in that case, since
    /// there is no partial `FetchOutcome` to return).
    pub async fn process_messages_in_batches<H>(
        &mut self,
        set: &MessageSet,
        parts: FetchItems,
        batch_size: u32,
        mut handler: H,
    ) -> Result<FetchOutcome>
    where
        H: FnMut(&EmailSnapshot) -> Result<()>,
    {
        Self::require_uid_set(set)?;
        let mut outcome = FetchOutcome::default();

        for batch in set.iter_batches(batch_size) {
            let snapshots = self.uid_fetch(&batch, parts.clone(), false).await?;
            for snapshot in &snapshots {
                match handler(snapshot) {
                    Ok(()) => outcome.successful_messages += 1,
                    Err(e) => {
                        outcome.failed_messages += 1;
                        let uid = snapshot
                            .uid
                            .expect("uid_fetch always requests UID");
                        outcome.errors.push((uid, e));
                    }
                }
            }
        }

        Ok(outcome)
    }

    fn require_uid_set(set: &MessageSet) -> Result<()> {
        if set.is_uid() {
            Ok(())
        } else {
            Err(Error::InvalidArgument(
                "mailbox service operations require a UID-based MessageSet".to_string(),
            ))
        }
    }

    /// Expands `items`'s macro variants into an explicit attribute list and
    /// ensures `UID` is among them.
    fn items_with_uid(items: FetchItems) -> Vec<FetchAttribute> {
        let mut attrs = match items {
            FetchItems::All => vec![
                FetchAttribute::Flags,
                FetchAttribute::InternalDate,
                FetchAttribute::Rfc822Size,
                FetchAttribute::Envelope,
            ],
            FetchItems::Full => vec![
                FetchAttribute::Flags,
                FetchAttribute::InternalDate,
                FetchAttribute::Rfc822Size,
                FetchAttribute::Envelope,
                FetchAttribute::BodyStructure,
            ],
            FetchItems::Fast => vec![
                FetchAttribute::Flags,
                FetchAttribute::InternalDate,
                FetchAttribute::Rfc822Size,
            ],
            FetchItems::Items(attrs) => attrs,
        };
        if !attrs.contains(&FetchAttribute::Uid) {
            attrs.push(FetchAttribute::Uid);
        }
        attrs
    }

    /// Builds a [`Error::PartialOperation`] naming every UID in `set`,
    /// falling back to the bare `err` if `set` has an open tail and can't be
    /// enumerated.
    fn partial_failure(set: &MessageSet, err: Error) -> Error {
        let Ok(ids) = set.ids() else {
            return err;
        };
        let text = err.to_string();
        let failures = ids
            .into_iter()
            .filter_map(Uid::new)
            .map(|uid| (uid, Box::new(Error::Move(text.clone()))))
            .collect();
        Error::PartialOperation {
            succeeded: 0,
            failures,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn items_with_uid_adds_uid_to_an_explicit_list() {
        let attrs = MailboxService::items_with_uid(FetchItems::Items(vec![FetchAttribute::Flags]));
        assert_eq!(attrs, vec![FetchAttribute::Flags, FetchAttribute::Uid]);
    }

    #[test]
    fn items_with_uid_does_not_duplicate_an_explicit_uid() {
        let attrs = MailboxService::items_with_uid(FetchItems::Items(vec![
            FetchAttribute::Uid,
            FetchAttribute::Flags,
        ]));
        assert_eq!(attrs, vec![FetchAttribute::Uid, FetchAttribute::Flags]);
    }

    #[test]
    fn items_with_uid_expands_the_fast_macro_and_adds_uid() {
        let attrs = MailboxService::items_with_uid(FetchItems::Fast);
        assert!(attrs.contains(&FetchAttribute::Flags));
        assert!(attrs.contains(&FetchAttribute::InternalDate));
        assert!(attrs.contains(&FetchAttribute::Rfc822Size));
        assert!(attrs.contains(&FetchAttribute::Uid));
        assert!(!attrs.contains(&FetchAttribute::Envelope));
    }

    #[test]
    fn require_uid_set_rejects_a_sequence_number_set() {
        let set = MessageSet::from_sequence_numbers(&[1, 2, 3], None).unwrap();
        assert!(MailboxService::require_uid_set(&set).is_err());
    }

    #[test]
    fn require_uid_set_accepts_a_uid_set() {
        let set = MessageSet::from_uids(&[1, 2, 3], None).unwrap();
        assert!(MailboxService::require_uid_set(&set).is_ok());
    }

    #[test]
    fn partial_failure_names_every_uid_in_a_closed_set() {
        let set = MessageSet::from_uids(&[3, 4, 7], None).unwrap();
        let err = MailboxService::partial_failure(&set, Error::Store("boom".to_string()));
        match err {
            Error::PartialOperation { succeeded, failures } => {
                assert_eq!(succeeded, 0);
                let uids: Vec<u32> = failures.iter().map(|(uid, _)| uid.get()).collect();
                assert_eq!(uids, vec![3, 4, 7]);
            }
            other => panic!("expected PartialOperation, got {other:?}"),
        }
    }

    #[test]
    fn partial_failure_falls_back_to_the_bare_error_for_an_open_tailed_set() {
        let set = MessageSet::all_messages(true, None);
        let err = MailboxService::partial_failure(&set, Error::Store("boom".to_string()));
        assert!(matches!(err, Error::Store(_)));
    }
}
