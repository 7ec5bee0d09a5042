//! Folder (mailbox hierarchy) management.
//!
//! Thin, typed wrapper over [`Connection`]'s `LIST`/`CREATE`/`DELETE`/`RENAME`
//! passthroughs, translating bare server `NO`/`BAD` diagnostics into the
//! typed errors callers actually want to match on.

use crate::connection::Connection;
use crate::types::{ListResponse, Mailbox};
use crate::{Error, Result};

/// Folder management operations for a [`Connection`].
///
/// Holds the connection exclusively for the duration of each call; nothing
/// here requires a mailbox to be selected, so it also works right after
/// authentication.
pub struct FolderService<'a> {
    connection: &'a mut Connection,
}

impl<'a> FolderService<'a> {
    /// Wraps `connection` for folder management operations.
    pub fn new(connection: &'a mut Connection) -> Self {
        Self { connection }
    }

    /// Lists mailboxes matching `reference`/`pattern` (`%`/`*` wildcards),
    /// with names decoded from modified UTF-7.
    ///
    /// # Errors
    ///
    /// Returns an error if not authenticated or the `LIST` command fails.
    pub async fn list(&mut self, reference: &str, pattern: &str) -> Result<Vec<ListResponse>> {
        self.connection.list(reference, pattern).await
    }

    /// Creates a mailbox.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FolderExists`] if the server reports the mailbox
    /// already exists (or otherwise rejects the `CREATE`).
    pub async fn create(&mut self, mailbox: &str) -> Result<()> {
        self.connection
            .create(mailbox)
            .await
            .map_err(|e| e.into_operation(Error::FolderExists))
    }

    /// Deletes a mailbox.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DefaultFolder`] if `mailbox` is `INBOX` (refused
    /// without even issuing the command), or [`Error::FolderNotFound`] if
    /// the server rejects the `DELETE`.
    pub async fn delete(&mut self, mailbox: &str) -> Result<()> {
        if Mailbox::new(mailbox).is_inbox() {
            return Err(Error::DefaultFolder(mailbox.to_string()));
        }

        self.connection
            .delete(mailbox)
            .await
            .map_err(|e| e.into_operation(Error::FolderNotFound))
    }

    /// Renames a mailbox.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FolderNotFound`] if the server reports `old` does
    /// not exist (or otherwise rejects the `RENAME`).
    pub async fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        self.connection
            .rename(old, new)
            .await
            .map_err(|e| e.into_operation(Error::FolderNotFound))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn delete_refuses_inbox_in_any_case() {
        // INBOX comparison is case-insensitive per RFC 3501 5.1, so the
        // guard must reject every spelling before a command is ever built.
        assert!(Mailbox::new("INBOX").is_inbox());
        assert!(Mailbox::new("inbox").is_inbox());
        assert!(Mailbox::new("InBoX").is_inbox());
        assert!(!Mailbox::new("Archive").is_inbox());
    }

    #[test]
    fn into_operation_maps_no_to_folder_exists() {
        let err = Error::No("Mailbox already exists".to_string());
        match err.into_operation(Error::FolderExists) {
            Error::FolderExists(text) => assert_eq!(text, "Mailbox already exists"),
            other => panic!("expected FolderExists, got {other:?}"),
        }
    }

    #[test]
    fn into_operation_maps_bad_to_folder_not_found() {
        let err = Error::Bad("no such mailbox".to_string());
        match err.into_operation(Error::FolderNotFound) {
            Error::FolderNotFound(text) => assert_eq!(text, "no such mailbox"),
            other => panic!("expected FolderNotFound, got {other:?}"),
        }
    }

    #[test]
    fn into_operation_leaves_other_errors_unchanged() {
        let err = Error::InvalidState("not authenticated".to_string());
        match err.into_operation(Error::FolderExists) {
            Error::InvalidState(text) => assert_eq!(text, "not authenticated"),
            other => panic!("expected InvalidState unchanged, got {other:?}"),
        }
    }
}
