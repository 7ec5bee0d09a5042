//! Mailbox types.

use super::{Flags, SeqNum, Uid, UidValidity};

/// Mailbox name.
///
/// Equality is case-sensitive except that any spelling of `INBOX` (in any
/// case) compares equal to any other, per RFC 3501 §5.1.
#[derive(Debug, Clone)]
pub struct Mailbox(pub String);

impl Mailbox {
    /// Creates a new mailbox name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The INBOX mailbox (case-insensitive per RFC).
    #[must_use]
    pub fn inbox() -> Self {
        Self("INBOX".to_string())
    }

    /// Returns true if this mailbox is `INBOX`, compared case-insensitively.
    #[must_use]
    pub fn is_inbox(&self) -> bool {
        self.0.eq_ignore_ascii_case("INBOX")
    }

    /// Returns the mailbox name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Encodes this mailbox name as modified UTF-7 for the wire, per RFC 3501 §5.1.1.
    #[must_use]
    pub fn encode_utf7(&self) -> String {
        utf7::encode(&self.0)
    }

    /// Decodes a wire-format modified UTF-7 mailbox name.
    #[must_use]
    pub fn decode_utf7(encoded: &str) -> Self {
        Self(utf7::decode(encoded))
    }
}

impl PartialEq for Mailbox {
    fn eq(&self, other: &Self) -> bool {
        if self.is_inbox() && other.is_inbox() {
            return true;
        }
        self.0 == other.0
    }
}

impl Eq for Mailbox {}

impl std::hash::Hash for Mailbox {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.is_inbox() {
            "INBOX".hash(state);
        } else {
            self.0.hash(state);
        }
    }
}

impl std::fmt::Display for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Modified UTF-7 encoding (RFC 3501 §5.1.3), used for IMAP mailbox names.
///
/// Differs from standard UTF-7 (RFC 2152) in two ways: `&` is the shift
/// character instead of `+`, and it is represented inside shifted sequences
/// as `&-` rather than passed through. All other printable US-ASCII bytes
/// pass through unchanged; everything else is base64-encoded (with a
/// modified alphabet that uses `,` instead of `/`, and no padding) between
/// `&` and `-`.
mod utf7 {
    const BASE64_ALPHABET: &[u8; 64] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+,";

    fn b64_value(c: u8) -> Option<u8> {
        BASE64_ALPHABET.iter().position(|&b| b == c).map(|p| p as u8)
    }

    /// Encodes a Rust `&str` (UTF-8) into modified UTF-7.
    pub(super) fn encode(input: &str) -> String {
        let mut out = String::new();
        let mut pending: Vec<u16> = Vec::new();

        let flush = |out: &mut String, pending: &mut Vec<u16>| {
            if pending.is_empty() {
                return;
            }
            out.push('&');
            let mut bits: u32 = 0;
            let mut bit_count = 0u32;
            for unit in pending.drain(..) {
                bits = (bits << 16) | u32::from(unit);
                bit_count += 16;
                while bit_count >= 6 {
                    bit_count -= 6;
                    let idx = ((bits >> bit_count) & 0x3F) as usize;
                    out.push(BASE64_ALPHABET[idx] as char);
                }
            }
            if bit_count > 0 {
                let idx = ((bits << (6 - bit_count)) & 0x3F) as usize;
                out.push(BASE64_ALPHABET[idx] as char);
            }
            out.push('-');
        };

        for ch in input.chars() {
            let is_direct = matches!(ch, '\x20'..='\x7e') && ch != '&' && ch != '\\' && ch != '~';
            if is_direct {
                flush(&mut out, &mut pending);
                out.push(ch);
            } else if ch == '&' {
                flush(&mut out, &mut pending);
                out.push_str("&-");
            } else {
                let mut buf = [0u16; 2];
                pending.extend_from_slice(ch.encode_utf16(&mut buf));
            }
        }
        flush(&mut out, &mut pending);
        out
    }

    /// Decodes a modified-UTF-7 wire string into a Rust `String`.
    ///
    /// Malformed shifted sequences are passed through literally rather than
    /// causing a parse failure, since mailbox names are advisory display data.
    pub(super) fn decode(input: &str) -> String {
        let bytes = input.as_bytes();
        let mut out = String::new();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'&' {
                if bytes.get(i + 1) == Some(&b'-') {
                    out.push('&');
                    i += 2;
                    continue;
                }
                let start = i + 1;
                let Some(rel_end) = bytes[start..].iter().position(|&b| b == b'-') else {
                    out.push_str(&input[i..]);
                    break;
                };
                let end = start + rel_end;
                let mut bits: u32 = 0;
                let mut bit_count = 0u32;
                let mut units: Vec<u16> = Vec::new();
                for &b in &bytes[start..end] {
                    let Some(v) = b64_value(b) else {
                        units.clear();
                        break;
                    };
                    bits = (bits << 6) | u32::from(v);
                    bit_count += 6;
                    if bit_count >= 16 {
                        bit_count -= 16;
                        units.push(((bits >> bit_count) & 0xFFFF) as u16);
                    }
                }
                match String::from_utf16(&units) {
                    Ok(decoded) => out.push_str(&decoded),
                    Err(_) => out.push_str(&input[i..=end]),
                }
                i = end + 1;
            } else {
                out.push(bytes[i] as char);
                i += 1;
            }
        }
        out
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn ascii_round_trips_unchanged() {
            assert_eq!(encode("INBOX"), "INBOX");
            assert_eq!(decode("INBOX"), "INBOX");
            assert_eq!(encode("Archive/2024"), "Archive/2024");
        }

        #[test]
        fn ampersand_is_escaped() {
            assert_eq!(encode("A&B"), "A&-B");
            assert_eq!(decode("A&-B"), "A&B");
        }

        #[test]
        fn non_ascii_round_trips() {
            let name = "Entw\u{fc}rfe";
            let encoded = encode(name);
            assert_ne!(encoded, name);
            assert_eq!(decode(&encoded), name);
        }

        #[test]
        fn japanese_round_trips() {
            let name = "\u{65e5}\u{672c}\u{8a9e}";
            let encoded = encode(name);
            assert_eq!(decode(&encoded), name);
        }
    }
}

/// Mailbox status information from SELECT/EXAMINE.
#[derive(Debug, Clone, Default)]
pub struct MailboxStatus {
    /// Number of messages in the mailbox.
    pub exists: u32,
    /// Number of recent messages.
    pub recent: u32,
    /// First unseen message sequence number.
    pub unseen: Option<SeqNum>,
    /// Next UID to be assigned.
    pub uid_next: Option<Uid>,
    /// UIDVALIDITY value.
    pub uid_validity: Option<UidValidity>,
    /// Flags defined for this mailbox.
    pub flags: Flags,
    /// Flags that can be permanently stored.
    pub permanent_flags: Flags,
    /// Whether mailbox is read-only.
    pub read_only: bool,
    /// Highest mod-sequence (if CONDSTORE enabled).
    pub highest_mod_seq: Option<u64>,
}

/// LIST response data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResponse {
    /// Mailbox attributes.
    pub attributes: Vec<MailboxAttribute>,
    /// Hierarchy delimiter.
    pub delimiter: Option<char>,
    /// Mailbox name.
    pub mailbox: Mailbox,
}

/// Mailbox attributes from LIST response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MailboxAttribute {
    /// Mailbox cannot be selected.
    NoSelect,
    /// Mailbox has no children.
    HasNoChildren,
    /// Mailbox has children.
    HasChildren,
    /// Mailbox is marked for attention.
    Marked,
    /// Mailbox is not marked.
    Unmarked,
    // SPECIAL-USE mailbox attributes (RFC 6154)
    /// All messages (virtual mailbox).
    All,
    /// Mailbox is the archive folder.
    Archive,
    /// Mailbox is the drafts folder.
    Drafts,
    /// Flagged/starred messages (virtual mailbox).
    Flagged,
    /// Mailbox is the junk/spam folder.
    Junk,
    /// Mailbox is the sent folder.
    Sent,
    /// Mailbox is the trash folder.
    Trash,
    /// Important messages (RFC 8457).
    Important,
    // Other attributes
    /// Mailbox is subscribed.
    Subscribed,
    /// Unknown attribute.
    Unknown(String),
}

impl MailboxAttribute {
    /// Parses a mailbox attribute string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "\\NOSELECT" => Self::NoSelect,
            "\\HASNOCHILDREN" => Self::HasNoChildren,
            "\\HASCHILDREN" => Self::HasChildren,
            "\\MARKED" => Self::Marked,
            "\\UNMARKED" => Self::Unmarked,
            // RFC 6154 SPECIAL-USE
            "\\ALL" => Self::All,
            "\\ARCHIVE" => Self::Archive,
            "\\DRAFTS" => Self::Drafts,
            "\\FLAGGED" => Self::Flagged,
            "\\JUNK" | "\\SPAM" => Self::Junk,
            "\\SENT" => Self::Sent,
            "\\TRASH" => Self::Trash,
            // RFC 8457
            "\\IMPORTANT" => Self::Important,
            // Other
            "\\SUBSCRIBED" => Self::Subscribed,
            _ => Self::Unknown(s.to_string()),
        }
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

    mod mailbox_tests {
        use super::*;

        #[test]
        fn new_from_string() {
            let mb = Mailbox::new("Archive".to_string());
            assert_eq!(mb.as_str(), "Archive");
        }

        #[test]
        fn new_from_str() {
            let mb = Mailbox::new("Drafts");
            assert_eq!(mb.as_str(), "Drafts");
        }

        #[test]
        fn inbox() {
            let inbox = Mailbox::inbox();
            assert_eq!(inbox.as_str(), "INBOX");
        }

        #[test]
        fn display() {
            let mb = Mailbox::new("Sent");
            assert_eq!(format!("{mb}"), "Sent");
        }

        #[test]
        fn equality() {
            let mb1 = Mailbox::new("INBOX");
            let mb2 = Mailbox::new("INBOX");
            let mb3 = Mailbox::new("Sent");
            assert_eq!(mb1, mb2);
            assert_ne!(mb1, mb3);
        }
    }

    mod mailbox_status_tests {
        use super::*;
        use crate::types::Flag;

        #[test]
        fn default() {
            let status = MailboxStatus::default();
            assert_eq!(status.exists, 0);
            assert_eq!(status.recent, 0);
            assert!(status.unseen.is_none());
            assert!(status.uid_next.is_none());
            assert!(status.uid_validity.is_none());
            assert!(status.flags.is_empty());
            assert!(status.permanent_flags.is_empty());
            assert!(!status.read_only);
            assert!(status.highest_mod_seq.is_none());
        }

        #[test]
        fn with_values() {
            let status = MailboxStatus {
                exists: 100,
                recent: 5,
                unseen: SeqNum::new(50),
                uid_next: Uid::new(101),
                uid_validity: UidValidity::new(123456),
                flags: Flags::from_vec(vec![Flag::Seen, Flag::Flagged]),
                permanent_flags: Flags::new(),
                read_only: false,
                highest_mod_seq: Some(999),
            };
            assert_eq!(status.exists, 100);
            assert_eq!(status.recent, 5);
            assert_eq!(status.unseen.unwrap().get(), 50);
            assert_eq!(status.highest_mod_seq, Some(999));
        }
    }

    mod list_response_tests {
        use super::*;

        #[test]
        fn with_attributes() {
            let resp = ListResponse {
                attributes: vec![MailboxAttribute::HasChildren, MailboxAttribute::Sent],
                delimiter: Some('/'),
                mailbox: Mailbox::new("Sent"),
            };
            assert_eq!(resp.attributes.len(), 2);
            assert_eq!(resp.delimiter, Some('/'));
            assert_eq!(resp.mailbox.as_str(), "Sent");
        }

        #[test]
        fn no_delimiter() {
            let resp = ListResponse {
                attributes: vec![],
                delimiter: None,
                mailbox: Mailbox::new("INBOX"),
            };
            assert!(resp.delimiter.is_none());
        }
    }

    mod mailbox_attribute_tests {
        use super::*;

        #[test]
        fn parse_noselect() {
            assert_eq!(
                MailboxAttribute::parse("\\NoSelect"),
                MailboxAttribute::NoSelect
            );
            assert_eq!(
                MailboxAttribute::parse("\\NOSELECT"),
                MailboxAttribute::NoSelect
            );
        }

        #[test]
        fn parse_has_no_children() {
            assert_eq!(
                MailboxAttribute::parse("\\HasNoChildren"),
                MailboxAttribute::HasNoChildren
            );
        }

        #[test]
        fn parse_has_children() {
            assert_eq!(
                MailboxAttribute::parse("\\HasChildren"),
                MailboxAttribute::HasChildren
            );
        }

        #[test]
        fn parse_marked() {
            assert_eq!(
                MailboxAttribute::parse("\\Marked"),
                MailboxAttribute::Marked
            );
        }

        #[test]
        fn parse_unmarked() {
            assert_eq!(
                MailboxAttribute::parse("\\Unmarked"),
                MailboxAttribute::Unmarked
            );
        }

        #[test]
        fn parse_all() {
            assert_eq!(MailboxAttribute::parse("\\All"), MailboxAttribute::All);
        }

        #[test]
        fn parse_archive() {
            assert_eq!(
                MailboxAttribute::parse("\\Archive"),
                MailboxAttribute::Archive
            );
        }

        #[test]
        fn parse_drafts() {
            assert_eq!(
                MailboxAttribute::parse("\\Drafts"),
                MailboxAttribute::Drafts
            );
        }

        #[test]
        fn parse_flagged() {
            assert_eq!(
                MailboxAttribute::parse("\\Flagged"),
                MailboxAttribute::Flagged
            );
        }

        #[test]
        fn parse_junk() {
            assert_eq!(MailboxAttribute::parse("\\Junk"), MailboxAttribute::Junk);
        }

        #[test]
        fn parse_spam() {
            assert_eq!(MailboxAttribute::parse("\\Spam"), MailboxAttribute::Junk);
        }

        #[test]
        fn parse_sent() {
            assert_eq!(MailboxAttribute::parse("\\Sent"), MailboxAttribute::Sent);
        }

        #[test]
        fn parse_trash() {
            assert_eq!(MailboxAttribute::parse("\\Trash"), MailboxAttribute::Trash);
        }

        #[test]
        fn parse_important() {
            assert_eq!(
                MailboxAttribute::parse("\\Important"),
                MailboxAttribute::Important
            );
        }

        #[test]
        fn parse_subscribed() {
            assert_eq!(
                MailboxAttribute::parse("\\Subscribed"),
                MailboxAttribute::Subscribed
            );
        }

        #[test]
        fn parse_unknown() {
            let attr = MailboxAttribute::parse("\\Custom");
            assert_eq!(attr, MailboxAttribute::Unknown("\\Custom".to_string()));
        }
    }
}
