//! Structured, higher-level view of a fetched message.
//!
//! [`EmailSnapshot`] assembles the scattered pieces of a `FETCH` response
//! (envelope, flags, body structure, and any fetched `BODY[...]` sections)
//! into a single value. Full MIME transfer-decoding (base64,
//! quoted-printable) is out of scope here — per the library's boundary, the
//! client surfaces opaque RFC 5322 bytes and this minimal parsed view, and
//! leaves full MIME decoding to a dedicated crate the caller can layer on
//! top.

use std::fmt;

use crate::parser::{Address, BodyStructure, Envelope, FetchItem};
use crate::types::{Flags, SeqNum, Uid};

/// A case-insensitive RFC 5322 header map.
///
/// Preserves original header casing and duplicate fields (e.g. repeated
/// `Received:` lines) while allowing case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Parses raw, unfolded RFC 5322 header bytes (as returned by
    /// `BODY[HEADER]`) into a header map.
    #[must_use]
    pub fn parse(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        let mut entries = Vec::new();
        let mut current: Option<(String, String)> = None;

        for line in text.split("\r\n") {
            if line.is_empty() {
                continue;
            }
            if (line.starts_with(' ') || line.starts_with('\t')) && current.is_some() {
                // Folded continuation line.
                if let Some((_, value)) = current.as_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            if let Some((name, value)) = line.split_once(':') {
                current = Some((name.trim().to_string(), value.trim().to_string()));
            }
        }
        if let Some(entry) = current.take() {
            entries.push(entry);
        }

        Self { entries }
    }

    /// Returns the first value for `name`, case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns every value for `name`, case-insensitively, in header order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over all header fields in original order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `true` if no headers were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One MIME body part discovered via `BODYSTRUCTURE`, not inlined as
/// `plain_body`/`html_body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Filename, if the part's content-type parameters carried a `NAME`.
    pub filename: Option<String>,
    /// `type/subtype`, lowercased (e.g. `application/pdf`).
    pub content_type: String,
    /// Size in octets as reported by `BODYSTRUCTURE` (pre-decoding).
    pub size: u32,
    /// The `BODY[<section>]` path callers use to fetch this part's bytes,
    /// e.g. `"2"` or `"1.2"`.
    pub section: String,
    /// Raw (still transfer-encoded) bytes, if this part was included in the
    /// triggering `FETCH` request. `None` means the caller must issue a
    /// follow-up `UID FETCH ... (BODY.PEEK[<section>])` using `section`.
    pub bytes: Option<Vec<u8>>,
}

/// Structured view of a message returned by `UID FETCH`.
///
/// Assembled from whichever `FetchItem`s were present in the response;
/// fields the caller didn't request are left at their default.
#[derive(Debug, Clone)]
pub struct EmailSnapshot {
    /// UID, present when `UID` was requested (always true for
    /// [`crate::mailbox_service::MailboxService::uid_fetch`]).
    pub uid: Option<Uid>,
    /// Sequence number this snapshot was delivered under.
    pub sequence_number: SeqNum,
    /// Flags, present when `FLAGS` was requested.
    pub flags: Flags,
    /// `INTERNALDATE`, present when requested.
    pub internaldate: Option<String>,
    /// `RFC822.SIZE`, present when requested.
    pub size: Option<u32>,
    /// Headers parsed from `BODY[HEADER]` / `BODY[HEADER.FIELDS (...)]`,
    /// when requested.
    pub headers: Headers,
    /// `Message-ID`, from the envelope.
    pub message_id: Option<String>,
    /// `Subject`, from the envelope.
    pub subject: Option<String>,
    /// `From` addresses, from the envelope.
    pub from: Vec<Address>,
    /// `To` addresses, from the envelope.
    pub to: Vec<Address>,
    /// `Cc` addresses, from the envelope.
    pub cc: Vec<Address>,
    /// `Bcc` addresses, from the envelope.
    pub bcc: Vec<Address>,
    /// `Date`, from the envelope.
    pub date: Option<String>,
    /// The `text/plain` part's raw bytes, lossily decoded as UTF-8, if the
    /// structure names one and its section was fetched.
    pub plain_body: Option<String>,
    /// The `text/html` part's raw bytes, lossily decoded as UTF-8, if the
    /// structure names one and its section was fetched.
    pub html_body: Option<String>,
    /// Non-inline parts discovered via `BODYSTRUCTURE`.
    pub attachments: Vec<Attachment>,
    /// Raw RFC 5322 bytes, present when `BODY[]`/`RFC822` was requested.
    pub raw: Option<Vec<u8>>,
}

impl EmailSnapshot {
    /// Assembles a snapshot from the raw `FetchItem`s of one `FETCH`
    /// response line.
    #[must_use]
    pub fn assemble(sequence_number: SeqNum, items: Vec<FetchItem>) -> Self {
        let mut snapshot = Self {
            uid: None,
            sequence_number,
            flags: Flags::new(),
            internaldate: None,
            size: None,
            headers: Headers::default(),
            message_id: None,
            subject: None,
            from: Vec::new(),
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            date: None,
            plain_body: None,
            html_body: None,
            attachments: Vec::new(),
            raw: None,
        };

        let mut structure: Option<BodyStructure> = None;
        let mut sections: Vec<(Option<String>, Vec<u8>)> = Vec::new();

        for item in items {
            match item {
                FetchItem::Uid(uid) => snapshot.uid = Some(uid),
                FetchItem::Flags(flags) => snapshot.flags = flags,
                FetchItem::InternalDate(date) => snapshot.internaldate = Some(date),
                FetchItem::Rfc822Size(size) => snapshot.size = Some(size),
                FetchItem::Envelope(envelope) => snapshot.apply_envelope(*envelope),
                FetchItem::BodyStructure(body) => structure = Some(body),
                FetchItem::Body {
                    section,
                    data: Some(data),
                    ..
                } => sections.push((section, data)),
                FetchItem::Body { .. } | FetchItem::ModSeq(_) => {}
            }
        }

        for (section, data) in &sections {
            match section.as_deref() {
                None | Some("") => snapshot.raw = Some(data.clone()),
                Some(s) if s.eq_ignore_ascii_case("HEADER") => {
                    snapshot.headers = Headers::parse(data);
                }
                Some(s) if s.to_ascii_uppercase().starts_with("HEADER.FIELDS") => {
                    snapshot.headers = Headers::parse(data);
                }
                Some(_) => {}
            }
        }

        if let Some(structure) = &structure {
            let mut parts = Vec::new();
            collect_parts(structure, &[], &mut parts);
            for part in parts {
                let fetched = sections
                    .iter()
                    .find(|(section, _)| section.as_deref() == Some(part.section.as_str()))
                    .map(|(_, data)| data.clone());

                if part.content_type == "text/plain" && snapshot.plain_body.is_none() {
                    snapshot.plain_body = fetched
                        .as_deref()
                        .map(|bytes| String::from_utf8_lossy(bytes).into_owned());
                    if fetched.is_some() {
                        continue;
                    }
                }
                if part.content_type == "text/html" && snapshot.html_body.is_none() {
                    snapshot.html_body = fetched
                        .as_deref()
                        .map(|bytes| String::from_utf8_lossy(bytes).into_owned());
                    if fetched.is_some() {
                        continue;
                    }
                }
                if part.is_attachment {
                    snapshot.attachments.push(Attachment {
                        filename: part.filename,
                        content_type: part.content_type,
                        size: part.size,
                        section: part.section,
                        bytes: fetched,
                    });
                }
            }
        }

        snapshot
    }

    fn apply_envelope(&mut self, envelope: Envelope) {
        self.subject = envelope.subject;
        self.date = envelope.date;
        self.message_id = envelope.message_id;
        self.from = envelope.from;
        self.to = envelope.to;
        self.cc = envelope.cc;
        self.bcc = envelope.bcc;
    }
}

impl fmt::Display for EmailSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.subject.as_deref().unwrap_or("(no subject)"),
            self.uid.map_or_else(|| self.sequence_number.to_string(), |uid| uid.to_string())
        )
    }
}

struct LeafPart {
    section: String,
    content_type: String,
    size: u32,
    filename: Option<String>,
    is_attachment: bool,
}

fn param(params: &[(String, String)], key: &str) -> Option<String> {
    params
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.clone())
}

fn collect_parts(structure: &BodyStructure, prefix: &[usize], out: &mut Vec<LeafPart>) {
    match structure {
        BodyStructure::Multipart { bodies, .. } => {
            for (index, body) in bodies.iter().enumerate() {
                let mut path = prefix.to_vec();
                path.push(index + 1);
                collect_parts(body, &path, out);
            }
        }
        BodyStructure::Text {
            subtype,
            params,
            size,
            ..
        } => {
            let section = section_path(prefix);
            let content_type = format!("text/{}", subtype.to_lowercase());
            let is_attachment = !matches!(subtype.to_uppercase().as_str(), "PLAIN" | "HTML");
            out.push(LeafPart {
                section,
                content_type,
                size: *size,
                filename: param(params, "NAME"),
                is_attachment,
            });
        }
        BodyStructure::Basic {
            media_type,
            media_subtype,
            params,
            size,
            ..
        } => {
            let section = section_path(prefix);
            out.push(LeafPart {
                section,
                content_type: format!(
                    "{}/{}",
                    media_type.to_lowercase(),
                    media_subtype.to_lowercase()
                ),
                size: *size,
                filename: param(params, "NAME"),
                is_attachment: true,
            });
        }
        BodyStructure::Message { body, .. } => {
            collect_parts(body, prefix, out);
        }
    }
}

fn section_path(prefix: &[usize]) -> String {
    if prefix.is_empty() {
        "1".to_string()
    } else {
        prefix
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Flag;

    fn seq(n: u32) -> SeqNum {
        SeqNum::new(n).unwrap()
    }

    #[test]
    fn headers_parse_unfolds_continuation_lines() {
        let raw = b"Subject: Hello\r\n World\r\nFrom: a@b.com\r\n\r\n";
        let headers = Headers::parse(raw);
        assert_eq!(headers.get("subject"), Some("Hello World"));
        assert_eq!(headers.get("FROM"), Some("a@b.com"));
    }

    #[test]
    fn headers_get_all_returns_every_matching_value() {
        let raw = b"Received: a\r\nReceived: b\r\n\r\n";
        let headers = Headers::parse(raw);
        assert_eq!(headers.get_all("received").collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn assemble_collects_envelope_flags_and_raw_body() {
        let envelope = Envelope {
            subject: Some("Hi".to_string()),
            message_id: Some("<1@x>".to_string()),
            ..Envelope::default()
        };
        let items = vec![
            FetchItem::Uid(Uid::new(42).unwrap()),
            FetchItem::Flags(Flags::from_vec(vec![Flag::Seen])),
            FetchItem::Envelope(Box::new(envelope)),
            FetchItem::Body {
                section: None,
                origin: None,
                data: Some(b"raw bytes".to_vec()),
            },
        ];

        let snapshot = EmailSnapshot::assemble(seq(1), items);
        assert_eq!(snapshot.uid, Uid::new(42));
        assert_eq!(snapshot.subject.as_deref(), Some("Hi"));
        assert_eq!(snapshot.message_id.as_deref(), Some("<1@x>"));
        assert!(snapshot.flags.contains(&Flag::Seen));
        assert_eq!(snapshot.raw, Some(b"raw bytes".to_vec()));
    }

    #[test]
    fn assemble_splits_plain_and_html_from_multipart_alternative() {
        let structure = BodyStructure::Multipart {
            bodies: vec![
                BodyStructure::Text {
                    subtype: "PLAIN".to_string(),
                    params: vec![],
                    id: None,
                    description: None,
                    encoding: "7BIT".to_string(),
                    size: 11,
                    lines: 1,
                },
                BodyStructure::Text {
                    subtype: "HTML".to_string(),
                    params: vec![],
                    id: None,
                    description: None,
                    encoding: "7BIT".to_string(),
                    size: 20,
                    lines: 1,
                },
            ],
            subtype: "ALTERNATIVE".to_string(),
        };

        let items = vec![
            FetchItem::BodyStructure(structure),
            FetchItem::Body {
                section: Some("1".to_string()),
                origin: None,
                data: Some(b"hello world".to_vec()),
            },
            FetchItem::Body {
                section: Some("2".to_string()),
                origin: None,
                data: Some(b"<p>hello</p>".to_vec()),
            },
        ];

        let snapshot = EmailSnapshot::assemble(seq(1), items);
        assert_eq!(snapshot.plain_body.as_deref(), Some("hello world"));
        assert_eq!(snapshot.html_body.as_deref(), Some("<p>hello</p>"));
        assert!(snapshot.attachments.is_empty());
    }

    #[test]
    fn assemble_surfaces_non_text_parts_as_attachments() {
        let structure = BodyStructure::Multipart {
            bodies: vec![
                BodyStructure::Text {
                    subtype: "PLAIN".to_string(),
                    params: vec![],
                    id: None,
                    description: None,
                    encoding: "7BIT".to_string(),
                    size: 5,
                    lines: 1,
                },
                BodyStructure::Basic {
                    media_type: "APPLICATION".to_string(),
                    media_subtype: "PDF".to_string(),
                    params: vec![("NAME".to_string(), "invoice.pdf".to_string())],
                    id: None,
                    description: None,
                    encoding: "BASE64".to_string(),
                    size: 4096,
                },
            ],
            subtype: "MIXED".to_string(),
        };

        let items = vec![FetchItem::BodyStructure(structure)];
        let snapshot = EmailSnapshot::assemble(seq(1), items);

        assert_eq!(snapshot.attachments.len(), 1);
        let attachment = &snapshot.attachments[0];
        assert_eq!(attachment.content_type, "application/pdf");
        assert_eq!(attachment.filename.as_deref(), Some("invoice.pdf"));
        assert_eq!(attachment.section, "2");
        assert!(attachment.bytes.is_none());
    }
}
