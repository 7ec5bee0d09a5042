//! `MessageSet`: a validated, canonicalized set of UIDs or sequence numbers.
//!
//! Generalizes [`super::SequenceSet`]/[`super::UidSet`] with canonicalization,
//! set-theoretic operations, and batched iteration, as required for
//! search-result handling and bulk mailbox operations.

use std::fmt;

use super::Mailbox;
use crate::{Error, Result};

/// A single identifier in a `MessageSet`: either a concrete value or the
/// wildcard `*`, which may only appear as the upper bound of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Bound {
    Value(u32),
    Star,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Star => write!(f, "*"),
        }
    }
}

/// A canonical, sorted, range-compressed segment: `low..=high` (`high` may be `*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    low: u32,
    high: Bound,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.high {
            Bound::Value(h) if h == self.low => write!(f, "{}", self.low),
            high => write!(f, "{}:{}", self.low, high),
        }
    }
}

/// A validated, canonicalized IMAP message identifier set, bound to either
/// UIDs or sequence numbers and optionally to a specific mailbox.
///
/// Construction always produces canonical form: segments sorted ascending,
/// with consecutive or overlapping runs coalesced into ranges. Two sets
/// representing the same membership over the same `(is_uid, mailbox)` always
/// serialize identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSet {
    segments: Vec<Segment>,
    is_uid: bool,
    mailbox: Option<Mailbox>,
}

impl MessageSet {
    /// Builds a `MessageSet` from an explicit list of ids (UIDs if `is_uid`,
    /// otherwise sequence numbers). Fails if `ids` is empty or contains 0.
    fn from_ids(ids: &[u32], is_uid: bool, mailbox: Option<Mailbox>) -> Result<Self> {
        if ids.is_empty() {
            return Err(Error::InvalidArgument(
                "message set must not be empty".to_string(),
            ));
        }
        if ids.contains(&0) {
            return Err(Error::InvalidArgument(
                "message identifiers must be >= 1".to_string(),
            ));
        }
        let mut sorted = ids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let segments = coalesce(sorted.into_iter().map(|v| (v, Bound::Value(v))).collect());
        Ok(Self {
            segments,
            is_uid,
            mailbox,
        })
    }

    /// Builds a `MessageSet` from explicit UIDs.
    pub fn from_uids(uids: &[u32], mailbox: Option<Mailbox>) -> Result<Self> {
        Self::from_ids(uids, true, mailbox)
    }

    /// Builds a `MessageSet` from explicit sequence numbers.
    ///
    /// Sequence numbers are ephemeral (they shift on expunge); prefer
    /// [`Self::from_uids`] wherever possible.
    pub fn from_sequence_numbers(seqs: &[u32], mailbox: Option<Mailbox>) -> Result<Self> {
        tracing::warn!(
            "constructing a MessageSet from sequence numbers; these are invalidated by concurrent expunges, prefer UIDs"
        );
        Self::from_ids(seqs, false, mailbox)
    }

    /// Builds a single-range `MessageSet`: `low:high`, or `low:*` if `high` is `None`.
    pub fn from_range(low: u32, high: Option<u32>, is_uid: bool, mailbox: Option<Mailbox>) -> Result<Self> {
        if low == 0 {
            return Err(Error::InvalidArgument(
                "message identifiers must be >= 1".to_string(),
            ));
        }
        let high_bound = match high {
            Some(h) if h < low => {
                return Err(Error::InvalidArgument(format!(
                    "range upper bound {h} is below lower bound {low}"
                )));
            }
            Some(h) => Bound::Value(h),
            None => Bound::Star,
        };
        Ok(Self {
            segments: vec![Segment {
                low,
                high: high_bound,
            }],
            is_uid,
            mailbox,
        })
    }

    /// The set covering every message in the mailbox (`1:*`).
    #[must_use]
    pub fn all_messages(is_uid: bool, mailbox: Option<Mailbox>) -> Self {
        Self {
            segments: vec![Segment {
                low: 1,
                high: Bound::Star,
            }],
            is_uid,
            mailbox,
        }
    }

    /// The empty set: matches no messages.
    ///
    /// Unlike [`Self::from_uids`]/[`Self::from_sequence_numbers`], this is a
    /// legal, directly-constructible value — used by callers like
    /// `create_message_set_from_search` that need to represent "no matches"
    /// without erroring.
    #[must_use]
    pub const fn empty(is_uid: bool, mailbox: Option<Mailbox>) -> Self {
        Self {
            segments: Vec::new(),
            is_uid,
            mailbox,
        }
    }

    /// Builds a UID set from a SEARCH result, bound to the mailbox it was
    /// searched in.
    pub fn from_search_result(uids: &[u32], mailbox: Mailbox) -> Result<Self> {
        Self::from_uids(uids, Some(mailbox))
    }

    /// Parses a textual IMAP sequence-set (e.g. `"1,3:5,9:*"`).
    pub fn from_string(s: &str, is_uid: bool, mailbox: Option<Mailbox>) -> Result<Self> {
        let invalid = |msg: &str| Error::InvalidArgument(format!("invalid message set {s:?}: {msg}"));
        if s.is_empty() {
            return Err(invalid("empty"));
        }
        let mut segments = Vec::new();
        for part in s.split(',') {
            if let Some((low_s, high_s)) = part.split_once(':') {
                let low: u32 = low_s.parse().map_err(|_| invalid("bad range start"))?;
                let high = if high_s == "*" {
                    Bound::Star
                } else {
                    Bound::Value(high_s.parse().map_err(|_| invalid("bad range end"))?)
                };
                if low == 0 {
                    return Err(invalid("identifiers must be >= 1"));
                }
                if let Bound::Value(h) = high {
                    if h < low {
                        return Err(invalid("range end below start"));
                    }
                }
                segments.push(Segment { low, high });
            } else if part == "*" {
                segments.push(Segment {
                    low: 1,
                    high: Bound::Star,
                });
            } else {
                let v: u32 = part.parse().map_err(|_| invalid("bad identifier"))?;
                if v == 0 {
                    return Err(invalid("identifiers must be >= 1"));
                }
                segments.push(Segment {
                    low: v,
                    high: Bound::Value(v),
                });
            }
        }
        if segments.is_empty() {
            return Err(invalid("empty"));
        }
        Ok(Self {
            segments: canonicalize_segments(segments),
            is_uid,
            mailbox,
        })
    }

    /// True if this set contains UIDs rather than sequence numbers.
    #[must_use]
    pub const fn is_uid(&self) -> bool {
        self.is_uid
    }

    /// The mailbox this set is bound to, if any.
    #[must_use]
    pub const fn mailbox(&self) -> Option<&Mailbox> {
        self.mailbox.as_ref()
    }

    /// Returns true if `id` is a member of this set.
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.segments.iter().any(|seg| match seg.high {
            Bound::Star => id >= seg.low,
            Bound::Value(h) => id >= seg.low && id <= h,
        })
    }

    /// Lower bound on the number of members. Exact if no segment has a `*` tail.
    #[must_use]
    pub fn size_lower_bound(&self) -> u64 {
        self.segments
            .iter()
            .map(|seg| match seg.high {
                Bound::Star => 1,
                Bound::Value(h) => u64::from(h) - u64::from(seg.low) + 1,
            })
            .sum()
    }

    /// True if any segment ends in an open-ended `*` (exact size unknown).
    #[must_use]
    pub fn has_open_tail(&self) -> bool {
        self.segments
            .iter()
            .any(|seg| matches!(seg.high, Bound::Star))
    }

    /// Converts to a [`super::UidSet`] for use with UID-taking wire methods.
    ///
    /// # Panics
    ///
    /// Panics if this set was not built with `is_uid == true`; callers should
    /// check [`Self::is_uid`] first (mixing the two is a programmer error,
    /// not a data error, so this does not return a `Result`).
    #[must_use]
    pub fn to_uid_set(&self) -> super::UidSet {
        use super::UidSet;
        assert!(
            self.is_uid,
            "to_uid_set() called on a sequence-number MessageSet"
        );

        let uid = |v: u32| super::Uid::new(v).expect("segment bounds validated >= 1 at construction");
        let mut parts: Vec<UidSet> = self
            .segments
            .iter()
            .map(|seg| match seg.high {
                Bound::Star if seg.low == 1 => UidSet::All,
                Bound::Star => UidSet::RangeFrom(uid(seg.low)),
                Bound::Value(h) if h == seg.low => UidSet::Single(uid(seg.low)),
                Bound::Value(h) => UidSet::Range(uid(seg.low), uid(h)),
            })
            .collect();

        if parts.len() == 1 {
            parts.pop().expect("len checked above")
        } else {
            UidSet::Set(parts)
        }
    }

    /// Converts to a [`super::SequenceSet`] for use with sequence-number
    /// wire methods.
    ///
    /// # Panics
    ///
    /// Panics if this set was built with `is_uid == true`; see
    /// [`Self::to_uid_set`].
    #[must_use]
    pub fn to_sequence_set(&self) -> super::SequenceSet {
        use super::SequenceSet;
        assert!(
            !self.is_uid,
            "to_sequence_set() called on a UID MessageSet"
        );

        let seq = |v: u32| super::SeqNum::new(v).expect("segment bounds validated >= 1 at construction");
        let mut parts: Vec<SequenceSet> = self
            .segments
            .iter()
            .map(|seg| match seg.high {
                Bound::Star if seg.low == 1 => SequenceSet::All,
                Bound::Star => SequenceSet::RangeFrom(seq(seg.low)),
                Bound::Value(h) if h == seg.low => SequenceSet::Single(seq(seg.low)),
                Bound::Value(h) => SequenceSet::Range(seq(seg.low), seq(h)),
            })
            .collect();

        if parts.len() == 1 {
            parts.pop().expect("len checked above")
        } else {
            SequenceSet::Set(parts)
        }
    }

    /// True if this set has no members (never true for a validly constructed set).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Expands this set into its individual member ids, sorted ascending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any segment ends in an
    /// open-ended `*` ([`Self::has_open_tail`]), since an unbounded set
    /// cannot be enumerated without knowing the mailbox's current size.
    pub fn ids(&self) -> Result<Vec<u32>> {
        if self.has_open_tail() {
            return Err(Error::InvalidArgument(
                "cannot enumerate an open-ended (*) message set".to_string(),
            ));
        }
        let mut ids = Vec::new();
        for seg in &self.segments {
            let Bound::Value(high) = seg.high else {
                unreachable!("open tail already rejected above")
            };
            ids.extend(seg.low..=high);
        }
        Ok(ids)
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.is_uid != other.is_uid {
            return Err(Error::InvalidArgument(
                "cannot combine a UID set with a sequence-number set".to_string(),
            ));
        }
        match (&self.mailbox, &other.mailbox) {
            (Some(a), Some(b)) if a != b => Err(Error::InvalidArgument(format!(
                "message sets are bound to different mailboxes ({a} vs {b})"
            ))),
            _ => Ok(()),
        }
    }

    fn combined_mailbox(&self, other: &Self) -> Option<Mailbox> {
        self.mailbox.clone().or_else(|| other.mailbox.clone())
    }

    /// Union of two sets. Both must share `is_uid`, and if both are bound to
    /// a mailbox, it must be the same mailbox.
    pub fn union(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().copied());
        Ok(Self {
            segments: canonicalize_segments(segments),
            is_uid: self.is_uid,
            mailbox: self.combined_mailbox(other),
        })
    }

    /// Intersection of two sets.
    ///
    /// Open-ended (`*`) segments are treated as unbounded above for the
    /// purposes of overlap detection; the result keeps a `*` tail only where
    /// both operands are unbounded over the overlapping region.
    pub fn intersection(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        let mut segments = Vec::new();
        for a in &self.segments {
            for b in &other.segments {
                let low = a.low.max(b.low);
                let high = match (a.high, b.high) {
                    (Bound::Star, Bound::Star) => Bound::Star,
                    (Bound::Star, Bound::Value(h)) | (Bound::Value(h), Bound::Star) => {
                        Bound::Value(h)
                    }
                    (Bound::Value(ha), Bound::Value(hb)) => Bound::Value(ha.min(hb)),
                };
                let fits = match high {
                    Bound::Star => true,
                    Bound::Value(h) => low <= h,
                };
                if fits {
                    segments.push(Segment { low, high });
                }
            }
        }
        let mailbox = self.combined_mailbox(other);
        if segments.is_empty() {
            // Empty intersections are a legal runtime value even though fresh
            // construction forbids them; represent as a zero-segment set.
            return Ok(Self {
                segments: Vec::new(),
                is_uid: self.is_uid,
                mailbox,
            });
        }
        Ok(Self {
            segments: canonicalize_segments(segments),
            is_uid: self.is_uid,
            mailbox,
        })
    }

    /// Difference `self \ other`.
    ///
    /// `*`-tailed segments in `other` are only honored against a matching
    /// `*`-tailed segment in `self`; a finite `self` segment is never assumed
    /// to extend past its explicit bound even if `other`'s tail is open.
    pub fn difference(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        let mut remaining = self.segments.clone();
        for sub in &other.segments {
            let mut next = Vec::new();
            for seg in remaining {
                next.extend(subtract_segment(seg, *sub));
            }
            remaining = next;
        }
        let mailbox = self.combined_mailbox(other);
        Ok(Self {
            segments: canonicalize_segments(remaining),
            is_uid: self.is_uid,
            mailbox,
        })
    }

    /// Splits this set into successive sets each covering at most `batch_size`
    /// members. A trailing open-ended segment becomes its own final batch.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` is 0.
    #[must_use]
    pub fn iter_batches(&self, batch_size: u32) -> Vec<Self> {
        assert!(batch_size > 0, "batch_size must be >= 1");
        let mut batches: Vec<Self> = Vec::new();
        let mut current: Vec<Segment> = Vec::new();
        let mut current_count: u64 = 0;
        let flush = |current: &mut Vec<Segment>, out: &mut Vec<Self>, is_uid: bool, mailbox: &Option<Mailbox>| {
            if !current.is_empty() {
                out.push(Self {
                    segments: std::mem::take(current),
                    is_uid,
                    mailbox: mailbox.clone(),
                });
            }
        };

        for seg in &self.segments {
            match seg.high {
                Bound::Star => {
                    flush(&mut current, &mut batches, self.is_uid, &self.mailbox);
                    current_count = 0;
                    batches.push(Self {
                        segments: vec![*seg],
                        is_uid: self.is_uid,
                        mailbox: self.mailbox.clone(),
                    });
                }
                Bound::Value(h) => {
                    let mut low = seg.low;
                    while low <= h {
                        let remaining_in_batch = u64::from(batch_size) - current_count;
                        let span = u64::from(h) - u64::from(low) + 1;
                        let take = remaining_in_batch.min(span);
                        #[allow(clippy::cast_possible_truncation)]
                        let take_u32 = take as u32;
                        let sub_high = low + take_u32 - 1;
                        current.push(Segment {
                            low,
                            high: Bound::Value(sub_high),
                        });
                        current_count += take;
                        if current_count >= u64::from(batch_size) {
                            flush(&mut current, &mut batches, self.is_uid, &self.mailbox);
                            current_count = 0;
                        }
                        low = sub_high + 1;
                    }
                }
            }
        }
        flush(&mut current, &mut batches, self.is_uid, &self.mailbox);
        batches
    }

    /// Splits this set on segment boundaries (not id boundaries) so that each
    /// resulting set has at most `max_segments` segments.
    ///
    /// # Panics
    ///
    /// Panics if `max_segments` is 0.
    #[must_use]
    pub fn split_by_size(&self, max_segments: usize) -> Vec<Self> {
        assert!(max_segments > 0, "max_segments must be >= 1");
        self.segments
            .chunks(max_segments)
            .map(|chunk| Self {
                segments: chunk.to_vec(),
                is_uid: self.is_uid,
                mailbox: self.mailbox.clone(),
            })
            .collect()
    }
}

impl fmt::Display for MessageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.segments.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join(","))
    }
}

fn coalesce(values: Vec<(u32, Bound)>) -> Vec<Segment> {
    canonicalize_segments(
        values
            .into_iter()
            .map(|(v, _)| Segment {
                low: v,
                high: Bound::Value(v),
            })
            .collect(),
    )
}

/// Sorts segments and merges any that are adjacent or overlapping.
fn canonicalize_segments(mut segments: Vec<Segment>) -> Vec<Segment> {
    segments.sort_by_key(|seg| seg.low);
    let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());
    for seg in segments {
        if let Some(last) = merged.last_mut() {
            let adjacent_or_overlapping = match last.high {
                Bound::Star => true,
                Bound::Value(h) => seg.low <= h.saturating_add(1),
            };
            if adjacent_or_overlapping {
                last.high = match (last.high, seg.high) {
                    (Bound::Star, _) | (_, Bound::Star) => Bound::Star,
                    (Bound::Value(a), Bound::Value(b)) => Bound::Value(a.max(b)),
                };
                continue;
            }
        }
        merged.push(seg);
    }
    merged
}

/// Subtracts `sub` from `seg`, producing zero, one, or two remaining segments.
fn subtract_segment(seg: Segment, sub: Segment) -> Vec<Segment> {
    let sub_covers_all = match (seg.high, sub.high) {
        (_, Bound::Star) => sub.low <= seg.low,
        (Bound::Value(sh), Bound::Value(subh)) => sub.low <= seg.low && subh >= sh,
        (Bound::Star, Bound::Value(_)) => false,
    };
    if sub_covers_all {
        return Vec::new();
    }

    let overlaps = match (seg.high, sub.high) {
        (Bound::Star, _) => true,
        (Bound::Value(sh), Bound::Star) => sub.low <= sh,
        (Bound::Value(sh), Bound::Value(subh)) => sub.low <= sh && subh >= seg.low,
    };
    if !overlaps {
        return vec![seg];
    }

    let mut out = Vec::new();
    if sub.low > seg.low {
        out.push(Segment {
            low: seg.low,
            high: Bound::Value(sub.low - 1),
        });
    }
    if let Bound::Value(subh) = sub.high {
        let new_low = subh + 1;
        let still_valid = match seg.high {
            Bound::Star => true,
            Bound::Value(sh) => new_low <= sh,
        };
        if still_valid {
            out.push(Segment {
                low: new_low,
                high: seg.high,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[u32]) -> MessageSet {
        MessageSet::from_uids(ids, None).unwrap()
    }

    #[test]
    fn empty_construction_fails() {
        assert!(MessageSet::from_uids(&[], None).is_err());
    }

    #[test]
    fn zero_id_fails() {
        assert!(MessageSet::from_uids(&[0, 1], None).is_err());
    }

    #[test]
    fn canonicalizes_consecutive_runs() {
        let s = set(&[1, 2, 3, 5, 6]);
        assert_eq!(s.to_string(), "1:3,5:6");
    }

    #[test]
    fn canonicalizes_out_of_order_duplicates() {
        let s = set(&[5, 1, 3, 1, 2]);
        assert_eq!(s.to_string(), "1:3,5");
    }

    #[test]
    fn from_range_open_ended() {
        let s = MessageSet::from_range(10, None, true, None).unwrap();
        assert_eq!(s.to_string(), "10:*");
        assert!(s.has_open_tail());
    }

    #[test]
    fn from_range_rejects_inverted_bounds() {
        assert!(MessageSet::from_range(10, Some(5), true, None).is_err());
    }

    #[test]
    fn from_string_parses_mixed() {
        let s = MessageSet::from_string("1,3:5,9:*", true, None).unwrap();
        assert_eq!(s.to_string(), "1,3:5,9:*");
    }

    #[test]
    fn union_is_idempotent() {
        let s = set(&[1, 2, 3]);
        assert_eq!(s.union(&s).unwrap(), s);
    }

    #[test]
    fn intersection_is_idempotent() {
        let s = set(&[1, 2, 3]);
        assert_eq!(s.intersection(&s).unwrap(), s);
    }

    #[test]
    fn difference_with_self_is_empty() {
        let s = set(&[1, 2, 3]);
        let diff = s.difference(&s).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn union_merges_adjacent_ranges() {
        let a = set(&[1, 2, 3]);
        let b = set(&[4, 5]);
        assert_eq!(a.union(&b).unwrap().to_string(), "1:5");
    }

    #[test]
    fn intersection_overlapping_ranges() {
        let a = MessageSet::from_range(1, Some(10), true, None).unwrap();
        let b = MessageSet::from_range(5, Some(15), true, None).unwrap();
        assert_eq!(a.intersection(&b).unwrap().to_string(), "5:10");
    }

    #[test]
    fn difference_splits_a_range() {
        let a = MessageSet::from_range(1, Some(10), true, None).unwrap();
        let b = set(&[5]);
        assert_eq!(a.difference(&b).unwrap().to_string(), "1:4,6:10");
    }

    #[test]
    fn mismatched_kind_rejected() {
        let uids = MessageSet::from_uids(&[1], None).unwrap();
        let seqs = MessageSet::from_sequence_numbers(&[1], None).unwrap();
        assert!(uids.union(&seqs).is_err());
    }

    #[test]
    fn mismatched_mailbox_rejected() {
        let a = MessageSet::from_uids(&[1], Some(Mailbox::new("INBOX"))).unwrap();
        let b = MessageSet::from_uids(&[2], Some(Mailbox::new("Archive"))).unwrap();
        assert!(a.union(&b).is_err());
    }

    #[test]
    fn iter_batches_covers_and_partitions() {
        let s = MessageSet::from_range(1, Some(1000), true, None).unwrap();
        let batches = s.iter_batches(100);
        assert_eq!(batches.len(), 10);
        let mut rebuilt = batches[0].clone();
        for b in &batches[1..] {
            rebuilt = rebuilt.union(b).unwrap();
        }
        assert_eq!(rebuilt, s);
        for b in &batches {
            assert!(b.size_lower_bound() <= 100);
        }
    }

    #[test]
    fn iter_batches_keeps_open_tail_as_last_batch() {
        let s = MessageSet::from_string("1:250,300:*", true, None).unwrap();
        let batches = s.iter_batches(100);
        assert!(batches.last().unwrap().has_open_tail());
    }

    #[test]
    fn split_by_size_respects_segment_count() {
        let s = MessageSet::from_string("1,3,5,7,9", true, None).unwrap();
        let parts = s.split_by_size(2);
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn contains_checks_ranges_and_tails() {
        let s = MessageSet::from_string("1:3,10:*", true, None).unwrap();
        assert!(s.contains(2));
        assert!(s.contains(500));
        assert!(!s.contains(5));
    }

    #[test]
    fn to_uid_set_renders_matching_wire_form() {
        let s = MessageSet::from_string("3:4,7", true, None).unwrap();
        assert_eq!(s.to_uid_set().to_string(), "3:4,7");
    }

    #[test]
    fn to_uid_set_single_segment_is_unwrapped() {
        let s = MessageSet::from_string("5", true, None).unwrap();
        assert_eq!(s.to_uid_set().to_string(), "5");
    }

    #[test]
    fn to_sequence_set_renders_matching_wire_form() {
        let s = MessageSet::from_string("1:3", false, None).unwrap();
        assert_eq!(s.to_sequence_set().to_string(), "1:3");
    }

    #[test]
    #[should_panic(expected = "called on a sequence-number MessageSet")]
    fn to_uid_set_panics_on_sequence_number_set() {
        let s = MessageSet::from_string("1:3", false, None).unwrap();
        let _ = s.to_uid_set();
    }

    #[test]
    fn empty_set_has_no_members() {
        let s = MessageSet::empty(true, None);
        assert!(s.is_empty());
        assert_eq!(s.size_lower_bound(), 0);
        assert!(!s.contains(1));
    }

    #[test]
    fn ids_expands_ranges_ascending() {
        let s = MessageSet::from_string("3:4,7", true, None).unwrap();
        assert_eq!(s.ids().unwrap(), vec![3, 4, 7]);
    }

    #[test]
    fn ids_rejects_open_tail() {
        let s = MessageSet::from_string("1:*", true, None).unwrap();
        assert!(s.ids().is_err());
    }
}
