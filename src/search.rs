//! Fluent builder for IMAP `SEARCH` criteria.
//!
//! [`SearchCriteriaBuilder`] wraps [`SearchCriteria`] so callers compose
//! search expressions without hand-nesting `And`/`Or`/`Not` variants. N-ary
//! `and`/`or` calls fold down to the binary/list wire representation that
//! [`crate::command::serialize::write_search_criteria`] expects: `And` is an
//! implicit space-joined list, `Or` right-folds a chain of criteria into
//! nested pairs (`(OR a (OR b c))`).

use crate::command::SearchCriteria;
use crate::types::{SequenceSet, UidSet};

/// Builder for [`SearchCriteria`] expressions.
///
/// Each method returns `Self` so calls chain; [`Self::build`] produces the
/// final [`SearchCriteria`] tree.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteriaBuilder {
    terms: Vec<SearchCriteria>,
}

impl SearchCriteriaBuilder {
    /// Creates an empty builder. [`Self::build`] on an empty builder
    /// produces `SearchCriteria::All`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, criteria: SearchCriteria) -> Self {
        self.terms.push(criteria);
        self
    }

    /// Matches all messages.
    #[must_use]
    pub fn all(self) -> Self {
        self.push(SearchCriteria::All)
    }

    /// Matches messages with the `\Seen` flag.
    #[must_use]
    pub fn seen(self) -> Self {
        self.push(SearchCriteria::Seen)
    }

    /// Matches messages without the `\Seen` flag.
    #[must_use]
    pub fn unseen(self) -> Self {
        self.push(SearchCriteria::Unseen)
    }

    /// Matches messages with the `\Answered` flag.
    #[must_use]
    pub fn answered(self) -> Self {
        self.push(SearchCriteria::Answered)
    }

    /// Matches messages without the `\Answered` flag.
    #[must_use]
    pub fn unanswered(self) -> Self {
        self.push(SearchCriteria::Unanswered)
    }

    /// Matches messages with the `\Flagged` flag.
    #[must_use]
    pub fn flagged(self) -> Self {
        self.push(SearchCriteria::Flagged)
    }

    /// Matches messages without the `\Flagged` flag.
    #[must_use]
    pub fn unflagged(self) -> Self {
        self.push(SearchCriteria::Unflagged)
    }

    /// Matches messages with the `\Deleted` flag.
    #[must_use]
    pub fn deleted(self) -> Self {
        self.push(SearchCriteria::Deleted)
    }

    /// Matches messages without the `\Deleted` flag.
    #[must_use]
    pub fn undeleted(self) -> Self {
        self.push(SearchCriteria::Undeleted)
    }

    /// Matches messages with the `\Draft` flag.
    #[must_use]
    pub fn draft(self) -> Self {
        self.push(SearchCriteria::Draft)
    }

    /// Matches the `FROM` header against `text`.
    #[must_use]
    pub fn from(self, text: impl Into<String>) -> Self {
        self.push(SearchCriteria::From(text.into()))
    }

    /// Matches the `TO` header against `text`.
    #[must_use]
    pub fn to(self, text: impl Into<String>) -> Self {
        self.push(SearchCriteria::To(text.into()))
    }

    /// Matches the `CC` header against `text`.
    #[must_use]
    pub fn cc(self, text: impl Into<String>) -> Self {
        self.push(SearchCriteria::Cc(text.into()))
    }

    /// Matches the `BCC` header against `text`.
    #[must_use]
    pub fn bcc(self, text: impl Into<String>) -> Self {
        self.push(SearchCriteria::Bcc(text.into()))
    }

    /// Matches the `SUBJECT` header against `text`.
    #[must_use]
    pub fn subject(self, text: impl Into<String>) -> Self {
        self.push(SearchCriteria::Subject(text.into()))
    }

    /// Matches message body text.
    #[must_use]
    pub fn body(self, text: impl Into<String>) -> Self {
        self.push(SearchCriteria::Body(text.into()))
    }

    /// Matches header or body text.
    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.push(SearchCriteria::Text(text.into()))
    }

    /// Matches an arbitrary header field against `value`.
    #[must_use]
    pub fn header(self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(SearchCriteria::Header(field.into(), value.into()))
    }

    /// Matches messages with `INTERNALDATE` on `date` (pre-formatted
    /// `DD-Mon-YYYY`).
    #[must_use]
    pub fn on(self, date: impl Into<String>) -> Self {
        self.push(SearchCriteria::On(date.into()))
    }

    /// Matches messages with `INTERNALDATE` before `date`.
    #[must_use]
    pub fn before(self, date: impl Into<String>) -> Self {
        self.push(SearchCriteria::Before(date.into()))
    }

    /// Matches messages with `INTERNALDATE` since `date`.
    #[must_use]
    pub fn since(self, date: impl Into<String>) -> Self {
        self.push(SearchCriteria::Since(date.into()))
    }

    /// Matches messages larger than `size` bytes.
    #[must_use]
    pub fn larger(self, size: u32) -> Self {
        self.push(SearchCriteria::Larger(size))
    }

    /// Matches messages smaller than `size` bytes.
    #[must_use]
    pub fn smaller(self, size: u32) -> Self {
        self.push(SearchCriteria::Smaller(size))
    }

    /// Restricts to a sequence-number set.
    #[must_use]
    pub fn sequence_set(self, set: SequenceSet) -> Self {
        self.push(SearchCriteria::SequenceSet(set))
    }

    /// Restricts to a UID set.
    #[must_use]
    pub fn uid_set(self, set: UidSet) -> Self {
        self.push(SearchCriteria::UidSet(set))
    }

    /// Adds an arbitrary pre-built criterion (escape hatch for variants not
    /// exposed as a dedicated builder method, e.g. `ModSeq`).
    #[must_use]
    pub fn criterion(self, criteria: SearchCriteria) -> Self {
        self.push(criteria)
    }

    /// Adds the negation of a sub-expression built with `f`.
    #[must_use]
    pub fn not(self, f: impl FnOnce(Self) -> Self) -> Self {
        let inner = f(Self::new()).build();
        self.push(SearchCriteria::Not(Box::new(inner)))
    }

    /// Adds an OR of the sub-expressions built by each closure in `branches`.
    ///
    /// `Or` is binary on the wire, so more than two branches right-fold:
    /// `or([a, b, c])` serializes as `OR a (OR b c)`.
    ///
    /// # Panics
    ///
    /// Panics if `branches` is empty; an OR needs at least one alternative.
    #[must_use]
    pub fn or<F>(self, branches: Vec<F>) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        let mut criteria: Vec<SearchCriteria> = branches
            .into_iter()
            .map(|f| f(Self::new()).build())
            .collect();
        assert!(!criteria.is_empty(), "or() requires at least one branch");

        let mut folded = criteria.pop().expect("checked non-empty above");
        while let Some(next) = criteria.pop() {
            folded = SearchCriteria::Or(Box::new(next), Box::new(folded));
        }
        self.push(folded)
    }

    /// Builds the final [`SearchCriteria`].
    ///
    /// An empty builder yields `SearchCriteria::All`. A single term is
    /// returned unwrapped; multiple terms are combined as an implicit,
    /// space-joined `And`.
    #[must_use]
    pub fn build(self) -> SearchCriteria {
        match self.terms.len() {
            0 => SearchCriteria::All,
            1 => self.terms.into_iter().next().expect("len checked above"),
            _ => SearchCriteria::And(self.terms),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::serialize::write_search_criteria;

    fn render(criteria: &SearchCriteria) -> String {
        let mut buf = Vec::new();
        write_search_criteria(&mut buf, criteria);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_empty_builder_is_all() {
        assert_eq!(SearchCriteriaBuilder::new().build(), SearchCriteria::All);
    }

    #[test]
    fn test_single_term_unwrapped() {
        let criteria = SearchCriteriaBuilder::new().unseen().build();
        assert_eq!(criteria, SearchCriteria::Unseen);
    }

    #[test]
    fn test_and_is_space_joined() {
        let criteria = SearchCriteriaBuilder::new()
            .unseen()
            .from("a@b")
            .build();
        assert_eq!(render(&criteria), "UNSEEN FROM \"a@b\"");
    }

    #[test]
    fn test_not_wraps_in_parens() {
        let criteria = SearchCriteriaBuilder::new()
            .not(SearchCriteriaBuilder::deleted)
            .build();
        assert_eq!(render(&criteria), "NOT (DELETED)");
    }

    #[test]
    fn test_or_right_folds_three_branches() {
        let criteria = SearchCriteriaBuilder::new()
            .or(vec![
                (|b: SearchCriteriaBuilder| b.seen()) as fn(_) -> _,
                (|b: SearchCriteriaBuilder| b.flagged()) as fn(_) -> _,
                (|b: SearchCriteriaBuilder| b.deleted()) as fn(_) -> _,
            ])
            .build();
        assert_eq!(render(&criteria), "OR SEEN (OR FLAGGED DELETED)");
    }

    #[test]
    #[should_panic(expected = "at least one branch")]
    fn test_or_requires_branches() {
        let _ = SearchCriteriaBuilder::new().or(Vec::<fn(_) -> _>::new());
    }
}
