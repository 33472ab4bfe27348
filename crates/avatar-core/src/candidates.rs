#![forbid(unsafe_code)]

//! Candidate list construction.
//!
//! Turns a primary URL, an ordered fallback list and the reduced-bandwidth
//! flag into the ordered, deduplicated list of image sources to attempt.
//!
//! # Invariants
//!
//! 1. No URL appears twice; the first (highest-priority) occurrence wins.
//! 2. The primary URL, when present, is always at index 0.
//! 3. Reduced-bandwidth mode yields an empty list regardless of inputs.
//! 4. Identical inputs always produce identical output.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Inline capacity for candidate storage; most avatars carry one or two URLs.
const INLINE_CANDIDATES: usize = 4;

/// Ordered, deduplicated image sources in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CandidateList {
    urls: SmallVec<[String; INLINE_CANDIDATES]>,
}

impl CandidateList {
    /// An empty list (forces the placeholder path).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of candidates.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether there is nothing to attempt.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Candidate at `index`, or `None` past the end.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.urls.get(index).map(String::as_str)
    }

    /// Highest-priority candidate.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.get(0)
    }

    /// Iterate candidates in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.urls.iter().map(String::as_str)
    }

    /// Candidates as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.iter()
    }
}

/// Build the candidate list for an avatar.
///
/// The primary URL is placed first, followed by `fallbacks` in the order
/// given. Later duplicates are dropped. When `reduced_bandwidth` is set the
/// result is always empty so that no network image is attempted.
#[must_use]
pub fn build_candidates<S: AsRef<str>>(
    primary: Option<&str>,
    fallbacks: Option<&[S]>,
    reduced_bandwidth: bool,
) -> CandidateList {
    if reduced_bandwidth {
        return CandidateList::empty();
    }

    let fallbacks = fallbacks.unwrap_or(&[]);
    let ordered = primary
        .into_iter()
        .chain(fallbacks.iter().map(|url| url.as_ref()));

    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut urls = SmallVec::new();
    for url in ordered {
        if seen.insert(url) {
            urls.push(url.to_owned());
        }
    }
    CandidateList { urls }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn primary_first_then_fallbacks_deduplicated() {
        let fallbacks = list(&["B", "A", "C"]);
        let built = build_candidates(Some("A"), Some(fallbacks.as_slice()), false);
        assert_eq!(built.as_slice(), list(&["A", "B", "C"]).as_slice());
    }

    #[test]
    fn duplicate_fallbacks_collapse() {
        let built = build_candidates(None, Some(&["A", "A"][..]), false);
        assert_eq!(built.as_slice(), list(&["A"]).as_slice());
    }

    #[test]
    fn reduced_bandwidth_is_always_empty() {
        let built = build_candidates(Some("A"), Some(&["B", "C"][..]), true);
        assert!(built.is_empty());
        let built = build_candidates::<&str>(None, None, true);
        assert!(built.is_empty());
    }

    #[test]
    fn no_inputs_is_empty() {
        let built = build_candidates::<String>(None, None, false);
        assert!(built.is_empty());
        assert_eq!(built.first(), None);
    }

    #[test]
    fn primary_only() {
        let built = build_candidates::<&str>(Some("A"), None, false);
        assert_eq!(built.len(), 1);
        assert_eq!(built.first(), Some("A"));
    }

    #[test]
    fn empty_string_is_a_candidate() {
        // Empty strings are passed through untouched; validating URLs is the host's job.
        let built = build_candidates(Some(""), Some(&["", "B"][..]), false);
        assert_eq!(built.as_slice(), list(&["", "B"]).as_slice());
    }

    #[test]
    fn get_past_end_is_none() {
        let built = build_candidates(Some("A"), Some(&["B"][..]), false);
        assert_eq!(built.get(1), Some("B"));
        assert_eq!(built.get(2), None);
        assert_eq!(built.get(usize::MAX), None);
    }

    #[test]
    fn iter_in_priority_order() {
        let built = build_candidates(Some("A"), Some(&["B", "C"][..]), false);
        assert_eq!(built.iter().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!((&built).into_iter().count(), 3);
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let fallbacks = list(&["x", "y", "x", "z", "y"]);
        let a = build_candidates(Some("y"), Some(fallbacks.as_slice()), false);
        let b = build_candidates(Some("y"), Some(fallbacks.as_slice()), false);
        assert_eq!(a, b);
        assert_eq!(a.as_slice(), list(&["y", "x", "z"]).as_slice());
    }
}
