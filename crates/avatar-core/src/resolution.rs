#![forbid(unsafe_code)]

//! Image-source resolution and retry state machine.
//!
//! A [`Resolver`] owns the candidate list for one avatar and a cursor into
//! it. The cursor names the single URL that should currently be attempted.
//!
//! # Transitions
//!
//! | Event | Effect |
//! |-------|--------|
//! | input change (sources or reduced-bandwidth flag differ) | rebuild list, cursor = 0 |
//! | load failure | cursor += 1, saturating at `len` (exhausted) |
//! | reconnection | cursor = 0, from any state |
//!
//! # Invariants
//!
//! 1. `cursor <= candidates.len()` at all times.
//! 2. `resolved()` is always `candidates[cursor]` or `None`; it is never cached.
//! 3. Events apply strictly in arrival order, so a failure followed by a
//!    reconnection leaves the cursor at 0.
//!
//! Exhaustion is a normal terminal state, not an error. Nothing here logs
//! load failures.

use crate::candidates::{CandidateList, build_candidates};
use crate::connectivity::SyncTransition;

/// The image inputs of an avatar: a primary URL and ordered fallbacks.
///
/// Equality is by value and order-sensitive: reordering the fallbacks is a
/// change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AvatarSources {
    pub primary: Option<String>,
    pub fallbacks: Option<Vec<String>>,
}

impl AvatarSources {
    /// No sources at all.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the primary URL.
    #[must_use]
    pub fn with_primary(mut self, url: impl Into<String>) -> Self {
        self.primary = Some(url.into());
        self
    }

    /// Set the ordered fallback URLs.
    #[must_use]
    pub fn with_fallbacks<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallbacks = Some(urls.into_iter().map(Into::into).collect());
        self
    }

    /// Whether these sources equal the given borrowed parts.
    #[must_use]
    pub fn matches<S: AsRef<str>>(&self, primary: Option<&str>, fallbacks: Option<&[S]>) -> bool {
        if self.primary.as_deref() != primary {
            return false;
        }
        match (self.fallbacks.as_deref(), fallbacks) {
            (None, None) => true,
            (Some(own), Some(other)) => {
                own.len() == other.len() && own.iter().zip(other).all(|(a, b)| a == b.as_ref())
            }
            _ => false,
        }
    }

    /// Candidate list for these sources.
    #[must_use]
    pub fn candidates(&self, reduced_bandwidth: bool) -> CandidateList {
        build_candidates(
            self.primary.as_deref(),
            self.fallbacks.as_deref(),
            reduced_bandwidth,
        )
    }
}

/// Retry state machine over a candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    sources: AvatarSources,
    reduced_bandwidth: bool,
    candidates: CandidateList,
    cursor: usize,
}

impl Resolver {
    /// Build the candidate list and start at the highest-priority source.
    #[must_use]
    pub fn new(sources: AvatarSources, reduced_bandwidth: bool) -> Self {
        let candidates = sources.candidates(reduced_bandwidth);
        crate::trace!(
            candidates = candidates.len(),
            reduced_bandwidth,
            "candidate list built"
        );
        Self {
            sources,
            reduced_bandwidth,
            candidates,
            cursor: 0,
        }
    }

    /// Apply new inputs.
    ///
    /// Rebuilds the list and rewinds the cursor if anything differs from the
    /// stored inputs; otherwise leaves the state untouched. Returns whether a
    /// rebuild happened.
    pub fn on_input_change(&mut self, sources: &AvatarSources, reduced_bandwidth: bool) -> bool {
        if self.sources == *sources && self.reduced_bandwidth == reduced_bandwidth {
            return false;
        }
        *self = Self::new(sources.clone(), reduced_bandwidth);
        true
    }

    /// The attempted image failed to load; move to the next candidate.
    pub fn on_load_failure(&mut self) {
        if self.cursor < self.candidates.len() {
            self.cursor += 1;
        }
    }

    /// Start over from the highest-priority candidate.
    pub fn on_reconnect(&mut self) {
        if self.cursor != 0 {
            crate::debug!(
                previous_cursor = self.cursor,
                candidates = self.candidates.len(),
                "reconnected, retrying from first candidate"
            );
        }
        self.cursor = 0;
    }

    /// Rewind on a reconnection transition. Returns whether it rewound.
    pub fn on_sync_transition(&mut self, transition: SyncTransition) -> bool {
        if !transition.is_reconnection() {
            return false;
        }
        self.on_reconnect();
        true
    }

    /// URL to attempt now, or `None` when there is nothing (left) to try.
    #[inline]
    #[must_use]
    pub fn resolved(&self) -> Option<&str> {
        self.candidates.get(self.cursor)
    }

    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether every candidate has failed (or there were none).
    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.candidates.len()
    }

    #[inline]
    #[must_use]
    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    #[inline]
    #[must_use]
    pub fn sources(&self) -> &AvatarSources {
        &self.sources
    }

    #[inline]
    #[must_use]
    pub fn reduced_bandwidth(&self) -> bool {
        self.reduced_bandwidth
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(AvatarSources::default(), false)
    }
}
