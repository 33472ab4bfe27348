#![forbid(unsafe_code)]

//! Core: candidate lists, the resolution state machine, connectivity
//! signals, and injected settings for avatar rendering.

pub mod candidates;
pub mod connectivity;
pub mod logging;
pub mod resolution;
pub mod settings;

pub use candidates::{CandidateList, build_candidates};
pub use connectivity::{
    ConnectivityNotifier, ConnectivitySubscription, ListenerId, LocalNotifier, SyncListener,
    SyncState, SyncTransition,
};
pub use resolution::{AvatarSources, Resolver};
pub use settings::{AvatarSettings, SettingsError};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, trace_span};
