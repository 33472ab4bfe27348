#![forbid(unsafe_code)]

//! Avatar public facade crate.
//!
//! Re-exports the types most hosts need from the internal crates and offers
//! a small prelude.
//!
//! ```
//! use std::rc::Rc;
//!
//! use avatar::prelude::*;
//!
//! struct Logic;
//!
//! impl AvatarLogic for Logic {
//!     fn color_for(&self, _key: &str) -> Rgb {
//!         Rgb::from_u24(0x0dbd8b)
//!     }
//!
//!     fn initial_letter_for(&self, name: &str) -> Option<String> {
//!         name.chars().next().map(|c| c.to_uppercase().collect())
//!     }
//! }
//!
//! let notifier = Rc::new(LocalNotifier::new());
//! let fallbacks = vec!["https://example.org/b.png".to_string()];
//! let avatar = BaseAvatar::new("alice", &Logic)
//!     .url("https://example.org/a.png")
//!     .urls(&fallbacks);
//!
//! let mut state = AvatarState::new(AvatarSettings::detect());
//! state.activate(notifier.clone());
//!
//! let view = avatar.render(&mut state);
//! if !state.settings().reduced_bandwidth {
//!     assert_eq!(view.src(), Some("https://example.org/a.png"));
//! }
//! ```

// --- Core re-exports -------------------------------------------------------

pub use avatar_core::{
    AvatarSettings, AvatarSources, CandidateList, ConnectivityNotifier, ConnectivitySubscription,
    ListenerId, LocalNotifier, Resolver, SettingsError, SyncListener, SyncState, SyncTransition,
    build_candidates,
};

// --- Style re-exports ------------------------------------------------------

pub use avatar_style::{AvatarLogic, InlineStyle, Rgb};

// --- Widget re-exports -----------------------------------------------------

pub use avatar_widgets::{
    AvatarEvent, AvatarState, AvatarView, BaseAvatar, ClickHandler, ImageElement, Interaction,
    PlaceholderElement, ResizeMethod, StatefulWidget,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AvatarEvent, AvatarLogic, AvatarSettings, AvatarState, AvatarView, BaseAvatar,
        ConnectivityNotifier, InlineStyle, LocalNotifier, Rgb, StatefulWidget, SyncState,
    };

    pub use crate::{core, style, widgets};
}

pub use avatar_core as core;
pub use avatar_style as style;
pub use avatar_widgets as widgets;
