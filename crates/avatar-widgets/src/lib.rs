#![forbid(unsafe_code)]

//! Avatar widgets.

pub mod avatar;
pub mod view;

pub use avatar::{AvatarEvent, AvatarState, BaseAvatar, ResizeMethod};
pub use view::{AvatarView, ClickHandler, ImageElement, Interaction, PlaceholderElement};

/// A widget that renders from mutable state.
///
/// Rendering may update the state: props are reconciled into it before the
/// view is derived, so the same state must be passed on every render of one
/// widget instance.
pub trait StatefulWidget {
    type State;
    type Output;

    /// Reconcile props into `state` and describe what to display.
    fn render(&self, state: &mut Self::State) -> Self::Output;
}
