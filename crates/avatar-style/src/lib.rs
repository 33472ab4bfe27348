#![forbid(unsafe_code)]

//! Style primitives for avatar rendering: colors, inline declarations, and
//! the placeholder/initial-letter collaborator.

pub mod color;
pub mod logic;
pub mod style;

pub use color::Rgb;
pub use logic::AvatarLogic;
pub use style::{FONT_SCALE, InlineStyle, placeholder_style, sized_style, to_px};
