//! Placeholder color and initial-letter collaborator.
//!
//! How colors and letters are derived is up to the host; avatars only ask.

use std::rc::Rc;

use crate::color::Rgb;

/// Derives placeholder visuals for an identity.
pub trait AvatarLogic {
    /// Background color for `key` (an explicit id, or the display name).
    fn color_for(&self, key: &str) -> Rgb;

    /// Representative character(s) for `name`; `None` if nothing suitable.
    fn initial_letter_for(&self, name: &str) -> Option<String>;
}

impl<T: AvatarLogic + ?Sized> AvatarLogic for &T {
    fn color_for(&self, key: &str) -> Rgb {
        (**self).color_for(key)
    }

    fn initial_letter_for(&self, name: &str) -> Option<String> {
        (**self).initial_letter_for(name)
    }
}

impl<T: AvatarLogic + ?Sized> AvatarLogic for Rc<T> {
    fn color_for(&self, key: &str) -> Rgb {
        (**self).color_for(key)
    }

    fn initial_letter_for(&self, name: &str) -> Option<String> {
        (**self).initial_letter_for(name)
    }
}
