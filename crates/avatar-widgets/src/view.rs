#![forbid(unsafe_code)]

//! Render output of the avatar widget.
//!
//! An [`AvatarView`] describes one of three outcomes: an image to load, a
//! placeholder box, or nothing. Hosts map these onto their own element
//! types; image load errors go back through
//! [`AvatarState::handle`](crate::AvatarState::handle).

use std::fmt;
use std::rc::Rc;

use avatar_style::{InlineStyle, Rgb};

/// Click callback for interactive avatars.
pub type ClickHandler = Rc<dyn Fn()>;

/// Whether the rendered element is a control or decoration.
#[derive(Clone)]
pub enum Interaction {
    /// Focusable button labelled for assistive technology.
    Interactive { on_click: ClickHandler, label: String },
    /// Decorative only; hidden from assistive technology.
    Presentational,
}

impl Interaction {
    /// Interactive iff a click handler is present.
    #[must_use]
    pub fn from_handler(on_click: Option<&ClickHandler>, label: &str) -> Self {
        match on_click {
            Some(on_click) => Self::Interactive {
                on_click: Rc::clone(on_click),
                label: label.to_owned(),
            },
            None => Self::Presentational,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive { .. })
    }

    /// ARIA role, if any.
    #[must_use]
    pub fn role(&self) -> Option<&'static str> {
        match self {
            Self::Interactive { .. } => Some("button"),
            Self::Presentational => None,
        }
    }

    /// Tab index for keyboard focus (`0` for controls).
    #[must_use]
    pub fn tab_index(&self) -> Option<i32> {
        self.is_interactive().then_some(0)
    }

    #[must_use]
    pub fn aria_hidden(&self) -> bool {
        !self.is_interactive()
    }

    /// Accessible label of an interactive element.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Interactive { label, .. } => Some(label.as_str()),
            Self::Presentational => None,
        }
    }

    /// Invoke the click handler. Returns `false` for presentational elements.
    pub fn click(&self) -> bool {
        match self {
            Self::Interactive { on_click, .. } => {
                on_click();
                true
            }
            Self::Presentational => false,
        }
    }
}

impl fmt::Debug for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interactive { label, .. } => f
                .debug_struct("Interactive")
                .field("label", label)
                .finish_non_exhaustive(),
            Self::Presentational => f.write_str("Presentational"),
        }
    }
}

/// An image to load from `src`.
#[derive(Debug, Clone)]
pub struct ImageElement {
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub class_name: String,
    pub title: Option<String>,
    pub style: InlineStyle,
    pub interaction: Interaction,
}

/// A colored box with an initial letter.
#[derive(Debug, Clone)]
pub struct PlaceholderElement {
    /// Letter to draw; `None` draws the bare background.
    pub letter: Option<String>,
    pub background: Rgb,
    pub width: u32,
    pub height: u32,
    pub class_name: String,
    pub title: Option<String>,
    pub style: InlineStyle,
    pub interaction: Interaction,
}

/// What an avatar should display right now.
#[derive(Debug, Clone)]
pub enum AvatarView {
    Image(ImageElement),
    Placeholder(PlaceholderElement),
    /// Nothing resolved and the placeholder is disabled.
    Empty,
}

impl AvatarView {
    /// Image source being attempted.
    #[must_use]
    pub fn src(&self) -> Option<&str> {
        match self {
            Self::Image(image) => Some(image.src.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    #[must_use]
    pub fn interaction(&self) -> Option<&Interaction> {
        match self {
            Self::Image(image) => Some(&image.interaction),
            Self::Placeholder(placeholder) => Some(&placeholder.interaction),
            Self::Empty => None,
        }
    }

    #[must_use]
    pub fn style(&self) -> Option<&InlineStyle> {
        match self {
            Self::Image(image) => Some(&image.style),
            Self::Placeholder(placeholder) => Some(&placeholder.style),
            Self::Empty => None,
        }
    }

    /// Forward a click. Returns whether a handler ran.
    pub fn click(&self) -> bool {
        self.interaction().is_some_and(Interaction::click)
    }
}
