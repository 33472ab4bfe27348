//! Inline style declarations and pixel formatting.
//!
//! An [`InlineStyle`] is an ordered list of CSS declarations. Setting a
//! property that already exists replaces its value in place, so merging
//! caller overrides over computed styles keeps a stable declaration order.

use std::borrow::Cow;
use std::fmt;

use crate::color::Rgb;

/// Placeholder font size as a fraction of the avatar width.
pub const FONT_SCALE: f64 = 0.65;

/// Format a length in CSS pixels.
///
/// Values are rounded to two decimals; integral values print without a
/// fractional part (`40px`, `26.65px`). Non-finite values format as `0px`.
#[must_use]
pub fn to_px(value: impl Into<f64>) -> String {
    let value = value.into();
    if !value.is_finite() {
        return "0px".to_owned();
    }
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid "-0px".
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded}px")
}

type Property = Cow<'static, str>;

/// Ordered CSS declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(Property, String)>,
}

impl InlineStyle {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            declarations: Vec::new(),
        }
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, property: impl Into<Property>, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    /// Set `property`, replacing an existing value in place.
    pub fn set(&mut self, property: impl Into<Property>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        match self.declarations.iter_mut().find(|(p, _)| *p == property) {
            Some((_, existing)) => *existing = value,
            None => self.declarations.push((property, value)),
        }
    }

    /// Value of `property`, if declared.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Apply every declaration of `overrides` on top of `self`.
    pub fn merge(&mut self, overrides: &InlineStyle) {
        for (property, value) in &overrides.declarations {
            self.set(property.clone(), value.clone());
        }
    }

    /// `self` with `overrides` applied.
    #[must_use]
    pub fn merged(mut self, overrides: &InlineStyle) -> Self {
        self.merge(overrides);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.declarations
            .iter()
            .map(|(p, v)| (p.as_ref(), v.as_str()))
    }
}

impl fmt::Display for InlineStyle {
    /// CSS text, e.g. `width: 40px; height: 40px`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (property, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{property}: {value}")?;
        }
        Ok(())
    }
}

/// Width and height declarations.
#[must_use]
pub fn sized_style(width: u32, height: u32) -> InlineStyle {
    InlineStyle::new()
        .with("width", to_px(width))
        .with("height", to_px(height))
}

/// Placeholder box: background, size, and a letter scaled to the width.
#[must_use]
pub fn placeholder_style(width: u32, height: u32, background: Rgb) -> InlineStyle {
    InlineStyle::new()
        .with("background-color", background.to_hex())
        .with("width", to_px(width))
        .with("height", to_px(height))
        .with("font-size", to_px(f64::from(width) * FONT_SCALE))
        .with("line-height", to_px(height))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn font_size_is_scaled_width(width in 0u32..10_000, height in 0u32..10_000) {
            let style = placeholder_style(width, height, Rgb::default());
            let expected = to_px(f64::from(width) * FONT_SCALE);
            prop_assert_eq!(style.get("font-size"), Some(expected.as_str()));
        }

        #[test]
        fn integral_px_has_no_fraction(value in 0u32..1_000_000) {
            prop_assert_eq!(to_px(value), format!("{value}px"));
        }
    }
}
