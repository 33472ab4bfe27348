#![forbid(unsafe_code)]

//! Injected avatar settings.
//!
//! Settings are passed to avatar state explicitly rather than read from
//! ambient global state. [`AvatarSettings::detect`] is a convenience for
//! hosts that configure through the environment; tests use
//! [`AvatarSettings::from_env_with`] with a custom lookup.

use std::fmt;

/// Environment variable enabling reduced-bandwidth mode (`1/0/true/false`).
pub const ENV_REDUCED_BANDWIDTH: &str = "AVATAR_REDUCED_BANDWIDTH";

/// Settings consumed by avatar resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct AvatarSettings {
    /// Skip all network images and show the placeholder.
    pub reduced_bandwidth: bool,
}

impl AvatarSettings {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reduced_bandwidth: false,
        }
    }

    #[must_use]
    pub const fn reduced_bandwidth(mut self, enabled: bool) -> Self {
        self.reduced_bandwidth = enabled;
        self
    }

    /// Read settings from the process environment, ignoring bad values.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read settings with a custom lookup. Unparsable values fall back to
    /// the default.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::try_from_env_with(get_env).unwrap_or_default()
    }

    /// Read settings with a custom lookup, rejecting unparsable values.
    pub fn try_from_env_with<F>(get_env: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::new();
        if let Some(value) = get_env(ENV_REDUCED_BANDWIDTH) {
            settings.reduced_bandwidth =
                parse_bool(&value).ok_or_else(|| SettingsError::InvalidValue {
                    key: ENV_REDUCED_BANDWIDTH,
                    value,
                })?;
        }
        Ok(settings)
    }

    /// Decode settings from JSON (`{"reducedBandwidth": true}`).
    ///
    /// Missing keys take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(input: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(input).map_err(|err| SettingsError::Decode(err.to_string()))
    }
}

/// Errors loading settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// A variable held something that is not a boolean.
    InvalidValue { key: &'static str, value: String },
    /// Serialized settings could not be decoded.
    #[cfg(feature = "serde")]
    Decode(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value for {key}: {value:?} (expected a boolean)")
            }
            #[cfg(feature = "serde")]
            Self::Decode(msg) => write!(f, "invalid settings: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
