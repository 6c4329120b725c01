#![forbid(unsafe_code)]

//! Error taxonomy shared by the core model and the web front end.
//!
//! None of these errors are allowed to escape a frame callback. Fetch and
//! parse failures freeze the affected feature in its last state; unknown
//! glyphs skip a single cell; a missing render context stops initialisation.

use std::fmt;

/// Which external asset an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// The MSDF atlas image (`<prefix>.png`).
    AtlasImage,
    /// The atlas metrics descriptor (`<prefix>-msdf.json`).
    AtlasMetrics,
    /// The page content JSON.
    PageContent,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtlasImage => write!(f, "atlas image"),
            Self::AtlasMetrics => write!(f, "atlas metrics"),
            Self::PageContent => write!(f, "page content"),
        }
    }
}

/// Failure while turning an atlas descriptor into glyph transforms.
#[derive(Debug)]
pub enum AtlasLoadError {
    /// The descriptor is not valid JSON or misses required fields.
    Parse(serde_json::Error),
    /// The descriptor parsed but describes an unusable atlas.
    Invalid(String),
}

impl fmt::Display for AtlasLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "atlas descriptor parse error: {err}"),
            Self::Invalid(msg) => write!(f, "invalid atlas descriptor: {msg}"),
        }
    }
}

impl std::error::Error for AtlasLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for AtlasLoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Invalid scene configuration.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    /// A field holds a value the engine cannot work with.
    OutOfRange {
        field: &'static str,
        value: f64,
    },
    /// The host's options value could not be turned into JSON.
    Unserializable(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "config parse error: {err}"),
            Self::OutOfRange { field, value } => {
                write!(f, "config field `{field}` out of range: {value}")
            }
            Self::Unserializable(msg) => write!(f, "options are not serializable: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::OutOfRange { .. } | Self::Unserializable(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Top-level error type.
#[derive(Debug)]
pub enum SeaError {
    /// Network failure while fetching an asset.
    AssetFetch { asset: AssetKind, reason: String },
    /// An asset arrived but could not be decoded.
    AssetParse { asset: AssetKind, reason: String },
    /// The character has no glyph in the atlas.
    UnknownGlyph(char),
    /// No graphics context could be obtained. Fatal.
    RenderContextUnavailable(String),
    Config(ConfigError),
}

impl SeaError {
    /// Whether initialisation must stop.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::RenderContextUnavailable(_) | Self::Config(_))
    }
}

impl fmt::Display for SeaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssetFetch { asset, reason } => write!(f, "failed to fetch {asset}: {reason}"),
            Self::AssetParse { asset, reason } => write!(f, "failed to parse {asset}: {reason}"),
            Self::UnknownGlyph(ch) => write!(f, "no glyph for {ch:?}"),
            Self::RenderContextUnavailable(msg) => {
                write!(f, "graphics context unavailable: {msg}")
            }
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SeaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AtlasLoadError> for SeaError {
    fn from(err: AtlasLoadError) -> Self {
        Self::AssetParse {
            asset: AssetKind::AtlasMetrics,
            reason: err.to_string(),
        }
    }
}

impl From<ConfigError> for SeaError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_context_and_config_errors_are_fatal() {
        assert!(SeaError::RenderContextUnavailable("no adapter".into()).is_fatal());
        assert!(
            !SeaError::AssetFetch {
                asset: AssetKind::PageContent,
                reason: "offline".into(),
            }
            .is_fatal()
        );
        assert!(!SeaError::UnknownGlyph('☺').is_fatal());
    }

    #[test]
    fn atlas_errors_surface_as_metrics_parse_errors() {
        let err: SeaError = AtlasLoadError::Invalid("lineHeight must be positive".into()).into();
        match err {
            SeaError::AssetParse { asset, reason } => {
                assert_eq!(asset, AssetKind::AtlasMetrics);
                assert!(reason.contains("lineHeight"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
