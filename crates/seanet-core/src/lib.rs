#![forbid(unsafe_code)]

//! Core: glyph atlas, SDF instance math, background field, text extraction,
//! grid layout engines, and the session that ties them together.

pub mod assets;
pub mod atlas;
pub mod background;
pub mod config;
pub mod content;
pub mod error;
pub mod grid;
pub mod layout;
pub mod orbit;
pub mod placement;
pub mod sdf;
pub mod session;
pub mod text;

pub use atlas::{AtlasMetrics, CharTransform, GlyphAtlas, GlyphDescriptor};
pub use config::{ContentMode, PlacementKind, SceneConfig};
pub use error::{AssetKind, AtlasLoadError, ConfigError, SeaError};
pub use placement::{CharacterPlacement, DrawCommand, FrameInput};
pub use session::Session;
pub use text::TextBuffer;
