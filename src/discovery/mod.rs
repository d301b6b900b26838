//! Topic-driven discovery of sources and illustrative media.
//!
//! Both discoverers run several searches with fallbacks and never fail: a
//! search error degrades to an empty (or placeholder) result so a report
//! can still go ahead.

mod graphics;
mod sources;

pub use graphics::{
    DEFAULT_GRAPHICS_COUNT, Graphic, GraphicKind, PLACEHOLDER_THUMBNAIL, PLACEHOLDER_URL,
    discover_graphics, extract_ark,
};
pub use sources::{Source, discover_sources};
