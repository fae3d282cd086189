//! Vector road map rendering: fixed-point projection, viewport clipping and
//! a batching draw pipeline that feeds an abstract canvas backend.

pub mod braille;
pub mod config;
pub mod data;
pub mod error;
pub mod geo;
pub mod map;
pub mod style;

pub use braille::BrailleLayers;
pub use config::{DisplaySettings, RenderConfig};
pub use error::MapError;
pub use geo::{Area, GeoPosition, GuiPoint};
pub use map::{MapRenderer, ProjectionContext, RefreshControl, RoadMap};
pub use style::StyleSheet;
