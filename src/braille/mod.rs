//! Braille terminal backend: one dot canvas per pen, composited by the UI.

mod canvas;
pub mod geometry;
mod layers;

pub use canvas::BrailleCanvas;
pub use layers::{BrailleLayers, PenInk};
