pub mod batch;
pub mod canvas;
pub mod clip;
pub mod line;
pub mod polygon;
pub mod projection;
pub mod refresh;
pub mod renderer;
pub mod spatial;
pub mod transform;
pub mod trig;
pub mod units;

pub use batch::{BatchState, DrawBatch, ProjectionAreas, Target, Texture, Vertex};
pub use canvas::Canvas;
pub use line::{LabelInfo, LinePath};
pub use projection::{ProjectionContext, MAX_ZOOM_OUT, MIN_ZOOM_IN, REFERENCE_ZOOM};
pub use refresh::RefreshControl;
pub use renderer::{HighlightPlugin, LinePlugin, MapLabel, MapRenderer, NoPlugin, RepaintStats};
pub use spatial::{LineId, LineStore, MapPolygon, RoadMap, RoadMapBuilder, TileId, TileIndex};
pub use transform::RotationCache;
