//! # Bus Map
//!
//! Consumer side of the fleet snapshots: the marker layer that keeps one map
//! marker per bus, the selection it drives, and the bus list cards shown
//! under the map.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod layer;
pub mod list;
pub mod selection;
pub mod style;
pub mod surface;

pub use layer::{MarkerLayer, RenderStats};
pub use list::BusCard;
pub use selection::Selection;
pub use style::MapStyle;
pub use surface::{LogSurface, MapSurface, Marker, MarkerKey, MarkerKind, MemorySurface};
