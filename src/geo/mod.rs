//! Geo Module
//!
//! Map viewport fitting for located bookmarks.

mod bounds;


pub use bounds::{
    compute_bounds, zoom_for_span, Coordinate, GeoPoint, HasCoordinates, Viewport,
    FALLBACK_CENTER, FALLBACK_ZOOM, FINEST_ZOOM, MARGIN_FLOOR, MARGIN_RATIO,
};
