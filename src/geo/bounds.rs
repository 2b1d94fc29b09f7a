//! Map Bounds Module
//!
//! Fits a set of coordinates into a single map viewport (center + zoom).

use serde::Serialize;

/// Smallest margin in degrees added around the bounding box, so coincident
/// points still get a non-degenerate viewport.
pub const MARGIN_FLOOR: f64 = 0.001;

/// Share of each axis span added as margin on both sides.
pub const MARGIN_RATIO: f64 = 0.1;

/// Zoom used when all points collapse onto a single location.
pub const FINEST_ZOOM: u8 = 15;

/// Zoom for the fallback viewport when nothing has coordinates.
pub const FALLBACK_ZOOM: u8 = 5;

/// Geographic centroid of Japan, used when no bookmark is located.
pub const FALLBACK_CENTER: Coordinate = Coordinate {
    latitude: 36.2048,
    longitude: 138.2529,
};

/// Largest padded span (degrees) first: the first threshold the span
/// reaches decides the zoom, anything smaller gets [`FINEST_ZOOM`].
const ZOOM_STEPS: [(f64, u8); 9] = [
    (10.0, 6),
    (5.0, 7),
    (2.0, 8),
    (1.0, 9),
    (0.5, 10),
    (0.2, 11),
    (0.1, 12),
    (0.05, 13),
    (0.02, 14),
];

// == Coordinate ==
/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

// == Has Coordinates ==
/// Anything that may sit on the map.
pub trait HasCoordinates {
    fn latitude(&self) -> Option<f64>;
    fn longitude(&self) -> Option<f64>;

    /// Both coordinates, if both are present and finite.
    fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude(), self.longitude()) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(Coordinate::new(lat, lng))
            }
            _ => None,
        }
    }
}

impl<T: HasCoordinates + ?Sized> HasCoordinates for &T {
    fn latitude(&self) -> Option<f64> {
        (**self).latitude()
    }

    fn longitude(&self) -> Option<f64> {
        (**self).longitude()
    }
}

// == Geo Point ==
/// A bare point whose coordinates may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeoPoint {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    pub fn unlocated() -> Self {
        Self::default()
    }
}

impl HasCoordinates for GeoPoint {
    fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    fn longitude(&self) -> Option<f64> {
        self.longitude
    }
}

// == Viewport ==
/// Where to center the map and how far to zoom in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

impl Viewport {
    /// The default view for a map with nothing on it.
    pub fn fallback() -> Self {
        Self {
            center: FALLBACK_CENTER,
            zoom: FALLBACK_ZOOM,
        }
    }
}

// == Zoom For Span ==
/// Maps the largest padded span in degrees to a zoom level.
pub fn zoom_for_span(max_diff: f64) -> u8 {
    ZOOM_STEPS
        .iter()
        .find(|(threshold, _)| max_diff >= *threshold)
        .map(|(_, zoom)| *zoom)
        .unwrap_or(FINEST_ZOOM)
}

fn margin(span: f64) -> f64 {
    (span * MARGIN_RATIO).max(MARGIN_FLOOR)
}

// == Compute Bounds ==
/// Computes a viewport showing every located point with some margin.
///
/// Points missing either coordinate are ignored. Returns `None` when no
/// point is located; callers usually fall back to [`Viewport::fallback`].
/// Planar math only: no antimeridian or polar handling.
pub fn compute_bounds<I>(points: I) -> Option<Viewport>
where
    I: IntoIterator,
    I::Item: HasCoordinates,
{
    let mut located = points.into_iter().filter_map(|p| p.coordinate());

    let first = located.next()?;
    let (mut min_lat, mut max_lat) = (first.latitude, first.latitude);
    let (mut min_lng, mut max_lng) = (first.longitude, first.longitude);
    let mut count = 1usize;

    for point in located {
        min_lat = min_lat.min(point.latitude);
        max_lat = max_lat.max(point.latitude);
        min_lng = min_lng.min(point.longitude);
        max_lng = max_lng.max(point.longitude);
        count += 1;
    }

    if count == 1 {
        return Some(Viewport {
            center: first,
            zoom: FINEST_ZOOM,
        });
    }

    let lat_margin = margin(max_lat - min_lat);
    let lng_margin = margin(max_lng - min_lng);

    let north = max_lat + lat_margin;
    let south = min_lat - lat_margin;
    let east = max_lng + lng_margin;
    let west = min_lng - lng_margin;

    let center = Coordinate::new((north + south) / 2.0, (east + west) / 2.0);
    let max_diff = (north - south).max(east - west);

    Some(Viewport {
        center,
        zoom: zoom_for_span(max_diff),
    })
}
