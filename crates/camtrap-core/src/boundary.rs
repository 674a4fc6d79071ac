// ── Region boundary ──
//
// The boundary document only feeds the initial viewport clamp and the
// outline drawn on the map canvas. A missing or broken document degrades
// to an unbounded viewport instead of failing startup.

use std::fs;
use std::path::Path;

use geo::algorithm::bounding_rect::BoundingRect;
use geo::{Geometry, GeometryCollection, Polygon, Rect};
use geojson::GeoJson;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CoreError;
use crate::model::Coordinates;

// ── BoundingBox ─────────────────────────────────────────────────────

/// Axis-aligned box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Clamp a coordinate into the box, axis by axis.
    ///
    /// Edges may arrive in either order from a hand-built or deserialized
    /// box; each axis is clamped between its smaller and larger edge.
    pub fn clamp(&self, point: Coordinates) -> Coordinates {
        Coordinates::new(
            clamp_between(point.latitude, self.south, self.north),
            clamp_between(point.longitude, self.west, self.east),
        )
    }
}

/// `f64::clamp` panics on `min > max` or NaN edges; this never does.
fn clamp_between(value: f64, a: f64, b: f64) -> f64 {
    value.max(a.min(b)).min(a.max(b))
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        // geo uses x = longitude, y = latitude
        Self {
            south: rect.min().y,
            west: rect.min().x,
            north: rect.max().y,
            east: rect.max().x,
        }
    }
}

// ── RegionGeometry ──────────────────────────────────────────────────

/// Parsed boundary polygons and their bounding box.
#[derive(Debug, Clone, Default)]
pub struct RegionGeometry {
    geometry: Option<GeometryCollection<f64>>,
    bounds: Option<BoundingBox>,
}

impl RegionGeometry {
    /// No boundary known: the viewport is not clamped.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn from_geometry(geometry: GeometryCollection<f64>) -> Self {
        let bounds = geometry.bounding_rect().map(BoundingBox::from);
        Self {
            geometry: Some(geometry),
            bounds,
        }
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    pub fn is_bounded(&self) -> bool {
        self.bounds.is_some()
    }

    /// Exterior rings of every polygon as `(longitude, latitude)` paths.
    pub fn outline(&self) -> Vec<Vec<(f64, f64)>> {
        let Some(collection) = &self.geometry else {
            return Vec::new();
        };
        let mut rings = Vec::new();
        for geometry in &collection.0 {
            match geometry {
                Geometry::Polygon(p) => rings.push(ring(p)),
                Geometry::MultiPolygon(mp) => rings.extend(mp.0.iter().map(ring)),
                _ => {}
            }
        }
        rings
    }
}

fn ring(polygon: &Polygon<f64>) -> Vec<(f64, f64)> {
    polygon.exterior().0.iter().map(|c| (c.x, c.y)).collect()
}

// ── Loading ─────────────────────────────────────────────────────────

/// Parse a GeoJSON Geometry, Feature or FeatureCollection.
pub fn load_boundary(path: &Path) -> Result<RegionGeometry, CoreError> {
    let content = fs::read_to_string(path).map_err(|e| boundary_error(path, e))?;
    let geojson: GeoJson = content.parse().map_err(|e| boundary_error(path, e))?;

    let values: Vec<geojson::Value> = match geojson {
        GeoJson::Geometry(g) => vec![g.value],
        GeoJson::Feature(f) => f.geometry.map(|g| g.value).into_iter().collect(),
        GeoJson::FeatureCollection(fc) => fc
            .features
            .into_iter()
            .filter_map(|f| f.geometry.map(|g| g.value))
            .collect(),
    };

    let geometries = values
        .into_iter()
        .map(Geometry::<f64>::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| boundary_error(path, e))?;

    let region = RegionGeometry::from_geometry(GeometryCollection(geometries));
    let Some(bounds) = region.bounds() else {
        return Err(boundary_error(path, "document contains no coordinates"));
    };

    info!(
        path = %path.display(),
        south = bounds.south,
        west = bounds.west,
        north = bounds.north,
        east = bounds.east,
        "region boundary loaded"
    );
    Ok(region)
}

/// [`load_boundary`], falling back to an unbounded viewport on failure.
pub fn load_boundary_or_unbounded(path: &Path) -> RegionGeometry {
    load_boundary(path).unwrap_or_else(|e| {
        warn!(error = %e, "continuing without region boundary");
        RegionGeometry::unbounded()
    })
}

fn boundary_error(path: &Path, reason: impl ToString) -> CoreError {
    CoreError::BoundaryLoad {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
