// ── View state ──
//
// The single mutable per-session entity. Every change goes through
// `ViewState::apply`, which is pure: it returns the next state or an
// error, and never touches `self`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::boundary::BoundingBox;
use crate::catalog::SiteCatalog;
use crate::error::CoreError;
use crate::model::{Coordinates, MapLayer, Region, SiteId};
use crate::resolver;

/// Assirik camp, the initial map center.
pub const DEFAULT_CENTER: Coordinates = Coordinates::new(12.90427, -12.39464);
pub const DEFAULT_ZOOM: u8 = 8;
/// Zoom applied by the "zoom to region" controls.
pub const REGION_ZOOM: u8 = 13;
/// Fongoli's mean center sits slightly west of its camp cluster.
pub const FONGOLI_LONGITUDE_OFFSET: f64 = 0.0505;
pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 20;

/// User interactions that change the view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    SelectRegion(Region),
    ToggleMarkers(bool),
    ToggleBubbles(bool),
    SetLayer(MapLayer),
    /// Marker label as reported by the map, e.g. `"Site 7"`.
    SelectSite(String),
    ZoomIn,
    ZoomOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub center: Coordinates,
    pub zoom: u8,
    pub active_layer: MapLayer,
    pub show_markers: bool,
    pub show_bubbles: bool,
    pub selected_site: Option<SiteId>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            active_layer: MapLayer::Standard,
            show_markers: false,
            show_bubbles: false,
            selected_site: None,
        }
    }
}

impl ViewState {
    /// Session start state, with the default center clamped into `bounds`.
    pub fn initial(bounds: Option<BoundingBox>) -> Self {
        let mut state = Self::default();
        if let Some(bounds) = bounds {
            state.center = bounds.clamp(state.center);
        }
        state
    }

    /// Compute the state that follows `event`.
    pub fn apply(&self, event: &ViewEvent, catalog: &SiteCatalog) -> Result<Self, CoreError> {
        let mut next = self.clone();
        match event {
            ViewEvent::SelectRegion(region) => {
                next.center = region_center(catalog, *region)?;
                next.zoom = REGION_ZOOM;
            }
            ViewEvent::ToggleMarkers(on) => next.show_markers = *on,
            ViewEvent::ToggleBubbles(on) => next.show_bubbles = *on,
            ViewEvent::SetLayer(layer) => next.active_layer = *layer,
            ViewEvent::SelectSite(label) => {
                let id = resolver::resolve(label)?;
                catalog.get(id)?;
                next.selected_site = Some(id);
            }
            ViewEvent::ZoomIn => next.zoom = self.zoom.saturating_add(1).min(MAX_ZOOM),
            ViewEvent::ZoomOut => next.zoom = self.zoom.saturating_sub(1).max(MIN_ZOOM),
        }
        debug!(?event, zoom = next.zoom, layer = %next.active_layer, "view transition");
        Ok(next)
    }

    /// Degrees of longitude visible at the current zoom.
    pub fn span_degrees(&self) -> f64 {
        360.0 / 2f64.powi(i32::from(self.zoom))
    }
}

/// Arithmetic mean of a region's site coordinates.
///
/// Fongoli's longitude is shifted by [`FONGOLI_LONGITUDE_OFFSET`].
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn region_center(catalog: &SiteCatalog, region: Region) -> Result<Coordinates, CoreError> {
    let (count, lat_sum, lon_sum) = catalog
        .in_region(region)
        .fold((0usize, 0.0, 0.0), |(n, lat, lon), site| {
            (
                n + 1,
                lat + site.coordinates.latitude,
                lon + site.coordinates.longitude,
            )
        });

    if count == 0 {
        return Err(CoreError::EmptyRegion {
            region: region.to_string(),
        });
    }

    let n = count as f64;
    let mut center = Coordinates::new(lat_sum / n, lon_sum / n);
    if region == Region::Fongoli {
        center.longitude += FONGOLI_LONGITUDE_OFFSET;
    }
    Ok(center)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalog::SiteRecord;

    fn record(region: Region, lat: f64, lon: f64) -> SiteRecord {
        SiteRecord {
            region,
            label: String::new(),
            coordinates: Coordinates::new(lat, lon),
            trigger_hours: vec![],
            baboon_count: 0,
        }
    }

    fn catalog() -> SiteCatalog {
        SiteCatalog::from_records([
            record(Region::Assirik, 12.80, -12.70),
            record(Region::Assirik, 12.90, -12.60),
            record(Region::Fongoli, 13.00, -12.60),
            record(Region::Fongoli, 13.10, -12.70),
        ])
    }

    #[test]
    fn defaults() {
        let state = ViewState::default();
        assert_eq!(state.center, DEFAULT_CENTER);
        assert_eq!(state.zoom, 8);
        assert_eq!(state.active_layer, MapLayer::Standard);
        assert!(!state.show_markers);
        assert!(!state.show_bubbles);
        assert_eq!(state.selected_site, None);
    }

    #[test]
    fn initial_center_is_clamped() {
        let bounds = BoundingBox {
            south: 13.0,
            west: -13.0,
            north: 14.0,
            east: -12.5,
        };
        let state = ViewState::initial(Some(bounds));
        assert_eq!(state.center, Coordinates::new(13.0, -12.5));
        assert_eq!(ViewState::initial(None).center, DEFAULT_CENTER);
    }

    #[test]
    fn select_region_assirik_uses_mean() {
        let next = ViewState::default()
            .apply(&ViewEvent::SelectRegion(Region::Assirik), &catalog())
            .unwrap();
        assert_eq!(next.zoom, REGION_ZOOM);
        assert_eq!(next.center.latitude, (12.80 + 12.90) / 2.0);
        assert_eq!(next.center.longitude, (-12.70 + -12.60) / 2.0);
    }

    #[test]
    fn select_region_fongoli_adds_offset() {
        let next = ViewState::default()
            .apply(&ViewEvent::SelectRegion(Region::Fongoli), &catalog())
            .unwrap();
        assert_eq!(next.center.latitude, (13.00 + 13.10) / 2.0);
        assert_eq!(
            next.center.longitude,
            (-12.60 + -12.70) / 2.0 + FONGOLI_LONGITUDE_OFFSET
        );
    }

    #[test]
    fn empty_region_fails_and_keeps_state() {
        let catalog = SiteCatalog::from_records([record(Region::Assirik, 12.8, -12.7)]);
        let state = ViewState::default();
        let result = state.apply(&ViewEvent::SelectRegion(Region::Fongoli), &catalog);
        assert!(matches!(result, Err(CoreError::EmptyRegion { .. })));
        assert_eq!(state, ViewState::default());
    }

    #[test]
    fn toggles_and_layer() {
        let catalog = catalog();
        let state = ViewState::default()
            .apply(&ViewEvent::ToggleMarkers(true), &catalog)
            .unwrap()
            .apply(&ViewEvent::ToggleBubbles(true), &catalog)
            .unwrap()
            .apply(&ViewEvent::SetLayer(MapLayer::Satellite), &catalog)
            .unwrap();
        assert!(state.show_markers);
        assert!(state.show_bubbles);
        assert_eq!(state.active_layer, MapLayer::Satellite);

        let state = state.apply(&ViewEvent::ToggleMarkers(false), &catalog).unwrap();
        assert!(!state.show_markers);
    }

    #[test]
    fn select_site_sets_selection() {
        let next = ViewState::default()
            .apply(&ViewEvent::SelectSite("Site 3".into()), &catalog())
            .unwrap();
        assert_eq!(next.selected_site, Some(SiteId(3)));
    }

    #[test]
    fn select_site_failures() {
        let catalog = catalog();
        let state = ViewState::default();
        assert!(matches!(
            state.apply(&ViewEvent::SelectSite("Site 4".into()), &catalog),
            Err(CoreError::NotFound { id: 4, len: 4 })
        ));
        assert!(matches!(
            state.apply(&ViewEvent::SelectSite("nothing".into()), &catalog),
            Err(CoreError::MalformedLabel { .. })
        ));
    }

    #[test]
    fn zoom_saturates_within_limits() {
        let catalog = SiteCatalog::default();
        let mut state = ViewState::default();
        for _ in 0..30 {
            state = state.apply(&ViewEvent::ZoomIn, &catalog).unwrap();
        }
        assert_eq!(state.zoom, MAX_ZOOM);
        for _ in 0..30 {
            state = state.apply(&ViewEvent::ZoomOut, &catalog).unwrap();
        }
        assert_eq!(state.zoom, MIN_ZOOM);
    }

    #[test]
    fn span_halves_per_zoom_level() {
        let mut state = ViewState::default();
        state.zoom = 1;
        assert_eq!(state.span_degrees(), 180.0);
        state.zoom = 2;
        assert_eq!(state.span_degrees(), 90.0);
    }
}
