// ── Marker projection ──
//
// Pure mapping from the catalog and the two visibility toggles to the
// overlay geometry. A hidden layer still yields exactly one placeholder
// so the overlay is never empty.

use crate::catalog::SiteCatalog;
use crate::model::{Coordinates, SiteId};

/// Placeholder position far outside the study area.
pub const SENTINEL: Coordinates = Coordinates::new(39.86752, 126.93875);

/// Bubble radius per observed baboon, in display units.
pub const BUBBLE_SCALE: f64 = 2.0;

/// Fill colour shared by every bubble.
pub const BUBBLE_COLOR: &str = "#D2691E";

/// Point marker. Placeholders carry no site and no tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub site_id: Option<SiteId>,
    pub position: Coordinates,
    pub tooltip: Option<String>,
}

impl Marker {
    fn sentinel() -> Self {
        Self {
            site_id: None,
            position: SENTINEL,
            tooltip: None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.site_id.is_none()
    }
}

/// Filled circle sized by baboon count.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub site_id: Option<SiteId>,
    pub center: Coordinates,
    pub radius: f64,
    pub color: &'static str,
    pub filled: bool,
}

impl Bubble {
    fn sentinel() -> Self {
        Self {
            site_id: None,
            center: SENTINEL,
            radius: 0.0,
            color: BUBBLE_COLOR,
            filled: true,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.site_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkerSet {
    pub markers: Vec<Marker>,
    pub bubbles: Vec<Bubble>,
}

/// Build the overlay for the current toggles. Output order is catalog order.
pub fn project(catalog: &SiteCatalog, show_markers: bool, show_bubbles: bool) -> MarkerSet {
    let markers = if show_markers {
        catalog
            .iter()
            .map(|site| Marker {
                site_id: Some(site.id),
                position: site.coordinates,
                tooltip: Some(site.id.tooltip()),
            })
            .collect()
    } else {
        vec![Marker::sentinel()]
    };

    let bubbles = if show_bubbles {
        catalog
            .iter()
            .map(|site| Bubble {
                site_id: Some(site.id),
                center: site.coordinates,
                radius: f64::from(site.baboon_count) * BUBBLE_SCALE,
                color: BUBBLE_COLOR,
                filled: true,
            })
            .collect()
    } else {
        vec![Bubble::sentinel()]
    };

    MarkerSet { markers, bubbles }
}
