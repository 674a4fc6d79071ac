// ── Base map layers ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Tile layer shown under the markers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum MapLayer {
    #[default]
    Standard,
    Topographical,
    Satellite,
}

impl MapLayer {
    /// XYZ tile URL template.
    pub fn tile_source(self) -> &'static str {
        match self {
            Self::Standard => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/NatGeo_World_Map/MapServer/tile/{z}/{y}/{x}"
            }
            Self::Topographical => "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
            Self::Satellite => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
            }
        }
    }

    /// Attribution text required by the tile provider.
    pub fn attribution(self) -> &'static str {
        match self {
            Self::Standard => {
                "Tiles &copy; Esri &mdash; National Geographic, Esri, DeLorme, NAVTEQ, UNEP-WCMC, USGS, NASA, ESA, METI, NRCAN, GEBCO, NOAA, iPC"
            }
            Self::Topographical => {
                "Map data: &copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors, <a href=\"http://viewfinderpanoramas.org\">SRTM</a> | Map style: &copy; <a href=\"https://opentopomap.org\">OpenTopoMap</a> (<a href=\"https://creativecommons.org/licenses/by-sa/3.0/\">CC-BY-SA</a>)"
            }
            Self::Satellite => {
                "Tiles &copy; Esri &mdash; Source: Esri, i-cubed, USDA, USGS, AEX, GeoEye, Getmapping, Aerogrid, IGN, IGP, UPR-EGP, and the GIS User Community"
            }
        }
    }

    /// Next layer in selector order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Self::Standard => Self::Topographical,
            Self::Topographical => Self::Satellite,
            Self::Satellite => Self::Standard,
        }
    }

    pub fn index(self) -> usize {
        Self::iter().position(|l| l == self).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_standard() {
        assert_eq!(MapLayer::default(), MapLayer::Standard);
    }

    #[test]
    fn next_cycles_through_all_layers() {
        assert_eq!(MapLayer::Standard.next(), MapLayer::Topographical);
        assert_eq!(MapLayer::Topographical.next(), MapLayer::Satellite);
        assert_eq!(MapLayer::Satellite.next(), MapLayer::Standard);
    }

    #[test]
    fn every_layer_has_source_and_attribution() {
        for layer in MapLayer::iter() {
            assert!(layer.tile_source().contains("{z}"));
            assert!(!layer.attribution().is_empty());
        }
        assert!(MapLayer::Topographical.attribution().contains("OpenTopoMap"));
    }
}
