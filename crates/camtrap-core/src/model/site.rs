// ── Site domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Ids below this value belong to Assirik; everything else to Fongoli.
pub const ASSIRIK_ID_THRESHOLD: usize = 10;

// ── SiteId ──────────────────────────────────────────────────────────

/// Position of a site in its catalog (0-based). Stable for one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub usize);

impl SiteId {
    pub fn index(self) -> usize {
        self.0
    }

    /// Marker tooltip text, e.g. `"Site 7"`.
    pub fn tooltip(self) -> String {
        format!("Site {}", self.0)
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for SiteId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

// ── Coordinates ─────────────────────────────────────────────────────

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

// ── Region ──────────────────────────────────────────────────────────

/// Field site grouping. The variant name doubles as the data directory name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
pub enum Region {
    Assirik,
    Fongoli,
}

impl Region {
    /// Threshold rule: ids below [`ASSIRIK_ID_THRESHOLD`] are Assirik.
    pub fn classify(id: SiteId) -> Self {
        if id.0 < ASSIRIK_ID_THRESHOLD {
            Self::Assirik
        } else {
            Self::Fongoli
        }
    }

    pub fn dir_name(self) -> &'static str {
        self.into()
    }
}

// ── Site ────────────────────────────────────────────────────────────

/// One camera-trap observation point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub coordinates: Coordinates,
    pub region: Region,
    /// File stem of the site document; also names the imagery folder.
    pub label: String,
    /// Hour-of-day (0..=23) of every historical sensor activation.
    pub trigger_hours: Vec<u8>,
    pub baboon_count: u32,
}
