// ── Site catalog ──
//
// Immutable, ordered list of sites built once at startup. Ids are catalog
// positions, assigned in load order: every Assirik document, then every
// Fongoli document, each group sorted by file name.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{Coordinates, Region, Site, SiteId};

/// On-disk shape of one site document. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct SiteDocument {
    latlon: [f64; 2],
    hours: Vec<i64>,
    baboon_count: u32,
}

/// A validated site that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteRecord {
    pub region: Region,
    pub label: String,
    pub coordinates: Coordinates,
    pub trigger_hours: Vec<u8>,
    pub baboon_count: u32,
}

/// Read-only site collection shared through `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteCatalog {
    sites: Vec<Site>,
}

impl SiteCatalog {
    /// Assign ids in iteration order.
    ///
    /// Logs a warning for every site whose stored region disagrees with
    /// the id-threshold rule used to classify marker labels.
    pub fn from_records(records: impl IntoIterator<Item = SiteRecord>) -> Self {
        let sites: Vec<Site> = records
            .into_iter()
            .enumerate()
            .map(|(idx, record)| {
                let id = SiteId(idx);
                let classified = Region::classify(id);
                if classified != record.region {
                    warn!(
                        site = %id,
                        label = %record.label,
                        stored = %record.region,
                        classified = %classified,
                        "site region disagrees with id classification"
                    );
                }
                Site {
                    id,
                    coordinates: record.coordinates,
                    region: record.region,
                    label: record.label,
                    trigger_hours: record.trigger_hours,
                    baboon_count: record.baboon_count,
                }
            })
            .collect();
        Self { sites }
    }

    pub fn get(&self, id: SiteId) -> Result<&Site, CoreError> {
        self.sites.get(id.index()).ok_or(CoreError::NotFound {
            id: id.index(),
            len: self.sites.len(),
        })
    }

    /// All sites in id order.
    pub fn all(&self) -> &[Site] {
        &self.sites
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Site> {
        self.sites.iter()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn in_region(&self, region: Region) -> impl Iterator<Item = &Site> + '_ {
        self.sites.iter().filter(move |s| s.region == region)
    }
}

impl<'a> IntoIterator for &'a SiteCatalog {
    type Item = &'a Site;
    type IntoIter = std::slice::Iter<'a, Site>;

    fn into_iter(self) -> Self::IntoIter {
        self.sites.iter()
    }
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load every region directory under `root` into a catalog.
///
/// Any failure is fatal and names the offending path.
pub fn load_catalog(root: &Path) -> Result<SiteCatalog, CoreError> {
    let mut records = Vec::new();
    for region in Region::iter() {
        let loaded = load_region(root, region)?;
        debug!(region = %region, count = loaded.len(), "region documents loaded");
        records.extend(loaded);
    }

    let catalog = SiteCatalog::from_records(records);
    info!(root = %root.display(), sites = catalog.len(), "site catalog loaded");
    Ok(catalog)
}

fn load_region(root: &Path, region: Region) -> Result<Vec<SiteRecord>, CoreError> {
    let dir = root.join(region.dir_name());
    let entries = fs::read_dir(&dir).map_err(|e| load_error(&dir, e))?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| load_error(&dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    paths.iter().map(|p| parse_document(p, region)).collect()
}

fn parse_document(path: &Path, region: Region) -> Result<SiteRecord, CoreError> {
    let label = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| load_error(path, "file name is not valid UTF-8"))?
        .to_owned();

    let content = fs::read_to_string(path).map_err(|e| load_error(path, e))?;
    let doc: SiteDocument = serde_json::from_str(&content).map_err(|e| load_error(path, e))?;

    let [latitude, longitude] = doc.latlon;
    let coordinates = Coordinates::new(latitude, longitude);
    if !coordinates.is_valid() {
        return Err(load_error(
            path,
            format!("coordinates out of range: {coordinates}"),
        ));
    }

    let trigger_hours = doc
        .hours
        .iter()
        .map(|&h| {
            u8::try_from(h)
                .ok()
                .filter(|h| *h < 24)
                .ok_or_else(|| load_error(path, format!("hour {h} is outside 0..=23")))
        })
        .collect::<Result<Vec<u8>, _>>()?;

    Ok(SiteRecord {
        region,
        label,
        coordinates,
        trigger_hours,
        baboon_count: doc.baboon_count,
    })
}

fn load_error(path: &Path, reason: impl ToString) -> CoreError {
    CoreError::CatalogLoad {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(region: Region, label: &str, lat: f64, lon: f64) -> SiteRecord {
        SiteRecord {
            region,
            label: label.into(),
            coordinates: Coordinates::new(lat, lon),
            trigger_hours: vec![6, 7],
            baboon_count: 1,
        }
    }

    #[test]
    fn ids_follow_record_order() {
        let catalog = SiteCatalog::from_records([
            record(Region::Assirik, "a", 12.8, -12.7),
            record(Region::Assirik, "b", 12.9, -12.6),
            record(Region::Fongoli, "c", 13.0, -12.6),
        ]);

        let ids: Vec<usize> = catalog.iter().map(|s| s.id.index()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(catalog.get(SiteId(1)).unwrap().label, "b");
        assert_eq!(catalog.in_region(Region::Assirik).count(), 2);
    }

    #[test]
    fn get_out_of_range_is_not_found() {
        let catalog = SiteCatalog::from_records([record(Region::Assirik, "a", 12.8, -12.7)]);
        assert!(matches!(
            catalog.get(SiteId(5)),
            Err(CoreError::NotFound { id: 5, len: 1 })
        ));
    }

    #[test]
    fn empty_catalog() {
        let catalog = SiteCatalog::default();
        assert!(catalog.is_empty());
        assert!(catalog.all().is_empty());
        assert!(catalog.get(SiteId(0)).is_err());
    }
}
