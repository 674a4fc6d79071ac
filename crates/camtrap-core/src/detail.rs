// ── Detail panel ──

use serde::{Deserialize, Serialize};

use crate::model::{Coordinates, EnrichmentResult, Region, Site, SiteId};

pub const HOURS_PER_DAY: usize = 24;

/// Weather section of the detail panel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum WeatherState {
    #[default]
    Loading,
    Unavailable(String),
    Ready(EnrichmentResult),
}

impl WeatherState {
    pub fn result(&self) -> Option<&EnrichmentResult> {
        match self {
            Self::Ready(result) => Some(result),
            Self::Loading | Self::Unavailable(_) => None,
        }
    }
}

/// Everything shown for the selected site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailPanel {
    pub site_id: SiteId,
    pub region: Region,
    pub label: String,
    pub coordinates: Coordinates,
    pub baboon_count: u32,
    /// Relative to the imagery root.
    pub image_path: String,
    pub histogram: [u32; HOURS_PER_DAY],
    pub weather: WeatherState,
}

impl DetailPanel {
    /// Panel for a freshly selected site; weather starts out loading.
    pub fn for_site(site: &Site) -> Self {
        Self {
            site_id: site.id,
            region: site.region,
            label: site.label.clone(),
            coordinates: site.coordinates,
            baboon_count: site.baboon_count,
            image_path: image_path(site.region, &site.label),
            histogram: trigger_histogram(&site.trigger_hours),
            weather: WeatherState::Loading,
        }
    }
}

/// `{region}/{label}/sample.jpg`
pub fn image_path(region: Region, label: &str) -> String {
    format!("{region}/{label}/sample.jpg")
}

/// Count activations per hour of day. Hours outside 0..=23 are ignored.
pub fn trigger_histogram(hours: &[u8]) -> [u32; HOURS_PER_DAY] {
    let mut bins = [0u32; HOURS_PER_DAY];
    for &hour in hours {
        if let Some(bin) = bins.get_mut(usize::from(hour)) {
            *bin += 1;
        }
    }
    bins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_each_hour() {
        let bins = trigger_histogram(&[6, 6, 7, 18, 23, 0]);
        assert_eq!(bins[0], 1);
        assert_eq!(bins[6], 2);
        assert_eq!(bins[7], 1);
        assert_eq!(bins[18], 1);
        assert_eq!(bins[23], 1);
        assert_eq!(bins.iter().sum::<u32>(), 6);
    }

    #[test]
    fn histogram_ignores_out_of_range() {
        assert_eq!(trigger_histogram(&[24, 99]).iter().sum::<u32>(), 0);
    }

    #[test]
    fn image_path_format() {
        assert_eq!(image_path(Region::Fongoli, "cam12"), "Fongoli/cam12/sample.jpg");
    }

    #[test]
    fn new_panel_is_loading() {
        let site = Site {
            id: SiteId(2),
            coordinates: Coordinates::new(12.8, -12.7),
            region: Region::Assirik,
            label: "a03".into(),
            trigger_hours: vec![5, 5],
            baboon_count: 4,
        };
        let panel = DetailPanel::for_site(&site);
        assert_eq!(panel.weather, WeatherState::Loading);
        assert_eq!(panel.image_path, "Assirik/a03/sample.jpg");
        assert_eq!(panel.histogram[5], 2);
        assert!(panel.weather.result().is_none());
    }
}
