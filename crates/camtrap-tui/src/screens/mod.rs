//! Screen implementations. Each screen is a top-level Component.

pub mod detail;
pub mod map;

use std::path::PathBuf;
use std::sync::Arc;

use camtrap_core::SiteCatalog;

use crate::component::Component;
use crate::screen::ScreenId;

/// Create screen components for the tab bar.
///
/// `outline` holds the study-area boundary rings as (lon, lat) pairs.
pub fn create_screens(
    catalog: Arc<SiteCatalog>,
    outline: Vec<Vec<(f64, f64)>>,
    images_dir: PathBuf,
) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Map,
            Box::new(map::MapScreen::new(catalog, outline)),
        ),
        (
            ScreenId::Detail,
            Box::new(detail::DetailScreen::new(images_dir)),
        ),
    ]
}
