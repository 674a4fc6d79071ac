// ── Domain model ──
//
// Canonical types shared by the catalog, the view state and the detail
// panel. Everything here is plain data: loaders live in `catalog` and
// `boundary`, behaviour in `view`, `projector` and `enrichment`.

pub mod layer;
pub mod site;
pub mod weather;

// ── Re-exports ──────────────────────────────────────────────────────

pub use layer::MapLayer;
pub use site::{Coordinates, Region, Site, SiteId};
pub use weather::{CurrentConditions, EnrichmentResult, WeatherMetric, WeatherSample};
