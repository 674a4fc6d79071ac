//! View state and selection engine for the camtrap field-site dashboard.
//!
//! This crate owns the domain model and every rule that turns user input
//! into something drawable:
//!
//! - **[`SiteCatalog`]**: immutable, ordered list of camera-trap sites,
//!   loaded once from per-site JSON documents by [`load_catalog`].
//!
//! - **[`RegionGeometry`]**: the study-area boundary, used to clamp the
//!   initial viewport. Loaded with [`load_boundary`]; optional.
//!
//! - **[`ViewState`]** and **[`ViewEvent`]**: the per-session view and the
//!   pure transitions between its values.
//!
//! - **[`project`]**: marker and bubble overlay for the current toggles.
//!
//! - **[`resolve`]**: marker label to [`SiteId`].
//!
//! - **[`EnrichmentFetcher`]**: hourly weather for the selected site, via
//!   any [`ForecastSource`] (normally `camtrap_api::ForecastClient`).
//!
//! - **[`DashboardController`]**: the single mutator. Dispatches events,
//!   launches fetches, discards stale outcomes, and publishes an
//!   `Arc<RenderModel>` snapshot after every change.

pub mod boundary;
pub mod catalog;
pub mod controller;
pub mod detail;
pub mod enrichment;
pub mod error;
pub mod model;
pub mod projector;
pub mod resolver;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use boundary::{BoundingBox, RegionGeometry, load_boundary, load_boundary_or_unbounded};
pub use catalog::{SiteCatalog, SiteRecord, load_catalog};
pub use controller::{DashboardController, EnrichmentOutcome, FetchTicket, RenderModel};
pub use detail::{DetailPanel, WeatherState};
pub use enrichment::{EnrichmentFetcher, ForecastSource};
pub use error::CoreError;
pub use projector::{Bubble, Marker, MarkerSet, project};
pub use resolver::{classify, resolve};
pub use view::{ViewEvent, ViewState};

pub use model::{
    Coordinates, CurrentConditions, EnrichmentResult, MapLayer, Region, Site, SiteId,
    WeatherMetric, WeatherSample,
};
