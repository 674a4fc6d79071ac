// ── Dashboard controller ──
//
// Sole owner of the view state. Applies events in arrival order, rebuilds
// the render snapshot after every successful transition, and runs one
// weather fetch per selection on a spawned task. Fetch outcomes come back
// over an unbounded channel and are merged only while their ticket still
// matches the current selection.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::boundary::{BoundingBox, RegionGeometry};
use crate::catalog::SiteCatalog;
use crate::detail::{DetailPanel, WeatherState};
use crate::enrichment::{EnrichmentFetcher, ForecastSource};
use crate::error::CoreError;
use crate::model::{Coordinates, SiteId};
use crate::projector::{self, MarkerSet};
use crate::view::{ViewEvent, ViewState};

// ── Fetch bookkeeping ───────────────────────────────────────────────

/// Tag attached to every weather request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub site_id: SiteId,
    pub generation: u64,
}

/// Result of one weather request, as delivered to the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentOutcome {
    pub ticket: FetchTicket,
    pub weather: WeatherState,
}

// ── RenderModel ─────────────────────────────────────────────────────

/// Immutable snapshot consumed by the front end.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    pub view: ViewState,
    pub tile_source: &'static str,
    pub attribution: &'static str,
    pub bounds: Option<BoundingBox>,
    pub overlay: MarkerSet,
    pub detail: Option<DetailPanel>,
}

impl RenderModel {
    fn build(
        view: &ViewState,
        catalog: &SiteCatalog,
        bounds: Option<BoundingBox>,
        detail: Option<&DetailPanel>,
    ) -> Self {
        Self {
            view: view.clone(),
            tile_source: view.active_layer.tile_source(),
            attribution: view.active_layer.attribution(),
            bounds,
            overlay: projector::project(catalog, view.show_markers, view.show_bubbles),
            detail: detail.cloned(),
        }
    }
}

// ── DashboardController ─────────────────────────────────────────────

pub struct DashboardController<S> {
    catalog: Arc<SiteCatalog>,
    region: Arc<RegionGeometry>,
    fetcher: Arc<EnrichmentFetcher<S>>,
    outcome_tx: mpsc::UnboundedSender<EnrichmentOutcome>,
    view: ViewState,
    detail: Option<DetailPanel>,
    pending: Option<FetchTicket>,
    generation: Arc<AtomicU64>,
    snapshot: Arc<RenderModel>,
}

impl<S: ForecastSource> DashboardController<S> {
    /// Build a controller in the initial view state.
    ///
    /// Returns the receiving end of the outcome channel; feed what arrives
    /// there back through [`apply_enrichment`](Self::apply_enrichment).
    pub fn new(
        catalog: Arc<SiteCatalog>,
        region: Arc<RegionGeometry>,
        fetcher: EnrichmentFetcher<S>,
    ) -> (Self, mpsc::UnboundedReceiver<EnrichmentOutcome>) {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let view = ViewState::initial(region.bounds());
        let snapshot = Arc::new(RenderModel::build(&view, &catalog, region.bounds(), None));

        info!(
            sites = catalog.len(),
            bounded = region.is_bounded(),
            center = %view.center,
            "dashboard controller ready"
        );

        let controller = Self {
            catalog,
            region,
            fetcher: Arc::new(fetcher),
            outcome_tx,
            view,
            detail: None,
            pending: None,
            generation: Arc::new(AtomicU64::new(0)),
            snapshot,
        };
        (controller, outcome_rx)
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn catalog(&self) -> &Arc<SiteCatalog> {
        &self.catalog
    }

    pub fn region(&self) -> &Arc<RegionGeometry> {
        &self.region
    }

    pub fn detail(&self) -> Option<&DetailPanel> {
        self.detail.as_ref()
    }

    /// Ticket of the fetch whose outcome is still awaited, if any.
    pub fn pending(&self) -> Option<FetchTicket> {
        self.pending
    }

    /// Latest render snapshot. Cheap to clone and safe to hold across frames.
    pub fn render_model(&self) -> Arc<RenderModel> {
        Arc::clone(&self.snapshot)
    }

    /// Apply one event.
    ///
    /// On failure the prior state is kept untouched. A successful site
    /// selection replaces the detail panel and returns the ticket of the
    /// fetch it started; this must run inside a Tokio runtime.
    pub fn dispatch(&mut self, event: ViewEvent) -> Result<Option<FetchTicket>, CoreError> {
        let next = self.view.apply(&event, &self.catalog).inspect_err(|e| match e {
            CoreError::NotFound { .. } => {
                warn!(error = %e, ?event, "marker label resolved outside the catalog");
            }
            _ => debug!(error = %e, ?event, "transition rejected"),
        })?;

        let panel = match (&event, next.selected_site) {
            (ViewEvent::SelectSite(_), Some(id)) => Some(DetailPanel::for_site(self.catalog.get(id)?)),
            _ => None,
        };

        self.view = next;
        let ticket = panel.map(|panel| {
            let (site_id, coordinates) = (panel.site_id, panel.coordinates);
            self.detail = Some(panel);
            self.spawn_fetch(site_id, coordinates)
        });

        self.rebuild();
        Ok(ticket)
    }

    /// Merge a fetch outcome into the detail panel.
    ///
    /// Returns `false` when the outcome is stale: the selection moved on,
    /// or a newer fetch for the same site superseded it.
    pub fn apply_enrichment(&mut self, outcome: EnrichmentOutcome) -> bool {
        let ticket = outcome.ticket;
        if self.pending != Some(ticket) || self.view.selected_site != Some(ticket.site_id) {
            debug!(
                site = %ticket.site_id,
                generation = ticket.generation,
                "discarding stale weather result"
            );
            return false;
        }

        self.pending = None;
        if let Some(panel) = self.detail.as_mut() {
            panel.weather = outcome.weather;
        }
        self.rebuild();
        true
    }

    fn spawn_fetch(&mut self, site_id: SiteId, coordinates: Coordinates) -> FetchTicket {
        // Bump generation; any in-flight task with an older one is dropped.
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let ticket = FetchTicket {
            site_id,
            generation,
        };
        self.pending = Some(ticket);

        let fetcher = Arc::clone(&self.fetcher);
        let gen_ref = Arc::clone(&self.generation);
        let tx = self.outcome_tx.clone();

        tokio::spawn(async move {
            let weather = match fetcher.fetch(coordinates).await {
                Ok(result) => WeatherState::Ready(result),
                Err(CoreError::EnrichmentUnavailable { reason }) => WeatherState::Unavailable(reason),
                Err(other) => WeatherState::Unavailable(other.to_string()),
            };

            if gen_ref.load(Ordering::Relaxed) != generation {
                debug!(site = %site_id, generation, "selection changed during fetch");
                return;
            }
            if tx.send(EnrichmentOutcome { ticket, weather }).is_err() {
                debug!("outcome receiver dropped");
            }
        });

        debug!(site = %site_id, generation, "weather fetch started");
        ticket
    }

    fn rebuild(&mut self) {
        self.snapshot = Arc::new(RenderModel::build(
            &self.view,
            &self.catalog,
            self.region.bounds(),
            self.detail.as_ref(),
        ));
    }
}
