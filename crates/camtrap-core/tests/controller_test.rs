#![allow(clippy::unwrap_used)]
// Controller behaviour against a scripted in-memory forecast source.

use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use tokio::sync::{mpsc, oneshot};

use camtrap_api::{HourlyForecast, HourlyRecord};
use camtrap_core::{
    Coordinates, DashboardController, EnrichmentFetcher, EnrichmentOutcome, ForecastSource,
    MapLayer, Region, RegionGeometry, SiteCatalog, SiteId, SiteRecord, ViewEvent, WeatherState,
};

// ── Scripted source ─────────────────────────────────────────────────

type Reply = Result<HourlyForecast, camtrap_api::Error>;

/// Each request blocks until the test releases the gate registered for
/// its coordinates.
#[derive(Clone, Default)]
struct ScriptedSource {
    gates: Arc<Mutex<Vec<(String, oneshot::Receiver<Reply>)>>>,
}

impl ScriptedSource {
    fn gate(&self, coordinates: Coordinates) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push((coordinates.to_string(), rx));
        tx
    }
}

impl ForecastSource for ScriptedSource {
    fn fetch_hourly(&self, coordinates: Coordinates) -> impl Future<Output = Reply> + Send {
        let key = coordinates.to_string();
        let rx = {
            let mut gates = self.gates.lock().unwrap();
            gates
                .iter()
                .position(|(k, _)| *k == key)
                .map(|idx| gates.remove(idx).1)
        };
        async move {
            match rx {
                Some(rx) => rx.await.unwrap_or_else(|_| {
                    Err(camtrap_api::Error::MalformedSeries("gate dropped".into()))
                }),
                None => Err(camtrap_api::Error::MalformedSeries("unscripted request".into())),
            }
        }
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 10, 40, 0).unwrap()
}

fn site_coordinates(id: u32) -> Coordinates {
    Coordinates::new(12.80 + f64::from(id) * 0.01, -12.70 + f64::from(id) * 0.01)
}

fn catalog() -> Arc<SiteCatalog> {
    Arc::new(SiteCatalog::from_records((0..12).map(|i| SiteRecord {
        region: if i < 10 { Region::Assirik } else { Region::Fongoli },
        label: format!("cam{i:02}"),
        coordinates: site_coordinates(i),
        trigger_hours: vec![6, 7, 7],
        baboon_count: i,
    })))
}

fn forecast(temperature: f64) -> HourlyForecast {
    HourlyForecast {
        latitude: 12.875,
        longitude: -12.375,
        timezone: Some("GMT".into()),
        utc_offset_seconds: 0,
        records: ["2024-06-15T10:00", "2024-06-15T11:00"]
            .iter()
            .map(|t| HourlyRecord {
                time: (*t).to_owned(),
                apparent_temperature: Some(temperature),
                precipitation: Some(0.0),
                pressure_msl: Some(1010.0),
                windspeed_10m: Some(5.0),
            })
            .collect(),
    }
}

fn controller(
    source: ScriptedSource,
) -> (
    DashboardController<ScriptedSource>,
    mpsc::UnboundedReceiver<EnrichmentOutcome>,
) {
    let fetcher = EnrichmentFetcher::new(source).with_clock(fixed_now);
    DashboardController::new(catalog(), Arc::new(RegionGeometry::unbounded()), fetcher)
}

async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn selection_fetches_and_merges_weather() {
    let source = ScriptedSource::default();
    let gate = source.gate(site_coordinates(3));
    let (mut ctl, mut rx) = controller(source);

    let ticket = ctl.dispatch(ViewEvent::SelectSite("Site 3".into())).unwrap().unwrap();
    assert_eq!(ticket.site_id, SiteId(3));

    let model = ctl.render_model();
    let panel = model.detail.as_ref().unwrap();
    assert_eq!(panel.weather, WeatherState::Loading);
    assert_eq!(panel.image_path, "Assirik/cam03/sample.jpg");
    assert_eq!(panel.histogram[7], 2);

    gate.send(Ok(forecast(31.5))).unwrap();
    let outcome = rx.recv().await.unwrap();
    assert!(ctl.apply_enrichment(outcome));

    let model = ctl.render_model();
    let result = model.detail.as_ref().unwrap().weather.result().unwrap();
    assert_eq!(result.series.len(), 2);
    let current = result.current_conditions().unwrap();
    assert_eq!(current.temperature, Some(31.5));
    assert_eq!(ctl.pending(), None);
}

#[tokio::test]
async fn late_result_for_previous_selection_is_dropped() {
    let source = ScriptedSource::default();
    let gate3 = source.gate(site_coordinates(3));
    let gate9 = source.gate(site_coordinates(9));
    let (mut ctl, mut rx) = controller(source);

    ctl.dispatch(ViewEvent::SelectSite("Site 3".into())).unwrap();
    let ticket9 = ctl.dispatch(ViewEvent::SelectSite("Site 9".into())).unwrap().unwrap();

    gate9.send(Ok(forecast(29.0))).unwrap();
    let outcome = rx.recv().await.unwrap();
    assert_eq!(outcome.ticket, ticket9);
    assert!(ctl.apply_enrichment(outcome));

    // Site 3 resolves after site 9; its task sees the newer generation.
    gate3.send(Ok(forecast(40.0))).unwrap();
    settle().await;
    assert!(rx.try_recv().is_err());

    let model = ctl.render_model();
    let panel = model.detail.as_ref().unwrap();
    assert_eq!(panel.site_id, SiteId(9));
    let current = panel.weather.result().unwrap().current_conditions().unwrap();
    assert_eq!(current.temperature, Some(29.0));
}

#[tokio::test]
async fn outcome_received_before_reselection_is_not_applied() {
    let source = ScriptedSource::default();
    let gate3 = source.gate(site_coordinates(3));
    let _gate9 = source.gate(site_coordinates(9));
    let (mut ctl, mut rx) = controller(source);

    ctl.dispatch(ViewEvent::SelectSite("Site 3".into())).unwrap();
    gate3.send(Ok(forecast(40.0))).unwrap();
    let stale = rx.recv().await.unwrap();

    ctl.dispatch(ViewEvent::SelectSite("Site 9".into())).unwrap();
    assert!(!ctl.apply_enrichment(stale));

    let model = ctl.render_model();
    let panel = model.detail.as_ref().unwrap();
    assert_eq!(panel.site_id, SiteId(9));
    assert_eq!(panel.weather, WeatherState::Loading);
}

#[tokio::test]
async fn reselecting_same_site_supersedes_first_fetch() {
    let source = ScriptedSource::default();
    let first = source.gate(site_coordinates(4));
    let second = source.gate(site_coordinates(4));
    let (mut ctl, mut rx) = controller(source);

    let t1 = ctl.dispatch(ViewEvent::SelectSite("Site 4".into())).unwrap().unwrap();
    let t2 = ctl.dispatch(ViewEvent::SelectSite("site 4".into())).unwrap().unwrap();
    assert_eq!(t1.site_id, t2.site_id);
    assert!(t2.generation > t1.generation);

    first.send(Ok(forecast(10.0))).unwrap();
    second.send(Ok(forecast(20.0))).unwrap();
    let outcome = rx.recv().await.unwrap();
    assert_eq!(outcome.ticket, t2);
    assert!(ctl.apply_enrichment(outcome));
}

#[tokio::test]
async fn provider_failure_marks_weather_unavailable() {
    let source = ScriptedSource::default();
    let gate = source.gate(site_coordinates(11));
    let (mut ctl, mut rx) = controller(source);

    ctl.dispatch(ViewEvent::SelectSite("Site 11".into())).unwrap();
    gate.send(Err(camtrap_api::Error::Status {
        status: 503,
        body: "upstream down".into(),
    }))
    .unwrap();

    let outcome = rx.recv().await.unwrap();
    assert!(ctl.apply_enrichment(outcome));

    let model = ctl.render_model();
    let panel = model.detail.as_ref().unwrap();
    assert_eq!(panel.region, Region::Fongoli);
    assert_eq!(panel.histogram.iter().sum::<u32>(), 3);
    match &panel.weather {
        WeatherState::Unavailable(reason) => assert!(reason.contains("503"), "{reason}"),
        other => panic!("expected Unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_selection_keeps_prior_state() {
    let source = ScriptedSource::default();
    let gate = source.gate(site_coordinates(2));
    let (mut ctl, mut rx) = controller(source);

    let ticket = ctl.dispatch(ViewEvent::SelectSite("Site 2".into())).unwrap().unwrap();
    let before = ctl.render_model();

    assert!(ctl.dispatch(ViewEvent::SelectSite("Site 99".into())).is_err());
    assert!(ctl.dispatch(ViewEvent::SelectSite("marker".into())).is_err());
    assert_eq!(*ctl.render_model(), *before);
    assert_eq!(ctl.pending(), Some(ticket));

    // The original fetch is still honoured.
    gate.send(Ok(forecast(25.0))).unwrap();
    let outcome = rx.recv().await.unwrap();
    assert!(ctl.apply_enrichment(outcome));
}

#[tokio::test]
async fn transitions_rebuild_overlay() {
    let (mut ctl, _rx) = controller(ScriptedSource::default());

    let model = ctl.render_model();
    assert_eq!(model.overlay.markers.len(), 1);
    assert_eq!(model.overlay.bubbles.len(), 1);
    assert_eq!(model.tile_source, MapLayer::Standard.tile_source());

    ctl.dispatch(ViewEvent::ToggleMarkers(true)).unwrap();
    ctl.dispatch(ViewEvent::ToggleBubbles(true)).unwrap();
    ctl.dispatch(ViewEvent::SetLayer(MapLayer::Topographical)).unwrap();

    let model = ctl.render_model();
    assert_eq!(model.overlay.markers.len(), 12);
    assert_eq!(model.overlay.bubbles.len(), 12);
    assert_eq!(model.attribution, MapLayer::Topographical.attribution());
    assert_eq!(model.overlay.markers[11].tooltip.as_deref(), Some("Site 11"));
}

#[tokio::test]
async fn region_zoom_uses_catalog_means() {
    let (mut ctl, _rx) = controller(ScriptedSource::default());

    ctl.dispatch(ViewEvent::SelectRegion(Region::Fongoli)).unwrap();
    let view = ctl.view();
    assert_eq!(view.zoom, 13);

    let expected_lat = (site_coordinates(10).latitude + site_coordinates(11).latitude) / 2.0;
    assert!((view.center.latitude - expected_lat).abs() < 1e-12);
}
