// ── Weather enrichment ──
//
// One provider request per selection, no retry, no cache. The full hourly
// series is kept for charting; the "current" sample is the row whose
// timestamp equals now rounded to the nearest hour in the provider's
// local time. No exact match means no current sample.

use std::future::Future;

use camtrap_api::{ForecastClient, HourlyForecast};
use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Utc};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{Coordinates, EnrichmentResult, WeatherSample};

/// Provider timestamp format, e.g. `2024-06-15T10:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Key format for the current-hour lookup.
pub const CURRENT_HOUR_FORMAT: &str = "%Y-%m-%dT%H:00";

// ── ForecastSource ──────────────────────────────────────────────────

/// Anything that can produce an hourly forecast for a coordinate pair.
pub trait ForecastSource: Send + Sync + 'static {
    fn fetch_hourly(
        &self,
        coordinates: Coordinates,
    ) -> impl Future<Output = Result<HourlyForecast, camtrap_api::Error>> + Send;
}

impl ForecastSource for ForecastClient {
    fn fetch_hourly(
        &self,
        coordinates: Coordinates,
    ) -> impl Future<Output = Result<HourlyForecast, camtrap_api::Error>> + Send {
        self.hourly(coordinates.latitude, coordinates.longitude)
    }
}

// ── EnrichmentFetcher ───────────────────────────────────────────────

pub type Clock = fn() -> DateTime<Utc>;

pub struct EnrichmentFetcher<S> {
    source: S,
    clock: Clock,
}

impl<S: ForecastSource> EnrichmentFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock used for the current-hour lookup.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Fetch and shape the forecast for one site.
    pub async fn fetch(&self, coordinates: Coordinates) -> Result<EnrichmentResult, CoreError> {
        debug!(%coordinates, "fetching weather");
        let forecast = self.source.fetch_hourly(coordinates).await.map_err(|e| {
            warn!(error = %e, %coordinates, "forecast request failed");
            CoreError::from(e)
        })?;
        shape(forecast, (self.clock)())
    }
}

// ── Shaping ─────────────────────────────────────────────────────────

/// Convert provider rows into samples and pick the current one.
pub fn shape(forecast: HourlyForecast, now: DateTime<Utc>) -> Result<EnrichmentResult, CoreError> {
    let series = forecast
        .records
        .into_iter()
        .map(|record| {
            let timestamp = NaiveDateTime::parse_from_str(&record.time, TIMESTAMP_FORMAT)
                .map_err(|e| CoreError::EnrichmentUnavailable {
                    reason: format!("bad forecast timestamp {:?}: {e}", record.time),
                })?;
            Ok(WeatherSample {
                timestamp,
                apparent_temperature: record.apparent_temperature,
                precipitation: record.precipitation,
                pressure_msl: record.pressure_msl,
                wind_speed: record.windspeed_10m,
            })
        })
        .collect::<Result<Vec<_>, CoreError>>()?;

    let local_now = now.naive_utc() + TimeDelta::seconds(i64::from(forecast.utc_offset_seconds));
    let hour = nearest_hour(local_now);
    let current = series.iter().find(|s| s.timestamp == hour).cloned();

    if current.is_none() {
        debug!(
            key = %current_hour_key(local_now),
            rows = series.len(),
            "no forecast row for current hour"
        );
    }
    Ok(EnrichmentResult { series, current })
}

/// Round to the nearest hour: minute 30 and later rounds up.
pub fn nearest_hour(t: NaiveDateTime) -> NaiveDateTime {
    let floor = t.date().and_time(NaiveTime::MIN) + TimeDelta::hours(i64::from(t.hour()));
    if t.minute() >= 30 {
        floor + TimeDelta::hours(1)
    } else {
        floor
    }
}

pub fn current_hour_key(now: NaiveDateTime) -> String {
    nearest_hour(now).format(CURRENT_HOUR_FORMAT).to_string()
}
