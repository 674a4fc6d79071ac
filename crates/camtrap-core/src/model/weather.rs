// ── Weather enrichment types ──
//
// Transient data attached to the selected site. Never stored in the
// catalog; discarded whenever the selection changes.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// One hourly forecast row. `timestamp` is in the provider's local time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub timestamp: NaiveDateTime,
    pub apparent_temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub pressure_msl: Option<f64>,
    pub wind_speed: Option<f64>,
}

impl WeatherSample {
    pub fn value(&self, metric: WeatherMetric) -> Option<f64> {
        match metric {
            WeatherMetric::ApparentTemperature => self.apparent_temperature,
            WeatherMetric::Precipitation => self.precipitation,
            WeatherMetric::Pressure => self.pressure_msl,
            WeatherMetric::WindSpeed => self.wind_speed,
        }
    }
}

/// The four charted quantities, in panel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum WeatherMetric {
    #[strum(to_string = "Apparent temperature")]
    ApparentTemperature,
    #[strum(to_string = "Precipitation")]
    Precipitation,
    #[strum(to_string = "Pressure (MSL)")]
    Pressure,
    #[strum(to_string = "Wind speed (10 m)")]
    WindSpeed,
}

impl WeatherMetric {
    pub fn unit(self) -> &'static str {
        match self {
            Self::ApparentTemperature => "°C",
            Self::Precipitation => "mm",
            Self::Pressure => "hPa",
            Self::WindSpeed => "km/h",
        }
    }
}

/// Current-conditions tuple shown above the charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
}

impl From<&WeatherSample> for CurrentConditions {
    fn from(sample: &WeatherSample) -> Self {
        Self {
            temperature: sample.apparent_temperature,
            precipitation: sample.precipitation,
            pressure: sample.pressure_msl,
            wind_speed: sample.wind_speed,
        }
    }
}

/// Forecast series plus the sample matching the current hour, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    /// Ascending by timestamp.
    pub series: Vec<WeatherSample>,
    pub current: Option<WeatherSample>,
}

impl EnrichmentResult {
    pub fn current_conditions(&self) -> Option<CurrentConditions> {
        self.current.as_ref().map(CurrentConditions::from)
    }

    /// Chart points for one metric: x is hours since the first sample.
    /// Rows with a missing value are skipped.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn points(&self, metric: WeatherMetric) -> Vec<(f64, f64)> {
        let Some(origin) = self.series.first().map(|s| s.timestamp) else {
            return Vec::new();
        };
        self.series
            .iter()
            .filter_map(|s| {
                let hours = (s.timestamp - origin).num_minutes() as f64 / 60.0;
                s.value(metric).map(|v| (hours, v))
            })
            .collect()
    }
}
