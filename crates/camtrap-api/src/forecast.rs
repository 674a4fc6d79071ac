// Open-Meteo forecast client
//
// Wraps `reqwest::Client` with forecast URL construction, provider error
// unwrapping, and validation of the column-oriented `hourly` payload.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Hourly variables requested for every site, in display order.
pub const HOURLY_VARIABLES: [&str; 4] = [
    "apparent_temperature",
    "precipitation",
    "pressure_msl",
    "windspeed_10m",
];

/// Open-Meteo reports failures as `{"error": true, "reason": "..."}`.
#[derive(Deserialize)]
struct ProviderError {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// Raw forecast response. Only the fields the dashboard consumes are modelled.
#[derive(Debug, Clone, Deserialize)]
struct ForecastResponse {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    utc_offset_seconds: i32,
    hourly: Option<HourlyColumns>,
}

/// Column-oriented hourly block: one array per variable, parallel to `time`.
#[derive(Debug, Clone, Deserialize)]
struct HourlyColumns {
    time: Vec<String>,
    #[serde(default)]
    apparent_temperature: Option<Vec<Option<f64>>>,
    #[serde(default)]
    precipitation: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pressure_msl: Option<Vec<Option<f64>>>,
    #[serde(default)]
    windspeed_10m: Option<Vec<Option<f64>>>,
}

/// One row of the hourly series. `time` is the provider's local timestamp
/// string (`YYYY-MM-DDTHH:MM`); missing values stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub time: String,
    pub apparent_temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub pressure_msl: Option<f64>,
    pub windspeed_10m: Option<f64>,
}

/// Validated hourly forecast for one coordinate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// Grid-snapped latitude reported by the provider.
    pub latitude: f64,
    /// Grid-snapped longitude reported by the provider.
    pub longitude: f64,
    pub timezone: Option<String>,
    /// Offset of `timezone` from UTC; `records[].time` is local to it.
    pub utc_offset_seconds: i32,
    /// Rows in provider order (ascending time).
    pub records: Vec<HourlyRecord>,
}

impl TryFrom<ForecastResponse> for HourlyForecast {
    type Error = Error;

    fn try_from(raw: ForecastResponse) -> Result<Self, Self::Error> {
        let hourly = raw
            .hourly
            .ok_or_else(|| Error::MalformedSeries("response has no `hourly` block".into()))?;
        let len = hourly.time.len();

        let apparent = column(hourly.apparent_temperature, "apparent_temperature", len)?;
        let precipitation = column(hourly.precipitation, "precipitation", len)?;
        let pressure = column(hourly.pressure_msl, "pressure_msl", len)?;
        let wind = column(hourly.windspeed_10m, "windspeed_10m", len)?;

        let records = hourly
            .time
            .into_iter()
            .zip(apparent)
            .zip(precipitation)
            .zip(pressure)
            .zip(wind)
            .map(
                |((((time, apparent_temperature), precipitation), pressure_msl), windspeed_10m)| {
                    HourlyRecord {
                        time,
                        apparent_temperature,
                        precipitation,
                        pressure_msl,
                        windspeed_10m,
                    }
                },
            )
            .collect();

        Ok(Self {
            latitude: raw.latitude,
            longitude: raw.longitude,
            timezone: raw.timezone,
            utc_offset_seconds: raw.utc_offset_seconds,
            records,
        })
    }
}

/// Require a variable column and check it lines up with `time`.
fn column(values: Option<Vec<Option<f64>>>, name: &str, len: usize) -> Result<Vec<Option<f64>>, Error> {
    let values = values.ok_or_else(|| Error::MalformedSeries(format!("missing `{name}` column")))?;
    if values.len() != len {
        return Err(Error::MalformedSeries(format!(
            "`{name}` has {} values for {len} timestamps",
            values.len()
        )));
    }
    Ok(values)
}

/// HTTP client for the Open-Meteo `/v1/forecast` endpoint.
///
/// Every request asks for [`HOURLY_VARIABLES`] in the configured timezone.
/// A single attempt is made per call; retry policy belongs to the caller.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    http: reqwest::Client,
    base_url: Url,
    timezone: String,
}

impl ForecastClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the full forecast endpoint, e.g.
    /// `https://api.open-meteo.com/v1/forecast`.
    pub fn new(
        base_url: Url,
        timezone: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, timezone))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, timezone: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            timezone: timezone.into(),
        }
    }

    /// The forecast endpoint this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The timezone passed to the provider; timestamps come back in it.
    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// Build the request URL for a coordinate pair.
    pub fn forecast_url(&self, latitude: f64, longitude: f64) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("latitude", &latitude.to_string())
            .append_pair("longitude", &longitude.to_string())
            .append_pair("hourly", &HOURLY_VARIABLES.join(","))
            .append_pair("timezone", &self.timezone);
        url
    }

    /// Fetch the hourly forecast for `(latitude, longitude)`.
    pub async fn hourly(&self, latitude: f64, longitude: f64) -> Result<HourlyForecast, Error> {
        let url = self.forecast_url(latitude, longitude);
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let raw: ForecastResponse = self.parse_response(resp).await?;
        let forecast = HourlyForecast::try_from(raw)?;

        trace!(rows = forecast.records.len(), "hourly forecast parsed");
        Ok(forecast)
    }

    /// Map HTTP status and provider error payloads to [`Error`], then
    /// deserialize the body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if let Ok(err) = serde_json::from_str::<ProviderError>(&body) {
            if err.error {
                return Err(Error::Provider {
                    status: status.as_u16(),
                    reason: err.reason.unwrap_or_else(|| "unspecified".into()),
                });
            }
        }

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> ForecastClient {
        ForecastClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://api.open-meteo.com/v1/forecast").unwrap(),
            "GMT",
        )
    }

    #[test]
    fn forecast_url_carries_all_parameters() {
        let url = client().forecast_url(12.9, -12.4);
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(pairs.contains(&("latitude".into(), "12.9".into())));
        assert!(pairs.contains(&("longitude".into(), "-12.4".into())));
        assert!(pairs.contains(&(
            "hourly".into(),
            "apparent_temperature,precipitation,pressure_msl,windspeed_10m".into()
        )));
        assert!(pairs.contains(&("timezone".into(), "GMT".into())));
    }

    #[test]
    fn columns_zip_into_records() {
        let raw: ForecastResponse = serde_json::from_value(serde_json::json!({
            "latitude": 12.9,
            "longitude": -12.4,
            "hourly": {
                "time": ["2024-06-01T00:00", "2024-06-01T01:00"],
                "apparent_temperature": [30.5, null],
                "precipitation": [0.0, 1.2],
                "pressure_msl": [1010.0, 1009.5],
                "windspeed_10m": [4.0, 5.5]
            }
        }))
        .unwrap();

        let forecast = HourlyForecast::try_from(raw).unwrap();
        assert_eq!(forecast.records.len(), 2);
        assert_eq!(forecast.records[1].time, "2024-06-01T01:00");
        assert_eq!(forecast.records[1].apparent_temperature, None);
        assert_eq!(forecast.records[1].precipitation, Some(1.2));
    }

    #[test]
    fn mismatched_column_is_rejected() {
        let raw: ForecastResponse = serde_json::from_value(serde_json::json!({
            "latitude": 0.0,
            "longitude": 0.0,
            "hourly": {
                "time": ["2024-06-01T00:00", "2024-06-01T01:00"],
                "apparent_temperature": [30.5],
                "precipitation": [0.0, 1.2],
                "pressure_msl": [1010.0, 1009.5],
                "windspeed_10m": [4.0, 5.5]
            }
        }))
        .unwrap();

        let err = HourlyForecast::try_from(raw).unwrap_err();
        assert!(matches!(err, Error::MalformedSeries(ref m) if m.contains("apparent_temperature")));
    }

    #[test]
    fn missing_hourly_block_is_rejected() {
        let raw: ForecastResponse =
            serde_json::from_value(serde_json::json!({ "latitude": 0.0, "longitude": 0.0 }))
                .unwrap();
        assert!(matches!(
            HourlyForecast::try_from(raw),
            Err(Error::MalformedSeries(_))
        ));
    }
}
