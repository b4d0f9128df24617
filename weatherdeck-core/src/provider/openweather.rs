use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::ProviderSettings,
    error::WeatherError,
    model::{Location, Units, WeatherReport, WeatherRequest},
    normalize::{OwCurrentResponse, OwForecastResponse, map_current, summarize_forecast},
};

use super::WeatherProvider;

/// Client for the OpenWeather `weather` and `forecast` endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    settings: ProviderSettings,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self, WeatherError> {
        Url::parse(&settings.base_url).map_err(|e| {
            WeatherError::InvalidConfig(format!("base URL '{}': {e}", settings.base_url))
        })?;

        if settings.api_key.is_empty() {
            warn!("no OpenWeather API key configured; the provider will reject requests");
        } else {
            debug!("OpenWeather API key configured");
        }

        Ok(Self { settings, http: Client::new() })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{name}", self.settings.base_url.trim_end_matches('/'))
    }

    /// GET an endpoint and decode its JSON body; the API key is appended here.
    async fn get_json<T: DeserializeOwned>(
        &self,
        name: &str,
        params: &[(&'static str, String)],
    ) -> Result<T, WeatherError> {
        let url = self.endpoint(name);
        debug!(
            %url,
            query = ?params,
            api_key_present = !self.settings.api_key.is_empty(),
            "requesting OpenWeather"
        );

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.settings.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            debug!(%status, body = %truncate_body(&body), "OpenWeather request failed");
            return Err(http_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::ProviderShape(format!(
                "{name} response could not be decoded ({e}): {}",
                truncate_body(&body)
            ))
        })
    }

    /// Raw `GET /weather` for a city name or coordinates.
    pub async fn fetch_current(
        &self,
        location: &Location,
        units: Units,
    ) -> Result<OwCurrentResponse, WeatherError> {
        let mut params = location.query_pairs();
        params.push(("units", units.as_str().to_string()));

        self.get_json("weather", &params).await
    }

    /// Raw `GET /forecast` for resolved coordinates.
    pub async fn fetch_forecast(
        &self,
        lat: f64,
        lon: f64,
        units: Units,
    ) -> Result<OwForecastResponse, WeatherError> {
        let params = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("units", units.as_str().to_string()),
        ];

        self.get_json("forecast", &params).await
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip_all, fields(location = %request.location, units = %request.units))]
    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherReport, WeatherError> {
        let raw = self.fetch_current(&request.location, request.units).await?;
        let current = map_current(&raw)?;

        // The forecast follows the coordinates the provider resolved, not the query.
        let raw = self.fetch_forecast(current.lat, current.lon, request.units).await?;
        let forecast = summarize_forecast(&raw, current.dt)?;

        info!(
            name = %current.name,
            daily = forecast.daily.len(),
            hourly = forecast.hourly.len(),
            "weather fetched"
        );

        Ok(WeatherReport { current, forecast })
    }

    fn icon_url(&self, code: &str) -> String {
        icon_url(&self.settings.icon_base_url, code)
    }
}

/// `<icon_base>/<code>@2x.png`.
pub fn icon_url(icon_base: &str, code: &str) -> String {
    format!("{}/{code}@2x.png", icon_base.trim_end_matches('/'))
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

fn http_error(status: StatusCode, body: &str) -> WeatherError {
    let message = serde_json::from_str::<OwErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("request failed with status {status}"));

    WeatherError::ProviderHttp { status: status.as_u16(), message }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_url_is_stable() {
        let a = icon_url("https://openweathermap.org/img/wn", "04d");
        let b = icon_url("https://openweathermap.org/img/wn/", "04d");
        assert_eq!(a, "https://openweathermap.org/img/wn/04d@2x.png");
        assert_eq!(a, b);
    }

    #[test]
    fn http_error_prefers_provider_message() {
        let err = http_error(StatusCode::NOT_FOUND, r#"{"cod":"404","message":"city not found"}"#);
        match err {
            WeatherError::ProviderHttp { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "city not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn http_error_falls_back_to_status() {
        let err = http_error(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
        assert_eq!(err.display_message(), "request failed with status 502 Bad Gateway");
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let provider =
            OpenWeatherProvider::new(ProviderSettings::new("KEY").with_base_url("http://localhost/api/"))
                .unwrap();
        assert_eq!(provider.endpoint("forecast"), "http://localhost/api/forecast");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(300);
        let cut = truncate_body(&body);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }
}
