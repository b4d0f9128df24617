use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

/// Unit system passed through to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial]
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn speed_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

/// Where to look up the weather.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

impl Location {
    /// Query parameters identifying this location on the provider side.
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            Location::City(name) => vec![("q", name.clone())],
            Location::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::City(name) => f.write_str(name),
            Location::Coordinates { lat, lon } => write!(f, "{lat},{lon}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherRequest {
    pub location: Location,
    pub units: Units,
}

impl WeatherRequest {
    pub fn city(name: impl Into<String>, units: Units) -> Self {
        Self { location: Location::City(name.into()), units }
    }

    pub fn coordinates(lat: f64, lon: f64, units: Units) -> Self {
        Self { location: Location::Coordinates { lat, lon }, units }
    }
}

/// Snapshot of the weather right now at the resolved location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub sunrise: i64,
    pub sunset: i64,
    /// Short condition label, e.g. "Clouds".
    pub details: String,
    pub icon: String,
    /// Observation instant, epoch seconds.
    pub dt: i64,
    pub timezone_offset: Option<i32>,
}

/// One display-ready forecast point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBucket {
    /// Pre-formatted local time label ("Tue", "03:00 PM").
    pub title: String,
    pub temp: f64,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub utc_offset_seconds: Option<i32>,
    pub daily: Vec<ForecastBucket>,
    pub hourly: Vec<ForecastBucket>,
}

/// Everything a dashboard needs for one query, serialised as a flat object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    #[serde(flatten)]
    pub current: CurrentConditions,
    #[serde(flatten)]
    pub forecast: ForecastSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_as_str_roundtrip() {
        for units in Units::all() {
            let parsed = Units::try_from(units.as_str()).expect("roundtrip should succeed");
            assert_eq!(*units, parsed);
        }
    }

    #[test]
    fn unknown_units_error() {
        let err = Units::try_from("kelvin").unwrap_err();
        assert!(err.to_string().contains("Unknown unit system"));
    }

    #[test]
    fn city_query_uses_q_parameter() {
        let pairs = Location::City("Tokyo".into()).query_pairs();
        assert_eq!(pairs, vec![("q", "Tokyo".to_string())]);
    }

    #[test]
    fn coordinate_query_uses_lat_lon() {
        let pairs = Location::Coordinates { lat: 51.5085, lon: -0.1257 }.query_pairs();
        assert_eq!(pairs, vec![("lat", "51.5085".to_string()), ("lon", "-0.1257".to_string())]);
    }

    #[test]
    fn report_serialises_flat() {
        let report = WeatherReport {
            current: CurrentConditions {
                name: "London".into(),
                country: "GB".into(),
                lat: 51.5,
                lon: -0.12,
                temp: 11.0,
                feels_like: 10.0,
                temp_min: 9.0,
                temp_max: 12.0,
                humidity: 80,
                wind_speed: 4.1,
                sunrise: 1,
                sunset: 2,
                details: "Clouds".into(),
                icon: "04d".into(),
                dt: 3,
                timezone_offset: Some(3600),
            },
            forecast: ForecastSummary::default(),
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["name"], "London");
        assert_eq!(value["icon"], "04d");
        assert_eq!(value["utc_offset_seconds"], serde_json::Value::Null);
        assert!(value["daily"].as_array().unwrap().is_empty());
        assert!(value.get("current").is_none());
    }
}
