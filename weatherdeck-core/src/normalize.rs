//! Shapes raw OpenWeather payloads into display records.
//!
//! Wire types mirror the provider JSON with every field optional, so a
//! malformed payload is reported as a [`WeatherError::ProviderShape`] naming
//! the missing path instead of failing somewhere inside serde.

use chrono::{NaiveDate, Timelike};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::{
    error::{WeatherError, require},
    model::{CurrentConditions, ForecastBucket, ForecastSummary},
    time::{CLOCK_PATTERN, WEEKDAY_PATTERN, format_local_time, local_datetime},
};

/// Upper bound on daily and hourly bucket counts.
pub const MAX_BUCKETS: usize = 5;

const NOON_SECS: i64 = 12 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct OwCoord {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwMain {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwSys {
    pub country: Option<String>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwCondition {
    pub main: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwWind {
    pub speed: Option<f64>,
}

/// `GET /weather` body.
#[derive(Debug, Clone, Deserialize)]
pub struct OwCurrentResponse {
    pub coord: Option<OwCoord>,
    pub main: Option<OwMain>,
    pub name: Option<String>,
    pub dt: Option<i64>,
    pub sys: Option<OwSys>,
    pub weather: Option<Vec<OwCondition>>,
    pub wind: Option<OwWind>,
    pub timezone: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwForecastEntry {
    pub dt: Option<i64>,
    pub main: Option<OwMain>,
    pub weather: Option<Vec<OwCondition>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwCity {
    pub timezone: Option<i32>,
}

/// `GET /forecast` body.
#[derive(Debug, Clone, Deserialize)]
pub struct OwForecastResponse {
    pub list: Option<Vec<OwForecastEntry>>,
    pub city: Option<OwCity>,
}

impl OwCurrentResponse {
    /// Coordinates the provider resolved the query to.
    pub fn coordinates(&self) -> Result<(f64, f64), WeatherError> {
        let coord = require(self.coord.as_ref(), "coord")?;
        Ok((require(coord.lat, "coord.lat")?, require(coord.lon, "coord.lon")?))
    }
}

/// Map a current-conditions payload, failing on any missing required field.
pub fn map_current(raw: &OwCurrentResponse) -> Result<CurrentConditions, WeatherError> {
    let (lat, lon) = raw.coordinates()?;

    let main = require(raw.main.as_ref(), "main")?;
    let sys = require(raw.sys.as_ref(), "sys")?;
    let wind = require(raw.wind.as_ref(), "wind")?;
    let condition = first_condition(raw.weather.as_deref(), "weather")?;

    Ok(CurrentConditions {
        name: require(raw.name.clone(), "name")?,
        country: require(sys.country.clone(), "sys.country")?,
        lat,
        lon,
        temp: require(main.temp, "main.temp")?,
        feels_like: require(main.feels_like, "main.feels_like")?,
        temp_min: require(main.temp_min, "main.temp_min")?,
        temp_max: require(main.temp_max, "main.temp_max")?,
        humidity: require(main.humidity, "main.humidity")?,
        wind_speed: require(wind.speed, "wind.speed")?,
        sunrise: require(sys.sunrise, "sys.sunrise")?,
        sunset: require(sys.sunset, "sys.sunset")?,
        details: require(condition.main.clone(), "weather[0].main")?,
        icon: require(condition.icon.clone(), "weather[0].icon")?,
        dt: require(raw.dt, "dt")?,
        timezone_offset: raw.timezone,
    })
}

fn first_condition<'a>(
    list: Option<&'a [OwCondition]>,
    path: &str,
) -> Result<&'a OwCondition, WeatherError> {
    require(list, path)?
        .first()
        .ok_or_else(|| WeatherError::ProviderShape(format!("`{path}` is empty")))
}

/// A validated forecast sample; `index` is its position in the provider list.
#[derive(Debug, Clone, PartialEq)]
struct Sample {
    index: usize,
    dt: i64,
    temp: f64,
    icon: String,
}

fn samples(raw: &OwForecastResponse) -> Result<Vec<Sample>, WeatherError> {
    require(raw.list.as_ref(), "list")?
        .iter()
        .enumerate()
        .map(|(index, entry)| -> Result<Sample, WeatherError> {
            let main = require(entry.main.as_ref(), &format!("list[{index}].main"))?;
            let condition =
                first_condition(entry.weather.as_deref(), &format!("list[{index}].weather"))?;

            Ok(Sample {
                index,
                dt: require(entry.dt, &format!("list[{index}].dt"))?,
                temp: require(main.temp, &format!("list[{index}].main.temp"))?,
                icon: require(
                    condition.icon.clone(),
                    &format!("list[{index}].weather[0].icon"),
                )?,
            })
        })
        .collect()
}

/// Build daily and hourly buckets from a forecast payload.
///
/// `reference_epoch` marks "today": its local date (at the forecast's offset)
/// and anything earlier are left out of the daily list.
pub fn summarize_forecast(
    raw: &OwForecastResponse,
    reference_epoch: i64,
) -> Result<ForecastSummary, WeatherError> {
    let utc_offset_seconds = raw.city.as_ref().and_then(|c| c.timezone);
    let offset = utc_offset_seconds.unwrap_or(0);
    let samples = samples(raw)?;

    let today = local_datetime(reference_epoch, offset)?.date_naive();

    Ok(ForecastSummary {
        utc_offset_seconds,
        daily: daily_buckets(&samples, offset, today)?,
        hourly: hourly_buckets(&samples, offset)?,
    })
}

/// One bucket per local date after `today`, in date order, at most [`MAX_BUCKETS`].
///
/// Within a date the sample closest to local noon wins; on equal distance the
/// sample listed first by the provider wins.
fn daily_buckets(
    samples: &[Sample],
    offset: i32,
    today: NaiveDate,
) -> Result<Vec<ForecastBucket>, WeatherError> {
    let mut days: BTreeMap<NaiveDate, Vec<(u64, &Sample)>> = BTreeMap::new();

    for sample in samples {
        let local = local_datetime(sample.dt, offset)?;
        let date = local.date_naive();
        if date <= today {
            continue;
        }

        let distance = (i64::from(local.num_seconds_from_midnight()) - NOON_SECS).unsigned_abs();
        days.entry(date).or_default().push((distance, sample));
    }

    days.into_values()
        .filter_map(|candidates| {
            candidates
                .into_iter()
                .min_by_key(|(distance, sample)| (*distance, sample.index))
                .map(|(_, sample)| sample)
        })
        .take(MAX_BUCKETS)
        .map(|sample| bucket(sample, offset, WEEKDAY_PATTERN))
        .collect()
}

/// The next samples after the first one, ungrouped.
fn hourly_buckets(samples: &[Sample], offset: i32) -> Result<Vec<ForecastBucket>, WeatherError> {
    samples
        .iter()
        .skip(1)
        .take(MAX_BUCKETS)
        .map(|sample| bucket(sample, offset, CLOCK_PATTERN))
        .collect()
}

fn bucket(sample: &Sample, offset: i32, pattern: &str) -> Result<ForecastBucket, WeatherError> {
    Ok(ForecastBucket {
        title: format_local_time(sample.dt, offset, pattern)?,
        temp: sample.temp,
        icon: sample.icon.clone(),
    })
}
