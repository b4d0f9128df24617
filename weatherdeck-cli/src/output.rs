use std::fmt::{self, Write};

use weatherdeck_core::{
    ForecastBucket, Units, WeatherError, WeatherReport, format_local_time,
    time::{CLOCK_PATTERN, FULL_PATTERN},
};

/// Whole degrees, halves rounded away from zero as on the forecast cards.
fn degrees(value: f64) -> String {
    format!("{:.0}°", value.round())
}

/// Render a report as plain text for the terminal.
///
/// `icon_url` turns an icon code into the address shown next to each entry.
pub fn render(
    report: &WeatherReport,
    units: Units,
    icon_url: impl Fn(&str) -> String,
) -> Result<String, WeatherError> {
    let current = &report.current;
    let offset = current
        .timezone_offset
        .or(report.forecast.utc_offset_seconds)
        .unwrap_or(0);

    let title = format_local_time(current.dt, offset, FULL_PATTERN)?;
    let sunrise = format_local_time(current.sunrise, offset, CLOCK_PATTERN)?;
    let sunset = format_local_time(current.sunset, offset, CLOCK_PATTERN)?;

    let mut out = String::new();
    write_report(&mut out, report, units, &title, (sunrise.as_str(), sunset.as_str()), &icon_url)
        .map_err(|e| WeatherError::Format(e.to_string()))?;

    Ok(out)
}

fn write_report(
    out: &mut String,
    report: &WeatherReport,
    units: Units,
    title: &str,
    (sunrise, sunset): (&str, &str),
    icon_url: &impl Fn(&str) -> String,
) -> fmt::Result {
    let current = &report.current;

    writeln!(out, "{}, {}", current.name, current.country)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}  {}", current.details, icon_url(&current.icon))?;
    writeln!(
        out,
        "Temperature {}{} (feels like {}), low {} / high {}",
        degrees(current.temp),
        units.temperature_symbol().trim_start_matches('°'),
        degrees(current.feels_like),
        degrees(current.temp_min),
        degrees(current.temp_max),
    )?;
    writeln!(
        out,
        "Humidity {}%  Wind {:.1} {}",
        current.humidity,
        current.wind_speed,
        units.speed_symbol()
    )?;
    writeln!(out, "Sunrise {sunrise}  Sunset {sunset}")?;

    section(out, "Hourly forecast", &report.forecast.hourly, icon_url)?;
    section(out, "Daily forecast", &report.forecast.daily, icon_url)
}

fn section(
    out: &mut String,
    title: &str,
    buckets: &[ForecastBucket],
    icon_url: &impl Fn(&str) -> String,
) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{}", title.to_uppercase())?;
    if buckets.is_empty() {
        return writeln!(out, "  (no data)");
    }
    for bucket in buckets {
        writeln!(
            out,
            "  {:<9} {:>5}  {}",
            bucket.title,
            degrees(bucket.temp),
            icon_url(&bucket.icon)
        )?;
    }
    Ok(())
}
