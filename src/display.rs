//! Human-readable rendering of weather snapshots
//!
//! All times are shown in Indian Standard Time (UTC+05:30), since every
//! location this tool queries is in India.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Utc};

use crate::data::location::title_case;
use crate::data::{ForecastEntry, WeatherSnapshot};

/// Offset of Indian Standard Time from UTC, in seconds
pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Forecast slots per day (3-hour intervals)
const SLOTS_PER_DAY: usize = 8;

/// Maximum number of forecast slots printed
const MAX_FORECAST_SLOTS: usize = 4;

/// Horizontal rule printed between sections
pub const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Indian Standard Time
pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Format a unix timestamp as `HH:MM` in IST
fn clock_time(unix_secs: i64) -> String {
    DateTime::from_timestamp(unix_secs, 0)
        .map(|dt| dt.with_timezone(&ist()).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Render the current conditions block
pub fn format_current_weather(snapshot: &WeatherSnapshot) -> String {
    let current = snapshot.current_conditions();
    let condition = current.condition();

    let location_name = current.name.as_deref().unwrap_or("Unknown");
    let country = current.sys.country.as_deref().unwrap_or("");
    let description = title_case(
        condition
            .and_then(|c| c.description.as_deref())
            .unwrap_or("Unknown"),
    );
    let visibility_km = current.visibility / 1000.0;

    format!(
        "\nCurrent weather is as follows:\n\n\
         Location: {}, {}\n\
         Temperature: {}°C (Feels like {}°C)\n\
         Condition: {}\n\
         Humidity: {}%\n\
         Pressure: {} hPa\n\
         Visibility: {:.1} km\n\
         Wind: {} m/s at {} Degree\n\
         Sunrise: {}\n\
         Sunset: {}\n",
        location_name,
        country,
        current.main.temp,
        current.main.feels_like,
        description,
        current.main.humidity,
        current.main.pressure,
        visibility_km,
        current.wind.speed,
        current.wind.deg,
        clock_time(current.sys.sunrise),
        clock_time(current.sys.sunset),
    )
}

/// Pick the forecast slots that fall on `tomorrow` (IST)
///
/// Falls back to the first day's worth of slots when none match.
pub fn select_tomorrow(entries: &[ForecastEntry], tomorrow: NaiveDate) -> Vec<&ForecastEntry> {
    let offset = ist();
    let matching: Vec<&ForecastEntry> = entries
        .iter()
        .filter(|entry| {
            DateTime::from_timestamp(entry.dt, 0)
                .map(|dt| dt.with_timezone(&offset).date_naive() == tomorrow)
                .unwrap_or(false)
        })
        .collect();

    if matching.is_empty() {
        entries.iter().take(SLOTS_PER_DAY).collect()
    } else {
        matching
    }
}

/// Render tomorrow's forecast relative to `now`
pub fn format_forecast(snapshot: &WeatherSnapshot, now: DateTime<Utc>) -> String {
    let Some(entries) = snapshot.forecast_entries() else {
        return "Forecast data not available".to_string();
    };

    if entries.is_empty() {
        return "No forecast data available".to_string();
    }

    let tomorrow = (now.with_timezone(&ist()) + Duration::days(1)).date_naive();
    let mut output = String::from("\nHere is the details for tomorrow's weather:\n");

    for entry in select_tomorrow(&entries, tomorrow).into_iter().take(MAX_FORECAST_SLOTS) {
        output.push_str(&format!(
            "\n  {}: {}°C - {}\n   Humidity: {}% | Wind: {} m/s\n",
            clock_time(entry.dt),
            entry.main.temp,
            title_case(entry.description().unwrap_or("Unknown")),
            entry.main.humidity,
            entry.wind.speed,
        ));
    }

    output
}

/// Render the "Data fetched at" footer in IST
pub fn format_fetched_at(snapshot: &WeatherSnapshot) -> String {
    format!(
        "Data fetched at: {}",
        snapshot
            .fetched_at
            .with_timezone(&ist())
            .format("%Y-%m-%d %H:%M:%S")
    )
}
