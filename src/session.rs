//! Interactive read-display loop
//!
//! Prompts for an API key, then repeatedly reads a city name or pincode,
//! fetches its weather through a `WeatherService` and prints the result.
//! Input and output are generic so the loop can be driven from tests.

use std::io::{BufRead, Write};

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use crate::cli::StartupConfig;
use crate::data::{FetchError, Location, WeatherClient};
use crate::display::{format_current_weather, format_fetched_at, format_forecast, SEPARATOR};
use crate::service::{Source, WeatherService};

/// Inputs that end the session
const EXIT_COMMANDS: [&str; 3] = ["quit", "exit", "q"];

/// Printed when the user presses Ctrl-C
pub const INTERRUPTED_MESSAGE: &str = "\n\n Weather Tool was interrupted.";

/// Errors that end the session abnormally
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading input or writing output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP client could not be constructed
    #[error("Could not start weather client: {0}")]
    Client(#[from] FetchError),
}

/// Line-oriented terminal wrapper
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `text` followed by a newline
    pub fn say(&mut self, text: &str) -> std::io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    /// Print `text` without a newline and read one trimmed line
    ///
    /// Returns `None` at end of input.
    pub fn prompt(&mut self, text: &str) -> std::io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Consume the console, returning the output sink
    pub fn into_output(self) -> W {
        self.output
    }
}

/// Tell the user the session was interrupted
pub fn report_interrupt<W: Write>(output: &mut W) -> std::io::Result<()> {
    writeln!(output, "{}", INTERRUPTED_MESSAGE)?;
    output.flush()
}

fn is_exit_command(input: &str) -> bool {
    let lowered = input.to_lowercase();
    EXIT_COMMANDS.contains(&lowered.as_str())
}

fn is_decline(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "n" | "no")
}

/// Run the interactive session until the user quits or input ends
pub async fn run<R: BufRead, W: Write>(
    config: &StartupConfig,
    console: &mut Console<R, W>,
) -> Result<(), SessionError> {
    console.say("Welcome to Command Line Weather Tool for India!")?;
    console.say(SEPARATOR)?;

    let api_key = match &config.api_key {
        Some(key) => key.clone(),
        None => console
            .prompt("Enter your OpenWeatherMap API key: ")?
            .unwrap_or_default(),
    };

    if api_key.is_empty() {
        console.say("API key is required. Get one from https://openweathermap.org/api")?;
        return Ok(());
    }

    let client = WeatherClient::with_base_url(api_key, config.base_url.as_str(), config.timeout)?;
    let mut service = WeatherService::with_cache_expiry(client, config.cache_expiry);

    console.say("\n You can enter:")?;
    console.say("   • City names: Delhi, Mumbai, Bangalore, etc.")?;
    console.say("   • Pincodes: 110001, 400001, etc.")?;
    console.say("   • Type 'quit' or 'exit' to stop")?;
    console.say(SEPARATOR)?;

    loop {
        let Some(location) = console.prompt("\n Enter city name or pincode: ")? else {
            console.say("\n Weather Tool input closed.")?;
            break;
        };

        if is_exit_command(&location) {
            console.say(" Thank you for using Weather Tool!")?;
            break;
        }

        if location.is_empty() {
            console.say("  Please enter a valid location.")?;
            continue;
        }

        if !display_weather(&mut service, &location, console).await? {
            continue;
        }

        service.sweep_cache();

        match console.prompt("\n Check another location? (y/n): ")? {
            Some(choice) if !is_decline(&choice) => {}
            _ => {
                console.say("Thank you for using Weather Tool!")?;
                break;
            }
        }
    }

    info!(cached = service.cache().len(), "session finished");
    Ok(())
}

/// Validate, fetch and print weather for one raw input
///
/// Returns whether a report was shown. Validation and fetch failures are
/// printed and reported as `false`.
pub async fn display_weather<R: BufRead, W: Write>(
    service: &mut WeatherService,
    raw: &str,
    console: &mut Console<R, W>,
) -> Result<bool, SessionError> {
    let location = match Location::parse(raw) {
        Ok(location) => location,
        Err(e) => {
            console.say(&e.to_string())?;
            return Ok(false);
        }
    };

    console.say(&format!("Fetching weather data for {}...", location))?;

    let fetched = match service.fetch(&location).await {
        Ok(fetched) => fetched,
        Err(e) => {
            console.say(&e.to_string())?;
            return Ok(false);
        }
    };

    let snapshot = &fetched.snapshot;
    match fetched.source {
        Source::Cache => console.say("Using cached data...")?,
        Source::Network if snapshot.forecast.is_none() => {
            console.say("Could not fetch forecast data, showing current weather only.")?
        }
        Source::Network => {}
    }

    console.say(&format_current_weather(snapshot))?;
    console.say(&format_forecast(snapshot, Utc::now()))?;
    console.say(&format_fetched_at(snapshot))?;
    console.say(SEPARATOR)?;

    Ok(true)
}
