//! Location input validation and normalization
//!
//! Turns raw user text into a `Location`: either a 6-digit Indian pincode or
//! a city name. City names are normalized through a small table of known
//! spellings and otherwise title-cased.

use std::fmt;
use thiserror::Error;

/// Country code appended to every API query
pub const COUNTRY_CODE: &str = "IN";

/// Known city spellings mapped to the name the weather API expects
///
/// Keys are lowercase. Anything not listed here is title-cased instead.
pub static CITY_ALIASES: [(&str, &str); 8] = [
    ("new delhi", "New Delhi"),
    ("delhi", "Delhi"),
    ("mumbai", "Mumbai"),
    ("bangalore", "Bengaluru"),
    ("kolkata", "Kolkata"),
    ("chennai", "Chennai"),
    ("hyderabad", "Hyderabad"),
    ("pune", "Pune"),
];

/// Rejected location input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    /// Input is neither a 6-digit pincode nor a plausible city name
    #[error("Invalid input. Please enter a valid Indian city name or 6-digit pincode.")]
    Invalid(String),
}

/// How a location is identified when querying the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    Pincode,
    City,
}

impl LocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationKind::Pincode => "pincode",
            LocationKind::City => "city",
        }
    }
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, normalized location
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    kind: LocationKind,
    name: String,
}

impl Location {
    /// Builds a location from already-normalized parts
    pub fn new(kind: LocationKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Validates and normalizes raw user input
    ///
    /// # Returns
    /// * `Ok(Location)` with kind `Pincode` for exactly six digits
    /// * `Ok(Location)` with kind `City` for letters, spaces, hyphens,
    ///   apostrophes and periods
    /// * `Err(LocationError::Invalid)` for anything else, including blank input
    pub fn parse(input: &str) -> Result<Self, LocationError> {
        let trimmed = input.trim();

        if is_pincode(trimmed) {
            return Ok(Self::new(LocationKind::Pincode, trimmed));
        }

        if is_city_name(trimmed) {
            return Ok(Self::new(LocationKind::City, normalize_city(trimmed)));
        }

        Err(LocationError::Invalid(input.to_string()))
    }

    pub fn kind(&self) -> LocationKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key under which weather for this location is cached
    ///
    /// The kind prefix keeps a pincode and a city with identical text apart.
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.kind, self.name)
    }

    /// Query-string fragment selecting this location, e.g. `zip=110001,IN`
    pub fn query(&self) -> String {
        let param = match self.kind {
            LocationKind::Pincode => "zip",
            LocationKind::City => "q",
        };
        format!("{}={},{}", param, self.name, COUNTRY_CODE)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn is_pincode(s: &str) -> bool {
    s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_city_name(s: &str) -> bool {
    !s.is_empty()
        && s.chars().any(|c| c.is_ascii_alphabetic())
        && s.chars().all(|c| {
            c.is_ascii_alphabetic() || c.is_whitespace() || matches!(c, '-' | '.' | '\'')
        })
}

/// Maps a city name to its canonical spelling
pub fn normalize_city(name: &str) -> String {
    let key = name.trim().to_lowercase();

    CITY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| title_case(name.trim()))
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}
