//! Normalized weather observation returned by the `get_weather` tool.

use std::borrow::Cow;

use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Provenance tag attached to every observation.
pub const WEATHER_SOURCE: &str = "openweathermap";

/// A numeric reading that may be unavailable.
///
/// The unavailable state is a non-finite sentinel rather than zero. JSON has
/// no NaN, so the sentinel travels as `null` and any `null` or missing value
/// decodes back to the sentinel.
#[derive(Debug, Clone, Copy)]
pub struct Reading(f64);

impl Reading {
    /// The "value unavailable" sentinel.
    pub const UNAVAILABLE: Reading = Reading(f64::NAN);

    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Build a reading from an optional upstream value.
    pub fn from_option(value: Option<f64>) -> Self {
        value.map(Self).unwrap_or(Self::UNAVAILABLE)
    }

    /// Raw value, possibly non-finite.
    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_available(self) -> bool {
        self.0.is_finite()
    }

    /// The value when finite, `None` for the sentinel.
    pub fn finite(self) -> Option<f64> {
        self.is_available().then_some(self.0)
    }

    /// Round to one decimal place, leaving the sentinel untouched.
    pub fn round_to_tenth(self) -> Self {
        match self.finite() {
            Some(value) => Self((value * 10.0).round() / 10.0),
            None => self,
        }
    }

    /// Apply `transform` to a finite value; the sentinel propagates.
    pub fn map(self, transform: impl FnOnce(f64) -> f64) -> Self {
        match self.finite() {
            Some(value) => Self(transform(value)),
            None => Self::UNAVAILABLE,
        }
    }
}

impl Default for Reading {
    fn default() -> Self {
        Self::UNAVAILABLE
    }
}

impl PartialEq for Reading {
    fn eq(&self, other: &Self) -> bool {
        match (self.finite(), other.finite()) {
            (Some(left), Some(right)) => left == right,
            (None, None) => true,
            _ => false,
        }
    }
}

impl From<f64> for Reading {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.finite() {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Reading {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<f64>::deserialize(deserializer).map(Self::from_option)
    }
}

impl JsonSchema for Reading {
    fn schema_name() -> Cow<'static, str> {
        "Reading".into()
    }

    fn inline_schema() -> bool {
        true
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": ["number", "null"],
            "description": "Numeric reading; null when the upstream source did not report it."
        })
    }
}

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Current conditions at a coordinate, normalized from the upstream provider.
///
/// Every field is always present on the wire. Missing upstream numbers are
/// carried as [`Reading::UNAVAILABLE`], so renderers only special-case
/// non-finite values, never missing keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherObservation {
    pub location: String,
    #[serde(default)]
    pub coordinates: Coordinates,
    pub description: String,
    #[serde(default)]
    pub temperature_c: Reading,
    #[serde(default)]
    pub temperature_f: Reading,
    #[serde(default)]
    pub humidity: Reading,
    #[serde(default)]
    pub wind_kph: Reading,
    /// ISO-8601 observation timestamp.
    pub observed_at: String,
    pub source: String,
}
