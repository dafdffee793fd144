//! Core types for the Skydeck tool server.

pub mod errors;

pub use errors::WeatherToolError;
