use html_escape::encode_text;
use skydeck_types::{DisplayMode, Reading, Theme, WeatherObservation};
use skydeck_util::format_observed_at;

use crate::weather::LoadState;

/// Shown in place of any unavailable reading.
pub const MISSING_VALUE: &str = "—";

const LOADING_MESSAGE: &str = "Fetching San Francisco weather…";
const PREPARING_MESSAGE: &str = "Preparing weather widget…";

pub fn format_temperature(reading: Reading, unit: char) -> String {
    match reading.finite() {
        Some(value) => format!("{value:.1}°{unit}"),
        None => MISSING_VALUE.to_string(),
    }
}

fn format_with_suffix(reading: Reading, suffix: &str) -> String {
    match reading.finite() {
        Some(value) => format!("{value}{suffix}"),
        None => MISSING_VALUE.to_string(),
    }
}

/// Display strings for one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherCardView {
    pub location: String,
    pub temperature: String,
    pub description: String,
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
    pub updated: String,
    pub source: String,
    pub dark: bool,
}

impl WeatherCardView {
    pub fn new(observation: &WeatherObservation, theme: Theme) -> Self {
        Self {
            location: observation.location.clone(),
            temperature: format_temperature(observation.temperature_c, 'C'),
            description: observation.description.clone(),
            feels_like: format_temperature(observation.temperature_f, 'F'),
            humidity: format_with_suffix(observation.humidity, "%"),
            wind: format_with_suffix(observation.wind_kph, " km/h"),
            updated: format_observed_at(&observation.observed_at),
            source: observation.source.clone(),
            dark: theme == Theme::Dark,
        }
    }

    pub fn to_html(&self) -> String {
        let class = if self.dark { "card dark" } else { "card" };
        let stats = [
            ("Feels Like", &self.feels_like),
            ("Humidity", &self.humidity),
            ("Wind", &self.wind),
            ("Updated", &self.updated),
        ]
        .iter()
        .map(|(label, value)| {
            format!(
                r#"<div class="meta-item"><span class="label">{label}</span><strong>{}</strong></div>"#,
                encode_text(value)
            )
        })
        .collect::<String>();

        format!(
            r#"<article class="{class}" aria-live="polite">
  <header class="card-header">
    <h1><span>{}</span><span class="temp">{}</span></h1>
    <p class="description">{}</p>
  </header>
  <section class="meta" aria-label="Weather statistics">{stats}</section>
  <footer><small class="label">Source: {}</small></footer>
</article>"#,
            encode_text(&self.location),
            encode_text(&self.temperature),
            encode_text(&self.description),
            encode_text(&self.source),
        )
    }
}

/// Render the weather widget frame for the current load state.
pub fn render_weather_frame(state: &LoadState, display_mode: DisplayMode, max_height: u32, theme: Theme) -> String {
    let content = match state {
        LoadState::Idle => format!(r#"<p class="loading">{PREPARING_MESSAGE}</p>"#),
        LoadState::Loading => format!(r#"<p class="loading">{LOADING_MESSAGE}</p>"#),
        LoadState::Error(message) => format!(r#"<p class="error" role="alert">{}</p>"#, encode_text(message)),
        LoadState::Success(observation) => WeatherCardView::new(observation, theme).to_html(),
    };
    let (class, mode) = match display_mode {
        DisplayMode::Fullscreen => ("widget-frame fullscreen", "fullscreen"),
        DisplayMode::Inline => ("widget-frame", "inline"),
        DisplayMode::Pip => ("widget-frame", "pip"),
    };
    format!(r#"<main class="{class}" style="max-height: {max_height}px" data-mode="{mode}">{content}</main>"#)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skydeck_types::Coordinates;

    fn observation() -> WeatherObservation {
        WeatherObservation {
            location: "San Francisco".into(),
            coordinates: Coordinates { lat: 37.7749, lon: -122.4194 },
            description: "clear <sky>".into(),
            temperature_c: Reading::new(18.0),
            temperature_f: Reading::new(64.4),
            humidity: Reading::new(72.0),
            wind_kph: Reading::UNAVAILABLE,
            observed_at: "2025-10-19T08:00:00.000Z".into(),
            source: "openweathermap".into(),
        }
    }

    #[test]
    fn sentinel_readings_render_as_a_dash() {
        let view = WeatherCardView::new(
            &WeatherObservation {
                temperature_c: Reading::UNAVAILABLE,
                temperature_f: Reading::UNAVAILABLE,
                humidity: Reading::UNAVAILABLE,
                ..observation()
            },
            Theme::Light,
        );
        assert_eq!(view.temperature, MISSING_VALUE);
        assert_eq!(view.feels_like, MISSING_VALUE);
        assert_eq!(view.humidity, MISSING_VALUE);
        assert_eq!(view.wind, MISSING_VALUE);
        assert!(!view.to_html().contains("NaN"));
    }

    #[test]
    fn finite_readings_are_formatted() {
        let view = WeatherCardView::new(&observation(), Theme::Dark);
        assert_eq!(view.temperature, "18.0°C");
        assert_eq!(view.feels_like, "64.4°F");
        assert_eq!(view.humidity, "72%");
        assert_eq!(view.updated, "Sun, Oct 19, 8:00 AM");
        assert!(view.dark);

        let html = view.to_html();
        assert!(html.contains(r#"class="card dark""#));
        assert!(html.contains("clear &lt;sky&gt;"));
    }

    #[test]
    fn frame_reflects_load_state_and_mode() {
        let loading = render_weather_frame(&LoadState::Loading, DisplayMode::Inline, 480, Theme::Light);
        assert!(loading.contains("Fetching San Francisco weather…"));
        assert!(loading.contains("max-height: 480px"));

        let idle = render_weather_frame(&LoadState::Idle, DisplayMode::Fullscreen, 720, Theme::Light);
        assert!(idle.contains("Preparing weather widget…"));
        assert!(idle.contains(r#"class="widget-frame fullscreen""#));

        let error = render_weather_frame(&LoadState::Error("boom <b>".into()), DisplayMode::Pip, 720, Theme::Light);
        assert!(error.contains(r#"<p class="error" role="alert">boom &lt;b&gt;</p>"#));
    }
}
