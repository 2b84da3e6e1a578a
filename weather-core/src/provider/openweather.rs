use anyhow::{Context as _, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    context::Context,
    model::{Observation, WeatherData},
    provider::{Provider, missing_api_key, truncate_body, unix_to_utc},
};

pub const NAME: &str = "openweather";
pub const TITLE: &str = "OpenWeatherMap";

const CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    ctx: Context,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(ctx: &Context) -> Self {
        Self { ctx: ctx.clone(), http: Client::new() }
    }

    async fn fetch_current(&self, api_key: &str, address: &str) -> Result<Observation> {
        let res = self
            .http
            .get(CURRENT_URL)
            .query(&[("q", address), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        parse_current(&body)
    }
}

fn parse_current(body: &str) -> Result<Observation> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).context("Failed to parse OpenWeather current JSON")?;

    let observation_time = unix_to_utc(parsed.dt).unwrap_or_else(Utc::now);

    let condition = parsed
        .weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    let location_name = match parsed.sys.and_then(|sys| sys.country) {
        Some(country) => format!("{}, {}", parsed.name, country),
        None => parsed.name,
    };

    Ok(Observation {
        location_name,
        temperature_c: parsed.main.temp,
        feels_like_c: parsed.main.feels_like,
        condition,
        humidity_pct: parsed.main.humidity,
        wind_speed_mps: parsed.wind.speed,
        observation_time,
    })
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: Option<OwSys>,
}

#[async_trait]
impl Provider for OpenWeatherProvider {
    async fn title(&self) -> Result<String> {
        Ok(TITLE.to_string())
    }

    async fn location(&self) -> Result<String> {
        Ok(self.ctx.config().location_for(NAME).to_string())
    }

    async fn run(&self, args: &[String]) -> Result<WeatherData> {
        if !args.is_empty() {
            tracing::debug!(provider = NAME, ?args, "ignoring extra arguments");
        }
        if self.ctx.refresh() {
            tracing::debug!(provider = NAME, "refresh requested, fetching live data");
        }

        let api_key = self
            .ctx
            .config()
            .provider_api_key(NAME)
            .ok_or_else(|| missing_api_key(NAME))?;
        let location = self.location().await?;

        tracing::info!(provider = NAME, %location, "fetching current weather");
        let observation = self.fetch_current(api_key, &location).await?;
        Ok(observation.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "name": "Kyiv",
        "dt": 1700000000,
        "main": { "temp": 2.71, "feels_like": -0.4, "humidity": 81, "pressure": 1012 },
        "weather": [ { "id": 600, "main": "Snow", "description": "light snow" } ],
        "wind": { "speed": 3.6, "deg": 200 },
        "sys": { "country": "UA" }
    }"#;

    #[test]
    fn parses_current_conditions() {
        let obs = parse_current(SAMPLE).expect("sample should parse");

        assert_eq!(obs.location_name, "Kyiv, UA");
        assert_eq!(obs.condition, "light snow");
        assert_eq!(obs.humidity_pct, 81);
        assert_eq!(obs.observation_time.timestamp(), 1_700_000_000);
    }

    #[test]
    fn empty_weather_list_is_unknown_condition() {
        let body = SAMPLE.replace(
            r#"[ { "id": 600, "main": "Snow", "description": "light snow" } ]"#,
            "[]",
        );
        let obs = parse_current(&body).unwrap();
        assert_eq!(obs.condition, "Unknown");
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = parse_current("{}").unwrap_err();
        assert!(err.to_string().contains("Failed to parse OpenWeather current JSON"));
    }
}
