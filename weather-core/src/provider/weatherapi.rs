use anyhow::{Context as _, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    context::Context,
    model::{Observation, WeatherData},
    provider::{Provider, missing_api_key, truncate_body, unix_to_utc},
};

pub const NAME: &str = "weatherapi";
pub const TITLE: &str = "WeatherAPI.com";

const CURRENT_URL: &str = "http://api.weatherapi.com/v1/current.json";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    ctx: Context,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(ctx: &Context) -> Self {
        Self { ctx: ctx.clone(), http: Client::new() }
    }

    async fn fetch_current(&self, api_key: &str, address: &str) -> Result<Observation> {
        let res = self
            .http
            .get(CURRENT_URL)
            .query(&[("key", api_key), ("q", address)])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (current)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read WeatherAPI current response body")?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "WeatherAPI current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        parse_current(&body)
    }
}

fn parse_current(body: &str) -> Result<Observation> {
    let parsed: WaResponse =
        serde_json::from_str(body).context("Failed to parse WeatherAPI current JSON")?;

    let ts = parsed.current.last_updated_epoch.or(parsed.location.localtime_epoch);
    let observation_time = ts.and_then(unix_to_utc).unwrap_or_else(Utc::now);

    let location_name = format!("{}, {}", parsed.location.name, parsed.location.country);
    let wind_speed_mps = parsed.current.wind_kph / 3.6;

    Ok(Observation {
        location_name,
        temperature_c: parsed.current.temp_c,
        feels_like_c: parsed.current.feelslike_c,
        condition: parsed.current.condition.text,
        humidity_pct: parsed.current.humidity,
        wind_speed_mps,
        observation_time,
    })
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
    localtime_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: u8,
    wind_kph: f64,
    condition: WaCondition,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[async_trait]
impl Provider for WeatherApiProvider {
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

        let api_key = self
            .ctx
            .config()
            .provider_api_key(NAME)
            .ok_or_else(|| missing_api_key(NAME))?;
        let location = self.location().await?;

        tracing::info!(provider = NAME, %location, refresh = self.ctx.refresh(), "fetching current weather");
        let observation = self.fetch_current(api_key, &location).await?;
        Ok(observation.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_converts_wind_to_mps() {
        let body = r#"{
            "location": { "name": "Lviv", "country": "Ukraine", "localtime_epoch": 1700000100 },
            "current": {
                "temp_c": 5.0, "feelslike_c": 2.0, "humidity": 70, "wind_kph": 18.0,
                "condition": { "text": "Overcast" },
                "last_updated_epoch": null
            }
        }"#;

        let obs = parse_current(body).unwrap();

        assert_eq!(obs.location_name, "Lviv, Ukraine");
        assert_eq!(obs.condition, "Overcast");
        assert!((obs.wind_speed_mps - 5.0).abs() < 1e-9);
        assert_eq!(obs.observation_time.timestamp(), 1_700_000_100);
    }
}
