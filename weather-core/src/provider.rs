use crate::{
    context::Context,
    error::RegistryError,
    model::WeatherData,
    provider::{openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider},
    registry::{OrderedRegistry, Registry},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub mod openweather;
pub mod weatherapi;

/// A source of weather data.
///
/// `title` and `location` are read before `run`; any of the three may do I/O
/// and any of them may fail.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn title(&self) -> anyhow::Result<String>;

    async fn location(&self) -> anyhow::Result<String>;

    /// `args` are the tokens the dispatcher did not recognize.
    async fn run(&self, args: &[String]) -> anyhow::Result<WeatherData>;
}

/// Builds a fresh provider for every invocation.
pub type ProviderFactory = Arc<dyn Fn(&Context) -> Box<dyn Provider> + Send + Sync>;

pub type ProviderRegistry = OrderedRegistry<ProviderFactory>;

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::with_kind("provider")
    }

    /// Every provider compiled into the binary, in display order.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut providers = Self::new();
        providers.register(openweather::NAME, OpenWeatherProvider::new)?;
        providers.register(weatherapi::NAME, WeatherApiProvider::new)?;
        Ok(providers)
    }

    /// Typed convenience over [`Registry::add`].
    pub fn register<F, P>(&mut self, name: &str, make: F) -> Result<(), RegistryError>
    where
        F: Fn(&Context) -> P + Send + Sync + 'static,
        P: Provider + 'static,
    {
        let factory: ProviderFactory =
            Arc::new(move |ctx: &Context| Box::new(make(ctx)) as Box<dyn Provider>);
        self.add(name, factory)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Error for a provider that has no API key configured yet.
pub(crate) fn missing_api_key(name: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "No API key configured for provider '{name}'.\n\
         Hint: run `weather configure {name}` and enter your API key."
    )
}

pub(crate) fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
