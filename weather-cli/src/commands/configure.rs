use std::path::PathBuf;

use anyhow::{Context as _, bail};
use async_trait::async_trait;
use clap::Parser;
use inquire::{Password, Text};
use weather_core::{Command, Config, Context};

pub const NAME: &str = "configure";

#[derive(Debug, Parser)]
#[command(name = "weather configure", no_binary_name = true, about = "Configure a provider")]
struct ConfigureArgs {
    /// Provider short name, e.g. "openweather" or "weatherapi".
    provider: String,

    /// API key; prompted for when absent.
    #[arg(long)]
    api_key: Option<String>,

    /// Location to show for this provider; prompted for when the API key is.
    #[arg(long)]
    location: Option<String>,
}

/// Stores credentials and location for one provider in the config file.
pub struct Configure {
    ctx: Context,
    path: Option<PathBuf>,
}

impl Configure {
    pub fn new(ctx: &Context) -> Self {
        Self { ctx: ctx.clone(), path: None }
    }

    /// Write to `path` instead of the platform config file.
    #[cfg(test)]
    pub fn with_path(ctx: &Context, path: PathBuf) -> Self {
        Self { ctx: ctx.clone(), path: Some(path) }
    }

    fn ensure_known(&self, provider: &str) -> anyhow::Result<()> {
        let names = self.ctx.provider_names();
        if !names.iter().any(|name| name == provider) {
            bail!("Unknown provider '{provider}'. Supported providers: {}.", names.join(", "));
        }
        Ok(())
    }
}

#[async_trait]
impl Command for Configure {
    async fn run(&self, args: &[String]) -> anyhow::Result<()> {
        let args = match ConfigureArgs::try_parse_from(args) {
            Ok(args) => args,
            Err(err) if !err.use_stderr() => {
                return self
                    .ctx
                    .stdout()
                    .write_str(&err.render().to_string())
                    .context("Failed to write usage");
            }
            Err(err) => return Err(err.into()),
        };
        self.ensure_known(&args.provider)?;

        let mut config = self.ctx.config().clone();
        let current_location = config.location_for(&args.provider).to_string();

        let (api_key, location) = match args.api_key {
            Some(key) => (key, args.location),
            None => {
                let key = Password::new(&format!("API key for {}:", args.provider))
                    .without_confirmation()
                    .prompt()
                    .context("Failed to read API key")?;
                let location = match args.location {
                    Some(location) => location,
                    None => Text::new("Location:")
                        .with_default(&current_location)
                        .prompt()
                        .context("Failed to read location")?,
                };
                (key, Some(location))
            }
        };

        if config.is_provider_configured(&args.provider) {
            self.ctx
                .stderr()
                .write_line(&format!("Replacing the stored API key for '{}'", args.provider))
                .context("Failed to write warning")?;
        }
        config.upsert_provider_api_key(&args.provider, api_key);
        if let Some(location) = location {
            config.set_provider_location(&args.provider, location);
        }

        let path = match &self.path {
            Some(path) => {
                config.save_to(path)?;
                path.clone()
            }
            None => config.save()?,
        };

        tracing::info!(provider = %args.provider, path = %path.display(), "configuration saved");
        self.ctx
            .stdout()
            .write_line(&format!("Configured provider '{}' in {}", args.provider, path.display()))
            .context("Failed to write confirmation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn stores_key_and_location_non_interactively() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let (ctx, out) = testing::context(Config::default());

        Configure::with_path(&ctx, path.clone())
            .run(&args(&["weatherapi", "--api-key", "KEY", "--location", "Odesa"]))
            .await
            .unwrap();

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.provider_api_key("weatherapi"), Some("KEY"));
        assert_eq!(saved.location_for("weatherapi"), "Odesa");
        assert!(out.contents().starts_with("Configured provider 'weatherapi'"));
    }

    #[tokio::test]
    async fn keeps_other_providers_from_current_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut existing = Config::default();
        existing.upsert_provider_api_key("openweather", "OPEN".into());
        let (ctx, _) = testing::context(existing);

        Configure::with_path(&ctx, path.clone())
            .run(&args(&["weatherapi", "--api-key", "KEY"]))
            .await
            .unwrap();

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.provider_api_key("openweather"), Some("OPEN"));
        assert_eq!(saved.provider_api_key("weatherapi"), Some("KEY"));
    }

    #[tokio::test]
    async fn replacing_a_key_warns_on_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut existing = Config::default();
        existing.upsert_provider_api_key("openweather", "OLD".into());
        let (ctx, _, err) = testing::context_with_stderr(existing);

        Configure::with_path(&ctx, path.clone())
            .run(&args(&["openweather", "--api-key", "NEW"]))
            .await
            .unwrap();

        assert_eq!(err.contents(), "Replacing the stored API key for 'openweather'\n");
        assert_eq!(Config::load_from(&path).unwrap().provider_api_key("openweather"), Some("NEW"));
    }

    #[tokio::test]
    async fn first_key_is_stored_without_warning() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _, err) = testing::context_with_stderr(Config::default());

        Configure::with_path(&ctx, dir.path().join("config.toml"))
            .run(&args(&["weatherapi", "--api-key", "KEY"]))
            .await
            .unwrap();

        assert_eq!(err.contents(), "");
    }

    #[tokio::test]
    async fn unknown_provider_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let (ctx, _) = testing::context(Config::default());

        let err = Configure::with_path(&ctx, path.clone())
            .run(&args(&["doesnotexist", "--api-key", "KEY"]))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Unknown provider 'doesnotexist'"));
        assert!(err.to_string().contains("openweather, weatherapi"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn help_is_printed_instead_of_failing() {
        let (ctx, out) = testing::context(Config::default());

        Configure::new(&ctx).run(&args(&["--help"])).await.unwrap();

        let text = out.contents();
        assert!(text.contains("Usage: weather configure"));
        assert!(text.contains("--api-key"));
    }

    #[tokio::test]
    async fn missing_provider_argument_is_a_usage_error() {
        let (ctx, _) = testing::context(Config::default());
        let result = Configure::new(&ctx).run(&[]).await;
        assert!(result.is_err());
    }
}
