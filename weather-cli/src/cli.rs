use weather_core::{App, Config, FormatterRegistry, ProviderRegistry};

use crate::commands;

/// Load configuration and populate every registry before anything runs.
pub fn build_app() -> anyhow::Result<App> {
    let config = Config::load()?;

    Ok(App::new(
        config,
        commands::registry()?,
        ProviderRegistry::builtin()?,
        FormatterRegistry::builtin()?,
    ))
}

pub async fn run<I>(argv: I) -> anyhow::Result<u8>
where
    I: IntoIterator<Item = String>,
{
    build_app()?.run(argv).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::Registry;

    #[test]
    fn builtin_tables_do_not_collide() {
        let commands = commands::registry().unwrap();
        let providers = ProviderRegistry::builtin().unwrap();

        for (name, _) in commands.iter() {
            assert!(!providers.contains(name), "'{name}' would shadow a provider");
        }
    }
}
