//! The dispatcher: resolves a name to a command or provider and runs it.
//!
//! Resolution order is fixed: no name runs every provider in registration
//! order, otherwise the command registry wins over the provider registry, and
//! a name found in neither ends the run with [`EXIT_UNKNOWN`].
//!
//! Faults are isolated per runnable. A failing (or panicking) command or
//! provider is logged and skipped; it never changes the exit code and never
//! stops the providers after it.

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use anyhow::{Context as _, anyhow};
use futures::FutureExt;
use tracing::{debug, error, info};

use crate::{
    args::{self, Options, ParsedArgs},
    command::CommandRegistry,
    config::Config,
    context::{Context, Streams},
    formatter::FormatterRegistry,
    logging,
    model::WeatherData,
    provider::{ProviderFactory, ProviderRegistry},
    registry::Registry,
};

pub const EXIT_OK: u8 = 0;
pub const EXIT_UNKNOWN: u8 = 1;

pub const UNKNOWN_COMMAND: &str = "Unknown command provided.";

/// Weather aggregator application.
pub struct App {
    config: Arc<Config>,
    commands: CommandRegistry,
    providers: ProviderRegistry,
    provider_names: Arc<[String]>,
    formatters: FormatterRegistry,
    streams: Streams,
}

/// What one provider produced, ready for a formatter.
struct Report {
    title: String,
    location: String,
    data: WeatherData,
}

impl App {
    /// Both registries must be fully populated here; they are not touched again.
    pub fn new(
        config: Config,
        commands: CommandRegistry,
        providers: ProviderRegistry,
        formatters: FormatterRegistry,
    ) -> Self {
        let provider_names = providers.names().into();
        Self {
            config: Arc::new(config),
            commands,
            providers,
            provider_names,
            formatters,
            streams: Streams::standard(),
        }
    }

    /// Redirect output and error streams, e.g. into memory buffers.
    pub fn with_streams(mut self, streams: Streams) -> Self {
        self.streams = streams;
        self
    }

    /// Run one invocation. `argv` excludes the binary name.
    ///
    /// Returns the process exit code. `Err` is reserved for failures of the
    /// dispatcher itself, such as the output stream going away.
    pub async fn run<I, T>(&self, argv: I) -> anyhow::Result<u8>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let ParsedArgs { options, remaining } = match args::parse_known(argv) {
            Ok(parsed) => parsed,
            Err(err) => return self.report_usage(&err),
        };

        logging::init(options.verbose_level);
        debug!(?options, ?remaining, "parsed arguments");

        let ctx = self.context(options);
        let name = match ctx.options().command.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => {
                self.run_providers(&ctx, &remaining).await?;
                return Ok(EXIT_OK);
            }
        };

        if self.commands.contains(name) {
            self.run_command(&ctx, name, &remaining).await?;
            return Ok(EXIT_OK);
        }

        if self.providers.contains(name) {
            self.run_provider(&ctx, name, &remaining).await?;
            return Ok(EXIT_OK);
        }

        info!(%name, "no command or provider with this name");
        ctx.stdout().write_line(UNKNOWN_COMMAND).context("Failed to write to output stream")?;
        Ok(EXIT_UNKNOWN)
    }

    /// Render one provider result with the selected formatter and write it out.
    pub fn produce_output(
        &self,
        ctx: &Context,
        title: &str,
        location: &str,
        data: &WeatherData,
    ) -> anyhow::Result<()> {
        let requested = ctx.options().formatter.as_str();
        if !self.formatters.contains(requested) {
            debug!(formatter = requested, "unknown formatter, using the default");
        }

        let formatter = self
            .formatters
            .select(requested)
            .ok_or_else(|| anyhow!("No '{requested}' formatter and no default formatter registered"))?;

        let text = formatter.emit([title, location], data);
        ctx.stdout().write_line(&text).context("Failed to write to output stream")?;
        Ok(())
    }

    fn context(&self, options: Options) -> Context {
        Context::new(
            options,
            Arc::clone(&self.config),
            Arc::clone(&self.provider_names),
            self.streams.clone(),
        )
    }

    async fn run_command(&self, ctx: &Context, name: &str, args: &[String]) -> anyhow::Result<()> {
        let factory = self.commands.get(name)?;

        let attempt = async {
            let command = factory(ctx);
            command.run(args).await
        };

        match settle(AssertUnwindSafe(attempt).catch_unwind().await) {
            Ok(()) => info!(command = name, "command finished"),
            Err(err) => report_fault(ctx, "command", name, &err),
        }
        Ok(())
    }

    async fn run_provider(&self, ctx: &Context, name: &str, args: &[String]) -> anyhow::Result<()> {
        let factory = self.providers.get(name)?;
        self.run_provider_entry(ctx, name, factory, args).await
    }

    /// Every provider, one after another, in registration order.
    async fn run_providers(&self, ctx: &Context, args: &[String]) -> anyhow::Result<()> {
        for (name, factory) in self.providers.iter() {
            self.run_provider_entry(ctx, name, factory, args).await?;
        }
        Ok(())
    }

    async fn run_provider_entry(
        &self,
        ctx: &Context,
        name: &str,
        factory: &ProviderFactory,
        args: &[String],
    ) -> anyhow::Result<()> {
        let attempt = async {
            let provider = factory(ctx);
            let title = provider.title().await?;
            let location = provider.location().await?;
            let data = provider.run(args).await?;
            Ok::<_, anyhow::Error>(Report { title, location, data })
        };

        match settle(AssertUnwindSafe(attempt).catch_unwind().await) {
            Ok(report) => {
                debug!(provider = name, fields = report.data.len(), "provider finished");
                self.produce_output(ctx, &report.title, &report.location, &report.data)
            }
            Err(err) => {
                report_fault(ctx, "provider", name, &err);
                Ok(())
            }
        }
    }

    /// Clap errors: help and version go to stdout, the rest to stderr.
    fn report_usage(&self, err: &clap::Error) -> anyhow::Result<u8> {
        let text = err.render().to_string();
        let stream = if err.use_stderr() { &self.streams.stderr } else { &self.streams.stdout };
        stream.write_str(&text).context("Failed to write usage")?;
        Ok(u8::try_from(err.exit_code()).unwrap_or(2))
    }
}

/// Fold a caught panic into an ordinary error.
fn settle<T>(outcome: Result<anyhow::Result<T>, Box<dyn Any + Send>>) -> anyhow::Result<T> {
    match outcome {
        Ok(result) => result,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            Err(anyhow!("panicked: {msg}"))
        }
    }
}

/// One log record per fault: the whole error chain with `--debug`, one line without.
fn report_fault(ctx: &Context, kind: &str, name: &str, err: &anyhow::Error) {
    if ctx.debug() {
        error!(kind, runnable = name, "Error during {kind}: {name} run\n{err:?}");
    } else {
        error!(kind, runnable = name, "Error during {kind}: {name} run: {err}");
    }
}
