//! Core library for the `weather` aggregator.
//!
//! This crate defines:
//! - Ordered, name-keyed registries for commands, providers and formatters
//! - The dispatcher ([`App`]) that resolves a name and runs the match
//! - The [`Context`] handed to every command and provider
//! - Configuration, logging setup and the built-in HTTP providers
//!
//! It is used by `weather-cli`, which adds the administrative commands.

pub mod app;
pub mod args;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod formatter;
pub mod logging;
pub mod model;
pub mod provider;
pub mod registry;

pub use app::{App, EXIT_OK, EXIT_UNKNOWN, UNKNOWN_COMMAND};
pub use args::Options;
pub use command::{Command, CommandFactory, CommandRegistry};
pub use config::{Config, ProviderConfig};
pub use context::{Context, MemoryBuffer, OutputStream, Streams};
pub use error::RegistryError;
pub use formatter::{Formatter, FormatterRegistry};
pub use model::{Observation, WeatherData};
pub use provider::{Provider, ProviderFactory, ProviderRegistry};
pub use registry::Registry;
