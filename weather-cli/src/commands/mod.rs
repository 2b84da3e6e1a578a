//! Administrative commands shipped with the binary.

use weather_core::{CommandRegistry, RegistryError};

pub mod configure;
pub mod providers;

/// Every command compiled into the binary.
pub fn registry() -> Result<CommandRegistry, RegistryError> {
    let mut commands = CommandRegistry::new();
    commands.register(configure::NAME, configure::Configure::new)?;
    commands.register(providers::NAME, providers::Providers::new)?;
    Ok(commands)
}
