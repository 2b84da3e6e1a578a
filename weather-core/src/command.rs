use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    context::Context,
    error::RegistryError,
    registry::{OrderedRegistry, Registry},
};

/// An administrative action. Produces no weather output of its own.
#[async_trait]
pub trait Command: Send + Sync {
    /// `args` are the tokens the dispatcher did not recognize.
    async fn run(&self, args: &[String]) -> anyhow::Result<()>;
}

/// Builds a fresh command for every invocation.
pub type CommandFactory = Arc<dyn Fn(&Context) -> Box<dyn Command> + Send + Sync>;

pub type CommandRegistry = OrderedRegistry<CommandFactory>;

impl CommandRegistry {
    pub fn new() -> Self {
        Self::with_kind("command")
    }

    /// Typed convenience over [`Registry::add`].
    pub fn register<F, C>(&mut self, name: &str, make: F) -> Result<(), RegistryError>
    where
        F: Fn(&Context) -> C + Send + Sync + 'static,
        C: Command + 'static,
    {
        let factory: CommandFactory = Arc::new(move |ctx: &Context| Box::new(make(ctx)) as Box<dyn Command>);
        self.add(name, factory)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
