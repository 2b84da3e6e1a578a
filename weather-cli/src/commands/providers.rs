use anyhow::Context as _;
use async_trait::async_trait;
use weather_core::{Command, Context};

pub const NAME: &str = "providers";

/// Prints the registered provider names, one per line.
pub struct Providers {
    ctx: Context,
}

impl Providers {
    pub fn new(ctx: &Context) -> Self {
        Self { ctx: ctx.clone() }
    }
}

#[async_trait]
impl Command for Providers {
    async fn run(&self, _args: &[String]) -> anyhow::Result<()> {
        let mut listing = String::new();
        for name in self.ctx.provider_names() {
            listing.push_str(name);
            listing.push('\n');
        }

        self.ctx.stdout().write_str(&listing).context("Failed to write provider list")
    }
}
