use anyhow::{Context as _, Result, bail};
use appstore_client::Storefront;
use clap::Args;

use super::search::summary;
use crate::context::Context;

/**
    Look up a package by bundle identifier.
*/
#[derive(Args)]
pub struct LookupCommand {
    /**
        Bundle identifier, e.g. com.example.app.
    */
    bundle_id: String,

    /**
        Storefront country code.
    */
    #[arg(short = 'C', long, default_value = "US")]
    country: Storefront,
}

impl LookupCommand {
    pub async fn run(self, ctx: &mut Context) -> Result<()> {
        let results = ctx
            .client
            .lookup(&mut ctx.session, self.country, &self.bundle_id, 1)
            .await
            .context("lookup failed")?;

        let Some(entry) = results.first() else {
            bail!("no package '{}' in {}", self.bundle_id, self.country);
        };
        println!("{}", summary(entry));
        if let Some(os) = &entry.minimum_os_version {
            println!("minimum OS: {os}");
        }
        if let Some(size) = &entry.file_size_bytes {
            println!("size: {size} bytes");
        }
        Ok(())
    }
}
