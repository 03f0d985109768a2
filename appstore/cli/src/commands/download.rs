use std::path::PathBuf;

use anyhow::{Context as _, Result};
use appstore_client::{LicenseRequest, Pricing, Storefront};
use clap::Args;

use super::with_hint;
use crate::context::Context;

/**
    Acquire a license, download the package and write the patched archive.
*/
#[derive(Args)]
pub struct DownloadCommand {
    /**
        Numeric package identifier (trackId).
    */
    app_id: u64,

    /**
        Storefront country code.
    */
    #[arg(short = 'C', long, default_value = "US")]
    country: Storefront,

    /**
        External version identifier. 0 selects the latest version.
    */
    #[arg(long, default_value = "0")]
    version_id: String,

    /**
        Purchase the package first if the account does not own it.
    */
    #[arg(long)]
    purchase: bool,

    /**
        Use Arcade pricing when purchasing.
    */
    #[arg(long)]
    arcade: bool,

    /**
        Output file. Defaults to <app-id>.ipa.
    */
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl DownloadCommand {
    pub async fn run(self, ctx: &mut Context) -> Result<()> {
        let pricing = if self.arcade { Pricing::Arcade } else { Pricing::Standard };
        let request = LicenseRequest::new(self.app_id, self.country)
            .with_version(self.version_id)
            .with_pricing(pricing);

        let grant = ctx
            .client
            .acquire_license(&mut ctx.session, &request, self.purchase)
            .await
            .map_err(with_hint)
            .context("failed to acquire license")?;
        let entry = grant
            .primary()
            .context("license grant has no download entries")?;
        tracing::info!(
            bundle = entry.metadata.bundle_id().unwrap_or("?"),
            version = entry.metadata.short_version().unwrap_or("?"),
            sinfs = entry.sinfs.len(),
            "license acquired"
        );

        let raw = ctx
            .client
            .download(&mut ctx.session, entry)
            .await
            .context("failed to download package")?;
        tracing::info!(bytes = raw.len(), "downloaded package");

        let patched = appstore_payload::patch(&raw, entry).context("failed to patch package")?;

        let output = self
            .output
            .unwrap_or_else(|| PathBuf::from(format!("{}.ipa", self.app_id)));
        std::fs::write(&output, &patched)
            .with_context(|| format!("failed to write {}", output.display()))?;

        println!("Saved {} ({} bytes)", output.display(), patched.len());
        Ok(())
    }
}
