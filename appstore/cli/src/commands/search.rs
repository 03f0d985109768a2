use anyhow::{Context as _, Result};
use appstore_client::CatalogEntry;
use appstore_client::Storefront;
use clap::Args;

use crate::context::Context;

/**
    Search the catalog by keyword.
*/
#[derive(Args)]
pub struct SearchCommand {
    /**
        Search term.
    */
    term: String,

    /**
        Storefront country code.
    */
    #[arg(short = 'C', long, default_value = "US")]
    country: Storefront,

    /**
        Maximum number of results.
    */
    #[arg(short, long, default_value_t = 5)]
    limit: u32,
}

impl SearchCommand {
    pub async fn run(self, ctx: &mut Context) -> Result<()> {
        let results = ctx
            .client
            .search(&mut ctx.session, self.country, &self.term, self.limit)
            .await
            .context("search failed")?;

        if results.is_empty() {
            eprintln!("No results for '{}' in {}", self.term, self.country);
        }
        for entry in &results {
            println!("{}", summary(entry));
        }
        Ok(())
    }
}

/**
    One-line summary used by search and lookup.
*/
pub fn summary(entry: &CatalogEntry) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        entry.track_id,
        entry.bundle_id,
        entry.track_name,
        entry.version,
        entry.formatted_price.as_deref().unwrap_or("-"),
    )
}
