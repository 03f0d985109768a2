use anyhow::Result;
use appstore_client::StoreError;
use appstore_client::{LicenseRequest, Pricing, Storefront};
use clap::Args;

use super::with_hint;
use crate::context::Context;

/**
    Acquire a free package for the signed-in account.
*/
#[derive(Args)]
pub struct PurchaseCommand {
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
        Use Arcade pricing.
    */
    #[arg(long)]
    arcade: bool,
}

impl PurchaseCommand {
    pub async fn run(self, ctx: &mut Context) -> Result<()> {
        let pricing = if self.arcade { Pricing::Arcade } else { Pricing::Standard };
        let request = LicenseRequest::new(self.app_id, self.country).with_pricing(pricing);

        match ctx.client.purchase(&mut ctx.session, &request).await {
            Ok(()) => println!("Purchased {}", self.app_id),
            Err(StoreError::LicenseAlreadyExists) => {
                println!("{} is already owned by this account", self.app_id)
            }
            Err(err) => return Err(with_hint(err)),
        }
        Ok(())
    }
}
