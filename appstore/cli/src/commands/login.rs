use anyhow::{Context as _, Result};
use appstore_client::{AuthOutcome, Credential};
use clap::Args;

use crate::context::Context;

/**
    Sign in to an account.
*/
#[derive(Args)]
pub struct LoginCommand {
    /**
        Account email address.
    */
    #[arg(short, long, env = "APPSTORE_EMAIL")]
    email: String,

    /**
        Account password.
    */
    #[arg(short, long, env = "APPSTORE_PASSWORD", hide_env_values = true)]
    password: String,

    /**
        Second-factor verification code.
    */
    #[arg(short, long)]
    code: Option<String>,
}

impl LoginCommand {
    pub async fn run(self, ctx: &mut Context) -> Result<()> {
        let mut credential = Credential::new(self.email, self.password);
        if let Some(code) = self.code {
            credential = credential.with_code(code);
        }

        let outcome = ctx
            .client
            .authenticate(&mut ctx.session, &credential)
            .await
            .context("sign-in failed")?;

        match outcome {
            AuthOutcome::ChallengeRequired => {
                eprintln!("A verification code is required.");
                eprintln!("Run login again with --code <CODE> once it arrives.");
            }
            AuthOutcome::Authenticated(account) => {
                tracing::info!(person_id = %account.person_id, "signed in");
                println!("Signed in as {}", account.display_name());
            }
        }
        Ok(())
    }
}
