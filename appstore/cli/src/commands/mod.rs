mod download;
mod login;
mod lookup;
mod purchase;
mod search;

use appstore_client::StoreError;

pub use self::download::DownloadCommand;
pub use self::login::LoginCommand;
pub use self::lookup::LookupCommand;
pub use self::purchase::PurchaseCommand;
pub use self::search::SearchCommand;

/**
    Attach a sign-in hint to errors that need a fresh session.
*/
fn with_hint(err: StoreError) -> anyhow::Error {
    if err.requires_authentication() {
        anyhow::Error::new(err).context("not signed in, run `appstore login` first")
    } else {
        anyhow::Error::new(err)
    }
}
