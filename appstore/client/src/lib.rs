mod auth;
mod catalog;
mod client;
mod config;
mod cookies;
mod error;
mod license;
mod machine;
mod protocol;
mod session;
mod transport;

#[cfg(test)]
mod testing;

// Re-export the shared data model from appstore-core
pub use appstore_core::{
    DownloadEntry, LicenseGrant, LicenseMetrics, LicenseRequest, PackageMetadata, ParseError,
    Pricing, Sinf, Storefront,
};

pub use self::auth::{Account, AuthOutcome, Credential};
pub use self::catalog::CatalogEntry;
pub use self::client::StoreClient;
pub use self::config::{ClientConfig, Endpoints};
pub use self::cookies::{Cookie, CookieJar};
pub use self::error::{StoreError, StoreResult};
pub use self::machine::{FixedMachineId, MachineIdGenerator, RandomMachineId};
pub use self::protocol::FailureType;
pub use self::session::{Identity, Session};
pub use self::transport::{HttpTransport, Method, Request, Response, Transport};
