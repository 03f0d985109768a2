mod error;
mod license;
mod storefront;

pub use self::error::ParseError;
pub use self::license::{
    DownloadEntry, LicenseGrant, LicenseMetrics, LicenseRequest, PackageMetadata, Pricing, Sinf,
};
pub use self::storefront::Storefront;
