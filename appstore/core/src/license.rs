use core::fmt;
use core::str::FromStr;

use plist::Dictionary;

use crate::error::ParseError;
use crate::storefront::Storefront;

/**
    Pricing parameter sent with a purchase request.

    Arcade titles are sold under a different pricing parameter than
    regular free titles; the store rejects a purchase that uses the wrong one.
*/
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pricing {
    #[default]
    Standard,
    Arcade,
}

impl Pricing {
    /**
        Value of the `pricingParameters` field in the purchase body.
    */
    pub const fn to_parameter(self) -> &'static str {
        match self {
            Self::Standard => "STDQ",
            Self::Arcade => "GAME",
        }
    }

    pub const fn to_name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Arcade => "arcade",
        }
    }
}

impl fmt::Display for Pricing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}

impl FromStr for Pricing {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("standard") || s.eq_ignore_ascii_case("stdq") {
            Ok(Self::Standard)
        } else if s.eq_ignore_ascii_case("arcade") || s.eq_ignore_ascii_case("game") {
            Ok(Self::Arcade)
        } else {
            Err(ParseError {
                kind: "pricing",
                value: s.to_owned(),
            })
        }
    }
}

/**
    Everything needed to ask the store for a license on one package.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseRequest {
    /// Store identifier of the package (`salableAdamId`).
    pub package_id: u64,
    /// External version identifier; `"0"` selects the latest version.
    pub version_id: String,
    /// Storefront the purchase is made in.
    pub storefront: Storefront,
    /// Pricing parameter used if a purchase turns out to be needed.
    pub pricing: Pricing,
}

impl LicenseRequest {
    /**
        Request the latest version of a package in the given storefront.
    */
    pub fn new(package_id: u64, storefront: Storefront) -> Self {
        Self {
            package_id,
            version_id: String::from("0"),
            storefront,
            pricing: Pricing::Standard,
        }
    }

    pub fn with_version(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = version_id.into();
        self
    }

    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = pricing;
        self
    }
}

/**
    A single sinf record: the DRM blob for one executable slice,
    addressed by its index into the archive's sinf manifest.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sinf {
    pub id: u64,
    pub data: Vec<u8>,
}

/**
    Package metadata exactly as returned by the store.

    Kept as the raw property-list dictionary so it can be written back
    into the patched archive without losing fields we do not model.
*/
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageMetadata(Dictionary);

impl PackageMetadata {
    pub fn new(dictionary: Dictionary) -> Self {
        Self(dictionary)
    }

    pub fn as_dictionary(&self) -> &Dictionary {
        &self.0
    }

    pub fn into_dictionary(self) -> Dictionary {
        self.0
    }

    fn string(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_string())
    }

    pub fn bundle_id(&self) -> Option<&str> {
        self.string("softwareVersionBundleId")
    }

    pub fn display_name(&self) -> Option<&str> {
        self.string("bundleDisplayName")
            .or_else(|| self.string("itemName"))
    }

    pub fn short_version(&self) -> Option<&str> {
        self.string("bundleShortVersionString")
    }

    pub fn bundle_version(&self) -> Option<&str> {
        self.string("bundleVersion")
    }

    pub fn item_id(&self) -> Option<u64> {
        self.0.get("itemId").and_then(|v| v.as_unsigned_integer())
    }
}

/**
    One downloadable item in a license grant.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadEntry {
    /// Where the raw (unpatched) archive can be fetched from.
    pub url: String,
    /// Hex MD5 of the raw archive, when the store provides one.
    pub md5: Option<String>,
    pub sinfs: Vec<Sinf>,
    pub metadata: PackageMetadata,
}

/**
    Account-level figures attached to a grant.
*/
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LicenseMetrics {
    pub item_ids: Vec<u64>,
    pub currency: Option<String>,
    pub exchange_rate_to_usd: Option<f64>,
}

/**
    Result of a successful permit: the download entries and account metrics.
*/
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LicenseGrant {
    pub entries: Vec<DownloadEntry>,
    pub metrics: LicenseMetrics,
}

impl LicenseGrant {
    /**
        The entry the payload patcher consumes.
    */
    pub fn primary(&self) -> Option<&DownloadEntry> {
        self.entries.first()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
