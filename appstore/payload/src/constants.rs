/**
    Top-level archive entry holding the binary property list of the
    package metadata returned by the store.
*/
pub const METADATA_ENTRY: &str = "iTunesMetadata.plist";

/**
    Path suffix of the sinf manifest inside the application bundle.
*/
pub const SINF_MANIFEST_SUFFIX: &str = ".app/SC_Info/Manifest.plist";

/**
    Path suffix of the application descriptor. Stripping it from a matching
    entry name yields the bundle directory path.
*/
pub(crate) const APP_INFO_SUFFIX: &str = ".app/Info.plist";

/**
    Companion watch applications carry their own descriptor; they must not
    be mistaken for the top-level bundle.
*/
pub(crate) const WATCH_SUBTREE: &str = "/Watch/";

/**
    Root directory of the application bundle in the produced archive.
*/
pub(crate) const PAYLOAD_DIR: &str = "Payload";
