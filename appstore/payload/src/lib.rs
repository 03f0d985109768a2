mod archive;
mod constants;
mod error;
mod patch;

pub use self::archive::{Archive, ArchiveEntry};
pub use self::constants::{METADATA_ENTRY, SINF_MANIFEST_SUFFIX};
pub use self::error::{PatchError, PatchResult};
pub use self::patch::patch;
