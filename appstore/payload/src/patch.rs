use std::io::Cursor;

use plist::Value;

use appstore_core::DownloadEntry;

use crate::archive::Archive;
use crate::constants::{
    APP_INFO_SUFFIX, METADATA_ENTRY, PAYLOAD_DIR, SINF_MANIFEST_SUFFIX, WATCH_SUBTREE,
};
use crate::error::{PatchError, PatchResult};

/**
    What a single pass over the input archive recovers.
*/
#[derive(Debug, Default)]
struct Scan {
    /// Raw bytes of the sinf manifest, if the bundle has one.
    manifest: Option<Vec<u8>>,
    /// Bundle directory name without the `.app` extension.
    bundle: Option<String>,
    /// Application descriptor content. Never captured by the scan, so the
    /// manifest-less branch cannot resolve an executable name.
    descriptor: Option<Vec<u8>>,
}

impl Scan {
    fn run(archive: &Archive) -> Self {
        let mut scan = Self::default();

        for entry in archive.files() {
            let name = entry.name.as_str();

            if name.ends_with(SINF_MANIFEST_SUFFIX) {
                scan.manifest = Some(entry.data.clone());
                continue;
            }

            if let Some(bundle) = bundle_name(name) {
                scan.bundle = Some(bundle.to_owned());
            }
        }

        scan
    }
}

/**
    Extract the bundle name from a top-level application descriptor path,
    e.g. `Payload/Foo.app/Info.plist` yields `Foo`.
*/
fn bundle_name(path: &str) -> Option<&str> {
    if path.contains(WATCH_SUBTREE) {
        return None;
    }
    let dir = path.strip_suffix(APP_INFO_SUFFIX)?;
    let name = dir.rsplit('/').next().unwrap_or(dir);
    (!name.is_empty()).then_some(name)
}

/**
    Decoded sinf manifest.
*/
struct SinfManifest {
    paths: Vec<String>,
}

impl SinfManifest {
    fn parse(bytes: &[u8]) -> PatchResult<Self> {
        let value = Value::from_reader(Cursor::new(bytes))?;
        let paths = value
            .as_dictionary()
            .and_then(|d| d.get("SinfPaths"))
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .map(|v| v.as_string().unwrap_or_default().to_owned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self { paths })
    }

    fn path(&self, id: u64) -> Option<&str> {
        let index = usize::try_from(id).ok()?;
        self.paths
            .get(index)
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }
}

/**
    Turn a raw downloaded archive into an installable one.

    Every file entry of the input is carried over unchanged and in order.
    On top of that the package metadata is written to `iTunesMetadata.plist`
    and each sinf blob is written to the location the bundle's sinf manifest
    assigns to it.

    The input is never modified; the patched archive is returned as new bytes.
*/
pub fn patch(raw: &[u8], entry: &DownloadEntry) -> PatchResult<Vec<u8>> {
    let input = Archive::open(raw)?;
    let scan = Scan::run(&input);

    let mut output: Archive = input.files().cloned().collect();
    output.insert_file(METADATA_ENTRY, encode_metadata(entry)?);

    let bundle = scan
        .bundle
        .as_deref()
        .ok_or(PatchError::PayloadBundleNameUnavailable)?;

    match &scan.manifest {
        Some(manifest) => {
            let manifest = SinfManifest::parse(manifest)?;
            for sinf in &entry.sinfs {
                let path = manifest
                    .path(sinf.id)
                    .ok_or(PatchError::PayloadSinfUnavailable(sinf.id))?;
                output.insert_file(
                    format!("{PAYLOAD_DIR}/{bundle}.app/{path}"),
                    sinf.data.clone(),
                );
            }
        }
        None => {
            let descriptor = scan
                .descriptor
                .as_deref()
                .ok_or(PatchError::PayloadInfoUnavailable)?;
            let executable = bundle_executable(descriptor)?;
            let sinf = entry.sinfs.first().ok_or(PatchError::NoSinfs)?;
            output.insert_file(
                format!("{PAYLOAD_DIR}/{bundle}/SC_Info/{executable}.sinf"),
                sinf.data.clone(),
            );
        }
    }

    output.to_bytes()
}

fn encode_metadata(entry: &DownloadEntry) -> PatchResult<Vec<u8>> {
    let value = Value::Dictionary(entry.metadata.as_dictionary().clone());
    let mut buffer = Vec::new();
    value.to_writer_binary(&mut buffer)?;
    Ok(buffer)
}

fn bundle_executable(descriptor: &[u8]) -> PatchResult<String> {
    let value = Value::from_reader(Cursor::new(descriptor))?;
    value
        .as_dictionary()
        .and_then(|d| d.get("CFBundleExecutable"))
        .and_then(|v| v.as_string())
        .map(str::to_owned)
        .ok_or(PatchError::PayloadInfoUnavailable)
}
