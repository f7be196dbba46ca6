use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};

use crate::api::ProfilesDocument;
use crate::codec::{decode_document, encode_document};
use crate::StorageError;

/// Reads and decodes the document. A missing file is `Ok(None)`.
pub fn read_document(path: &Utf8Path) -> Result<Option<ProfilesDocument>, StorageError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    decode_document(&bytes).map(Some)
}

/// Encodes and atomically replaces the document. Returns the bytes written.
pub fn write_document(path: &Utf8Path, doc: &ProfilesDocument) -> Result<Vec<u8>, StorageError> {
    let bytes = encode_document(doc)?;
    if let Some(parent) = path.parent() {
        if !parent.as_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    atomic_write(path, &bytes)?;
    Ok(bytes)
}

fn atomic_write(path: &Utf8Path, contents: &[u8]) -> Result<(), StorageError> {
    let tmp_path = Utf8PathBuf::from(format!("{path}.tmp"));

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    match fs::rename(&tmp_path, path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            fs::remove_file(path).ok();
            fs::rename(&tmp_path, path)?;
        }
        Err(e) => {
            fs::remove_file(&tmp_path).ok();
            return Err(e.into());
        }
    }

    if let Some(parent) = path.parent() {
        if let Ok(dir) = fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}
