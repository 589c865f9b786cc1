use std::fs;
use std::io::{self, Write};

use camino::Utf8Path;
use tracing::debug;
use zip::ZipArchive;

use crate::error::KiraError;

/// Checks every entry name before writing, so a rejected archive writes nothing.
pub fn extract_zip(zip_path: &Utf8Path, target_dir: &Utf8Path) -> Result<usize, KiraError> {
    let file = fs::File::open(zip_path)
        .map_err(|err| KiraError::Filesystem(format!("open zip {zip_path}: {err}")))?;
    let mut archive =
        ZipArchive::new(file).map_err(|err| KiraError::Filesystem(err.to_string()))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive
            .by_index_raw(i)
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        match entry.enclosed_name() {
            Some(path) => entries.push((target_dir.as_std_path().join(path), entry.is_dir())),
            None => {
                return Err(KiraError::Filesystem(format!(
                    "zip entry `{}` escapes the target directory",
                    entry.name()
                )));
            }
        }
    }

    let mut written = 0usize;
    for (i, (entry_path, is_dir)) in entries.into_iter().enumerate() {
        if is_dir {
            fs::create_dir_all(&entry_path)
                .map_err(|err| KiraError::Filesystem(err.to_string()))?;
            continue;
        }

        let mut entry = archive
            .by_index(i)
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        if let Some(parent) = entry_path.parent() {
            fs::create_dir_all(parent).map_err(|err| KiraError::Filesystem(err.to_string()))?;
        }
        let mut outfile =
            fs::File::create(&entry_path).map_err(|err| KiraError::Filesystem(err.to_string()))?;
        io::copy(&mut entry, &mut outfile).map_err(|err| KiraError::Filesystem(err.to_string()))?;
        written += 1;
    }
    debug!(archive = %zip_path, target = %target_dir, files = written, "extracted archive");
    Ok(written)
}

pub fn write_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), KiraError> {
    let parent = path
        .parent()
        .ok_or_else(|| KiraError::Filesystem(format!("invalid destination path {path}")))?;
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| KiraError::Filesystem(err.to_string()))?;
    let mut temp = tempfile::Builder::new()
        .prefix("kira-klifs-file")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| KiraError::Filesystem(err.to_string()))?;
    temp.write_all(content)
        .map_err(|err| KiraError::Filesystem(err.to_string()))?;
    temp.persist(path.as_std_path())
        .map_err(|err| KiraError::Filesystem(err.to_string()))?;
    Ok(())
}
