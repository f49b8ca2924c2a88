//! Archive extraction and `bin/` layout normalization.
//!
//! The payload format is sniffed from magic bytes rather than the URL, since
//! override maps can point the same entry at `.tar.gz`, `.tar.xz`, or `.zip`
//! assets depending on the platform.

use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;

use crate::error::{Error, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const XZ_MAGIC: [u8; 6] = [0xfd, b'7', b'z', b'X', b'Z', 0x00];

/// Extracts archive bytes into `dest`, stripping `prefix` from every entry
/// path. `name` only labels errors.
pub fn extract_archive(name: &str, data: &[u8], dest: &Path, prefix: &str) -> Result<()> {
    fs::create_dir_all(dest)?;

    if data.starts_with(&GZIP_MAGIC) {
        extract_tar(GzDecoder::new(data), dest, prefix)
    } else if data.starts_with(&XZ_MAGIC) {
        extract_tar(xz2::read::XzDecoder::new(data), dest, prefix)
    } else if data.starts_with(b"PK") {
        extract_zip(data, dest, prefix)
    } else {
        Err(Error::UnsupportedArchive(name.to_string()))
    }
}

fn extract_tar<R: Read>(decoder: R, dest: &Path, prefix: &str) -> Result<()> {
    let mut archive = Archive::new(decoder);
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();
        let Some(target) = rewrite_entry_path(&path, dest, prefix) else {
            continue;
        };

        if entry.header().entry_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            entry.unpack(&target)?;
        }
    }
    Ok(())
}

fn extract_zip(data: &[u8], dest: &Path, prefix: &str) -> Result<()> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let raw_name = file.name().to_string();
        let Some(target) = rewrite_entry_path(Path::new(&raw_name), dest, prefix) else {
            continue;
        };

        if raw_name.ends_with('/') {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = fs::File::create(&target)?;
            io::copy(&mut file, &mut outfile)?;

            #[cfg(unix)]
            if let Some(mode) = file.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&target, fs::Permissions::from_mode(mode))?;
            }
        }
    }
    Ok(())
}

/// Strips `prefix` from an entry path and anchors it under `dest`. Entries
/// that strip down to nothing, or that try to escape the destination, are
/// dropped.
fn rewrite_entry_path(path: &Path, dest: &Path, prefix: &str) -> Option<PathBuf> {
    let name = path.to_string_lossy();
    let stripped = name.strip_prefix(prefix).unwrap_or(&name);
    let stripped = stripped.trim_start_matches('/');
    if stripped.is_empty() {
        return None;
    }

    let relative = Path::new(stripped);
    if relative
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
    {
        tracing::warn!("skipping archive entry with unsafe path: {}", name);
        return None;
    }
    Some(dest.join(relative))
}

/// Guarantees `dir` has a `bin/` subdirectory, moving top-level files into
/// it. Archives that ship a loose binary at the root end up with the same
/// layout as archives that ship `bin/` themselves.
pub fn ensure_bin_dir(dir: &Path) -> Result<()> {
    let bin = dir.join("bin");
    if !bin.is_dir() {
        fs::create_dir_all(&bin)?;
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let _ = fs::rename(entry.path(), bin.join(entry.file_name()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    fn tar_gz(entries: &[(&str, &[u8], u32)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (path, data, mode) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(*mode);
            header.set_cksum();
            builder.append_data(&mut header, path, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default().unix_permissions(0o755);
        for (path, data) in entries {
            writer.start_file(*path, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn extracts_tar_gz_with_prefix_strip() {
        let data = tar_gz(&[
            ("tool-1.2.3/bin/tool", b"#!/bin/sh\n", 0o755),
            ("tool-1.2.3/README.md", b"docs", 0o644),
        ]);
        let dest = TempDir::new().unwrap();

        extract_archive("tool", &data, dest.path(), "tool-1.2.3/").unwrap();

        assert!(dest.path().join("bin/tool").is_file());
        assert!(dest.path().join("README.md").is_file());
        assert!(!dest.path().join("tool-1.2.3").exists());
    }

    #[test]
    fn extracts_zip() {
        let data = zip_bytes(&[("prefix/tool", b"binary")]);
        let dest = TempDir::new().unwrap();

        extract_archive("tool", &data, dest.path(), "prefix/").unwrap();

        assert!(dest.path().join("tool").is_file());
    }

    #[test]
    fn rejects_unknown_format() {
        let dest = TempDir::new().unwrap();
        let err = extract_archive("tool", b"not an archive", dest.path(), "").unwrap_err();
        assert!(matches!(err, Error::UnsupportedArchive(_)));
    }

    #[test]
    fn skips_entries_escaping_destination() {
        let data = zip_bytes(&[("../evil", b"boom"), ("ok", b"fine")]);
        let dest = TempDir::new().unwrap();

        extract_archive("tool", &data, dest.path(), "").unwrap();

        assert!(!dest.path().parent().unwrap().join("evil").exists());
        assert!(dest.path().join("ok").is_file());
    }

    #[test]
    fn ensure_bin_dir_moves_loose_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("tool"), b"binary").unwrap();
        fs::create_dir(dir.path().join("share")).unwrap();

        ensure_bin_dir(dir.path()).unwrap();

        assert!(dir.path().join("bin/tool").is_file());
        assert!(!dir.path().join("tool").exists());
        assert!(dir.path().join("share").is_dir());
    }

    #[test]
    fn ensure_bin_dir_keeps_existing_bin() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("bin")).unwrap();
        fs::write(dir.path().join("bin/tool"), b"binary").unwrap();

        ensure_bin_dir(dir.path()).unwrap();

        assert!(dir.path().join("bin/tool").is_file());
    }
}
