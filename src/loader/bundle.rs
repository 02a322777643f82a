//! # Bundled Library
//!
//! The fallback source for the native module: either bytes compiled into the
//! host (`include_bytes!`) or a `native/<platform-library-name>` file shipped
//! next to the application. Whatever the source, the bytes are copied into a
//! fresh temporary file and the loader opens that copy.

use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use super::linker::bundled_path;
use super::FallbackError;
use crate::util::hash::sha256_hex;

/// Where to find the bundled copy of the native module
#[derive(Debug, Clone)]
pub enum Bundle {
    /// Library bytes embedded in the host binary
    Embedded(&'static [u8]),
    /// Resource directories, searched in order
    Directories(Vec<PathBuf>),
}

impl Bundle {
    /// Candidate file paths for `stem`, in search order
    pub fn candidates(&self, stem: &str) -> Vec<PathBuf> {
        match self {
            Bundle::Embedded(_) => Vec::new(),
            Bundle::Directories(dirs) => {
                let mut out: Vec<PathBuf> = Vec::new();
                for dir in dirs {
                    for root in resolve_dir(dir) {
                        let candidate = bundled_path(&root, stem);
                        if !out.contains(&candidate) {
                            out.push(candidate);
                        }
                    }
                }
                out
            }
        }
    }

    /// Read the bundled library bytes
    pub fn read(&self, stem: &str) -> Result<Cow<'static, [u8]>, FallbackError> {
        match self {
            Bundle::Embedded(bytes) => Ok(Cow::Borrowed(*bytes)),
            Bundle::Directories(_) => {
                let searched = self.candidates(stem);
                let Some(found) = searched.iter().find(|p| p.is_file()) else {
                    return Err(FallbackError::ResourceMissing { searched });
                };

                log::debug!("Bundled library found at {}", found.display());
                fs::read(found)
                    .map(Cow::Owned)
                    .map_err(|source| FallbackError::Read {
                        path: found.clone(),
                        source,
                    })
            }
        }
    }
}

/// Relative resource dirs are tried next to the executable, then under the
/// working directory.
fn resolve_dir(dir: &Path) -> Vec<PathBuf> {
    if dir.is_absolute() {
        return vec![dir.to_path_buf()];
    }

    let mut roots = Vec::with_capacity(2);
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir.join(dir));
    }
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.join(dir));
    }
    roots
}

/// Check `bytes` against an expected SHA-256 (hex, case-insensitive)
pub fn verify(bytes: &[u8], expected: Option<&str>) -> Result<(), FallbackError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let actual = sha256_hex(bytes);
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(FallbackError::DigestMismatch {
            expected: expected.to_string(),
            actual,
        })
    }
}

/// Copy `bytes` into a new, uniquely named temporary library file.
///
/// The file handle is closed before returning so the platform loader can
/// open it (Windows refuses to map a file that is still open for writing).
pub fn extract(bytes: &[u8], prefix: &str) -> Result<TempPath, FallbackError> {
    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(std::env::consts::DLL_SUFFIX)
        .tempfile()
        .map_err(|source| FallbackError::Extract { source })?;

    file.write_all(bytes)
        .and_then(|_| file.as_file().sync_all())
        .map_err(|source| FallbackError::Extract { source })?;

    Ok(file.into_temp_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_bundle_reads_bytes() {
        static LIB: &[u8] = b"\x7fELF-not-really";
        let bundle = Bundle::Embedded(LIB);

        assert_eq!(&*bundle.read("fen_shim_jni").unwrap(), LIB);
        assert!(bundle.candidates("fen_shim_jni").is_empty());
    }

    #[test]
    fn test_directory_bundle_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = bundled_path(dir.path(), "fen_shim_test");
        fs::write(&path, b"library bytes").unwrap();

        let bundle = Bundle::Directories(vec![dir.path().to_path_buf()]);
        assert_eq!(&*bundle.read("fen_shim_test").unwrap(), b"library bytes");
    }

    #[test]
    fn test_missing_bundle_lists_searched_paths() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = Bundle::Directories(vec![dir.path().to_path_buf()]);

        match bundle.read("fen_shim_test") {
            Err(FallbackError::ResourceMissing { searched }) => {
                assert_eq!(searched, vec![bundled_path(dir.path(), "fen_shim_test")]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_relative_dir_expands_to_exe_and_cwd() {
        let bundle = Bundle::Directories(vec![PathBuf::from("native")]);
        let candidates = bundle.candidates("fen_shim_jni");

        assert!(!candidates.is_empty());
        assert!(candidates.len() <= 2);
        for candidate in &candidates {
            assert!(candidate.is_absolute());
            assert!(candidate.parent().unwrap().ends_with("native"));
        }
    }

    #[test]
    fn test_verify_digest() {
        let bytes = b"abc";
        let digest = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

        assert!(verify(bytes, None).is_ok());
        assert!(verify(bytes, Some(digest)).is_ok());
        assert!(verify(bytes, Some(&digest.to_uppercase())).is_ok());
        assert!(matches!(
            verify(b"abd", Some(digest)),
            Err(FallbackError::DigestMismatch { .. })
        ));
    }

    #[test]
    fn test_extract_writes_unique_files() {
        let a = extract(b"one", "fen_shim_test").unwrap();
        let b = extract(b"two", "fen_shim_test").unwrap();

        assert_ne!(a.to_path_buf(), b.to_path_buf());
        assert_eq!(fs::read(&a).unwrap(), b"one");
        assert!(a
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("fen_shim_test"));
        assert!(a.to_string_lossy().ends_with(std::env::consts::DLL_SUFFIX));
    }
}
