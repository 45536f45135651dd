//! Writing signature and key artifacts to disk

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};

/// Where each artifact of one signing run goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub signature: PathBuf,
    pub public_key: PathBuf,
    /// `None` means the private key is not exported
    pub private_key: Option<PathBuf>,
}

impl ArtifactPaths {
    pub fn new(signature: impl Into<PathBuf>, public_key: impl Into<PathBuf>) -> Self {
        Self {
            signature: signature.into(),
            public_key: public_key.into(),
            private_key: None,
        }
    }

    pub fn with_private_key(mut self, private_key: impl Into<PathBuf>) -> Self {
        self.private_key = Some(private_key.into());
        self
    }

    /// `<source>.sig` and `<source>.pub` next to the source file
    pub fn beside(source: &Path) -> Self {
        Self::new(with_suffix(source, "sig"), with_suffix(source, "pub"))
    }

    fn outputs(&self) -> Vec<(&'static str, &Path)> {
        let mut outputs = vec![
            ("signature", self.signature.as_path()),
            ("public key", self.public_key.as_path()),
        ];
        if let Some(private_key) = &self.private_key {
            outputs.push(("private key", private_key.as_path()));
        }
        outputs
    }

    /// Reject outputs that resolve to the same file, or to `source`
    ///
    /// Paths are compared after resolving their parent directory, so `x`,
    /// `./x` and `sub/../x` all name the same output.
    pub fn check_distinct(&self, source: Option<&Path>) -> Result<()> {
        let outputs: Vec<_> = self
            .outputs()
            .into_iter()
            .map(|(role, path)| (role, path, resolve(path)))
            .collect();

        if let Some(source) = source {
            let source = resolve(source);
            if let Some((role, path, _)) = outputs.iter().find(|(_, _, out)| *out == source) {
                return Err(Error::invalid_configuration(format!(
                    "{} output {} would overwrite the source file",
                    role,
                    path.display()
                )));
            }
        }

        for (i, (role, path, resolved)) in outputs.iter().enumerate() {
            if let Some((other, _, _)) = outputs[i + 1..].iter().find(|(_, _, o)| o == resolved) {
                return Err(Error::invalid_configuration(format!(
                    "{} is used for both the {} and the {}",
                    path.display(),
                    role,
                    other
                )));
            }
        }
        Ok(())
    }
}

/// Existing files resolve fully (symlinks included); new ones through their
/// parent directory
fn resolve(path: &Path) -> PathBuf {
    if let Ok(full) = fs::canonicalize(path) {
        return full;
    }
    match (fs::canonicalize(parent_dir(path)), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Encoded bytes ready to be written
pub struct Artifacts<'a> {
    pub signature: &'a [u8],
    pub public_key: &'a [u8],
    pub private_key: Option<&'a [u8]>,
}

/// One file to write; `secret` files are kept owner-only
struct Entry<'p, 'a> {
    path: &'p Path,
    bytes: &'a [u8],
    secret: bool,
}

impl<'a> Artifacts<'a> {
    fn entries<'p>(&self, paths: &'p ArtifactPaths) -> Result<Vec<Entry<'p, 'a>>> {
        let mut out = vec![
            Entry {
                path: &paths.signature,
                bytes: self.signature,
                secret: false,
            },
            Entry {
                path: &paths.public_key,
                bytes: self.public_key,
                secret: false,
            },
        ];
        match (&paths.private_key, self.private_key) {
            (Some(path), Some(bytes)) => out.push(Entry {
                path,
                bytes,
                secret: true,
            }),
            (None, None) => {}
            (Some(path), None) => {
                return Err(Error::Encoding(format!(
                    "no private key encoding supplied for {}",
                    path.display()
                )))
            }
            // encoded but nowhere to go: drop it
            (None, Some(_)) => {}
        }
        Ok(out)
    }
}

/// Write every artifact, replacing existing files
///
/// Outputs must name distinct files. With `atomic` set, all artifacts are
/// first staged as temporary files in their target directories; targets are
/// only touched once every staging write succeeded. A failure while renaming
/// leaves earlier renames in place. Without `atomic`, files are written
/// directly in order and a failure leaves the earlier ones written.
///
/// On Unix the signature and public key end up 0644, the private key 0600.
pub fn persist(paths: &ArtifactPaths, artifacts: &Artifacts<'_>, atomic: bool) -> Result<()> {
    paths.check_distinct(None)?;
    let entries = artifacts.entries(paths)?;
    if atomic {
        persist_atomic(&entries)
    } else {
        persist_direct(&entries)
    }
}

fn persist_direct(entries: &[Entry<'_, '_>]) -> Result<()> {
    for entry in entries {
        let path = entry.path;
        let mut file = File::create(path).map_err(|e| Error::io(path, e))?;
        set_mode(&file, entry.secret).map_err(|e| Error::io(path, e))?;
        file.write_all(entry.bytes).map_err(|e| Error::io(path, e))?;
        debug!("Wrote {} bytes to {}", entry.bytes.len(), path.display());
    }
    Ok(())
}

fn persist_atomic(entries: &[Entry<'_, '_>]) -> Result<()> {
    let mut staged = Vec::with_capacity(entries.len());
    for entry in entries {
        staged.push((stage(entry)?, entry.path));
    }

    for (file, path) in staged {
        file.persist(path).map_err(|e| Error::io(path, e.error))?;
        debug!("Renamed staged artifact into {}", path.display());
    }
    Ok(())
}

fn stage(entry: &Entry<'_, '_>) -> Result<NamedTempFile> {
    let path = entry.path;
    let mut file = NamedTempFile::new_in(parent_dir(path)).map_err(|e| Error::io(path, e))?;
    set_mode(file.as_file(), entry.secret).map_err(|e| Error::io(path, e))?;
    file.write_all(entry.bytes).map_err(|e| Error::io(path, e))?;
    file.as_file().sync_all().map_err(|e| Error::io(path, e))?;
    Ok(file)
}

#[cfg(unix)]
fn set_mode(file: &File, secret: bool) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = if secret { 0o600 } else { 0o644 };
    file.set_permissions(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &File, _secret: bool) -> io::Result<()> {
    Ok(())
}
