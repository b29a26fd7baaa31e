use jarscope_core::{JarscopeError, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// One `.class` resource of an archive.
#[derive(Debug, Clone)]
pub struct ClassResource {
    /// Path inside the archive, e.g. `com/example/Point.class`.
    pub name: String,
    pub bytes: Vec<u8>,
}

pub(crate) fn archive_error(path: &Path, err: impl std::fmt::Display) -> JarscopeError {
    JarscopeError::Archive {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// A jar opened for reading.
pub struct JarArchive {
    path: PathBuf,
    archive: ZipArchive<File>,
}

impl JarArchive {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file).map_err(|e| archive_error(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every class entry in archive order. `META-INF/` is skipped, so multi-release
    /// variants never shadow the base class.
    pub fn class_resources(&mut self) -> Result<Vec<ClassResource>> {
        let mut resources = Vec::new();
        for i in 0..self.archive.len() {
            let mut entry = self
                .archive
                .by_index(i)
                .map_err(|e| archive_error(&self.path, e))?;
            let name = entry.name().to_string();
            if entry.is_dir() || !name.ends_with(".class") || name.starts_with("META-INF/") {
                continue;
            }

            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut bytes)
                .map_err(|e| archive_error(&self.path, format!("{name}: {e}")))?;
            resources.push(ClassResource { name, bytes });
        }
        Ok(resources)
    }

    /// Bytes of a single entry, `None` when the archive has no such entry.
    pub fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(archive_error(&self.path, e)),
        };
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| archive_error(&self.path, format!("{name}: {e}")))?;
        Ok(Some(bytes))
    }
}
