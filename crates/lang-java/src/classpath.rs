use crate::archive::JarArchive;
use jarscope_core::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

enum ClasspathRoot {
    Directory(PathBuf),
    Archive(JarArchive),
}

/// Ordered set of roots that auxiliary classes are looked up in.
///
/// Built from a directory: every entry of it is one root, either a class directory or a
/// zip archive. Files that do not open as a zip are skipped with a warning. The first
/// root holding `name.class` wins.
#[derive(Default)]
pub struct Classpath {
    roots: Vec<ClasspathRoot>,
}

impl Classpath {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn open_dir(dir: &Path) -> Result<Self> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        paths.sort();

        let mut roots = Vec::new();
        for path in paths {
            if path.is_dir() {
                roots.push(ClasspathRoot::Directory(path));
                continue;
            }
            if !path.is_file() {
                continue;
            }
            // any regular file is read as a zip, whatever its extension
            match JarArchive::open(&path) {
                Ok(archive) => roots.push(ClasspathRoot::Archive(archive)),
                Err(e) => warn!("Skipping classpath entry {}: {}", path.display(), e),
            }
        }
        debug!("Classpath {} has {} roots", dir.display(), roots.len());
        Ok(Self { roots })
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Bytes of the class with internal name `name`, if any root has it.
    pub fn find_class(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let resource = format!("{name}.class");
        for root in &mut self.roots {
            match root {
                ClasspathRoot::Directory(dir) => {
                    let path = dir.join(&resource);
                    if path.is_file() {
                        return Ok(Some(fs::read(path)?));
                    }
                }
                ClasspathRoot::Archive(archive) => {
                    if let Some(bytes) = archive.read_entry(&resource)? {
                        debug!("{} found in {}", name, archive.path().display());
                        return Ok(Some(bytes));
                    }
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_find_class_in_directory_and_jar_roots() {
        let dir = tempdir().unwrap();

        let classes = dir.path().join("a-classes");
        fs::create_dir_all(classes.join("lib")).unwrap();
        fs::write(classes.join("lib/Dir.class"), b"dir").unwrap();

        let file = File::create(dir.path().join("b-lib.jar")).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("lib/Jar.class", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"jar").unwrap();
        zip.finish().unwrap();

        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let mut classpath = Classpath::open_dir(dir.path()).unwrap();
        assert_eq!(classpath.len(), 2);
        assert_eq!(classpath.find_class("lib/Dir").unwrap(), Some(b"dir".to_vec()));
        assert_eq!(classpath.find_class("lib/Jar").unwrap(), Some(b"jar".to_vec()));
        assert_eq!(classpath.find_class("lib/Nope").unwrap(), None);
    }

    #[test]
    fn test_archive_root_is_opened_regardless_of_extension() {
        let dir = tempdir().unwrap();

        let file = File::create(dir.path().join("lib.bundle")).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("lib/Bundled.class", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"bundled").unwrap();
        zip.finish().unwrap();

        fs::write(dir.path().join("lib.jar"), b"not a zip").unwrap();

        let mut classpath = Classpath::open_dir(dir.path()).unwrap();
        assert_eq!(classpath.len(), 1);
        assert_eq!(
            classpath.find_class("lib/Bundled").unwrap(),
            Some(b"bundled".to_vec())
        );
    }

    #[test]
    fn test_empty_classpath_finds_nothing() {
        let mut classpath = Classpath::empty();
        assert!(classpath.is_empty());
        assert_eq!(classpath.find_class("java/lang/Object").unwrap(), None);
    }
}
