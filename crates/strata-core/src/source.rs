//! Document sources.
//!
//! The resolver reads class and node documents through the [`DocumentSource`]
//! trait: locate a name, read the text and its modification time. Path
//! conventions live here, not in the resolver. Two implementations are
//! provided: [`FsSource`] for real inventories on disk and [`MemorySource`]
//! for tests and embedded fixtures.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use strata_model::ClassKind;

/// A located backing document.
#[derive(Debug, Clone)]
pub struct Located {
    pub path: PathBuf,
    /// True when the directory-as-namespace form (`<name>/init.yml`) matched.
    pub is_init: bool,
}

/// Where class and node documents come from.
pub trait DocumentSource {
    /// Find the backing document for a name. Dots in the name map to
    /// directory separators; candidates are tried in order
    /// `<name>/init.yml`, `<name>/init.yaml`, `<name>.yml`, `<name>.yaml`,
    /// and the first match wins.
    fn locate(&self, kind: ClassKind, name: &str) -> Option<Located>;

    /// Read a located document's text and last-modification time.
    fn read(&self, path: &Path) -> io::Result<(String, SystemTime)>;

    /// Current modification time of a previously located document, or `None`
    /// when it no longer exists.
    fn modified(&self, path: &Path) -> Option<SystemTime>;
}

/// Filesystem-backed inventory with separate base directories for classes
/// and nodes.
#[derive(Debug, Clone)]
pub struct FsSource {
    classes_dir: PathBuf,
    nodes_dir: PathBuf,
}

impl FsSource {
    /// Conventional layout: `<root>/classes` and `<root>/nodes`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            classes_dir: root.join("classes"),
            nodes_dir: root.join("nodes"),
        }
    }

    pub fn with_dirs(classes_dir: impl Into<PathBuf>, nodes_dir: impl Into<PathBuf>) -> Self {
        Self {
            classes_dir: classes_dir.into(),
            nodes_dir: nodes_dir.into(),
        }
    }

    fn base_dir(&self, kind: ClassKind) -> &Path {
        match kind {
            ClassKind::Class => &self.classes_dir,
            ClassKind::Node => &self.nodes_dir,
        }
    }
}

impl DocumentSource for FsSource {
    fn locate(&self, kind: ClassKind, name: &str) -> Option<Located> {
        let rel: PathBuf = name.split('.').collect();
        let base = self.base_dir(kind).join(rel);

        let candidates = [
            (base.join("init.yml"), true),
            (base.join("init.yaml"), true),
            (base.with_extension("yml"), false),
            (base.with_extension("yaml"), false),
        ];
        candidates
            .into_iter()
            .find(|(path, _)| path.is_file())
            .map(|(path, is_init)| Located { path, is_init })
    }

    fn read(&self, path: &Path) -> io::Result<(String, SystemTime)> {
        let text = std::fs::read_to_string(path)?;
        let modified = std::fs::metadata(path)?.modified()?;
        Ok((text, modified))
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        std::fs::metadata(path).ok()?.modified().ok()
    }
}

/// In-memory inventory.
///
/// Documents are keyed by (kind, name); each carries a version counter that
/// stands in for a file modification time, so cache-invalidation behavior is
/// testable without touching a filesystem.
#[derive(Debug, Default)]
pub struct MemorySource {
    docs: HashMap<PathBuf, MemoryDoc>,
    names: HashMap<(ClassKind, String), PathBuf>,
}

#[derive(Debug)]
struct MemoryDoc {
    content: String,
    version: u64,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a class document. Replacing bumps the version, which
    /// reads as a modification-time change.
    pub fn insert_class(&mut self, name: &str, content: &str) {
        self.insert(ClassKind::Class, name, content);
    }

    /// Add or replace a node document.
    pub fn insert_node(&mut self, name: &str, content: &str) {
        self.insert(ClassKind::Node, name, content);
    }

    fn insert(&mut self, kind: ClassKind, name: &str, content: &str) {
        let path = PathBuf::from(format!("mem://{}/{}.yml", kind.as_str(), name));
        let version = self.docs.get(&path).map(|d| d.version + 1).unwrap_or(1);
        self.docs.insert(
            path.clone(),
            MemoryDoc {
                content: content.to_string(),
                version,
            },
        );
        self.names.insert((kind, name.to_string()), path);
    }

    /// Remove a document, as if its file was deleted.
    pub fn remove(&mut self, kind: ClassKind, name: &str) {
        if let Some(path) = self.names.remove(&(kind, name.to_string())) {
            self.docs.remove(&path);
        }
    }

    /// Bump a document's version without changing its content.
    pub fn touch(&mut self, kind: ClassKind, name: &str) {
        if let Some(path) = self.names.get(&(kind, name.to_string()))
            && let Some(doc) = self.docs.get_mut(path)
        {
            doc.version += 1;
        }
    }
}

impl DocumentSource for MemorySource {
    fn locate(&self, kind: ClassKind, name: &str) -> Option<Located> {
        self.names.get(&(kind, name.to_string())).map(|path| Located {
            path: path.clone(),
            is_init: false,
        })
    }

    fn read(&self, path: &Path) -> io::Result<(String, SystemTime)> {
        let doc = self.docs.get(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
        })?;
        Ok((doc.content.clone(), version_time(doc.version)))
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        self.docs.get(path).map(|doc| version_time(doc.version))
    }
}

fn version_time(version: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_source_extension_order() {
        let dir = tempfile::tempdir().unwrap();
        let classes = dir.path().join("classes");
        std::fs::create_dir_all(classes.join("app")).unwrap();
        std::fs::write(classes.join("app/init.yml"), "parameters: {a: 1}\n").unwrap();
        std::fs::write(classes.join("app.yml"), "parameters: {a: 2}\n").unwrap();
        std::fs::write(classes.join("base.yaml"), "parameters: {b: 1}\n").unwrap();

        let source = FsSource::new(dir.path());

        // Directory-as-namespace form wins over the flat file.
        let located = source.locate(ClassKind::Class, "app").unwrap();
        assert!(located.is_init);
        assert!(located.path.ends_with("app/init.yml"));

        // .yaml is found when .yml is absent.
        let located = source.locate(ClassKind::Class, "base").unwrap();
        assert!(!located.is_init);
        assert!(located.path.ends_with("base.yaml"));

        assert!(source.locate(ClassKind::Class, "missing").is_none());
    }

    #[test]
    fn test_fs_source_dotted_names() {
        let dir = tempfile::tempdir().unwrap();
        let classes = dir.path().join("classes");
        std::fs::create_dir_all(classes.join("app/web")).unwrap();
        std::fs::write(classes.join("app/web/frontend.yml"), "parameters: {}\n").unwrap();

        let source = FsSource::new(dir.path());
        let located = source.locate(ClassKind::Class, "app.web.frontend").unwrap();
        assert!(located.path.ends_with("app/web/frontend.yml"));
    }

    #[test]
    fn test_memory_source_versions() {
        let mut source = MemorySource::new();
        source.insert_class("base", "parameters: {a: 1}");

        let located = source.locate(ClassKind::Class, "base").unwrap();
        let first = source.modified(&located.path).unwrap();

        source.touch(ClassKind::Class, "base");
        let second = source.modified(&located.path).unwrap();
        assert_ne!(first, second);

        source.remove(ClassKind::Class, "base");
        assert!(source.locate(ClassKind::Class, "base").is_none());
        assert!(source.modified(&located.path).is_none());
    }
}
