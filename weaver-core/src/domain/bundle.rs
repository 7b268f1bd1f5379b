//! Generated file bundle

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping of relative file path to file content.
///
/// Owned exclusively by the runner while a job executes; read-only once
/// attached to a Completed job. A BTreeMap keeps iteration (and therefore
/// verification reports) deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBundle {
    files: BTreeMap<String, String>,
}

impl FileBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file, replacing any previous content at the same path.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// (path, content) pairs in sorted path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }
}

impl FromIterator<(String, String)> for FileBundle {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self { files: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces() {
        let mut bundle = FileBundle::new();
        bundle.insert("index.html", "<html></html>");
        bundle.insert("index.html", "<html>v2</html>");
        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.get("index.html"), Some("<html>v2</html>"));
    }

    #[test]
    fn test_paths_sorted() {
        let mut bundle = FileBundle::new();
        bundle.insert("styles.css", "");
        bundle.insert("app.js", "");
        bundle.insert("index.html", "");
        let paths: Vec<_> = bundle.paths().collect();
        assert_eq!(paths, vec!["app.js", "index.html", "styles.css"]);
    }
}
