//! Route catalog
//!
//! Maps every supported file found at startup to exactly one endpoint under
//! the route prefix. Requests are resolved through a single lookup keyed by
//! the decoded relative path instead of one registered handler per file.

pub mod route;
pub mod scan;

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::http::mime;
use crate::logger;

/// How a file's content is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Spreadsheet,
    Delimited,
    Unsupported,
}

impl FileKind {
    /// Infer from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Self::Spreadsheet,
            Some("csv") => Self::Delimited,
            _ => Self::Unsupported,
        }
    }

    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// A file discovered under the data root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub absolute_path: PathBuf,
    /// Relative to the data root, `/`-separated
    pub relative_path: String,
    pub kind: FileKind,
}

/// One file bound to its endpoint
#[derive(Debug, Clone)]
pub struct RouteBinding {
    pub route: String,
    pub entry: FileEntry,
}

/// Listing view of a binding, served from the bare route prefix
#[derive(Debug, Serialize)]
pub struct CatalogItem<'a> {
    pub path: &'a str,
    pub route: &'a str,
    pub kind: FileKind,
    pub content_type: &'static str,
}

/// Immutable set of route bindings built once at startup
#[derive(Debug, Default)]
pub struct Catalog {
    prefix: String,
    bindings: BTreeMap<String, RouteBinding>,
}

impl Catalog {
    /// Build the catalog from enumerated files.
    ///
    /// Unsupported extensions and paths that cannot be encoded are skipped
    /// (logged, never fatal).
    pub fn build(prefix: String, root: &Path, files: Vec<PathBuf>) -> Self {
        let mut bindings = BTreeMap::new();

        for file in files {
            let kind = FileKind::from_path(&file);
            if !kind.is_supported() {
                logger::log_skipped_file(&file);
                continue;
            }

            let Some(relative_path) = route::relative_key(root, &file) else {
                logger::log_warning(&format!(
                    "Skipping file with non UTF-8 or unexpected path: {}",
                    file.display()
                ));
                continue;
            };

            let route = route::route_for(&prefix, &relative_path);
            logger::log_route_created(&route);

            let binding = RouteBinding {
                route,
                entry: FileEntry {
                    absolute_path: file,
                    relative_path: relative_path.clone(),
                    kind,
                },
            };
            bindings.insert(relative_path, binding);
        }

        Self { prefix, bindings }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Look up a binding by the raw (still encoded) path suffix after the prefix
    pub fn resolve(&self, raw_suffix: &str) -> Option<&RouteBinding> {
        let key = route::decode_segment(raw_suffix)?;
        self.bindings.get(&key)
    }

    /// Bindings in relative-path order
    pub fn bindings(&self) -> impl Iterator<Item = &RouteBinding> {
        self.bindings.values()
    }

    pub fn items(&self) -> Vec<CatalogItem<'_>> {
        self.bindings()
            .map(|b| CatalogItem {
                path: &b.entry.relative_path,
                route: &b.route,
                kind: b.entry.kind,
                content_type: mime::get_content_type(
                    b.entry
                        .absolute_path
                        .extension()
                        .and_then(|e| e.to_str()),
                ),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(files: &[&str]) -> Catalog {
        let root = PathBuf::from("/data");
        let paths = files.iter().map(|f| root.join(f)).collect();
        Catalog::build("/api/data/".to_string(), &root, paths)
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(FileKind::from_path(Path::new("a.xlsx")), FileKind::Spreadsheet);
        assert_eq!(FileKind::from_path(Path::new("a.XLSX")), FileKind::Spreadsheet);
        assert_eq!(FileKind::from_path(Path::new("a.ods")), FileKind::Spreadsheet);
        assert_eq!(FileKind::from_path(Path::new("a.csv")), FileKind::Delimited);
        assert_eq!(FileKind::from_path(Path::new("a.txt")), FileKind::Unsupported);
        assert_eq!(FileKind::from_path(Path::new("csv")), FileKind::Unsupported);
    }

    #[test]
    fn test_one_route_per_supported_file() {
        let catalog = build(&["a.csv", "notes.txt", "sub/b.xlsx", "sub/readme.md"]);
        assert_eq!(catalog.len(), 2);

        let routes: Vec<_> = catalog.bindings().map(|b| b.route.as_str()).collect();
        assert_eq!(routes, vec!["/api/data/a.csv", "/api/data/sub%2Fb.xlsx"]);
    }

    #[test]
    fn test_routes_are_deterministic() {
        let files = ["x/1.csv", "y (2).csv", "z!.xlsx"];
        let first: Vec<_> = build(&files).bindings().map(|b| b.route.clone()).collect();
        let second: Vec<_> = build(&files).bindings().map(|b| b.route.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_distinct_paths_never_collide() {
        let catalog = build(&["a/b.csv", "a%2Fb.csv", "a b.csv", "a%20b.csv", "a'b.csv"]);
        assert_eq!(catalog.len(), 5);
        let routes: std::collections::HashSet<_> =
            catalog.bindings().map(|b| b.route.clone()).collect();
        assert_eq!(routes.len(), 5);
    }

    #[test]
    fn test_resolve_by_encoded_suffix() {
        let catalog = build(&["sub/b.xlsx", "it's.csv"]);
        let binding = catalog.resolve("sub%2Fb.xlsx").unwrap();
        assert_eq!(binding.entry.relative_path, "sub/b.xlsx");
        assert_eq!(binding.entry.kind, FileKind::Spreadsheet);
        assert!(catalog.resolve("sub%2fb.xlsx").is_some());
        assert!(catalog.resolve("it%27s.csv").is_some());
        assert!(catalog.resolve("missing.csv").is_none());
        assert!(catalog.resolve("%FF").is_none());
    }

    #[test]
    fn test_items_listing() {
        let catalog = build(&["a.csv"]);
        let items = catalog.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path, "a.csv");
        assert_eq!(items[0].route, "/api/data/a.csv");
        assert_eq!(items[0].content_type, "text/csv; charset=utf-8");
    }
}
