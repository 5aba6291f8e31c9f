//! Discovery of test and suite definitions in search directories.
//!
//! Definitions are KDL files (`*.kdl`) anywhere below a search directory:
//!
//! ```kdl
//! test "login" {
//!     tags "short" "smoke"
//!     command "cargo" "test" "login"
//!     workdir ".."      // relative to this file's directory
//!     timeout 60        // seconds
//! }
//!
//! suite "nightly" {
//!     tags "slow"
//!     tests "login" "logout"
//! }
//! ```
//!
//! Search directories are scanned in order and the first definition of a name
//! wins. Files that cannot be read or parsed are skipped with a warning.

use crate::Result;
use crate::models::{SuiteDefinition, TestDefinition};
use kdl::{KdlDocument, KdlNode};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Source of test and suite definitions.
pub trait DefinitionSource {
    /// All tests, sorted by name.
    fn tests(&self) -> Result<Vec<TestDefinition>>;

    /// All suites, sorted by name.
    fn suites(&self) -> Result<Vec<SuiteDefinition>>;

    fn find_test(&self, name: &str) -> Result<Option<TestDefinition>> {
        Ok(self.tests()?.into_iter().find(|t| t.name == name))
    }

    fn find_suite(&self, name: &str) -> Result<Option<SuiteDefinition>> {
        Ok(self.suites()?.into_iter().find(|s| s.name == name))
    }
}

impl<T: DefinitionSource + ?Sized> DefinitionSource for &T {
    fn tests(&self) -> Result<Vec<TestDefinition>> {
        (**self).tests()
    }

    fn suites(&self) -> Result<Vec<SuiteDefinition>> {
        (**self).suites()
    }
}

/// Definitions read from KDL files below a list of search directories.
#[derive(Debug, Clone)]
pub struct KdlDefinitionSource {
    search_dirs: Vec<PathBuf>,
}

#[derive(Debug, Default)]
struct Catalog {
    tests: Vec<TestDefinition>,
    suites: Vec<SuiteDefinition>,
}

impl KdlDefinitionSource {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    fn scan(&self) -> Catalog {
        let mut catalog = Catalog::default();

        for dir in &self.search_dirs {
            if !dir.is_dir() {
                tracing::debug!(dir = %dir.display(), "search directory does not exist");
                continue;
            }
            for path in definition_files(dir) {
                let Some(doc) = read_document(&path) else {
                    continue;
                };
                collect_definitions(&doc, &path, &mut catalog);
            }
        }

        catalog.tests.sort_by(|a, b| a.name.cmp(&b.name));
        catalog.suites.sort_by(|a, b| a.name.cmp(&b.name));
        catalog
    }
}

impl DefinitionSource for KdlDefinitionSource {
    fn tests(&self) -> Result<Vec<TestDefinition>> {
        Ok(self.scan().tests)
    }

    fn suites(&self) -> Result<Vec<SuiteDefinition>> {
        Ok(self.scan().suites)
    }
}

/// KDL files below `root`, in a stable order.
fn definition_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path()
                    .extension()
                    .map(|ext| ext == "kdl")
                    .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect()
}

fn read_document(path: &Path) -> Option<KdlDocument> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable definition file");
            return None;
        }
    };
    match content.parse() {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping invalid definition file");
            None
        }
    }
}

fn collect_definitions(doc: &KdlDocument, path: &Path, catalog: &mut Catalog) {
    for node in doc.nodes() {
        match node.name().value() {
            "test" => {
                if let Some(test) = parse_test_node(node, path) {
                    if catalog.tests.iter().any(|t| t.name == test.name) {
                        tracing::warn!(test = %test.name, path = %path.display(), "duplicate test definition ignored");
                    } else {
                        catalog.tests.push(test);
                    }
                }
            }
            "suite" => {
                if let Some(suite) = parse_suite_node(node, path) {
                    if catalog.suites.iter().any(|s| s.name == suite.name) {
                        tracing::warn!(suite = %suite.name, path = %path.display(), "duplicate suite definition ignored");
                    } else {
                        catalog.suites.push(suite);
                    }
                }
            }
            _ => {
                // Other nodes belong to other tools
            }
        }
    }
}

fn parse_test_node(node: &KdlNode, path: &Path) -> Option<TestDefinition> {
    let Some(name) = get_string_arg(node) else {
        tracing::warn!(path = %path.display(), "test node must have a name argument");
        return None;
    };

    let mut test = TestDefinition::new(name, path, Vec::new());

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "tags" => test.tags.extend(get_string_args(child)),
                "command" => test.command = get_string_args(child),
                "workdir" => test.workdir = get_string_arg(child).map(PathBuf::from),
                "timeout" => {
                    test.timeout_secs = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_integer())
                        .and_then(|secs| u64::try_from(secs).ok());
                }
                _ => {
                    // Ignore unknown fields for forward compatibility
                }
            }
        }
    }

    if test.command.is_empty() {
        tracing::warn!(test = %test.name, path = %path.display(), "test has no command, skipping");
        return None;
    }

    Some(test)
}

fn parse_suite_node(node: &KdlNode, path: &Path) -> Option<SuiteDefinition> {
    let Some(name) = get_string_arg(node) else {
        tracing::warn!(path = %path.display(), "suite node must have a name argument");
        return None;
    };

    let mut suite = SuiteDefinition {
        name,
        path: path.to_path_buf(),
        tags: Vec::new(),
        tests: Vec::new(),
    };

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "tags" => suite.tags.extend(get_string_args(child)),
                "tests" => suite.tests.extend(get_string_args(child)),
                _ => {}
            }
        }
    }

    Some(suite)
}

/// Get a string argument from a node's first entry.
fn get_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// All string arguments of a node.
fn get_string_args(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter_map(|e| e.value().as_string())
        .map(|s| s.to_string())
        .collect()
}
