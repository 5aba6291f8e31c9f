//! Recognized settings, their built-in defaults, and the KDL schema of the
//! persisted settings file.
//!
//! # KDL Schema
//!
//! ```kdl
//! // settings.kdl - user overrides, one node per setting
//! tag_operator all
//! cleanup_on_pass #true
//! oldest_test_run 14
//! search_dirs {
//!     - "tests"
//!     - "suites"
//! }
//! ```
//!
//! Scalars are the node's first argument and keep their KDL type. Lists are
//! always a child block of `-` nodes, so a one-element list never reads back
//! as a plain string.

use crate::config::value::TypedValue;
use chrono::NaiveDate;
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use std::collections::BTreeMap;
use std::path::Path;

pub const RUNS_DIR: &str = "runs_dir";
pub const SEARCH_DIRS: &str = "search_dirs";
pub const CLEANUP_ON_PASS: &str = "cleanup_on_pass";
pub const STDOUT: &str = "stdout";
pub const DEBUG: &str = "debug";
pub const TAG_OPERATOR: &str = "tag_operator";
pub const OLDEST_TEST_RUN: &str = "oldest_test_run";
pub const NEWEST_TEST_RUN: &str = "newest_test_run";
pub const TEMPLATE_OUTPUT_DIR: &str = "template_output_dir";
pub const FORCE_CLEAN: &str = "force_clean";

/// Calendar date format shared by retention bounds and run records.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Node name used for list items in the KDL file.
const LIST_ITEM_NODE: &str = "-";

/// A recognized setting with its built-in value.
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    pub name: &'static str,
    pub value: TypedValue,
    pub description: &'static str,
}

/// One layer of the settings store: setting name to value.
pub type Layer = BTreeMap<String, TypedValue>;

/// The built-in defaults layer. Holds an entry for every recognized setting.
#[derive(Debug, Clone)]
pub struct Defaults {
    settings: Vec<Setting>,
}

impl Defaults {
    /// Build the standard defaults.
    ///
    /// `data_dir` anchors the default runs directory and `today` is the
    /// default upper retention bound.
    pub fn standard(data_dir: &Path, today: NaiveDate) -> Self {
        let runs_dir = data_dir.join("runs").to_string_lossy().to_string();
        let settings = vec![
            Setting {
                name: RUNS_DIR,
                value: TypedValue::String(runs_dir),
                description: "Directory where test run artifacts are stored",
            },
            Setting {
                name: SEARCH_DIRS,
                value: TypedValue::StringList(vec![".".to_string()]),
                description: "Directories searched for test and suite definitions",
            },
            Setting {
                name: CLEANUP_ON_PASS,
                value: TypedValue::Bool(false),
                description: "Delete a run's artifacts automatically when the test passes",
            },
            Setting {
                name: STDOUT,
                value: TypedValue::Bool(false),
                description: "Mirror log output to the console",
            },
            Setting {
                name: DEBUG,
                value: TypedValue::Bool(false),
                description: "Enable verbose debug logging",
            },
            Setting {
                name: TAG_OPERATOR,
                value: TypedValue::String("any".to_string()),
                description: "How multiple tags combine when selecting: any or all",
            },
            Setting {
                name: OLDEST_TEST_RUN,
                value: TypedValue::String("1970-01-01".to_string()),
                description: "Oldest run targeted by clean: a number of days back or a YYYY-MM-DD date",
            },
            Setting {
                name: NEWEST_TEST_RUN,
                value: TypedValue::String(today.format(DATE_FORMAT).to_string()),
                description: "Newest run targeted by clean: a YYYY-MM-DD date",
            },
            Setting {
                name: TEMPLATE_OUTPUT_DIR,
                value: TypedValue::String(".".to_string()),
                description: "Directory where generated test templates are written",
            },
            Setting {
                name: FORCE_CLEAN,
                value: TypedValue::Bool(false),
                description: "Delete targeted runs without requiring --force",
            },
        ];
        Self { settings }
    }

    pub fn get(&self, name: &str) -> Option<&Setting> {
        self.settings.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Settings in their declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.settings.iter()
    }
}

/// Parse a persisted layer from a KDL document.
///
/// Nodes without a usable value are skipped; name validation is left to the
/// settings store.
pub fn layer_from_kdl(doc: &KdlDocument) -> Layer {
    let mut layer = Layer::new();

    for node in doc.nodes() {
        let name = node.name().value().to_string();
        let value = if let Some(children) = node.children() {
            Some(TypedValue::StringList(
                children
                    .nodes()
                    .iter()
                    .filter(|child| child.name().value() == LIST_ITEM_NODE)
                    .filter_map(get_string_arg)
                    .collect(),
            ))
        } else {
            node.entries().first().and_then(|e| value_from_kdl(e.value()))
        };

        match value {
            Some(value) => {
                layer.insert(name, value);
            }
            None => tracing::warn!(setting = %name, "ignoring persisted setting without a value"),
        }
    }

    layer
}

/// Convert a persisted layer to a KDL document.
pub fn layer_to_kdl(layer: &Layer) -> KdlDocument {
    let mut doc = KdlDocument::new();

    for (name, value) in layer {
        let mut node = KdlNode::new(name.as_str());
        match value {
            TypedValue::StringList(items) => {
                let mut children = KdlDocument::new();
                for item in items {
                    let mut child = KdlNode::new(LIST_ITEM_NODE);
                    child.push(KdlEntry::new(KdlValue::String(item.clone())));
                    children.nodes_mut().push(child);
                }
                node.set_children(children);
            }
            TypedValue::Bool(b) => node.push(KdlEntry::new(KdlValue::Bool(*b))),
            TypedValue::Int(i) => node.push(KdlEntry::new(KdlValue::Integer(*i as i128))),
            TypedValue::Float(x) => node.push(KdlEntry::new(KdlValue::Float(*x))),
            TypedValue::String(s) => node.push(KdlEntry::new(KdlValue::String(s.clone()))),
        }
        doc.nodes_mut().push(node);
    }

    doc.autoformat();
    doc
}

fn value_from_kdl(value: &KdlValue) -> Option<TypedValue> {
    if let Some(b) = value.as_bool() {
        Some(TypedValue::Bool(b))
    } else if let Some(i) = value.as_integer() {
        i64::try_from(i).ok().map(TypedValue::Int)
    } else if let Some(x) = value.as_float() {
        Some(TypedValue::Float(x))
    } else {
        value.as_string().map(|s| TypedValue::String(s.to_string()))
    }
}

/// Get a string argument from a node's first entry.
fn get_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}
