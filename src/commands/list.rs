//! The `list` command.

use super::{Context, Output, json};
use crate::Result;
use crate::select::TagQuery;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Suite,
    Test,
}

#[derive(Serialize)]
pub struct ListItem {
    pub kind: ItemKind,
    pub name: String,
    pub path: PathBuf,
    pub tags: Vec<String>,
}

/// Result of the `list` command.
#[derive(Serialize)]
pub struct ListResult {
    pub tag_operator: String,
    pub items: Vec<ListItem>,
}

impl Output for ListResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.items.is_empty() {
            return "No tests or suites found.".to_string();
        }
        self.items
            .iter()
            .map(|item| {
                let kind = match item.kind {
                    ItemKind::Suite => "suite",
                    ItemKind::Test => "test ",
                };
                if item.tags.is_empty() {
                    format!("{} {}", kind, item.name)
                } else {
                    format!("{} {} [{}]", kind, item.name, item.tags.join(", "))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// List suites and tests matching `tags` under the effective tag operator.
pub fn list(ctx: &Context, tags: &[String]) -> Result<ListResult> {
    let query = TagQuery::new(tags, ctx.settings.combinator()?);
    let definitions = ctx.collaborators.definitions()?;

    let suites = definitions
        .suites()?
        .into_iter()
        .filter(|s| query.matches(s))
        .map(|s| ListItem {
            kind: ItemKind::Suite,
            name: s.name,
            path: s.path,
            tags: s.tags,
        });
    let tests = definitions
        .tests()?
        .into_iter()
        .filter(|t| query.matches(t))
        .map(|t| ListItem {
            kind: ItemKind::Test,
            name: t.name,
            path: t.path,
            tags: t.tags,
        });

    let mut items: Vec<ListItem> = suites.chain(tests).collect();
    items.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));

    Ok(ListResult {
        tag_operator: query.combinator().to_string(),
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingOverrides;
    use crate::config::schema::TAG_OPERATOR;
    use crate::test_utils::{FakeWorld, suite, test_def};

    fn world() -> FakeWorld {
        FakeWorld::new()
            .with_test(test_def("login", &["auth", "fast"]))
            .with_test(test_def("upload", &["files"]))
            .with_suite(suite("auth", &["auth"], &["login"]))
    }

    fn names(result: &ListResult) -> Vec<&str> {
        result.items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_list_everything_suites_first() {
        let world = world();
        let result = list(&world.context(), &[]).unwrap();
        assert_eq!(names(&result), vec!["auth", "login", "upload"]);
        assert_eq!(result.items[0].kind, ItemKind::Suite);
        assert_eq!(result.tag_operator, "any");
    }

    #[test]
    fn test_list_filters_by_tag_case_insensitively() {
        let world = world();
        let result = list(&world.context(), &["AUTH".to_string()]).unwrap();
        assert_eq!(names(&result), vec!["auth", "login"]);
    }

    #[test]
    fn test_list_all_operator() {
        let world = world().with_overrides(SettingOverrides::new().with(TAG_OPERATOR, "all"));
        let tags = vec!["auth".to_string(), "fast".to_string()];
        let result = list(&world.context(), &tags).unwrap();
        assert_eq!(names(&result), vec!["login"]);
        assert_eq!(result.tag_operator, "all");
    }

    #[test]
    fn test_list_human_format() {
        let world = world();
        let human = list(&world.context(), &[]).unwrap().to_human();
        assert_eq!(
            human,
            "suite auth [auth]\ntest  login [auth, fast]\ntest  upload [files]"
        );
    }

    #[test]
    fn test_list_empty() {
        let world = FakeWorld::new();
        let result = list(&world.context(), &[]).unwrap();
        assert_eq!(result.to_human(), "No tests or suites found.");
        assert!(result.to_json().contains(r#""items":[]"#));
    }
}
