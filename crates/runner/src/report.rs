//! Machine-readable run results

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thyme_common::Page;
use tracing::info;

use crate::error::RunnerResult;
use crate::node::TestRef;
use crate::summary::RunSummary;

/// File name of the JSON results inside the output directory
pub const RESULTS_FILE: &str = "thyme-results.json";

/// File name of the rendered page inside the output directory
pub const PAGE_FILE: &str = "index.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Passed,
    Failed,
    Skipped,
    Incomplete,
}

impl NodeStatus {
    pub fn of(node: &TestRef) -> Self {
        if node.was_skipped() {
            NodeStatus::Skipped
        } else if !node.is_complete() {
            NodeStatus::Incomplete
        } else if node.has_passed() {
            NodeStatus::Passed
        } else {
            NodeStatus::Failed
        }
    }
}

/// Result of one test node and its subtree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeReport {
    pub name: String,
    pub full_key: String,
    pub status: NodeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeReport>,
}

impl NodeReport {
    pub fn from_node(node: &TestRef) -> Self {
        Self {
            name: node.name(),
            full_key: node.full_key(),
            status: NodeStatus::of(node),
            error: node.error(),
            children: node.children().iter().map(Self::from_node).collect(),
        }
    }
}

/// Results of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub summary: RunSummary,
    pub tests: Vec<NodeReport>,
}

impl RunReport {
    pub fn new(title: impl Into<String>, summary: RunSummary, tests: &[TestRef]) -> Self {
        Self {
            title: title.into(),
            generated_at: Utc::now(),
            summary,
            tests: tests.iter().map(NodeReport::from_node).collect(),
        }
    }

    /// Write the results as JSON into `output_dir`.
    pub fn write(&self, output_dir: &Path) -> RunnerResult<PathBuf> {
        std::fs::create_dir_all(output_dir)?;

        let path = output_dir.join(RESULTS_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }

    pub fn load(path: &Path) -> RunnerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Serialize `page` into `output_dir`.
pub fn write_page(page: &Page, output_dir: &Path) -> RunnerResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join(PAGE_FILE);
    std::fs::write(&path, page.to_html())?;

    info!("Page written to: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TestNode;
    use crate::tree::Test;
    use tempfile::TempDir;
    use thyme_common::Location;

    #[test]
    fn test_statuses_follow_node_state() {
        let root = Test::new("root");
        root.child("ok").finish(Ok(()));
        root.child("bad").finish(Err("boom".into()));
        root.child("skipped").skip();
        root.child("waiting");

        let report = NodeReport::from_node(&(root as TestRef));
        let statuses: Vec<NodeStatus> = report.children.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![
                NodeStatus::Passed,
                NodeStatus::Failed,
                NodeStatus::Skipped,
                NodeStatus::Incomplete
            ]
        );
        assert_eq!(report.children[1].error.as_deref(), Some("boom"));
        assert_eq!(report.status, NodeStatus::Incomplete);
    }

    #[test]
    fn test_write_and_load_results() {
        let dir = TempDir::new().unwrap();
        let test = Test::new("only");
        test.finish(Ok(()));
        let tests: Vec<TestRef> = vec![test];
        let report = RunReport::new("Thyme", RunSummary::count(&tests), &tests);

        let path = report.write(&dir.path().join("out")).unwrap();
        assert!(path.ends_with(RESULTS_FILE));

        let loaded = RunReport::load(&path).unwrap();
        assert_eq!(loaded.title, "Thyme");
        assert_eq!(loaded.summary.passed, 1);
        assert_eq!(loaded.tests[0].full_key, "only");
    }

    #[test]
    fn test_write_page_serializes_html() {
        let dir = TempDir::new().unwrap();
        let mut page = Page::new("Report", Location::default());
        let body = page.body();
        page.append_text(body, "a < b");

        let path = write_page(&page, dir.path()).unwrap();
        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains("a &lt; b"));
        assert!(html.contains("<title>Report</title>"));
    }
}
