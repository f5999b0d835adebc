//! Declarative YAML suite files

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, info};

use crate::error::{RunnerError, RunnerResult};
use crate::node::Inspection;
use crate::tree::{Body, Test, TreeRunner};

/// One top-level test group parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteSpec {
    /// Name of the top-level test
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tests in declaration order
    #[serde(default)]
    pub tests: Vec<TestSpec>,
}

/// A test or group of tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSpec {
    pub name: String,

    /// Failure message; the test passes when absent
    #[serde(default)]
    pub fails: Option<String>,

    /// Source text of the test body, shown by the view-code control
    #[serde(default)]
    pub source: Option<String>,

    /// Nested tests; a test with children is a group
    #[serde(default)]
    pub tests: Vec<TestSpec>,
}

impl SuiteSpec {
    /// Parse a suite from YAML string
    pub fn from_yaml(yaml: &str) -> RunnerResult<Self> {
        serde_yaml::from_str(yaml).map_err(RunnerError::from)
    }

    /// Parse a suite from a YAML file
    pub fn from_file(path: &Path) -> RunnerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| RunnerError::SuiteParse(format!("{}: {}", path.display(), e)))
    }

    /// Load every suite below `dir`, ordered by file path.
    ///
    /// `dir` may also name a single YAML file.
    pub fn load_all(dir: &Path) -> RunnerResult<Vec<Self>> {
        if !dir.exists() {
            return Err(RunnerError::SuiteNotFound(dir.display().to_string()));
        }

        let mut suites = Vec::new();
        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_type().is_file()
                    && e.path()
                        .extension()
                        .map(|ext| ext == "yaml" || ext == "yml")
                        .unwrap_or(false)
            })
        {
            debug!("Loading suite {}", entry.path().display());
            suites.push(Self::from_file(entry.path())?);
        }

        info!("Loaded {} suite(s) from {}", suites.len(), dir.display());
        Ok(suites)
    }

    /// Build the in-memory test tree for this suite.
    pub fn build(&self) -> Rc<Test> {
        let root = Test::new(self.name.as_str());
        for spec in &self.tests {
            spec.attach(&root);
        }
        root
    }

    /// A runner over the given suites, in order.
    pub fn runner(suites: &[Self]) -> TreeRunner {
        TreeRunner::new(suites.iter().map(Self::build).collect())
    }

    /// Number of leaf tests declared in the suite.
    pub fn leaf_count(&self) -> usize {
        self.tests.iter().map(TestSpec::leaf_count).sum()
    }
}

impl TestSpec {
    fn attach(&self, parent: &Rc<Test>) {
        let test = parent.child(self.name.as_str());
        if let Some(message) = &self.fails {
            test.set_body(Body::Fail(message.clone()));
        }
        if let Some(source) = &self.source {
            let name = self.name.clone();
            test.set_inspection(
                Inspection::new(move || info!("Inspecting test '{}'", name))
                    .with_source(source.as_str()),
            );
        }
        for child in &self.tests {
            child.attach(&test);
        }
    }

    fn leaf_count(&self) -> usize {
        if self.tests.is_empty() {
            1
        } else {
            self.tests.iter().map(TestSpec::leaf_count).sum()
        }
    }
}
