//! Thyme Report Runner
//!
//! Renders a hierarchical test run into an interactive HTML page through
//! independent contributions:
//! - The registry keeps contributions in registration order
//! - Execution hooks wrap every node's execution around a `Proceed`
//! - Render hooks decorate each page region and each test element
//! - The shell drives the runner and debounces run-complete signals
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Shell                                                      │
//! │    ├── build page -> onPageSetup(header, results)           │
//! │    ├── runner.start(Executor, CompletionSender)             │
//! │    │     └── Executor: h1(proceed -> h2(... -> body))       │
//! │    ├── top-level completion -> rebuild subtree              │
//! │    │     └── onNodeRender(visual, node) per node            │
//! │    └── debounce -> onRunComplete(page, RunSummary)          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner / TestNode (black box)                          │
//! │    └── TreeRunner + Test: in-memory tree, YAML suites       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod contribution;
pub mod error;
pub mod execute;
pub mod node;
pub mod plugins;
pub mod render;
pub mod report;
pub mod shell;
pub mod suite;
pub mod summary;
pub mod tree;

pub use contribution::{Contribution, HookKind, Registry};
pub use error::{RunnerError, RunnerResult};
pub use execute::{Executor, Proceed};
pub use node::{
    completion_channel, CompletionReceiver, CompletionSender, Inspection, TestNode, TestRef,
    TestRunner, KEY_DELIMITER,
};
pub use plugins::Builtins;
pub use render::{PageRegions, VisualNode};
pub use report::RunReport;
pub use shell::{RunOutcome, Shell, ShellState};
pub use suite::{SuiteSpec, TestSpec};
pub use summary::RunSummary;
pub use tree::{Body, RunState, Test, TreeRunner};
