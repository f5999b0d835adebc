//! Boundary with the test-execution core
//!
//! The report never walks or schedules tests itself. It sees the test tree
//! through [`TestNode`] and drives a run through [`TestRunner`]; the runner
//! routes every node's execution through the [`Executor`] it is handed and
//! reports finished top-level nodes on a [`CompletionSender`].

use std::fmt;
use std::rc::Rc;

use tokio::sync::mpsc;

use crate::execute::Executor;

/// Separator between key segments in [`TestNode::full_key`].
pub const KEY_DELIMITER: char = '>';

/// Shared handle to a node of the test tree.
pub type TestRef = Rc<dyn TestNode>;

/// One node (leaf or group) of the hierarchical test tree.
///
/// Implementations are owned and mutated by the runner. The report only
/// reads them, except for calling [`TestNode::skip`] before execution.
pub trait TestNode {
    /// Display name
    fn name(&self) -> String;

    /// This node's segment of the path from the root.
    fn key(&self) -> String;

    /// Root-to-node path, segments joined by [`KEY_DELIMITER`].
    fn full_key(&self) -> String;

    /// Children in declaration order.
    fn children(&self) -> Vec<TestRef>;

    fn is_complete(&self) -> bool;

    fn has_passed(&self) -> bool;

    fn error(&self) -> Option<String>;

    /// Mark the node so the runner will not execute it.
    fn skip(&self);

    fn was_skipped(&self) -> bool;

    /// Debugging entry point for the node, when it has one.
    fn inspect(&self) -> Option<Inspection> {
        None
    }

    fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }
}

/// A manual-debugging hook attached to a test: a callback bound to the
/// test's context plus, optionally, the source of the test body.
#[derive(Clone)]
pub struct Inspection {
    callback: Rc<dyn Fn()>,
    source: Option<String>,
}

impl Inspection {
    pub fn new(callback: impl Fn() + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Call the bound callback.
    pub fn invoke(&self) {
        (self.callback)()
    }
}

impl fmt::Debug for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inspection")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// The test-execution core, treated as a black box.
pub trait TestRunner {
    /// Top-level nodes in declaration order.
    fn tests(&self) -> Vec<TestRef>;

    /// Begin the run.
    ///
    /// Every node execution, at every depth, must go through
    /// [`Executor::execute`]. Each time a top-level node finishes an
    /// execution pass it must be reported on `completions`; dropping the
    /// sender signals that no further completions will arrive.
    fn start(&self, executor: Executor, completions: CompletionSender);

    /// Stop executing further nodes and release the completion sender.
    fn abort(&self);
}

/// Sending half of the top-level completion channel.
#[derive(Clone)]
pub struct CompletionSender {
    tx: mpsc::UnboundedSender<TestRef>,
}

/// Receiving half of the top-level completion channel.
pub struct CompletionReceiver {
    rx: mpsc::UnboundedReceiver<TestRef>,
}

/// Create a completion channel.
pub fn completion_channel() -> (CompletionSender, CompletionReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CompletionSender { tx }, CompletionReceiver { rx })
}

impl CompletionSender {
    /// Report that `node` finished an execution pass.
    ///
    /// Returns false when nobody is listening any more.
    pub fn complete(&self, node: TestRef) -> bool {
        self.tx.send(node).is_ok()
    }
}

impl CompletionReceiver {
    /// Next completed top-level node, or `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<TestRef> {
        self.rx.recv().await
    }
}

impl fmt::Debug for CompletionSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSender")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}
