//! Execution-wrapping dispatcher
//!
//! Composes every registered [`ExecuteHook`](crate::contribution::ExecuteHook)
//! around the execution of one test node:
//!
//! ```text
//! h1(proceed -> h2(proceed -> ... hn(proceed -> body) ...))
//! ```
//!
//! With [`Nesting::OuterFirst`] the earliest registration is outermost, so it
//! runs first on the way in and last on the way out. A hook that drops its
//! [`Proceed`] without running it cuts the chain for that node: inner hooks
//! and the body never run, while outer hooks still get their trailing code.

use std::fmt;
use std::rc::Rc;

use thyme_common::{Nesting, PageHandle};

use crate::contribution::{ExecuteHook, Registry};
use crate::node::TestRef;

/// Continuation handed to an execution hook.
///
/// Consumed by [`Proceed::run`], so it can be invoked at most once.
pub struct Proceed<'a> {
    next: Box<dyn FnOnce() + 'a>,
}

impl<'a> Proceed<'a> {
    pub fn new(next: impl FnOnce() + 'a) -> Self {
        Self {
            next: Box::new(next),
        }
    }

    /// Continue with the next hook inward, or the node body at the centre.
    pub fn run(self) {
        (self.next)()
    }
}

impl fmt::Debug for Proceed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Proceed")
    }
}

/// Runs test nodes through the composed execution hooks.
///
/// Handed to the runner on start; cheap to clone.
#[derive(Clone)]
pub struct Executor {
    hooks: Rc<[Rc<ExecuteHook>]>,
    page: PageHandle,
}

impl Executor {
    /// Snapshot the registry's execution hooks in the requested nesting.
    pub fn new(registry: &Registry, page: PageHandle, nesting: Nesting) -> Self {
        let mut hooks = registry.execute_hooks();
        if nesting == Nesting::InnerFirst {
            hooks.reverse();
        }
        Self {
            hooks: hooks.into(),
            page,
        }
    }

    /// Number of hooks wrapped around each node.
    pub fn depth(&self) -> usize {
        self.hooks.len()
    }

    pub fn page(&self) -> &PageHandle {
        &self.page
    }

    /// Execute `node`, running `body` at the centre of the hook chain unless
    /// a hook withholds its continuation.
    pub fn execute<'a>(&'a self, node: &'a TestRef, body: impl FnOnce() + 'a) {
        wrap(&self.hooks, node, &self.page, Box::new(body));
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

fn wrap<'a>(
    hooks: &'a [Rc<ExecuteHook>],
    node: &'a TestRef,
    page: &'a PageHandle,
    body: Box<dyn FnOnce() + 'a>,
) {
    match hooks.split_first() {
        None => body(),
        Some((outer, inner)) => {
            let proceed = Proceed::new(move || wrap(inner, node, page, body));
            outer(proceed, node, page)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contribution::Contribution;
    use crate::tree::Test;
    use std::cell::RefCell;
    use thyme_common::{Location, Page};

    fn page() -> PageHandle {
        PageHandle::new(Page::new("t", Location::default()))
    }

    fn tracing_hook(log: &Rc<RefCell<Vec<String>>>, name: &'static str) -> Contribution {
        let log = log.clone();
        Contribution::new(name).on_test_execute(move |proceed, _, _| {
            log.borrow_mut().push(format!("{}:before", name));
            proceed.run();
            log.borrow_mut().push(format!("{}:after", name));
        })
    }

    #[test]
    fn test_body_runs_once_without_hooks() {
        let executor = Executor::new(&Registry::new(), page(), Nesting::OuterFirst);
        let node: TestRef = Test::new("a");
        let count = RefCell::new(0);
        executor.execute(&node, || *count.borrow_mut() += 1);
        assert_eq!(*count.borrow(), 1);
        assert_eq!(executor.depth(), 0);
    }

    #[test]
    fn test_inner_first_reverses_nesting() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = Registry::new();
        registry.register(tracing_hook(&log, "a"));
        registry.register(tracing_hook(&log, "b"));

        let executor = Executor::new(&registry, page(), Nesting::InnerFirst);
        let node: TestRef = Test::new("n");
        let body_log = log.clone();
        executor.execute(&node, move || body_log.borrow_mut().push("body".into()));

        assert_eq!(
            *log.borrow(),
            vec!["b:before", "a:before", "body", "a:after", "b:after"]
        );
    }
}
