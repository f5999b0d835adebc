//! Run summary: pass/fail counts over leaf tests

use serde::{Deserialize, Serialize};

use crate::node::TestRef;

/// Counts over the leaves of the current top-level node set.
///
/// Recomputed from the tree each time it is needed. Group nodes are never
/// counted; `total` always equals `passed + failed + incomplete()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl RunSummary {
    /// Count the leaves below `tests`.
    pub fn count(tests: &[TestRef]) -> Self {
        let mut summary = Self::default();
        for test in tests {
            summary.count_leaves(test);
        }
        summary
    }

    fn count_leaves(&mut self, test: &TestRef) {
        let children = test.children();
        if !children.is_empty() {
            for child in &children {
                self.count_leaves(child);
            }
            return;
        }

        self.total += 1;
        if test.is_complete() {
            if test.has_passed() {
                self.passed += 1;
            } else {
                self.failed += 1;
            }
        }
    }

    /// Leaves that have not finished, skipped ones included.
    pub fn incomplete(&self) -> usize {
        self.total - self.passed - self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// `passed/failed/total`
    pub fn ratio(&self) -> String {
        format!("{}/{}/{}", self.passed, self.failed, self.total)
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} total",
            self.passed, self.failed, self.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TestNode;
    use crate::tree::Test;

    #[test]
    fn test_no_tests_counts_zero() {
        assert_eq!(RunSummary::count(&[]), RunSummary::default());
    }

    #[test]
    fn test_only_leaves_are_counted() {
        let a = Test::new("a");
        let aa = a.child("aa");
        aa.child("aaa");
        a.child("ab");
        let b = Test::new("b");

        let summary = RunSummary::count(&[a as TestRef, b as TestRef]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.incomplete(), 3);
    }

    #[test]
    fn test_mixture_of_passing_failing_and_incomplete() {
        let suite = Test::new("suite");
        for i in 0..3 {
            suite.child(&format!("pass {}", i)).finish(Ok(()));
        }
        for i in 0..2 {
            suite
                .child(&format!("fail {}", i))
                .finish(Err("boom".into()));
        }
        suite.child("incomplete");

        let summary = RunSummary::count(&[suite as TestRef]);
        assert_eq!(summary.passed, 3);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.incomplete(), 1);
        assert!(summary.has_failures());
        assert_eq!(summary.ratio(), "3/2/6");
    }

    #[test]
    fn test_skipped_leaves_count_as_incomplete() {
        let suite = Test::new("suite");
        suite.child("ran").finish(Ok(()));
        suite.child("skipped").skip();

        let summary = RunSummary::count(&[suite as TestRef]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.incomplete(), 1);
    }
}
