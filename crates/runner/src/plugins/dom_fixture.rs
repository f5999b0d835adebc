//! Scratch element for leaf bodies
//!
//! Each leaf runs with an empty `div#thyme-temporary-dom-element` appended
//! to the page body. It is removed again once the leaf's body returns, so
//! nothing a body puts there leaks into the report.

use tracing::debug;

use crate::contribution::Contribution;

pub const NAME: &str = "dom-fixture";

pub const FIXTURE_ID: &str = "thyme-temporary-dom-element";
pub const FIXTURE: &str = "thyme-temporary-dom-element";

pub fn contribution() -> Contribution {
    Contribution::new(NAME).on_test_execute(|proceed, node, page| {
        if !node.is_leaf() {
            proceed.run();
            return;
        }

        let fixture = page.update(|page| {
            let body = page.body();
            let fixture = page.append_element(body, "div");
            page.set_attr(fixture, "id", FIXTURE_ID);
            page.add_class(fixture, FIXTURE);
            fixture
        });

        proceed.run();

        debug!("Removing fixture of '{}'", node.full_key());
        page.update(|page| page.remove(fixture));
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TestRef;
    use crate::plugins::testing::*;
    use crate::tree::Test;
    use std::cell::Cell;
    use thyme_common::PageHandle;

    #[test]
    fn test_leaf_body_sees_fixture_until_it_returns() {
        let registry = registry_of(contribution());
        let page = PageHandle::new(page_at("index.html"));
        let leaf: TestRef = Test::new("leaf");

        let seen = Cell::new(false);
        execute(&registry, &page, &leaf, || {
            page.update(|page| {
                let fixture = page.find_by_id(FIXTURE_ID).unwrap();
                assert!(page.has_class(fixture, FIXTURE));
                page.append_text(fixture, "scribble");
            });
            seen.set(true);
        });

        assert!(seen.get());
        page.read(|page| {
            assert!(page.find_by_id(FIXTURE_ID).is_none());
            assert!(!page.to_html().contains("scribble"));
        });
    }

    #[test]
    fn test_groups_get_no_fixture() {
        let registry = registry_of(contribution());
        let page = PageHandle::new(page_at("index.html"));
        let group = Test::new("group");
        group.child("leaf");
        let group: TestRef = group;

        execute(&registry, &page, &group, || {
            page.read(|page| assert!(page.find_by_id(FIXTURE_ID).is_none()));
        });
    }

    #[test]
    fn test_withheld_body_still_removes_fixture() {
        let mut registry = registry_of(contribution());
        registry.register(Contribution::new("withhold").on_test_execute(|_, _, _| {}));
        let page = PageHandle::new(page_at("index.html"));
        let leaf: TestRef = Test::new("leaf");

        execute(&registry, &page, &leaf, || unreachable!());

        page.read(|page| assert!(page.find_by_id(FIXTURE_ID).is_none()));
    }
}
