//! Pass/fail/total counters in the header and the document title

use std::cell::RefCell;
use std::rc::Rc;

use thyme_common::ElementId;

use crate::contribution::Contribution;

pub const NAME: &str = "test-count";

pub const SUMMARY_ID: &str = "thyme-summary";
pub const PASSES: &str = "thyme-passes";
pub const FAILS: &str = "thyme-fails";
pub const TOTAL: &str = "thyme-total";

#[derive(Debug, Clone, Copy)]
struct Counters {
    passed: ElementId,
    failed: ElementId,
    total: ElementId,
}

pub fn contribution() -> Contribution {
    let counters: Rc<RefCell<Option<(Counters, String)>>> = Rc::new(RefCell::new(None));
    let installed = counters.clone();

    Contribution::new(NAME)
        .on_page_setup(move |page, regions| {
            let container = page.append_element(regions.header, "div");
            page.set_attr(container, "id", SUMMARY_ID);

            let passed = page.append_element(container, "span");
            page.add_class(passed, PASSES);
            page.append_text(container, "/");
            let failed = page.append_element(container, "span");
            page.add_class(failed, FAILS);
            page.append_text(container, "/");
            let total = page.append_element(container, "span");
            page.add_class(total, TOTAL);

            let original_title = page.title().to_string();
            *installed.borrow_mut() = Some((Counters { passed, failed, total }, original_title));
        })
        .on_run_complete(move |page, summary| {
            let counters = counters.borrow();
            let Some((elements, original_title)) = counters.as_ref() else {
                return;
            };
            page.set_text(elements.passed, &summary.passed.to_string());
            page.set_text(elements.failed, &summary.failed.to_string());
            page.set_text(elements.total, &summary.total.to_string());
            page.set_title(format!("[{}] {}", summary.ratio(), original_title));
        })
}
