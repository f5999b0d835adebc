//! Marks the header as running, then failed or finished

use std::cell::Cell;
use std::rc::Rc;

use thyme_common::ElementId;

use crate::contribution::Contribution;

pub const NAME: &str = "header-state";

pub const RUNNING: &str = "is-running";
pub const FAILED: &str = "is-failed";

pub fn contribution() -> Contribution {
    let header: Rc<Cell<Option<ElementId>>> = Rc::new(Cell::new(None));
    let installed = header.clone();

    Contribution::new(NAME)
        .on_page_setup(move |page, regions| {
            installed.set(Some(regions.header));
            page.add_class(regions.header, RUNNING);
        })
        .on_run_complete(move |page, summary| {
            let Some(header) = header.get() else {
                return;
            };
            page.remove_class(header, RUNNING);
            if summary.has_failures() {
                page.add_class(header, FAILED);
            }
        })
}
