//! Favicon reflecting the state of the run
//!
//! Starts as "running, passing", switches once to "running, failing" when
//! the first node finishes failed, and settles on passed or failed when the
//! run completes.

use std::cell::Cell;
use std::rc::Rc;

use thyme_common::Page;
use tracing::debug;

use crate::contribution::Contribution;

pub const NAME: &str = "favicon";

pub const ICON_ID: &str = "favIcon";

pub const FAILED_ICON: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAABAAAAAQCAYAAAAf8/9hAAAABGdBTUEAAK/INwWK6QAAABl0RVh0U29mdHdhcmUAQWRvYmUgSW1hZ2VSZWFkeXHJZTwAAAHdSURBVDjLpZNraxpBFIb3a0ggISmmNISWXmOboKihxpgUNGWNSpvaS6RpKL3Ry//Mh1wgf6PElaCyzq67O09nVjdVlJbSDy8Lw77PmfecMwZg/I/GDw3DCo8HCkZl/RlgGA0e3Yfv7+DbAfLrW+SXOvLTG+SHV/gPbuMZRnsyIDL/OASziMxkkKkUQTJJsLaGn8/iHz6nd+8mQv87Ahg2H9Th/BxZqxEkEgSrq/iVCvLsDK9awtvfxb2zjD2ARID+lVVlbabTgWYTv1rFL5fBUtHbbeTJCb3EQ3ovCnRC6xAgzJtOE+ztheYIEkqbFaS3vY2zuIj77AmtYYDusPy8/zuvunJkDKXM7tYWTiyGWFjAqeQnAD6+7ueNx/FLpRGAru7mcoj5ebqzszil7DggeF/DX1nBN82rzPqrzbRayIsLhJqMPT2N83Sdy2GApwFqRN7jFPL0tF+10cDd3MTZ2AjNUkGCoyO6y9cRxfQowFUbpufr1ct4ZoHg+Dg067zduTmEbq4yi/UkYidDe+kaTcP4ObJIajksPd/eyx3c+N2rvPbMDPbUFPZSLKzcGjKPrbJaDsu+dQO3msfZzeGY2TCvKGYQhdSYeeJjUt21dIcjXQ7U7Kv599f4j/oF55W4g/2e3b8AAAAASUVORK5CYII=";
pub const PASSED_ICON: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAABAAAAAQCAYAAAAf8/9hAAAABGdBTUEAAK/INwWK6QAAABl0RVh0U29mdHdhcmUAQWRvYmUgSW1hZ2VSZWFkeXHJZTwAAAKfSURBVDjLpZPrS1NhHMf9O3bOdmwDCWREIYKEUHsVJBI7mg3FvCxL09290jZj2EyLMnJexkgpLbPUanNOberU5taUMnHZUULMvelCtWF0sW/n7MVMEiN64AsPD8/n83uucQDi/id/DBT4Dolypw/qsz0pTMbj/WHpiDgsdSUyUmeiPt2+V7SrIM+bSss8ySGdR4abQQv6lrui6VxsRonrGCS9VEjSQ9E7CtiqdOZ4UuTqnBHO1X7YXl6Daa4yGq7vWO1D40wVDtj4kWQbn94myPGkCDPdSesczE2sCZShwl8CzcwZ6NiUs6n2nYX99T1cnKqA2EKui6+TwphA5k4yqMayopU5mANV3lNQTBdCMVUA9VQh3GuDMHiVcLCS3J4jSLhCGmKCjBEx0xlshjXYhApfMZRP5CyYD+UkG08+xt+4wLVQZA1tzxthm2tEfD3JxARH7QkbD1ZuozaggdZbxK5kAIsf5qGaKMTY2lAU/rH5HW3PLsEwUYy+YCcERmIjJpDcpzb6l7th9KtQ69fi09ePUej9l7cx2DJbD7UrG3r3afQHOyCo+V3QQzE35pvQvnAZukk5zL5qRL59jsKbPzdheXoBZc4saFhBS6AO7V4zqCpiawuptwQG+UAa7Ct3UT0hh9p9EnXT5Vh6t4C22QaUDh6HwnECOmcO7K+6kW49DKqS2DrEZCtfuI+9GrNHg4fMHVSO5kE7nAPVkAxKBxcOzsajpS4Yh4ohUPPWKTUh3PaQEptIOr6BiJjcZXCwktaAGfrRIpwblqOV3YKdhfXOIvBLeREWpnd8ynsaSJoyESFphwTtfjN6X1jRO2+FxWtCWksqBApeiFIR9K6fiTpPiigDoadqCEag5YUFKl6Yrciw0VOlhOivv/Ff8wtn0KzlebrUYwAAAABJRU5ErkJggg==";
pub const RUNNING_PASSED_ICON: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAABAAAAAQCAYAAAAf8/9hAAAABGdBTUEAAK/INwWK6QAAABl0RVh0U29mdHdhcmUAQWRvYmUgSW1hZ2VSZWFkeXHJZTwAAAIMSURBVBgZpcHNi05xGMfhz/07hzTDiKZmEmLYeM3iKTKUiFhY2EhZ2NjIBgsWYoUoSWr+B7NhY6GkJBRhYSMvJYRSFDPPi3N+9/01Z2Jvcl0mif9h+46PH92yrXXpe0f9EhCBIvBwFCIUyJ2QkDsewcDsuv3y5adTN67sHytbo61rs+b0p6E5zER/u+PXgLGyUyt1vk8yU91aiSmlXJw/uJKZOnzxPY1SChpVdgQohAcEIkJ4BJ6FZ+EKKhfLh+fh4TRKJBqWDJNQMmTCwkjJMEuYOVaIIhJlFo3ITiN5OI0EmBmWjCIZqTAsQZFgVlFw/tZuTt/cjIqaRnjQSAoxzYxGApIZKRlFYRQGKcGvXLF4cBXHxjdS5R4RTqOMcP4yM6ZJnLy+DSlTRabKmUULVrJqeCMTvTZ7x0ZYoKs0ylzXTDPDAEmYGTkqdq45hCvwcALx+cdH1i0eZbLq8qx7iPXnDswv5UGjAMQUM5Do5QpX8P7bG+rI5Kipvebnrwk2LNnKZN3h8bsH38qI4C8DjClm9HKP7JmhgaXkcFzBlx8fWDh3mOcfH/L47Qs6Tsv2HR8fH1qyaH+4Ex64OxHBz8Ej9KqKKip6uWLF4Go2jezi6YdH3H/1hGXdE7fvXD6zxyTxL9aeS+3W0u19917f/VQFOz5f0CummCT+xchZa3sUfd3wka8X9I4/fgON+TR7PCxMcAAAAABJRU5ErkJggg==";
pub const RUNNING_FAILED_ICON: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAABAAAAAQCAYAAAAf8/9hAAAAAXNSR0IArs4c6QAAAAZiS0dEAP8A/wD/oL2nkwAAAAlwSFlzAAALEwAACxMBAJqcGAAAAAd0SU1FB90CBw0qMMQJoV8AAAIRSURBVDjLpZNPSFRRFMZ/575RLMsIJCU0UIwwN0EDVhYYQtjChYskaBH92UQrIYiI2lRSUC0E19FSiKBFELg1ixYt2khUSI4tFSxnnHnvnnNavBnbKl344HI4/M73ce8Rd+d/joxPzt48PVx8slbxVnfADDdDTXFzzA1XxdxxVdSMtuasvLj46/br5xMzheJQcbqppTV0tOxocGu5otPATKGSeaisbezY+mbmAaDg6jy61LdjwPXHP8kBbgCkUXHAzVEDwzFz1AyNnsuNVJ2ezr2oaQ6g/goSBHHHg+DiiAkhCCIBEUUSJ7FAIeb9FnNAaJACICJIEJIghESQAEmApiRhbuwCb8+O4kmWAzR3Htzq/0BkCxQkn54kQiIQAsQ0pb3/MG9OjhCrNawRoXGh7gAAd14Nj+HRsJgRY8b+vh46B49TLW8w0zuAXp3KATHLthwI4O6ICJZmDFy+iJtiquDOemmFrqFB0s0yx57d4OHUlX0Fr2dJAG9EcSemNdyU1W8/sJhhWYZmGbU/v+k+c4qsUmZpfn61YGb/ItSFCLFaRWOk7VAXphE3Y325xJ7OA5Tef+D7l88oWpTxydnZju6DE6aKqaGqmBknXtwiTWtYmhLTGu1H++k9N8LywgJfPy3w8drku7mn987j7tvSA9lVfjky6ncprNwhHGnUZbvrfF+ay5bIbtO0d8p9qVH/C58rTkV50AKSAAAAAElFTkSuQmCC";

pub fn contribution() -> Contribution {
    let has_failed = Rc::new(Cell::new(false));
    let seen_failure = has_failed.clone();

    Contribution::new(NAME)
        .on_page_setup(|page, _| set_icon(page, RUNNING_PASSED_ICON))
        .on_test_execute(move |proceed, node, page| {
            proceed.run();

            if !seen_failure.get() && node.is_complete() && !node.has_passed() {
                debug!("First failure at '{}'", node.full_key());
                seen_failure.set(true);
                page.update(|page| set_icon(page, RUNNING_FAILED_ICON));
            }
        })
        .on_run_complete(move |page, _| {
            let icon = if has_failed.get() { FAILED_ICON } else { PASSED_ICON };
            set_icon(page, icon);
        })
}

/// Point the page's icon link at `url`, creating the link on first use.
fn set_icon(page: &mut Page, url: &str) {
    let link = match page.find_by_id(ICON_ID) {
        Some(link) => link,
        None => {
            let head = page.head();
            let link = page.append_element(head, "link");
            page.set_attr(link, "id", ICON_ID);
            page.set_attr(link, "rel", "shortcut icon");
            page.set_attr(link, "type", "image/x-icon");
            link
        }
    };
    page.set_attr(link, "href", url);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TestRef;
    use crate::plugins::testing::*;
    use crate::summary::RunSummary;
    use crate::tree::Test;
    use thyme_common::PageHandle;

    fn icon(page: &PageHandle) -> String {
        page.read(|page| {
            let link = page.find_by_id(ICON_ID).unwrap();
            page.attr(link, "href").unwrap().to_string()
        })
    }

    #[test]
    fn test_running_passed_icon_installed_once_in_head() {
        let registry = registry_of(contribution());
        let mut page = page_at("index.html");
        setup(&registry, &mut page);
        complete(&registry, &mut page, &RunSummary::default());

        let links = page.query_tag_all(page.head(), "link");
        assert_eq!(links.len(), 1);
        assert_eq!(page.attr(links[0], "rel"), Some("shortcut icon"));
    }

    #[test]
    fn test_passing_run_ends_with_passed_icon() {
        let registry = registry_of(contribution());
        let page = PageHandle::new(page_at("index.html"));
        page.update(|page| setup(&registry, page));
        assert_eq!(icon(&page), RUNNING_PASSED_ICON);

        let passing = Test::new("ok");
        let node: TestRef = passing.clone();
        execute(&registry, &page, &node, || passing.finish(Ok(())));
        assert_eq!(icon(&page), RUNNING_PASSED_ICON);

        page.update(|p| complete(&registry, p, &RunSummary::default()));
        assert_eq!(icon(&page), PASSED_ICON);
    }

    #[test]
    fn test_failure_switches_to_running_failed_then_failed() {
        let registry = registry_of(contribution());
        let page = PageHandle::new(page_at("index.html"));
        page.update(|page| setup(&registry, page));

        let failing = Test::new("bad");
        let node: TestRef = failing.clone();
        execute(&registry, &page, &node, || failing.finish(Err("boom".into())));
        assert_eq!(icon(&page), RUNNING_FAILED_ICON);

        page.update(|p| complete(&registry, p, &RunSummary::default()));
        assert_eq!(icon(&page), FAILED_ICON);
    }
}
