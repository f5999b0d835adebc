//! Page title linking back to the unfiltered report

use crate::contribution::Contribution;
use crate::plugins::HEADER_SECTION;

pub const NAME: &str = "big-title";

pub const TITLE_ID: &str = "thyme-title";

/// Shown when the document has no title.
pub const DEFAULT_TITLE: &str = "Thyme";

pub fn contribution() -> Contribution {
    Contribution::new(NAME).on_page_setup(|page, regions| {
        let href = page.location().without_query();
        let text = match page.title() {
            "" => DEFAULT_TITLE.to_string(),
            title => title.to_string(),
        };

        let link = page.append_element(regions.header, "a");
        page.set_attr(link, "id", TITLE_ID);
        page.add_class(link, HEADER_SECTION);
        page.set_attr(link, "href", &href);
        page.append_text(link, &text);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::*;
    use thyme_common::{Location, Page};

    #[test]
    fn test_title_links_to_page_without_query() {
        let registry = registry_of(contribution());
        let mut page = page_at("report.html?filter=kettle");
        let regions = setup(&registry, &mut page);

        let link = page.find_by_id(TITLE_ID).unwrap();
        assert_eq!(page.parent(link), Some(regions.header));
        assert_eq!(page.tag(link), Some("a"));
        assert_eq!(page.text_content(link), "Report");
        assert_eq!(page.attr(link, "href"), Some("report.html"));
        assert!(page.has_class(link, HEADER_SECTION));
    }

    #[test]
    fn test_untitled_page_uses_default() {
        let registry = registry_of(contribution());
        let mut page = Page::new("", Location::new("index.html"));
        setup(&registry, &mut page);

        let link = page.find_by_id(TITLE_ID).unwrap();
        assert_eq!(page.text_content(link), DEFAULT_TITLE);
    }
}
