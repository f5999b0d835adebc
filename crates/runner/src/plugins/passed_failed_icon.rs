use crate::contribution::Contribution;
use crate::plugins::TEST_ICON;

pub const NAME: &str = "passed-failed-icon";

pub const PASSED_ICON: &str = "icon-ok";
pub const FAILED_ICON: &str = "icon-remove";

pub fn contribution() -> Contribution {
    Contribution::new(NAME).on_node_render(|visual, node| {
        let icon = visual.append_icon("i", TEST_ICON);
        let class = if node.has_passed() { PASSED_ICON } else { FAILED_ICON };
        visual.page_mut().add_class(icon, class);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TestRef;
    use crate::plugins::testing::*;
    use crate::tree::Test;

    #[test]
    fn test_icon_reflects_outcome() {
        let registry = registry_of(contribution());
        let mut page = page_at("index.html");

        let passed = Test::new("passed");
        passed.finish(Ok(()));
        let failed = Test::new("failed");
        failed.finish(Err("no".into()));

        let element = render(&registry, &mut page, &(passed as TestRef));
        let icon = page.children(element)[0];
        assert!(page.has_class(icon, TEST_ICON));
        assert!(page.has_class(icon, PASSED_ICON));

        let element = render(&registry, &mut page, &(failed as TestRef));
        let icon = page.children(element)[0];
        assert!(page.has_class(icon, FAILED_ICON));
        assert!(!page.has_class(icon, PASSED_ICON));
    }
}
