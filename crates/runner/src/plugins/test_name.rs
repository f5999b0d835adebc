use crate::contribution::Contribution;

pub const NAME: &str = "test-name";

pub fn contribution() -> Contribution {
    Contribution::new(NAME).on_node_render(|visual, node| visual.append_text(&node.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::TestRef;
    use crate::plugins::testing::*;
    use crate::tree::Test;

    #[test]
    fn test_name_is_appended() {
        let registry = registry_of(contribution());
        let mut page = page_at("index.html");
        let node: TestRef = Test::new("Kettle boils");
        let element = render(&registry, &mut page, &node);
        assert_eq!(page.text_content(element), "Kettle boils");
    }
}
