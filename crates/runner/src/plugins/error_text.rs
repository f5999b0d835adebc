use crate::contribution::Contribution;

pub const NAME: &str = "error-text";

pub fn contribution() -> Contribution {
    Contribution::new(NAME).on_node_render(|visual, node| {
        if let Some(error) = node.error().filter(|error| !error.is_empty()) {
            visual.append_text(&format!(" ({})", error));
        }
    })
}
