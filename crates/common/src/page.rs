//! Page model: an arena of elements that contributions decorate
//!
//! The page is the rendering surface of a report. Elements live in a single
//! arena owned by the [`Page`] and are addressed by [`ElementId`]. Interaction
//! is modelled with listeners registered per element and event name; firing an
//! event through [`Page::dispatch`] hands the listener mutable access to the
//! page, so listeners never hold references into it.
//!
//! [`Page::to_html`] serializes the current state as a static HTML document.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use tracing::debug;

use crate::location::Location;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

/// Handle to a node in a [`Page`] arena.
///
/// Ids are only meaningful for the page that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementId(usize);

/// Callback fired by [`Page::dispatch`] with the page and the event target.
pub type Listener = Rc<dyn Fn(&mut Page, ElementId)>;

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        classes: Vec<String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    kind: NodeKind,
}

/// The report page
pub struct Page {
    nodes: Vec<Node>,
    head: ElementId,
    body: ElementId,
    title: String,
    location: Location,
    listeners: HashMap<(ElementId, String), Vec<Listener>>,
    active: Option<ElementId>,
    navigation: Option<Location>,
}

impl Page {
    /// Create an empty page with a `head` and a `body`.
    pub fn new(title: impl Into<String>, location: Location) -> Self {
        let mut page = Self {
            nodes: Vec::new(),
            head: ElementId(0),
            body: ElementId(0),
            title: title.into(),
            location,
            listeners: HashMap::new(),
            active: None,
            navigation: None,
        };
        page.head = page.create_element("head");
        page.body = page.create_element("body");
        page
    }

    pub fn head(&self) -> ElementId {
        self.head
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    /// Document title
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Where the page asked to navigate to, set by [`Page::submit_form`].
    pub fn navigation(&self) -> Option<&Location> {
        self.navigation.as_ref()
    }

    // ------------------------------------------------------------------
    // Tree construction
    // ------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        self.push_node(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            classes: Vec::new(),
        })
    }

    /// Create an element and append it as the last child of `parent`.
    pub fn append_element(&mut self, parent: ElementId, tag: &str) -> ElementId {
        let child = self.create_element(tag);
        self.append_child(parent, child);
        child
    }

    /// Append a text node to `parent`.
    pub fn append_text(&mut self, parent: ElementId, text: &str) -> ElementId {
        let child = self.push_node(NodeKind::Text(text.to_string()));
        self.append_child(parent, child);
        child
    }

    /// Move `child` (and its subtree) to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Put `replacement` where `old` was and detach `old`.
    pub fn replace(&mut self, old: ElementId, replacement: ElementId) {
        let Some(parent) = self.nodes[old.0].parent else {
            return;
        };
        self.detach(replacement);
        if let Some(position) = self.position_in_parent(old) {
            self.nodes[parent.0].children[position] = replacement;
            self.nodes[replacement.0].parent = Some(parent);
            self.nodes[old.0].parent = None;
            self.forget_subtree(old);
        }
    }

    /// Detach `id` from the tree and drop the listeners of its subtree.
    pub fn remove(&mut self, id: ElementId) {
        self.detach(id);
        self.forget_subtree(id);
    }

    fn push_node(&mut self, kind: NodeKind) -> ElementId {
        let id = ElementId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    fn position_in_parent(&self, id: ElementId) -> Option<usize> {
        let parent = self.nodes[id.0].parent?;
        self.nodes[parent.0].children.iter().position(|c| *c == id)
    }

    fn detach(&mut self, id: ElementId) {
        if let Some(position) = self.position_in_parent(id) {
            if let Some(parent) = self.nodes[id.0].parent.take() {
                self.nodes[parent.0].children.remove(position);
            }
        }
    }

    fn forget_subtree(&mut self, id: ElementId) {
        let subtree = self.descendants(id);
        self.listeners.retain(|(target, _), _| !subtree.contains(target));
        if self.active.is_some_and(|active| subtree.contains(&active)) {
            self.active = None;
        }
    }

    /// `id` followed by every node below it, in document order.
    fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = vec![id];
        let mut index = 0;
        while index < out.len() {
            let current = out[index];
            out.extend(self.nodes[current.0].children.iter().copied());
            index += 1;
        }
        out
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Tag name, or `None` for text nodes.
    pub fn tag(&self, id: ElementId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes[id.0].parent
    }

    /// All child nodes, text included.
    pub fn child_nodes(&self, id: ElementId) -> &[ElementId] {
        &self.nodes[id.0].children
    }

    /// Child elements only.
    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|child| self.tag(*child).is_some())
            .collect()
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: ElementId) -> String {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element { .. } => self.nodes[id.0]
                .children
                .iter()
                .map(|child| self.text_content(*child))
                .collect(),
        }
    }

    /// Replace every child of `id` with a single text node.
    pub fn set_text(&mut self, id: ElementId, text: &str) {
        for child in self.nodes[id.0].children.clone() {
            self.remove(child);
        }
        self.append_text(id, text);
    }

    /// First attached element whose `id` attribute equals `dom_id`.
    pub fn find_by_id(&self, dom_id: &str) -> Option<ElementId> {
        [self.head, self.body]
            .into_iter()
            .flat_map(|root| self.descendants(root))
            .find(|node| self.attr(*node, "id") == Some(dom_id))
    }

    /// First element at or below `root` carrying `class`.
    pub fn query_class(&self, root: ElementId, class: &str) -> Option<ElementId> {
        self.descendants(root)
            .into_iter()
            .find(|node| self.has_class(*node, class))
    }

    /// Every element at or below `root` carrying `class`, in document order.
    pub fn query_class_all(&self, root: ElementId, class: &str) -> Vec<ElementId> {
        self.descendants(root)
            .into_iter()
            .filter(|node| self.has_class(*node, class))
            .collect()
    }

    /// Every element at or below `root` with the given tag, in document order.
    pub fn query_tag_all(&self, root: ElementId, tag: &str) -> Vec<ElementId> {
        self.descendants(root)
            .into_iter()
            .filter(|node| self.tag(*node) == Some(tag))
            .collect()
    }

    // ------------------------------------------------------------------
    // Attributes and classes
    // ------------------------------------------------------------------

    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// Set an attribute. `class` is routed to the class list.
    pub fn set_attr(&mut self, id: ElementId, name: &str, value: &str) {
        if name == "class" {
            self.set_class_name(id, value);
            return;
        }
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind {
            match attrs.iter_mut().find(|(key, _)| key == name) {
                Some(entry) => entry.1 = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn remove_attr(&mut self, id: ElementId, name: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind {
            attrs.retain(|(key, _)| key != name);
        }
    }

    /// Space-separated class list
    pub fn class_name(&self, id: ElementId) -> String {
        match &self.nodes[id.0].kind {
            NodeKind::Element { classes, .. } => classes.join(" "),
            NodeKind::Text(_) => String::new(),
        }
    }

    /// Replace the whole class list.
    pub fn set_class_name(&mut self, id: ElementId, class_name: &str) {
        if let NodeKind::Element { classes, .. } = &mut self.nodes[id.0].kind {
            *classes = class_name.split_whitespace().map(str::to_string).collect();
        }
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        match &self.nodes[id.0].kind {
            NodeKind::Element { classes, .. } => classes.iter().any(|c| c == class),
            NodeKind::Text(_) => false,
        }
    }

    /// Add each whitespace-separated class not already present.
    pub fn add_class(&mut self, id: ElementId, class: &str) {
        if let NodeKind::Element { classes, .. } = &mut self.nodes[id.0].kind {
            for name in class.split_whitespace() {
                if !classes.iter().any(|c| c == name) {
                    classes.push(name.to_string());
                }
            }
        }
    }

    /// Remove each whitespace-separated class.
    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        if let NodeKind::Element { classes, .. } = &mut self.nodes[id.0].kind {
            for name in class.split_whitespace() {
                classes.retain(|c| c != name);
            }
        }
    }

    /// Add or remove `class` depending on `enabled`.
    pub fn toggle_class(&mut self, id: ElementId, class: &str, enabled: bool) {
        if enabled {
            self.add_class(id, class);
        } else {
            self.remove_class(id, class);
        }
    }

    // ------------------------------------------------------------------
    // Form controls
    // ------------------------------------------------------------------

    pub fn value(&self, id: ElementId) -> String {
        self.attr(id, "value").unwrap_or_default().to_string()
    }

    pub fn set_value(&mut self, id: ElementId, value: &str) {
        self.set_attr(id, "value", value);
    }

    pub fn is_checked(&self, id: ElementId) -> bool {
        self.attr(id, "checked").is_some()
    }

    pub fn set_checked(&mut self, id: ElementId, checked: bool) {
        if checked {
            self.set_attr(id, "checked", "");
        } else {
            self.remove_attr(id, "checked");
        }
    }

    /// Give `id` input focus.
    pub fn focus(&mut self, id: ElementId) {
        self.active = Some(id);
    }

    pub fn active_element(&self) -> Option<ElementId> {
        self.active
    }

    /// Record a navigation to the form's action carrying its named controls
    /// as query parameters. Does not fire `submit` listeners.
    pub fn submit_form(&mut self, form: ElementId) {
        let action = self
            .attr(form, "action")
            .map(Location::new)
            .unwrap_or_else(|| self.location.clone());

        let mut target = Location::new(action.without_query());
        for control in self.query_tag_all(form, "input") {
            if let Some(name) = self.attr(control, "name") {
                target = target.with_param(name, &self.value(control));
            }
        }

        debug!("Form submitted, navigating to {}", target);
        self.navigation = Some(target);
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Register a listener for `event` on `id`.
    pub fn add_listener<F>(&mut self, id: ElementId, event: &str, listener: F)
    where
        F: Fn(&mut Page, ElementId) + 'static,
    {
        self.listeners
            .entry((id, event.to_string()))
            .or_default()
            .push(Rc::new(listener));
    }

    /// Fire `event` at `id`, calling its listeners in registration order.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch(&mut self, id: ElementId, event: &str) -> usize {
        let listeners: Vec<Listener> = self
            .listeners
            .get(&(id, event.to_string()))
            .cloned()
            .unwrap_or_default();

        for listener in &listeners {
            listener(self, id);
        }
        listeners.len()
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Serialize the page as a standalone HTML document.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{}</title>\n", escape_text(&self.title)));
        for child in self.child_nodes(self.head) {
            self.write_node(*child, &mut out);
            out.push('\n');
        }
        out.push_str("</head>\n");
        self.write_node(self.body, &mut out);
        out.push_str("\n</html>\n");
        out
    }

    /// Serialize one subtree.
    pub fn outer_html(&self, id: ElementId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: ElementId, out: &mut String) {
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Element { tag, attrs, classes } => {
                out.push('<');
                out.push_str(tag);
                if let Some((_, dom_id)) = attrs.iter().find(|(key, _)| key == "id") {
                    out.push_str(&format!(" id=\"{}\"", escape_attr(dom_id)));
                }
                if !classes.is_empty() {
                    out.push_str(&format!(" class=\"{}\"", escape_attr(&classes.join(" "))));
                }
                for (key, value) in attrs.iter().filter(|(key, _)| key != "id") {
                    out.push_str(&format!(" {}=\"{}\"", key, escape_attr(value)));
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for child in &node.children {
                    self.write_node(*child, out);
                }
                out.push_str(&format!("</{}>", tag));
            }
        }
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("title", &self.title)
            .field("location", &self.location)
            .field("nodes", &self.nodes.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Shared, single-threaded access to a [`Page`].
///
/// Borrows are scoped to the closure passed to [`PageHandle::update`] or
/// [`PageHandle::read`]; callers must not nest them.
#[derive(Clone)]
pub struct PageHandle(Rc<RefCell<Page>>);

impl PageHandle {
    pub fn new(page: Page) -> Self {
        Self(Rc::new(RefCell::new(page)))
    }

    /// Run `f` with mutable access to the page.
    pub fn update<R>(&self, f: impl FnOnce(&mut Page) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }

    /// Run `f` with shared access to the page.
    pub fn read<R>(&self, f: impl FnOnce(&Page) -> R) -> R {
        f(&self.0.borrow())
    }
}

impl fmt::Debug for PageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PageHandle").field(&self.0.borrow()).finish()
    }
}
