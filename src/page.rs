//! A minimal model of the host page the picker is embedded in: an ordered
//! list of named elements that the controller writes into.
use crate::config::Config;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Page {
    nodes: Vec<Node>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    pub id: String,
    pub parent: Option<String>,
    pub element: Element,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Element {
    /// Slot that a calendar is mounted in
    Calendar,
    /// Hidden form input
    Input { value: String },
    Container { hidden: bool },
    Text { content: String },
    Button {
        label: String,
        button_type: ButtonType,
        disabled: bool,
    },
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Calendar => ElementKind::Calendar,
            Element::Input { .. } => ElementKind::Input,
            Element::Container { .. } => ElementKind::Container,
            Element::Text { .. } => ElementKind::Text,
            Element::Button { .. } => ElementKind::Button,
        }
    }

    fn type_attr(&self) -> Option<&'static str> {
        match self {
            Element::Input { .. } => Some("hidden"),
            Element::Button { button_type, .. } => Some(button_type.as_str()),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ElementKind {
    Calendar,
    Input,
    Container,
    Text,
    Button,
}

impl ElementKind {
    fn tag(self) -> &'static str {
        match self {
            ElementKind::Calendar => "calendar",
            ElementKind::Input => "input",
            ElementKind::Container => "div",
            ElementKind::Text => "span",
            ElementKind::Button => "button",
        }
    }

    fn from_tag(tag: &str) -> Option<ElementKind> {
        [
            ElementKind::Calendar,
            ElementKind::Input,
            ElementKind::Container,
            ElementKind::Text,
            ElementKind::Button,
        ]
        .into_iter()
        .find(|k| k.tag() == tag)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ButtonType {
    Submit,
    Button,
}

impl ButtonType {
    fn as_str(self) -> &'static str {
        match self {
            ButtonType::Submit => "submit",
            ButtonType::Button => "button",
        }
    }
}

/// Which optional parts [`Page::standard()`] should include
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageParts {
    pub inputs: bool,
    pub status: bool,
    pub submit: bool,
}

impl Default for PageParts {
    fn default() -> PageParts {
        PageParts {
            inputs: true,
            status: true,
            submit: true,
        }
    }
}

impl Page {
    pub fn new() -> Page {
        Page::default()
    }

    /// The stock page layout: the calendar slot, then the status line, the
    /// hidden inputs, and the submit button, each named as in `config`
    pub fn standard(config: &Config, parts: PageParts) -> Page {
        let mut page = Page::new().with(&config.calendar_id, Element::Calendar);
        if parts.status {
            page = page
                .with(
                    &config.info_container_id,
                    Element::Container { hidden: true },
                )
                .with_child(
                    &config.info_container_id,
                    &config.info_text_id,
                    Element::Text {
                        content: String::new(),
                    },
                );
        }
        if parts.inputs {
            for id in [&config.start_input_id, &config.end_input_id] {
                page = page.with(
                    id,
                    Element::Input {
                        value: String::new(),
                    },
                );
            }
        }
        if parts.submit {
            page = page.with(
                "submit",
                Element::Button {
                    label: String::from("Submit"),
                    button_type: ButtonType::Submit,
                    disabled: false,
                },
            );
        }
        page
    }

    #[must_use]
    pub fn with(mut self, id: &str, element: Element) -> Page {
        self.nodes.push(Node {
            id: id.to_owned(),
            parent: None,
            element,
        });
        self
    }

    #[must_use]
    pub fn with_child(mut self, parent: &str, id: &str, element: Element) -> Page {
        self.nodes.push(Node {
            id: id.to_owned(),
            parent: Some(parent.to_owned()),
            element,
        });
        self
    }

    /// Insert `node` directly after the element with the given ID, or at the
    /// end if there is no such element
    pub fn insert_after(&mut self, sibling: &str, node: Node) {
        match self.nodes.iter().position(|n| n.id == sibling) {
            Some(i) => self.nodes.insert(i + 1, node),
            None => self.nodes.push(node),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn by_id(&self, id: &str) -> Option<&Element> {
        self.nodes.iter().find(|n| n.id == id).map(|n| &n.element)
    }

    fn by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .map(|n| &mut n.element)
    }

    /// Returns the first node in document order matching `selector`
    pub fn select(&self, selector: &Selector) -> Option<&Node> {
        self.nodes.iter().find(|n| selector.matches(n))
    }

    /// Set the value of an input.  Returns `false` if there is no input with
    /// the given ID.
    pub fn set_value(&mut self, id: &str, new: &str) -> bool {
        if let Some(Element::Input { value }) = self.by_id_mut(id) {
            new.clone_into(value);
            true
        } else {
            false
        }
    }

    pub fn set_text(&mut self, id: &str, new: &str) -> bool {
        if let Some(Element::Text { content }) = self.by_id_mut(id) {
            new.clone_into(content);
            true
        } else {
            false
        }
    }

    pub fn set_hidden(&mut self, id: &str, flag: bool) -> bool {
        if let Some(Element::Container { hidden }) = self.by_id_mut(id) {
            *hidden = flag;
            true
        } else {
            false
        }
    }

    pub fn set_disabled(&mut self, id: &str, flag: bool) -> bool {
        if let Some(Element::Button { disabled, .. }) = self.by_id_mut(id) {
            *disabled = flag;
            true
        } else {
            false
        }
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        match self.by_id(id)? {
            Element::Input { value } => Some(value),
            _ => None,
        }
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        match self.by_id(id)? {
            Element::Text { content } => Some(content),
            _ => None,
        }
    }

    /// Returns `None` if there is no button with the given ID
    pub fn is_disabled(&self, id: &str) -> Option<bool> {
        match self.by_id(id)? {
            Element::Button { disabled, .. } => Some(*disabled),
            _ => None,
        }
    }

    /// An element is visible unless it or one of its ancestors is a hidden
    /// container.  Elements that don't exist aren't visible.
    pub fn is_visible(&self, id: &str) -> bool {
        let mut current = self.nodes.iter().find(|n| n.id == id);
        if current.is_none() {
            return false;
        }
        // Bound the walk in case of a parent cycle
        for _ in 0..=self.nodes.len() {
            let Some(node) = current else {
                return true;
            };
            if node.element == (Element::Container { hidden: true }) {
                return false;
            }
            current = node
                .parent
                .as_deref()
                .and_then(|p| self.nodes.iter().find(|n| n.id == p));
        }
        true
    }

    /// The `(id, value)` pairs of all inputs, in document order, as they
    /// would be submitted
    pub fn form_data(&self) -> Vec<(&str, &str)> {
        self.nodes
            .iter()
            .filter_map(|n| match &n.element {
                Element::Input { value } => Some((n.id.as_str(), value.as_str())),
                _ => None,
            })
            .collect()
    }
}

/// A tiny subset of CSS selectors: `#id`, `kind`, and `kind[type="value"]`,
/// where `kind` is one of `calendar`, `input`, `div`, `span`, or `button`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Selector {
    Id(String),
    Kind {
        kind: ElementKind,
        type_attr: Option<String>,
    },
}

impl Selector {
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            Selector::Id(id) => node.id == *id,
            Selector::Kind { kind, type_attr } => {
                node.element.kind() == *kind
                    && type_attr
                        .as_deref()
                        .map_or(true, |t| node.element.type_attr() == Some(t))
            }
        }
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Selector, SelectorError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SelectorError::Empty);
        }
        if let Some(id) = s.strip_prefix('#') {
            if id.is_empty() || id.contains(|c: char| c.is_whitespace() || "#[]".contains(c)) {
                return Err(SelectorError::Malformed(s.to_owned()));
            }
            return Ok(Selector::Id(id.to_owned()));
        }
        let (tag, attr) = match s.split_once('[') {
            Some((tag, rest)) => {
                let inner = rest
                    .strip_suffix(']')
                    .ok_or_else(|| SelectorError::Malformed(s.to_owned()))?;
                let attr = parse_type_attr(inner)
                    .ok_or_else(|| SelectorError::Malformed(s.to_owned()))?;
                (tag, Some(attr))
            }
            None => (s, None),
        };
        let kind =
            ElementKind::from_tag(tag).ok_or_else(|| SelectorError::UnknownKind(tag.to_owned()))?;
        Ok(Selector::Kind {
            kind,
            type_attr: attr,
        })
    }
}

// Parses `type="value"`, `type='value'`, or `type=value`
fn parse_type_attr(s: &str) -> Option<String> {
    let value = s.strip_prefix("type=")?;
    let value = ['"', '\'']
        .into_iter()
        .find_map(|q| value.strip_prefix(q)?.strip_suffix(q))
        .unwrap_or(value);
    (!value.is_empty() && !value.contains(['"', '\'', '[', ']'])).then(|| value.to_owned())
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SelectorError {
    #[error("selector is empty")]
    Empty,
    #[error("unknown element kind {0:?} in selector")]
    UnknownKind(String),
    #[error("malformed selector {0:?}")]
    Malformed(String),
}
