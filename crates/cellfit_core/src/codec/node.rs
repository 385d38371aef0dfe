//! Element paths and typed value access over a parsed XML document

use std::fmt;
use std::path::Path;

use roxmltree::{Document, Node};

use crate::error::ParseError;

/// One step of a [`NodePath`]: a child element tag, optionally filtered by
/// the value of one of its attributes
#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    tag: String,
    filter: Option<(String, String)>,
}

/// Location of an element relative to the document root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePath {
    steps: Vec<Step>,
}

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, tag: &str) -> Self {
        let mut path = self.clone();
        path.steps.push(Step {
            tag: tag.to_string(),
            filter: None,
        });
        path
    }

    /// Child whose `attribute` equals `value`
    pub fn child_where(&self, tag: &str, attribute: &str, value: &str) -> Self {
        let mut path = self.clone();
        path.steps.push(Step {
            tag: tag.to_string(),
            filter: Some((attribute.to_string(), value.to_string())),
        });
        path
    }

    /// Child whose `name` attribute equals `name`
    pub fn named(&self, tag: &str, name: &str) -> Self {
        self.child_where(tag, "name", name)
    }

    /// Resolves the path below `root`, taking the first match at every step
    pub fn find<'a, 'input>(&self, root: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
        self.steps.iter().try_fold(root, |node, step| {
            node.children().find(|child| {
                child.is_element()
                    && child.tag_name().name() == step.tag
                    && step
                        .filter
                        .as_ref()
                        .is_none_or(|(attr, value)| child.attribute(attr.as_str()) == Some(value.as_str()))
            })
        })
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(&step.tag)?;
            if let Some((attr, value)) = &step.filter {
                write!(f, "[@{attr}='{value}']")?;
            }
        }
        Ok(())
    }
}

/// Parsed configuration document with typed lookups
pub struct ConfigDocument<'input> {
    doc: Document<'input>,
}

impl<'input> ConfigDocument<'input> {
    pub fn parse(text: &'input str, path: &Path) -> Result<Self, ParseError> {
        let doc = Document::parse(text).map_err(|source| ParseError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { doc })
    }

    pub fn input(&self) -> &'input str {
        self.doc.input_text()
    }

    pub fn find<'a>(&'a self, path: &NodePath) -> Option<Node<'a, 'input>> {
        path.find(self.doc.root_element())
    }

    pub fn node<'a>(&'a self, path: &NodePath) -> Result<Node<'a, 'input>, ParseError> {
        self.find(path)
            .ok_or_else(|| ParseError::MissingNode(path.to_string()))
    }

    /// Trimmed text content of an element; empty when it has none
    pub fn text<'a>(&'a self, path: &NodePath) -> Result<&'a str, ParseError> {
        Ok(self.node(path)?.text().map(str::trim).unwrap_or(""))
    }

    pub fn number(&self, path: &NodePath) -> Result<f64, ParseError> {
        let text = self.text(path)?;
        parse_number(text).ok_or_else(|| invalid(path, text))
    }

    pub fn optional_number(&self, path: &NodePath) -> Result<Option<f64>, ParseError> {
        match self.find(path) {
            Some(_) => self.number(path).map(Some),
            None => Ok(None),
        }
    }

    pub fn flag(&self, path: &NodePath) -> Result<bool, ParseError> {
        let text = self.text(path)?;
        parse_flag(text).ok_or_else(|| invalid(path, text))
    }

    pub fn attribute<'a>(&'a self, path: &NodePath, name: &str) -> Result<&'a str, ParseError> {
        self.node(path)?
            .attribute(name)
            .ok_or_else(|| ParseError::MissingAttribute {
                node: path.to_string(),
                attribute: name.to_string(),
            })
    }

    pub fn integer_attribute(&self, path: &NodePath, name: &str) -> Result<i32, ParseError> {
        let text = self.attribute(path, name)?.trim();
        text.parse()
            .map_err(|_| invalid(&path.child(&format!("@{name}")), text))
    }

    /// Values of `attribute` on every `tag` child of `path`, in file order
    pub fn child_attributes(
        &self,
        path: &NodePath,
        tag: &str,
        attribute: &str,
    ) -> Result<Vec<String>, ParseError> {
        Ok(self
            .node(path)?
            .children()
            .filter(|c| c.is_element() && c.tag_name().name() == tag)
            .filter_map(|c| c.attribute(attribute).map(str::to_string))
            .collect())
    }

    /// Numeric text of every `tag` child of `path`, in file order
    pub fn numbers(&self, path: &NodePath, tag: &str) -> Result<Vec<f64>, ParseError> {
        self.node(path)?
            .children()
            .filter(|c| c.is_element() && c.tag_name().name() == tag)
            .map(|c| {
                let text = c.text().map(str::trim).unwrap_or("");
                parse_number(text).ok_or_else(|| invalid(&path.child(tag), text))
            })
            .collect()
    }
}

fn invalid(path: &NodePath, text: &str) -> ParseError {
    ParseError::InvalidValue {
        node: path.to_string(),
        text: text.to_string(),
    }
}

pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

pub(crate) fn parse_flag(text: &str) -> Option<bool> {
    match text.trim() {
        t if t.eq_ignore_ascii_case("true") || t == "1" => Some(true),
        t if t.eq_ignore_ascii_case("false") || t == "0" => Some(false),
        _ => None,
    }
}
