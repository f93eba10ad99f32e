//! Config-node text parser.
//!
//! Parses the brace-delimited key/value format used by the game's settings
//! files into a tree of [`ConfigNode`]s:
//!
//! ```text
//! // Comments run to the end of the line
//! DustBody
//! {
//!     name = Kerbin
//!     Biomes
//!     {
//!         Grasslands = 0.65 0.48 0.34 0.05
//!     }
//! }
//! ```
//!
//! Node headers may be followed by `{` on the same line or the next one, and
//! a node holding a single value may sit on one line (`Biomes { Water = 1 1 1 }`).

use crate::error::{DustError, Result};

/// A named node holding ordered values and child nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigNode {
    /// Node name (empty for the document root).
    pub name: String,
    /// `key = value` pairs in file order.
    pub values: Vec<(String, String)>,
    /// Child nodes in file order.
    pub nodes: Vec<ConfigNode>,
}

impl ConfigNode {
    /// Create an empty node.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// First value stored under `key`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First child node named `name`.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&ConfigNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// All child nodes named `name`.
    pub fn nodes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ConfigNode> {
        self.nodes.iter().filter(move |n| n.name == name)
    }
}

/// Parse config-node text into a root node.
///
/// # Errors
///
/// Returns an error on stray or unbalanced braces, or when a node header is
/// not followed by `{`.
///
/// # Example
///
/// ```
/// use fx_dust::parse_config_str;
///
/// let root = parse_config_str("DustBody { name = Mun }").unwrap();
/// let body = root.node("DustBody").unwrap();
/// assert_eq!(body.value("name"), Some("Mun"));
/// ```
pub fn parse_config_str(text: &str) -> Result<ConfigNode> {
    let mut stack: Vec<(ConfigNode, usize)> = vec![(ConfigNode::new(""), 0)];
    let mut pending: Option<(String, usize)> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.split("//").next().unwrap_or_default();

        let mut rest = line;
        while !rest.is_empty() {
            let split = rest.find(['{', '}']).unwrap_or(rest.len());
            let (segment, tail) = rest.split_at(split);
            handle_segment(segment.trim(), line_no, &mut stack, &mut pending)?;

            let Some(brace) = tail.chars().next() else {
                break;
            };
            rest = &tail[1..];

            if brace == '{' {
                let (name, _) = pending
                    .take()
                    .ok_or_else(|| DustError::parse(line_no, "'{' without a node name"))?;
                stack.push((ConfigNode::new(name), line_no));
            } else {
                if let Some((name, _)) = pending.take() {
                    return Err(DustError::parse(
                        line_no,
                        format!("expected '{{' after node name '{name}'"),
                    ));
                }
                if stack.len() == 1 {
                    return Err(DustError::parse(line_no, "unmatched '}'"));
                }
                if let Some((node, _)) = stack.pop() {
                    if let Some((parent, _)) = stack.last_mut() {
                        parent.nodes.push(node);
                    }
                }
            }
        }
    }

    if let Some((name, line)) = pending {
        return Err(DustError::parse(
            line,
            format!("expected '{{' after node name '{name}'"),
        ));
    }
    if stack.len() > 1 {
        if let Some((node, line)) = stack.pop() {
            return Err(DustError::Unclosed {
                node: node.name,
                line,
            });
        }
    }

    Ok(stack.pop().map(|(root, _)| root).unwrap_or_default())
}

fn handle_segment(
    segment: &str,
    line_no: usize,
    stack: &mut [(ConfigNode, usize)],
    pending: &mut Option<(String, usize)>,
) -> Result<()> {
    if segment.is_empty() {
        return Ok(());
    }

    if let Some((key, value)) = segment.split_once('=') {
        if let Some((name, _)) = pending.take() {
            return Err(DustError::parse(
                line_no,
                format!("expected '{{' after node name '{name}'"),
            ));
        }
        if let Some((node, _)) = stack.last_mut() {
            node.values
                .push((key.trim().to_string(), value.trim().to_string()));
        }
        return Ok(());
    }

    if let Some((name, _)) = pending {
        return Err(DustError::parse(
            line_no,
            format!("expected '{{' after node name '{name}'"),
        ));
    }
    *pending = Some((segment.to_string(), line_no));
    Ok(())
}
