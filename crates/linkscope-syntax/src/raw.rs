//! Structured parser output.
//!
//! The external parser emits one JSON value per node:
//!
//! ```json
//! ["Interior", "Fun: f", "1:1-3:2", [ ...children ]]
//! ["Leaf", "Variable: x", "2:5-2:6"]
//! ```
//!
//! i.e. an ordered quadruple of node kind, label, encoded span and child
//! list. The child list may be omitted or `null` for leaves.

use linkscope_common::limits::MAX_TREE_DEPTH;
use linkscope_common::{NativePosition, NativeSpan};
use serde_json::Value;

use crate::adapter::TreeError;
use crate::node::NodeShape;

/// One node of the structured parser output, before arena construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawNode {
    pub shape: NodeShape,
    pub label: String,
    pub span: NativeSpan,
    pub children: Vec<RawNode>,
}

impl RawNode {
    pub fn leaf(label: impl Into<String>, span: NativeSpan) -> Self {
        RawNode {
            shape: NodeShape::Leaf,
            label: label.into(),
            span,
            children: Vec::new(),
        }
    }

    pub fn interior(label: impl Into<String>, span: NativeSpan, children: Vec<RawNode>) -> Self {
        RawNode {
            shape: NodeShape::Interior,
            label: label.into(),
            span,
            children,
        }
    }

    /// Decode the parser's JSON text.
    pub fn from_json(text: &str) -> Result<Self, TreeError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| TreeError::InvalidJson(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Decode an already parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Self, TreeError> {
        decode_node(value, &mut Vec::new())
    }

    /// Encode in the parser's shape. Leaves carry no child list.
    pub fn to_value(&self) -> Value {
        let shape = match self.shape {
            NodeShape::Interior => "Interior",
            NodeShape::Leaf => "Leaf",
        };
        let mut fields = vec![
            Value::from(shape),
            Value::from(self.label.as_str()),
            Value::from(encode_span(&self.span)),
        ];
        if self.shape == NodeShape::Interior {
            fields.push(Value::Array(self.children.iter().map(RawNode::to_value).collect()));
        }
        Value::Array(fields)
    }

    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

pub(crate) fn path_string(path: &[usize]) -> String {
    let mut out = String::from("$");
    for idx in path {
        out.push('/');
        out.push_str(&idx.to_string());
    }
    out
}

fn malformed(path: &[usize], reason: &str) -> TreeError {
    TreeError::MalformedNode {
        path: path_string(path),
        reason: reason.to_string(),
    }
}

fn decode_node(value: &Value, path: &mut Vec<usize>) -> Result<RawNode, TreeError> {
    if path.len() > MAX_TREE_DEPTH {
        return Err(TreeError::TooDeep { depth: path.len() });
    }

    let Some(items) = value.as_array() else {
        return Err(malformed(path, "expected an array [kind, label, span, children]"));
    };
    if items.len() < 3 || items.len() > 4 {
        return Err(malformed(path, "expected 3 or 4 elements"));
    }

    let shape = match items[0].as_str() {
        Some("Interior") => NodeShape::Interior,
        Some("Leaf") => NodeShape::Leaf,
        _ => return Err(malformed(path, "node kind must be \"Interior\" or \"Leaf\"")),
    };
    let Some(label) = items[1].as_str() else {
        return Err(malformed(path, "label must be a string"));
    };
    let Some(encoded_span) = items[2].as_str() else {
        return Err(malformed(path, "span must be a string"));
    };
    let span = decode_span(encoded_span).ok_or_else(|| TreeError::InvalidSpan {
        path: path_string(path),
        span: encoded_span.to_string(),
    })?;

    let children = match items.get(3) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(raw_children)) => {
            let mut children = Vec::with_capacity(raw_children.len());
            for (i, child) in raw_children.iter().enumerate() {
                path.push(i);
                let decoded = decode_node(child, path);
                path.pop();
                children.push(decoded?);
            }
            children
        }
        Some(_) => return Err(malformed(path, "children must be an array")),
    };

    Ok(RawNode {
        shape,
        label: label.to_string(),
        span,
        children,
    })
}

/// Decode `"<line>:<col>-<line>:<col>"`.
pub fn decode_span(encoded: &str) -> Option<NativeSpan> {
    let (start, end) = encoded.trim().split_once('-')?;
    let start = decode_position(start)?;
    let end = decode_position(end)?;
    (start <= end).then_some(NativeSpan::new(start, end))
}

fn decode_position(encoded: &str) -> Option<NativePosition> {
    let (line, column) = encoded.trim().split_once(':')?;
    Some(NativePosition::new(
        line.trim().parse().ok()?,
        column.trim().parse().ok()?,
    ))
}

/// Encode a span in the parser's format (used by fixtures and the CLI).
pub fn encode_span(span: &NativeSpan) -> String {
    format!(
        "{}:{}-{}:{}",
        span.start.line, span.start.column, span.end.line, span.end.column
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_span() {
        let span = decode_span("2:5-2:6").unwrap();
        assert_eq!(span.start, NativePosition::new(2, 5));
        assert_eq!(span.end, NativePosition::new(2, 6));
        assert!(decode_span("2:5").is_none());
        assert!(decode_span("3:1-2:1").is_none(), "end before start");
        assert!(decode_span("a:1-2:1").is_none());
    }

    #[test]
    fn test_decode_nested() {
        let value = json!(["Interior", "Val", "1:1-1:11", [
            ["Leaf", "Binder: x", "1:5-1:6"],
            ["Leaf", "Constant: 1", "1:9-1:10", null]
        ]]);
        let raw = RawNode::from_value(&value).unwrap();
        assert_eq!(raw.children.len(), 2);
        assert_eq!(raw.children[0].label, "Binder: x");
        assert_eq!(raw.children[1].shape, NodeShape::Leaf);
    }

    #[test]
    fn test_error_path_points_at_bad_child() {
        let value = json!(["Interior", "Block", "1:1-2:1", [
            ["Leaf", "Variable: x", "1:1-1:2"],
            ["Leaf", "Variable: y", "bogus"]
        ]]);
        match RawNode::from_value(&value) {
            Err(TreeError::InvalidSpan { path, span }) => {
                assert_eq!(path, "$/1");
                assert_eq!(span, "bogus");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_encoded_tree_decodes_to_itself() {
        let raw = RawNode::interior(
            "Val",
            decode_span("1:1-1:11").unwrap(),
            vec![RawNode::leaf("Binder: x", decode_span("1:5-1:6").unwrap())],
        );
        let json = raw.to_json();
        assert_eq!(json, r#"["Interior","Val","1:1-1:11",[["Leaf","Binder: x","1:5-1:6"]]]"#);
        assert_eq!(RawNode::from_json(&json).unwrap(), raw);
    }

    #[test]
    fn test_span_roundtrip_encoding() {
        let span = decode_span("10:2-11:7").unwrap();
        assert_eq!(encode_span(&span), "10:2-11:7");
    }
}
