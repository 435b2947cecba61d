//! Label decoding.
//!
//! The parser flattens every node's discriminant and payload into a single
//! string (`"Variable: x"`, `"Constant: 42"`, `"Block"`). Labels are decoded
//! exactly once, here, into `NodeKind`.

use crate::node::{BinderRole, Literal, NodeKind};

/// Split a raw label into its discriminant and optional payload.
pub fn split_label(label: &str) -> (&str, Option<&str>) {
    match label.split_once(": ") {
        Some((tag, payload)) => (tag.trim(), Some(payload)),
        None => {
            // "Variable:" with nothing after the colon still names the tag.
            let tag = label.trim().trim_end_matches(':');
            (tag, None)
        }
    }
}

/// Decode a label. Binder roles are refined by the adapter once the parent
/// is known; here every binder starts as `Let`.
pub fn decode_label(label: &str) -> Result<NodeKind, String> {
    let (tag, payload) = split_label(label);
    if tag.is_empty() {
        return Err("empty discriminant".to_string());
    }

    let required = |what: &str| -> Result<String, String> {
        match payload {
            Some(p) if !p.trim().is_empty() => Ok(p.trim().to_string()),
            _ => Err(format!("'{tag}' requires a {what}")),
        }
    };

    let kind = match tag {
        "Fun" => NodeKind::Fun {
            name: required("function name")?,
        },
        "Funs" => NodeKind::Funs,
        "FunLit" | "NormalFunlit" => NodeKind::FunLit,
        "Params" => NodeKind::Params,
        "Block" => NodeKind::Block,
        "Val" => NodeKind::Val,
        "FunCall" | "FnAppl" => NodeKind::FunCall,
        "Iteration" => NodeKind::Iteration,
        "Generator" => NodeKind::Generator,
        "Formlet" => NodeKind::Formlet,
        "FormBinding" => NodeKind::FormBinding,
        "FormletPlacement" => NodeKind::FormletPlacement,
        "DBUpdate" => NodeKind::DbUpdate,
        "DBDelete" => NodeKind::DbDelete,
        "Projection" => NodeKind::Projection {
            field: required("field name")?,
        },
        "Constructor" | "ConstructorLit" => NodeKind::Constructor {
            tag: required("tag")?,
        },
        "Xml" => NodeKind::Xml {
            tag: required("tag name")?,
        },
        "XmlAttr" => NodeKind::XmlAttr {
            name: required("attribute name")?,
        },
        "Variable" => NodeKind::Variable {
            name: required("name")?,
        },
        "Binder" => NodeKind::Binder {
            name: required("name")?,
            role: BinderRole::Let,
        },
        "Constant" => NodeKind::Constant(decode_literal(payload.unwrap_or(""))),
        "TextNode" => NodeKind::Text {
            text: payload.unwrap_or("").to_string(),
        },
        _ => NodeKind::Other {
            tag: tag.to_string(),
            payload: payload.map(str::to_string),
        },
    };
    Ok(kind)
}

fn decode_literal(payload: &str) -> Literal {
    if payload.starts_with('"') {
        Literal::String(payload.to_string())
    } else if !payload.is_empty() && payload.parse::<f64>().is_ok() {
        Literal::Number(payload.to_string())
    } else {
        Literal::Other(payload.to_string())
    }
}
