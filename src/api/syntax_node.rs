//! # Expression syntax node
//!
//! The compiler serializes its AST as nested JSON objects tagged by a `"type"` field:
//!
//! ```text
//! {"type":"BINARY_OP","op":"+","left":{"type":"NUMBER","value":2},"right":{"type":"VARIABLE","name":"x"}}
//! ```
//!
//! `SyntaxNode` is the closed set of kinds the compiler emits today plus an `Unknown` variant which keeps
//! the raw kind string, so a newer compiler that adds node kinds does not break the front end.
//! Deserialization is lenient: absent or `null` sub-nodes become `None`, absent names/operators stay
//! `None` (the normalizer picks the defaults), absent numbers become 0.
//!
//! The tree is owned by whoever received the response; nothing in this crate mutates it.
use serde::de::{Deserialize, Deserializer};
use serde_json::Value;
use strum_macros::{AsRefStr, EnumIter};

/// kinds of nodes the compiler knows about. `as_ref()` gives the wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
pub enum SyntaxKind {
    #[strum(serialize = "NUMBER")]
    Number,
    #[strum(serialize = "VARIABLE")]
    Variable,
    #[strum(serialize = "BINARY_OP")]
    BinaryOp,
    #[strum(serialize = "UNARY_OP")]
    UnaryOp,
    #[strum(serialize = "FUNCTION_CALL")]
    FunctionCall,
    #[strum(serialize = "DIFF_NODE")]
    Diff,
    #[strum(serialize = "INTEGRATE_NODE")]
    Integrate,
}

impl SyntaxKind {
    pub fn from_tag(tag: &str) -> Option<SyntaxKind> {
        match tag {
            "NUMBER" => Some(SyntaxKind::Number),
            "VARIABLE" => Some(SyntaxKind::Variable),
            "BINARY_OP" => Some(SyntaxKind::BinaryOp),
            "UNARY_OP" => Some(SyntaxKind::UnaryOp),
            "FUNCTION_CALL" => Some(SyntaxKind::FunctionCall),
            "DIFF_NODE" => Some(SyntaxKind::Diff),
            "INTEGRATE_NODE" => Some(SyntaxKind::Integrate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxNode {
    /// numeric literal
    Number { value: f64 },
    /// named variable; the compiler always sends a name, older payloads did not
    Variable { name: Option<String> },
    /// `left op right`
    BinaryOp {
        op: Option<String>,
        left: Option<Box<SyntaxNode>>,
        right: Option<Box<SyntaxNode>>,
    },
    /// `op operand`, e.g. unary minus
    UnaryOp {
        op: Option<String>,
        operand: Option<Box<SyntaxNode>>,
    },
    /// `name(arg0, arg1, ...)`; a `null` argument stays in place as `None`
    FunctionCall {
        name: Option<String>,
        arguments: Vec<Option<SyntaxNode>>,
    },
    /// `diff(expression, variable, point)`
    Diff {
        expression: Option<Box<SyntaxNode>>,
        variable: Option<String>,
        point: f64,
    },
    /// `integrate(expression, variable, lower_bound, upper_bound)`
    Integrate {
        expression: Option<Box<SyntaxNode>>,
        variable: Option<String>,
        lower_bound: f64,
        upper_bound: f64,
    },
    /// any `"type"` this crate does not know; `kind` is the raw tag ("?" if the tag itself is missing)
    Unknown { kind: String },
}

impl SyntaxNode {
    /// builds a node out of an already parsed JSON value. Returns `None` for `null` and for
    /// anything that is not a JSON object.
    pub fn from_value(value: &Value) -> Option<SyntaxNode> {
        let object = value.as_object()?;
        let tag = object.get("type").and_then(Value::as_str).unwrap_or("?");
        let child = |key: &str| object.get(key).and_then(SyntaxNode::from_value).map(Box::new);
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);
        let number = |key: &str| object.get(key).and_then(Value::as_f64);

        let node = match SyntaxKind::from_tag(tag) {
            Some(SyntaxKind::Number) => SyntaxNode::Number {
                value: number("value").or_else(|| number("numValue")).unwrap_or(0.0),
            },
            Some(SyntaxKind::Variable) => SyntaxNode::Variable { name: text("name") },
            Some(SyntaxKind::BinaryOp) => SyntaxNode::BinaryOp {
                op: text("op"),
                left: child("left"),
                right: child("right"),
            },
            Some(SyntaxKind::UnaryOp) => SyntaxNode::UnaryOp {
                op: text("op"),
                operand: child("operand"),
            },
            Some(SyntaxKind::FunctionCall) => SyntaxNode::FunctionCall {
                name: text("name"),
                arguments: object
                    .get("arguments")
                    .and_then(Value::as_array)
                    .map(|args| args.iter().map(SyntaxNode::from_value).collect())
                    .unwrap_or_default(),
            },
            Some(SyntaxKind::Diff) => SyntaxNode::Diff {
                expression: child("expression"),
                variable: text("variable"),
                point: number("point").unwrap_or(0.0),
            },
            Some(SyntaxKind::Integrate) => SyntaxNode::Integrate {
                expression: child("expression"),
                variable: text("variable"),
                lower_bound: number("lowerBound").unwrap_or(0.0),
                upper_bound: number("upperBound").unwrap_or(0.0),
            },
            None => SyntaxNode::Unknown {
                kind: tag.to_string(),
            },
        };
        Some(node)
    }

    /// wire tag of the node
    pub fn kind_tag(&self) -> &str {
        match self {
            SyntaxNode::Number { .. } => SyntaxKind::Number.as_ref(),
            SyntaxNode::Variable { .. } => SyntaxKind::Variable.as_ref(),
            SyntaxNode::BinaryOp { .. } => SyntaxKind::BinaryOp.as_ref(),
            SyntaxNode::UnaryOp { .. } => SyntaxKind::UnaryOp.as_ref(),
            SyntaxNode::FunctionCall { .. } => SyntaxKind::FunctionCall.as_ref(),
            SyntaxNode::Diff { .. } => SyntaxKind::Diff.as_ref(),
            SyntaxNode::Integrate { .. } => SyntaxKind::Integrate.as_ref(),
            SyntaxNode::Unknown { kind } => kind,
        }
    }
}

impl<'de> Deserialize<'de> for SyntaxNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        SyntaxNode::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("syntax node must be a JSON object"))
    }
}
