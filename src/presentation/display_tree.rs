//! # Display tree
//!
//! `normalize` turns a compiler `SyntaxNode` into a `DisplayNode`: a kind, a short label and an ordered
//! list of children, which is all the layout engine and the drawing code need to know about an AST.
//!
//! Rules:
//! - absent input gives `None`, and absent sub-nodes are dropped from `children` (never kept as holes)
//! - numbers and variables are leaves labelled by their value/name
//! - operators are labelled by their symbol, function calls by their name
//! - `diff(...)` / `integrate(...)` get extra leaves for the variable and the point/bounds, which do not
//!   exist in the compiler tree and are synthesized here so the tree shows every argument
//! - unknown kinds become leaves labelled with the raw kind string
use crate::api::syntax_node::{SyntaxKind, SyntaxNode};

pub const DIFF_MARKER: &str = "d/dx";
pub const INTEGRATE_MARKER: &str = "∫";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Known(SyntaxKind),
    Other(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Known(kind) => kind.as_ref(),
            NodeKind::Other(tag) => tag,
        }
    }

    /// fill colour used when the node is drawn
    pub fn color(&self) -> &'static str {
        match self {
            NodeKind::Known(SyntaxKind::Number) => "#3b82f6",
            NodeKind::Known(SyntaxKind::Variable) => "#f59e0b",
            NodeKind::Known(SyntaxKind::BinaryOp) => "#10b981",
            NodeKind::Known(SyntaxKind::UnaryOp) => "#f97316",
            NodeKind::Known(SyntaxKind::FunctionCall) => "#8b5cf6",
            NodeKind::Known(SyntaxKind::Diff) => "#ef4444",
            NodeKind::Known(SyntaxKind::Integrate) => "#06b6d4",
            NodeKind::Other(_) => "#3b82f6",
        }
    }

    /// circle radius: value leaves are the smallest, binary operators the largest
    pub fn radius(&self) -> f64 {
        match self {
            NodeKind::Known(SyntaxKind::Number) | NodeKind::Known(SyntaxKind::Variable) => 25.0,
            NodeKind::Known(SyntaxKind::BinaryOp) => 30.0,
            _ => 28.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayNode {
    pub kind: NodeKind,
    pub label: String,
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    pub fn leaf(kind: NodeKind, label: String) -> Self {
        DisplayNode {
            kind,
            label,
            children: Vec::new(),
        }
    }

    fn branch(kind: SyntaxKind, label: String, children: Vec<DisplayNode>) -> Self {
        DisplayNode {
            kind: NodeKind::Known(kind),
            label,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// number of nodes in the subtree, self included
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(DisplayNode::size).sum::<usize>()
    }

    /// depth of the deepest node, root is 0
    pub fn height(&self) -> usize {
        self.children.iter().map(|c| c.height() + 1).max().unwrap_or(0)
    }
}

/// f64 to the label form the compiler front end always used: integral values without a fraction
pub fn number_label(value: f64) -> String {
    format!("{}", value)
}

fn variable_leaf(name: Option<&str>) -> DisplayNode {
    DisplayNode::leaf(
        NodeKind::Known(SyntaxKind::Variable),
        name.unwrap_or("x").to_string(),
    )
}

fn number_leaf(value: f64) -> DisplayNode {
    DisplayNode::leaf(NodeKind::Known(SyntaxKind::Number), number_label(value))
}

fn normalize_boxed(node: &Option<Box<SyntaxNode>>) -> Option<DisplayNode> {
    normalize(node.as_deref())
}

pub fn normalize(node: Option<&SyntaxNode>) -> Option<DisplayNode> {
    let node = node?;
    let display = match node {
        SyntaxNode::Number { value } => number_leaf(*value),
        SyntaxNode::Variable { name } => variable_leaf(name.as_deref()),
        SyntaxNode::BinaryOp { op, left, right } => DisplayNode::branch(
            SyntaxKind::BinaryOp,
            op.clone().unwrap_or_else(|| "+".to_string()),
            [normalize_boxed(left), normalize_boxed(right)]
                .into_iter()
                .flatten()
                .collect(),
        ),
        SyntaxNode::UnaryOp { op, operand } => DisplayNode::branch(
            SyntaxKind::UnaryOp,
            op.clone().unwrap_or_else(|| "-".to_string()),
            normalize_boxed(operand).into_iter().collect(),
        ),
        SyntaxNode::FunctionCall { name, arguments } => DisplayNode::branch(
            SyntaxKind::FunctionCall,
            name.clone().unwrap_or_else(|| "f".to_string()),
            arguments
                .iter()
                .filter_map(|arg| normalize(arg.as_ref()))
                .collect(),
        ),
        SyntaxNode::Diff {
            expression,
            variable,
            point,
        } => {
            let mut children: Vec<DisplayNode> = normalize_boxed(expression).into_iter().collect();
            children.push(variable_leaf(variable.as_deref()));
            children.push(number_leaf(*point));
            DisplayNode::branch(SyntaxKind::Diff, DIFF_MARKER.to_string(), children)
        }
        SyntaxNode::Integrate {
            expression,
            variable,
            lower_bound,
            upper_bound,
        } => {
            let mut children: Vec<DisplayNode> = normalize_boxed(expression).into_iter().collect();
            children.push(variable_leaf(variable.as_deref()));
            children.push(number_leaf(*lower_bound));
            children.push(number_leaf(*upper_bound));
            DisplayNode::branch(SyntaxKind::Integrate, INTEGRATE_MARKER.to_string(), children)
        }
        SyntaxNode::Unknown { kind } => DisplayNode::leaf(NodeKind::Other(kind.clone()), kind.clone()),
    };
    Some(display)
}

//////////////////////////////////////////////////////////////////////////////////////
// TESTS
//////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests_display_tree {
    use super::*;
    use strum::IntoEnumIterator;

    fn num(value: f64) -> Box<SyntaxNode> {
        Box::new(SyntaxNode::Number { value })
    }

    fn var(name: &str) -> Box<SyntaxNode> {
        Box::new(SyntaxNode::Variable {
            name: Some(name.to_string()),
        })
    }

    fn labels(node: &DisplayNode) -> Vec<&str> {
        node.children.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_absent_is_none() {
        assert_eq!(normalize(None), None);
    }

    #[test]
    fn test_leaves() {
        let five = normalize(Some(&SyntaxNode::Number { value: 5.0 })).unwrap();
        assert_eq!(five.label, "5");
        assert!(five.is_leaf());
        let half = normalize(Some(&SyntaxNode::Number { value: 2.5 })).unwrap();
        assert_eq!(half.label, "2.5");
        let anonymous = normalize(Some(&SyntaxNode::Variable { name: None })).unwrap();
        assert_eq!(anonymous.label, "x");
        assert_eq!(anonymous.kind, NodeKind::Known(SyntaxKind::Variable));
    }

    #[test]
    fn test_binary_op_keeps_operand_order() {
        let node = SyntaxNode::BinaryOp {
            op: Some("-".to_string()),
            left: Some(var("y")),
            right: Some(num(3.0)),
        };
        let display = normalize(Some(&node)).unwrap();
        assert_eq!(display.label, "-");
        assert_eq!(display.children.len(), 2);
        assert_eq!(labels(&display), vec!["y", "3"]);
    }

    #[test]
    fn test_binary_op_drops_missing_side() {
        let node = SyntaxNode::BinaryOp {
            op: None,
            left: None,
            right: Some(num(1.0)),
        };
        let display = normalize(Some(&node)).unwrap();
        assert_eq!(display.label, "+");
        assert_eq!(labels(&display), vec!["1"]);
    }

    #[test]
    fn test_unary_op() {
        let node = SyntaxNode::UnaryOp {
            op: None,
            operand: Some(var("x")),
        };
        let display = normalize(Some(&node)).unwrap();
        assert_eq!(display.label, "-");
        assert_eq!(display.children.len(), 1);
    }

    #[test]
    fn test_function_call_arguments() {
        let node = SyntaxNode::FunctionCall {
            name: Some("max".to_string()),
            arguments: vec![
                Some(*num(1.0)),
                None,
                Some(*var("z")),
                Some(*num(4.0)),
            ],
        };
        let display = normalize(Some(&node)).unwrap();
        assert_eq!(display.label, "max");
        assert_eq!(display.children.len(), 3);
        assert_eq!(labels(&display), vec!["1", "z", "4"]);

        let no_args = SyntaxNode::FunctionCall {
            name: None,
            arguments: vec![],
        };
        let display = normalize(Some(&no_args)).unwrap();
        assert_eq!(display.label, "f");
        assert!(display.is_leaf());
    }

    #[test]
    fn test_diff_synthesizes_variable_and_point() {
        let node = SyntaxNode::Diff {
            expression: Some(Box::new(SyntaxNode::BinaryOp {
                op: Some("^".to_string()),
                left: Some(var("x")),
                right: Some(num(2.0)),
            })),
            variable: Some("x".to_string()),
            point: 1.5,
        };
        let display = normalize(Some(&node)).unwrap();
        assert_eq!(display.label, DIFF_MARKER);
        assert_eq!(display.children.len(), 3);
        assert_eq!(labels(&display), vec!["^", "x", "1.5"]);
        assert_eq!(display.children[1].kind, NodeKind::Known(SyntaxKind::Variable));
        assert_eq!(display.children[2].kind, NodeKind::Known(SyntaxKind::Number));
        assert!(display.children[2].is_leaf());
    }

    #[test]
    fn test_integrate_children_order() {
        let node = SyntaxNode::Integrate {
            expression: Some(var("t")),
            variable: Some("t".to_string()),
            lower_bound: 0.0,
            upper_bound: 2.0,
        };
        let display = normalize(Some(&node)).unwrap();
        assert_eq!(display.label, INTEGRATE_MARKER);
        assert_eq!(labels(&display), vec!["t", "t", "0", "2"]);
    }

    #[test]
    fn test_unknown_kind_is_leaf() {
        let node = SyntaxNode::Unknown {
            kind: "NCR_NODE".to_string(),
        };
        let display = normalize(Some(&node)).unwrap();
        assert_eq!(display.label, "NCR_NODE");
        assert_eq!(display.kind.as_str(), "NCR_NODE");
        assert!(display.is_leaf());
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let node = SyntaxNode::FunctionCall {
            name: Some("sin".to_string()),
            arguments: vec![Some(SyntaxNode::BinaryOp {
                op: Some("*".to_string()),
                left: Some(num(2.0)),
                right: Some(var("x")),
            })],
        };
        let first = normalize(Some(&node)).unwrap();
        let second = normalize(Some(&node)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.size(), 4);
        assert_eq!(first.height(), 2);
    }

    #[test]
    fn test_every_known_kind_has_style() {
        for kind in SyntaxKind::iter() {
            let kind = NodeKind::Known(kind);
            assert!(kind.color().starts_with('#'));
            assert!(kind.radius() >= 25.0);
        }
        assert_eq!(NodeKind::Known(SyntaxKind::BinaryOp).radius(), 30.0);
        assert_eq!(NodeKind::Known(SyntaxKind::Number).radius(), 25.0);
        assert_eq!(NodeKind::Other("X".to_string()).radius(), 28.0);
    }
}
