//! everything that crosses the wire between the front end and the compiler backend
///________________________________________________________________________________________________________________________________
/// # Syntax node
/// the compiler's AST as a sum type with a forward compatible `Unknown` kind
/// ```
/// use RustedExprViz::api::syntax_node::SyntaxNode;
/// let json = r#"{"type":"BINARY_OP","op":"+","left":{"type":"NUMBER","value":2},"right":{"type":"VARIABLE","name":"x"}}"#;
/// let node: SyntaxNode = serde_json::from_str(json).unwrap();
/// assert_eq!(node.kind_tag(), "BINARY_OP");
/// ```
pub mod syntax_node;
/// serde types of the response bodies
pub mod wire;
/// `CompilerBackend` trait and the blocking HTTP implementation
pub mod client;
/// transport/domain error taxonomy
pub mod errors;
