//! everything between a backend response and what ends up on screen
///________________________________________________________________________________________________________________________________
/// # Display tree
/// compiler AST -> uniform {kind, label, children} tree, with the pseudo-leaves of diff/integrate
/// ```
/// use RustedExprViz::api::syntax_node::SyntaxNode;
/// use RustedExprViz::presentation::display_tree::normalize;
/// let ast: SyntaxNode = serde_json::from_str(
///     r#"{"type":"DIFF_NODE","variable":"x","point":1,"expression":{"type":"VARIABLE","name":"x"}}"#,
/// ).unwrap();
/// let tree = normalize(Some(&ast)).unwrap();
/// assert_eq!(tree.label, "d/dx");
/// assert_eq!(tree.children.len(), 3);
/// assert_eq!(tree.children[2].label, "1");
/// ```
pub mod display_tree;
///________________________________________________________________________________________________________________________________
/// # Tree layout
/// tidy tree drawing (Reingold-Tilford with Walker's linear time improvements) of a display tree
pub mod tree_layout;
/// calculus steps -> plot series
pub mod sampler;
/// surfaces owning at most one live chart each, and the `ChartBackend` seam for drawing adapters
pub mod chart_surfaces;
/// panel visibility and view models of a compile result
pub mod view_orchestrator;
/// object file analysis: cache, actions, tabs
pub mod analysis_tabs;
/// probability and combinatorics result view
pub mod pnc_view;
