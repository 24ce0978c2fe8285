//! # Hierarchical layout
//!
//! Tidy tree layout (Reingold-Tilford, in the linear time formulation of Buchheim, Jünger and Leipert)
//! of a `DisplayNode` tree inside a viewport.
//!
//! Guarantees:
//! - the root is on top and `y` grows with depth (`y = depth * level_height`)
//! - siblings are placed left to right in `children` order
//! - two sibling subtrees never overlap horizontally on any depth they share: the contours of
//!   neighbouring subtrees are kept at least one unit apart (two units between cousins) before scaling
//! - `nodes` is in pre-order, which doubles as the reveal order of the animated drawing, so the same tree
//!   is always revealed in the same sequence
//!
//! The algorithm works on an arena of `WalkNode`s addressed by index. Index 0 is a virtual parent of
//! the real root, the real nodes follow in pre-order, so arena index `i` is output node `i - 1`.
//!
//! The drawing area is the viewport minus `inset_x`/`inset_y`, shifted by `margin_left`/`margin_top`
//! (defaults: 40/20 offset and a 100 px inset).
use crate::Utils::config::LayoutSettings;
use crate::presentation::display_tree::{DisplayNode, NodeKind};
use log::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    /// pre-order index == position in `TreeLayout::nodes`
    pub index: usize,
    pub kind: NodeKind,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub depth: usize,
    pub parent: Option<usize>,
    pub radius: f64,
    /// when the node fades in during the animated reveal
    pub reveal_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeLink {
    pub parent: usize,
    pub child: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeLayout {
    pub nodes: Vec<LayoutNode>,
    pub links: Vec<TreeLink>,
    pub width: f64,
    pub height: f64,
    pub link_fade_ms: u64,
}

impl TreeLayout {
    pub fn children_of(&self, index: usize) -> impl Iterator<Item = &LayoutNode> {
        self.nodes.iter().filter(move |n| n.parent == Some(index))
    }

    /// indices of the subtree rooted at `index`. Pre-order makes a subtree a contiguous run.
    pub fn subtree(&self, index: usize) -> std::ops::Range<usize> {
        let depth = self.nodes[index].depth;
        let end = self.nodes[index + 1..]
            .iter()
            .position(|n| n.depth <= depth)
            .map(|offset| index + 1 + offset)
            .unwrap_or(self.nodes.len());
        index..end
    }

    /// straight segment parent -> child
    pub fn link_segment(&self, link: &TreeLink) -> ((f64, f64), (f64, f64)) {
        let p = &self.nodes[link.parent];
        let c = &self.nodes[link.child];
        ((p.x, p.y), (c.x, c.y))
    }

    /// vertical cubic Bezier (start, control 1, control 2, end) with both control points at mid height
    pub fn link_curve(&self, link: &TreeLink) -> [(f64, f64); 4] {
        let ((x0, y0), (x1, y1)) = self.link_segment(link);
        let mid = (y0 + y1) / 2.0;
        [(x0, y0), (x0, mid), (x1, mid), (x1, y1)]
    }
}

struct WalkNode {
    parent: Option<usize>,
    children: Vec<usize>,
    /// position among siblings
    number: usize,
    depth: usize,
    ancestor: usize,
    default_ancestor: Option<usize>,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
    x: f64,
}

impl WalkNode {
    fn new(own: usize, parent: Option<usize>, number: usize, depth: usize) -> Self {
        WalkNode {
            parent,
            children: Vec::new(),
            number,
            depth,
            ancestor: own,
            default_ancestor: None,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            x: 0.0,
        }
    }
}

struct TidyTree<'a> {
    arena: Vec<WalkNode>,
    display: Vec<&'a DisplayNode>,
}

impl<'a> TidyTree<'a> {
    fn new(root: &'a DisplayNode) -> Self {
        let mut tree = TidyTree {
            arena: vec![WalkNode::new(0, None, 0, 0)],
            display: Vec::with_capacity(root.size()),
        };
        tree.push(root, 0, 0, 0);
        tree
    }

    fn push(&mut self, node: &'a DisplayNode, parent: usize, number: usize, depth: usize) {
        let own = self.arena.len();
        self.arena.push(WalkNode::new(own, Some(parent), number, depth));
        self.display.push(node);
        self.arena[parent].children.push(own);
        for (i, child) in node.children.iter().enumerate() {
            self.push(child, own, i, depth + 1);
        }
    }

    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.arena[a].parent == self.arena[b].parent { 1.0 } else { 2.0 }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.arena[v].children.first().copied().or(self.arena[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.arena[v].children.last().copied().or(self.arena[v].thread)
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.arena[vim].ancestor;
        if self.arena[candidate].parent == self.arena[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let change = shift / (self.arena[wp].number - self.arena[wm].number) as f64;
        self.arena[wp].change -= change;
        self.arena[wp].shift += shift;
        self.arena[wm].change += change;
        self.arena[wp].prelim += shift;
        self.arena[wp].modifier += shift;
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        for i in (0..self.arena[v].children.len()).rev() {
            let w = self.arena[v].children[i];
            self.arena[w].prelim += shift;
            self.arena[w].modifier += shift;
            change += self.arena[w].change;
            shift += self.arena[w].shift + change;
        }
    }

    fn apportion(&mut self, v: usize, w: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = w else {
            return ancestor;
        };
        let Some(parent) = self.arena[v].parent else {
            return ancestor;
        };
        let mut vip = v;
        let mut vop = v;
        let mut vim = w;
        let mut vom = self.arena[parent].children[0];
        let mut sip = self.arena[vip].modifier;
        let mut sop = self.arena[vop].modifier;
        let mut sim = self.arena[vim].modifier;
        let mut som = self.arena[vom].modifier;

        let (last_vim, last_vip) = loop {
            let (Some(next_vim), Some(next_vip)) = (self.next_right(vim), self.next_left(vip)) else {
                break (self.next_right(vim), self.next_left(vip));
            };
            vim = next_vim;
            vip = next_vip;
            vom = self.next_left(vom).unwrap_or(vom);
            vop = self.next_right(vop).unwrap_or(vop);
            self.arena[vop].ancestor = v;
            let shift = self.arena[vim].prelim + sim - self.arena[vip].prelim - sip + self.separation(vim, vip);
            if shift > 0.0 {
                let moved = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(moved, v, shift);
                sip += shift;
                sop += shift;
            }
            sim += self.arena[vim].modifier;
            sip += self.arena[vip].modifier;
            som += self.arena[vom].modifier;
            sop += self.arena[vop].modifier;
        };

        if let Some(vim) = last_vim {
            if self.next_right(vop).is_none() {
                self.arena[vop].thread = Some(vim);
                self.arena[vop].modifier += sim - sop;
            }
        }
        if let Some(vip) = last_vip {
            if self.next_left(vom).is_none() {
                self.arena[vom].thread = Some(vip);
                self.arena[vom].modifier += sip - som;
                ancestor = v;
            }
        }
        ancestor
    }

    fn first_walk(&mut self, v: usize) {
        let Some(parent) = self.arena[v].parent else {
            return;
        };
        let number = self.arena[v].number;
        let w = if number > 0 {
            Some(self.arena[parent].children[number - 1])
        } else {
            None
        };
        if !self.arena[v].children.is_empty() {
            self.execute_shifts(v);
            let first = self.arena[v].children[0];
            let last = self.arena[v].children[self.arena[v].children.len() - 1];
            let midpoint = (self.arena[first].prelim + self.arena[last].prelim) / 2.0;
            if let Some(w) = w {
                self.arena[v].prelim = self.arena[w].prelim + self.separation(v, w);
                self.arena[v].modifier = self.arena[v].prelim - midpoint;
            } else {
                self.arena[v].prelim = midpoint;
            }
        } else if let Some(w) = w {
            self.arena[v].prelim = self.arena[w].prelim + self.separation(v, w);
        }
        let first_sibling = self.arena[parent].children[0];
        let ancestor = self.arena[parent].default_ancestor.unwrap_or(first_sibling);
        let ancestor = self.apportion(v, w, ancestor);
        self.arena[parent].default_ancestor = Some(ancestor);
    }

    fn post_order(&self, v: usize, out: &mut Vec<usize>) {
        for &child in &self.arena[v].children {
            self.post_order(child, out);
        }
        out.push(v);
    }

    /// relative x of every real node (arena index >= 1)
    fn run(&mut self) {
        let mut order = Vec::with_capacity(self.arena.len());
        self.post_order(1, &mut order);
        for v in order {
            self.first_walk(v);
        }
        self.arena[0].modifier = -self.arena[1].prelim;
        // arena is in pre-order, so parents are finished before their children
        for v in 1..self.arena.len() {
            let parent_modifier = self.arena[self.arena[v].parent.unwrap_or(0)].modifier;
            self.arena[v].x = self.arena[v].prelim + parent_modifier;
            self.arena[v].modifier += parent_modifier;
        }
    }
}

/// Lays `tree` out in a viewport of the given size with the default margins.
pub fn layout(tree: &DisplayNode, viewport_width: f64, viewport_height: f64) -> TreeLayout {
    let settings = LayoutSettings {
        viewport_width,
        viewport_height,
        ..LayoutSettings::default()
    };
    layout_with(tree, &settings)
}

pub fn layout_with(tree: &DisplayNode, settings: &LayoutSettings) -> TreeLayout {
    let mut tidy = TidyTree::new(tree);
    tidy.run();

    // extreme nodes, first one wins like in a pre-order scan
    let (mut left, mut right, mut bottom) = (1, 1, 1);
    for v in 1..tidy.arena.len() {
        if tidy.arena[v].x < tidy.arena[left].x {
            left = v;
        }
        if tidy.arena[v].x > tidy.arena[right].x {
            right = v;
        }
        if tidy.arena[v].depth > tidy.arena[bottom].depth {
            bottom = v;
        }
    }
    let s = if left == right { 1.0 } else { tidy.separation(left, right) / 2.0 };
    let tx = s - tidy.arena[left].x;
    let area_width = (settings.viewport_width - settings.inset_x).max(1.0);
    let area_height = (settings.viewport_height - settings.inset_y).max(1.0);
    let kx = area_width / (tidy.arena[right].x + s + tx);
    let ky = area_height / (tidy.arena[bottom].depth.max(1) as f64);

    let nodes: Vec<LayoutNode> = (1..tidy.arena.len())
        .map(|v| {
            let walk = &tidy.arena[v];
            let display = tidy.display[v - 1];
            let index = v - 1;
            LayoutNode {
                index,
                kind: display.kind.clone(),
                label: display.label.clone(),
                x: settings.margin_left + (walk.x + tx) * kx,
                y: settings.margin_top + walk.depth as f64 * ky,
                depth: walk.depth,
                parent: walk.parent.filter(|&p| p > 0).map(|p| p - 1),
                radius: display.kind.radius(),
                reveal_delay_ms: index as u64 * settings.reveal_step_ms,
            }
        })
        .collect();
    let links: Vec<TreeLink> = nodes
        .iter()
        .filter_map(|n| n.parent.map(|parent| TreeLink { parent, child: n.index }))
        .collect();
    debug!(
        "tree layout: {} nodes, {} links, depth {}",
        nodes.len(),
        links.len(),
        tidy.arena[bottom].depth
    );
    TreeLayout {
        nodes,
        links,
        width: settings.viewport_width,
        height: settings.viewport_height,
        link_fade_ms: settings.link_fade_ms,
    }
}
