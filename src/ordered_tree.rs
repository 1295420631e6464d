//! A self-balancing ordered sequence: a red-black tree whose in-order
//! traversal is also maintained as an explicit doubly-linked list.
//!
//! This is the "single invariant-checked data structure" both the beachline
//! and the circle-event queue are built on (see the crate's design notes).
//! Neither caller inserts by key through the tree itself — the beachline
//! descends comparing dynamic breakpoints and the event queue descends
//! comparing `(y, x)`, and both then call [`Tree::insert_before`] or
//! [`Tree::insert_after`] relative to a node they already found. The tree's
//! own job is purely structural: keep that sequence balanced, and keep
//! `prev`/`next` correct in O(1) after every insert or remove. Rotations
//! rebalance the tree but never change the in-order sequence, so they never
//! need to touch `prev`/`next` at all.

use crate::arena::{Arena, Index};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

pub struct Node<T> {
    color: Color,
    parent: Option<Index<Node<T>>>,
    left: Option<Index<Node<T>>>,
    right: Option<Index<Node<T>>>,
    prev: Option<Index<Node<T>>>,
    next: Option<Index<Node<T>>>,
    value: T,
}

pub type NodeId<T> = Index<Node<T>>;

pub struct Tree<T> {
    nodes: Arena<Node<T>>,
    root: Option<NodeId<T>>,
    head: Option<NodeId<T>>,
    tail: Option<NodeId<T>>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Tree {
            nodes: Arena::new(),
            root: None,
            head: None,
            tail: None,
        }
    }

    pub fn has_root(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<NodeId<T>> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Inserts the first node of an empty tree. Panics if the tree already
    /// has a root; callers are expected to check [`Tree::has_root`] first,
    /// exactly as the beachline does before splitting an arc.
    pub fn create_root(&mut self, value: T) -> NodeId<T> {
        assert!(self.root.is_none(), "tree already has a root");
        let node = self.nodes.insert(Node {
            color: Color::Black,
            parent: None,
            left: None,
            right: None,
            prev: None,
            next: None,
            value,
        });
        self.root = Some(node);
        self.head = Some(node);
        self.tail = Some(node);
        node
    }

    pub fn get_leftmost_node(&self) -> Option<NodeId<T>> {
        self.head
    }

    pub fn get_rightmost_node(&self) -> Option<NodeId<T>> {
        self.tail
    }

    pub fn get_prev(&self, node: NodeId<T>) -> Option<NodeId<T>> {
        self.n(node).prev
    }

    pub fn get_next(&self, node: NodeId<T>) -> Option<NodeId<T>> {
        self.n(node).next
    }

    pub fn get_left(&self, node: NodeId<T>) -> Option<NodeId<T>> {
        self.n(node).left
    }

    pub fn get_right(&self, node: NodeId<T>) -> Option<NodeId<T>> {
        self.n(node).right
    }

    pub fn get_contents(&self, node: NodeId<T>) -> &T {
        &self.n(node).value
    }

    pub fn get_mut_contents(&mut self, node: NodeId<T>) -> &mut T {
        &mut self.nodes.get_mut(node).expect("dangling node id").value
    }

    pub fn set_contents(&mut self, node: NodeId<T>, value: T) {
        self.nodes.get_mut(node).expect("dangling node id").value = value;
    }

    /// Inserts `value` as the in-order successor of `at`.
    pub fn insert_after(&mut self, at: NodeId<T>, value: T) -> NodeId<T> {
        let new_node = self.new_red_node(value);
        if self.right(Some(at)).is_none() {
            self.attach(at, new_node, Side::Right);
        } else {
            let successor = self.minimum(self.right(Some(at)).unwrap());
            self.attach(successor, new_node, Side::Left);
        }
        self.splice_after(at, new_node);
        self.insert_fixup(new_node);
        new_node
    }

    /// Inserts `value` as the in-order predecessor of `at`.
    pub fn insert_before(&mut self, at: NodeId<T>, value: T) -> NodeId<T> {
        let new_node = self.new_red_node(value);
        if self.left(Some(at)).is_none() {
            self.attach(at, new_node, Side::Left);
        } else {
            let predecessor = self.maximum(self.left(Some(at)).unwrap());
            self.attach(predecessor, new_node, Side::Right);
        }
        self.splice_before(at, new_node);
        self.insert_fixup(new_node);
        new_node
    }

    /// Removes `node` from the tree, reattaching its in-order neighbours.
    pub fn delete_node(&mut self, node: NodeId<T>) {
        self.unsplice(node);

        let mut y = node;
        let mut y_original_color = self.color_of(y);
        let x;
        let x_parent;

        if self.left(Some(node)).is_none() {
            x = self.right(Some(node));
            x_parent = self.parent(node);
            self.transplant(node, self.right(Some(node)));
        } else if self.right(Some(node)).is_none() {
            x = self.left(Some(node));
            x_parent = self.parent(node);
            self.transplant(node, self.left(Some(node)));
        } else {
            y = self.minimum(self.right(Some(node)).unwrap());
            y_original_color = self.color_of(y);
            x = self.right(Some(y));
            if self.parent(y) == Some(node) {
                x_parent = Some(y);
                if let Some(x) = x {
                    self.set_parent(x, Some(y));
                }
            } else {
                x_parent = self.parent(y);
                self.transplant(y, self.right(Some(y)));
                self.set_right(y, self.right(Some(node)));
                self.set_parent(self.right(Some(y)).unwrap(), Some(y));
            }
            self.transplant(node, Some(y));
            self.set_left(y, self.left(Some(node)));
            self.set_parent(self.left(Some(y)).unwrap(), Some(y));
            self.set_color(y, self.color_of(node));
        }

        self.nodes.remove(node);

        if y_original_color == Color::Black {
            self.delete_fixup(x, x_parent);
        }
    }

    // --- in-order list bookkeeping -----------------------------------------

    fn splice_after(&mut self, at: NodeId<T>, new_node: NodeId<T>) {
        let next = self.n(at).next;
        self.nodes.get_mut(at).unwrap().next = Some(new_node);
        {
            let n = self.nodes.get_mut(new_node).unwrap();
            n.prev = Some(at);
            n.next = next;
        }
        match next {
            Some(next) => self.nodes.get_mut(next).unwrap().prev = Some(new_node),
            None => self.tail = Some(new_node),
        }
    }

    fn splice_before(&mut self, at: NodeId<T>, new_node: NodeId<T>) {
        let prev = self.n(at).prev;
        self.nodes.get_mut(at).unwrap().prev = Some(new_node);
        {
            let n = self.nodes.get_mut(new_node).unwrap();
            n.next = Some(at);
            n.prev = prev;
        }
        match prev {
            Some(prev) => self.nodes.get_mut(prev).unwrap().next = Some(new_node),
            None => self.head = Some(new_node),
        }
    }

    fn unsplice(&mut self, node: NodeId<T>) {
        let prev = self.n(node).prev;
        let next = self.n(node).next;
        match prev {
            Some(prev) => self.nodes.get_mut(prev).unwrap().next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes.get_mut(next).unwrap().prev = prev,
            None => self.tail = prev,
        }
    }

    // --- structural helpers -------------------------------------------------

    fn n(&self, node: NodeId<T>) -> &Node<T> {
        self.nodes.get(node).expect("dangling node id")
    }

    fn new_red_node(&mut self, value: T) -> NodeId<T> {
        self.nodes.insert(Node {
            color: Color::Red,
            parent: None,
            left: None,
            right: None,
            prev: None,
            next: None,
            value,
        })
    }

    fn attach(&mut self, parent: NodeId<T>, child: NodeId<T>, side: Side) {
        match side {
            Side::Left => self.set_left(parent, Some(child)),
            Side::Right => self.set_right(parent, Some(child)),
        }
        self.set_parent(child, Some(parent));
    }

    fn minimum(&self, mut node: NodeId<T>) -> NodeId<T> {
        while let Some(left) = self.left(Some(node)) {
            node = left;
        }
        node
    }

    fn maximum(&self, mut node: NodeId<T>) -> NodeId<T> {
        while let Some(right) = self.right(Some(node)) {
            node = right;
        }
        node
    }

    fn left(&self, node: Option<NodeId<T>>) -> Option<NodeId<T>> {
        node.and_then(|n| self.n(n).left)
    }

    fn right(&self, node: Option<NodeId<T>>) -> Option<NodeId<T>> {
        node.and_then(|n| self.n(n).right)
    }

    fn parent(&self, node: NodeId<T>) -> Option<NodeId<T>> {
        self.n(node).parent
    }

    fn set_left(&mut self, node: NodeId<T>, child: Option<NodeId<T>>) {
        self.nodes.get_mut(node).unwrap().left = child;
    }

    fn set_right(&mut self, node: NodeId<T>, child: Option<NodeId<T>>) {
        self.nodes.get_mut(node).unwrap().right = child;
    }

    fn set_parent(&mut self, node: NodeId<T>, parent: Option<NodeId<T>>) {
        self.nodes.get_mut(node).unwrap().parent = parent;
    }

    fn color_of(&self, node: NodeId<T>) -> Color {
        self.n(node).color
    }

    fn set_color(&mut self, node: NodeId<T>, color: Color) {
        self.nodes.get_mut(node).unwrap().color = color;
    }

    /// Treats a missing (nil) child as black, per the usual red-black
    /// convention, so callers don't special-case `None` at every site.
    fn color(&self, node: Option<NodeId<T>>) -> Color {
        node.map(|n| self.color_of(n)).unwrap_or(Color::Black)
    }

    fn transplant(&mut self, u: NodeId<T>, v: Option<NodeId<T>>) {
        match self.parent(u) {
            None => self.root = v,
            Some(p) => {
                if self.left(Some(p)) == Some(u) {
                    self.set_left(p, v);
                } else {
                    self.set_right(p, v);
                }
            }
        }
        if let Some(v) = v {
            self.set_parent(v, self.parent(u));
        }
    }

    fn left_rotate(&mut self, x: NodeId<T>) {
        let y = self.right(Some(x)).expect("left_rotate requires a right child");
        self.set_right(x, self.left(Some(y)));
        if let Some(yl) = self.left(Some(y)) {
            self.set_parent(yl, Some(x));
        }
        self.set_parent(y, self.parent(x));
        match self.parent(x) {
            None => self.root = Some(y),
            Some(p) => {
                if self.left(Some(p)) == Some(x) {
                    self.set_left(p, Some(y));
                } else {
                    self.set_right(p, Some(y));
                }
            }
        }
        self.set_left(y, Some(x));
        self.set_parent(x, Some(y));
    }

    fn right_rotate(&mut self, x: NodeId<T>) {
        let y = self.left(Some(x)).expect("right_rotate requires a left child");
        self.set_left(x, self.right(Some(y)));
        if let Some(yr) = self.right(Some(y)) {
            self.set_parent(yr, Some(x));
        }
        self.set_parent(y, self.parent(x));
        match self.parent(x) {
            None => self.root = Some(y),
            Some(p) => {
                if self.left(Some(p)) == Some(x) {
                    self.set_left(p, Some(y));
                } else {
                    self.set_right(p, Some(y));
                }
            }
        }
        self.set_right(y, Some(x));
        self.set_parent(x, Some(y));
    }

    fn insert_fixup(&mut self, mut z: NodeId<T>) {
        while let Some(zp) = self.parent(z) {
            if self.color_of(zp) == Color::Black {
                break;
            }
            // A red node always has a parent with a parent: the root is
            // always forced black below, so a red parent can't be the root.
            let zpp = self.parent(zp).expect("red node must have a grandparent");
            if Some(zp) == self.left(Some(zpp)) {
                let uncle = self.right(Some(zpp));
                if self.color(uncle) == Color::Red {
                    self.set_color(zp, Color::Black);
                    self.set_color(uncle.unwrap(), Color::Black);
                    self.set_color(zpp, Color::Red);
                    z = zpp;
                } else {
                    if Some(z) == self.right(Some(zp)) {
                        z = zp;
                        self.left_rotate(z);
                    }
                    let zp = self.parent(z).unwrap();
                    let zpp = self.parent(zp).unwrap();
                    self.set_color(zp, Color::Black);
                    self.set_color(zpp, Color::Red);
                    self.right_rotate(zpp);
                }
            } else {
                let uncle = self.left(Some(zpp));
                if self.color(uncle) == Color::Red {
                    self.set_color(zp, Color::Black);
                    self.set_color(uncle.unwrap(), Color::Black);
                    self.set_color(zpp, Color::Red);
                    z = zpp;
                } else {
                    if Some(z) == self.left(Some(zp)) {
                        z = zp;
                        self.right_rotate(z);
                    }
                    let zp = self.parent(z).unwrap();
                    let zpp = self.parent(zp).unwrap();
                    self.set_color(zp, Color::Black);
                    self.set_color(zpp, Color::Red);
                    self.left_rotate(zpp);
                }
            }
        }
        self.set_color(self.root.unwrap(), Color::Black);
    }

    fn delete_fixup(&mut self, mut x: Option<NodeId<T>>, mut x_parent: Option<NodeId<T>>) {
        while x != self.root && self.color(x) == Color::Black {
            let xp = match x_parent {
                Some(p) => p,
                None => break,
            };
            if x == self.left(Some(xp)) {
                let mut w = self.right(Some(xp)).expect("sibling must exist");
                if self.color_of(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(xp, Color::Red);
                    self.left_rotate(xp);
                    w = self.right(Some(xp)).unwrap();
                }
                if self.color(self.left(Some(w))) == Color::Black
                    && self.color(self.right(Some(w))) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = Some(xp);
                    x_parent = self.parent(xp);
                } else {
                    if self.color(self.right(Some(w))) == Color::Black {
                        if let Some(wl) = self.left(Some(w)) {
                            self.set_color(wl, Color::Black);
                        }
                        self.set_color(w, Color::Red);
                        self.right_rotate(w);
                        w = self.right(Some(xp)).unwrap();
                    }
                    self.set_color(w, self.color_of(xp));
                    self.set_color(xp, Color::Black);
                    if let Some(wr) = self.right(Some(w)) {
                        self.set_color(wr, Color::Black);
                    }
                    self.left_rotate(xp);
                    x = self.root;
                    x_parent = None;
                }
            } else {
                let mut w = self.left(Some(xp)).expect("sibling must exist");
                if self.color_of(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(xp, Color::Red);
                    self.right_rotate(xp);
                    w = self.left(Some(xp)).unwrap();
                }
                if self.color(self.right(Some(w))) == Color::Black
                    && self.color(self.left(Some(w))) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = Some(xp);
                    x_parent = self.parent(xp);
                } else {
                    if self.color(self.left(Some(w))) == Color::Black {
                        if let Some(wr) = self.right(Some(w)) {
                            self.set_color(wr, Color::Black);
                        }
                        self.set_color(w, Color::Red);
                        self.left_rotate(w);
                        w = self.left(Some(xp)).unwrap();
                    }
                    self.set_color(w, self.color_of(xp));
                    self.set_color(xp, Color::Black);
                    if let Some(wl) = self.left(Some(w)) {
                        self.set_color(wl, Color::Black);
                    }
                    self.right_rotate(xp);
                    x = self.root;
                    x_parent = None;
                }
            }
        }
        if let Some(x) = x {
            self.set_color(x, Color::Black);
        }
    }
}

enum Side {
    Left,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_order(tree: &Tree<i32>) -> Vec<i32> {
        let mut out = Vec::new();
        let mut cur = tree.get_leftmost_node();
        while let Some(node) = cur {
            out.push(*tree.get_contents(node));
            cur = tree.get_next(node);
        }
        out
    }

    fn black_height(tree: &Tree<i32>, node: Option<NodeId<i32>>) -> Result<u32, &'static str> {
        match node {
            None => Ok(1),
            Some(n) => {
                if tree.color_of(n) == Color::Red {
                    let pl = tree.left(Some(n));
                    let pr = tree.right(Some(n));
                    if tree.color(pl) == Color::Red || tree.color(pr) == Color::Red {
                        return Err("red node with red child");
                    }
                }
                let left = black_height(tree, tree.left(Some(n)))?;
                let right = black_height(tree, tree.right(Some(n)))?;
                if left != right {
                    return Err("unequal black heights");
                }
                Ok(left + if tree.color_of(n) == Color::Black { 1 } else { 0 })
            }
        }
    }

    fn assert_valid(tree: &Tree<i32>) {
        if let Some(root) = tree.root() {
            assert_eq!(tree.color_of(root), Color::Black, "root must be black");
        }
        black_height(tree, tree.root()).expect("red-black invariant violated");
    }

    #[test]
    fn insert_after_keeps_in_order_sequence() {
        let mut tree = Tree::new();
        let a = tree.create_root(0);
        let b = tree.insert_after(a, 1);
        let _c = tree.insert_after(b, 2);
        let _z = tree.insert_before(a, -1);
        assert_eq!(in_order(&tree), vec![-1, 0, 1, 2]);
        assert_valid(&tree);
    }

    #[test]
    fn many_inserts_stay_balanced_and_ordered() {
        let mut tree = Tree::new();
        let mut cursor = tree.create_root(500);
        for v in (0..500).rev() {
            cursor = tree.insert_before(cursor, v);
        }
        cursor = tree.get_rightmost_node().unwrap();
        for v in 501..1000 {
            cursor = tree.insert_after(cursor, v);
        }
        let expected: Vec<i32> = (0..1000).collect();
        assert_eq!(in_order(&tree), expected);
        assert_valid(&tree);
    }

    #[test]
    fn delete_preserves_sequence_and_balance() {
        let mut tree = Tree::new();
        let mut nodes = vec![tree.create_root(0)];
        for v in 1..200 {
            let last = *nodes.last().unwrap();
            nodes.push(tree.insert_after(last, v));
        }
        // Remove every third node.
        for i in (0..nodes.len()).step_by(3) {
            tree.delete_node(nodes[i]);
        }
        assert_valid(&tree);
        let remaining = in_order(&tree);
        let expected: Vec<i32> = (0..200).filter(|v| v % 3 != 0).collect();
        assert_eq!(remaining, expected);
    }

    #[test]
    fn delete_down_to_empty() {
        let mut tree = Tree::new();
        let mut nodes = vec![tree.create_root(0)];
        for v in 1..50 {
            let last = *nodes.last().unwrap();
            nodes.push(tree.insert_after(last, v));
        }
        for node in nodes {
            tree.delete_node(node);
        }
        assert!(tree.is_empty());
        assert!(tree.get_leftmost_node().is_none());
        assert!(tree.get_rightmost_node().is_none());
    }
}
