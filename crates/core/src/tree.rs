//! Assemble flat parent-linked rows into a recursive tree.
//!
//! Folder rows arrive as a flat list with `parent_id` references. Orphans
//! (parent missing from the list) become roots, and any parent cycle is cut
//! at its earliest member so every row appears exactly once.

use std::collections::HashMap;
use std::hash::Hash;

/// A row that knows its own key and its parent's key.
pub trait TreeItem {
    type Key: Eq + Hash + Clone;

    fn key(&self) -> Self::Key;
    fn parent_key(&self) -> Option<Self::Key>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<T> {
    pub item: T,
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    /// Number of nodes in this subtree, including itself.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }

    /// Depth-first search for the first node matching `pred`.
    pub fn find(&self, pred: &impl Fn(&T) -> bool) -> Option<&TreeNode<T>> {
        if pred(&self.item) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(pred))
    }
}

/// Build a forest, preserving input order among siblings.
pub fn build_forest<T: TreeItem>(items: Vec<T>) -> Vec<TreeNode<T>> {
    let index: HashMap<T::Key, usize> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (item.key(), i))
        .collect();

    let mut parent: Vec<Option<usize>> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.parent_key()
                .and_then(|k| index.get(&k).copied())
                .filter(|&p| p != i)
        })
        .collect();

    break_cycles(&mut parent);

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
    let mut roots = Vec::new();
    for (i, p) in parent.iter().enumerate() {
        match p {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    roots
        .into_iter()
        .filter_map(|r| assemble(r, &children, &mut slots))
        .collect()
}

fn assemble<T>(
    i: usize,
    children: &[Vec<usize>],
    slots: &mut [Option<T>],
) -> Option<TreeNode<T>> {
    let item = slots[i].take()?;
    let kids = children[i]
        .iter()
        .filter_map(|&c| assemble(c, children, slots))
        .collect();
    Some(TreeNode {
        item,
        children: kids,
    })
}

fn break_cycles(parent: &mut [Option<usize>]) {
    const UNSEEN: u8 = 0;
    const ON_PATH: u8 = 1;
    const DONE: u8 = 2;

    let mut state = vec![UNSEEN; parent.len()];
    for start in 0..parent.len() {
        let mut path = Vec::new();
        let mut cur = start;
        loop {
            if state[cur] != UNSEEN {
                break;
            }
            state[cur] = ON_PATH;
            path.push(cur);
            match parent[cur] {
                Some(p) => cur = p,
                None => break,
            }
        }
        if state[cur] == ON_PATH && parent[cur].is_some() {
            if let Some(pos) = path.iter().position(|&n| n == cur) {
                if let Some(&cut) = path[pos..].iter().min() {
                    parent[cut] = None;
                }
            }
        }
        for n in path {
            state[n] = DONE;
        }
    }
}
