//! Depth-first traversals parameterized by a successor closure.
//!
//! Graphs are given implicitly: a node type plus a function from a node to
//! its successors. All traversals visit each node at most once per walk and
//! tolerate cycles.

use std::hash::Hash;

use rustc_hash::FxHashSet;

/// Depth-first post-order from `roots`.
///
/// Every reachable node appears exactly once, after all of its successors —
/// a dependency-first ordering when successors are dependencies. Roots are
/// processed in the order given; the relative order of independent subtrees
/// follows the successor order.
pub fn post_order<N, S, I>(roots: impl IntoIterator<Item = N>, mut successors: S) -> Vec<N>
where
    N: Eq + Hash + Clone,
    S: FnMut(&N) -> I,
    I: IntoIterator<Item = N>,
{
    let mut order = Vec::new();
    let mut visited = FxHashSet::default();
    for root in roots {
        visit_post_order(root, &mut successors, &mut visited, &mut order);
    }
    order
}

fn visit_post_order<N, S, I>(
    node: N,
    successors: &mut S,
    visited: &mut FxHashSet<N>,
    order: &mut Vec<N>,
) where
    N: Eq + Hash + Clone,
    S: FnMut(&N) -> I,
    I: IntoIterator<Item = N>,
{
    if !visited.insert(node.clone()) {
        return;
    }
    for next in successors(&node) {
        visit_post_order(next, successors, visited, order);
    }
    order.push(node);
}

/// Elementary cycles reachable from `starts`.
///
/// Each cycle is reported once, as the node sequence from its smallest point
/// of entry back to itself (the entry node is not repeated at the end).
/// Two reported cycles never share the same node set.
pub fn find_cycles<N, S, I>(starts: impl IntoIterator<Item = N>, mut successors: S) -> Vec<Vec<N>>
where
    N: Eq + Hash + Clone,
    S: FnMut(&N) -> I,
    I: IntoIterator<Item = N>,
{
    let mut cycles: Vec<Vec<N>> = Vec::new();
    let mut done = FxHashSet::default();
    for start in starts {
        let mut path = Vec::new();
        let mut on_path = FxHashSet::default();
        walk_cycles(
            start,
            &mut successors,
            &mut path,
            &mut on_path,
            &mut done,
            &mut cycles,
        );
    }
    cycles
}

fn walk_cycles<N, S, I>(
    node: N,
    successors: &mut S,
    path: &mut Vec<N>,
    on_path: &mut FxHashSet<N>,
    done: &mut FxHashSet<N>,
    cycles: &mut Vec<Vec<N>>,
) where
    N: Eq + Hash + Clone,
    S: FnMut(&N) -> I,
    I: IntoIterator<Item = N>,
{
    if on_path.contains(&node) {
        // Back edge: the cycle is the path suffix starting at `node`.
        let from = path.iter().position(|n| *n == node).unwrap_or(0);
        let cycle: Vec<N> = path[from..].to_vec();
        let is_new = !cycles.iter().any(|known| {
            known.len() == cycle.len() && cycle.iter().all(|n| known.contains(n))
        });
        if is_new {
            cycles.push(cycle);
        }
        return;
    }
    if done.contains(&node) {
        return;
    }
    path.push(node.clone());
    on_path.insert(node.clone());
    for next in successors(&node) {
        walk_cycles(next, successors, path, on_path, done, cycles);
    }
    path.pop();
    on_path.remove(&node);
    done.insert(node);
}

/// All simple paths from `from` to `to` (inclusive of both endpoints).
///
/// A path never repeats a node, so the enumeration terminates on cyclic
/// graphs. Returns one single-node path when `from == to`.
pub fn all_paths<N, S, I>(from: N, to: N, mut successors: S) -> Vec<Vec<N>>
where
    N: Eq + Hash + Clone,
    S: FnMut(&N) -> I,
    I: IntoIterator<Item = N>,
{
    let mut paths = Vec::new();
    let mut current = Vec::new();
    walk_paths(from, &to, &mut successors, &mut current, &mut paths);
    paths
}

fn walk_paths<N, S, I>(
    node: N,
    to: &N,
    successors: &mut S,
    current: &mut Vec<N>,
    paths: &mut Vec<Vec<N>>,
) where
    N: Eq + Hash + Clone,
    S: FnMut(&N) -> I,
    I: IntoIterator<Item = N>,
{
    if current.contains(&node) {
        return;
    }
    current.push(node.clone());
    if node == *to {
        paths.push(current.clone());
    } else {
        for next in successors(&node) {
            walk_paths(next, to, successors, current, paths);
        }
    }
    current.pop();
}
