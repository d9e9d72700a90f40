// SPDX-License-Identifier: MIT

//! Circular dependency groups among vendor modules.
//!
//! Walks dependent edges depth-first; whenever an edge points back into the
//! current path, the path suffix from that node is a circle. Overlapping
//! circles are then merged until the groups are disjoint, so two cycles
//! sharing a module schedule as one group while disconnected cycles stay
//! separate.

use crate::scheduler::graph::VendorGraph;

pub(crate) type Circle = Vec<usize>;

pub(crate) fn find_circles(graph: &VendorGraph) -> Vec<Circle> {
    let mut seen = vec![false; graph.nodes.len()];
    let mut circles = Vec::new();
    for node in 0..graph.nodes.len() {
        let mut path = vec![node];
        traverse(graph, node, &mut path, &mut seen, &mut circles);
    }
    collapse(circles)
}

fn traverse(
    graph: &VendorGraph,
    node: usize,
    path: &mut Vec<usize>,
    seen: &mut [bool],
    circles: &mut Vec<Circle>,
) {
    if seen[node] {
        return;
    }
    for &dependent in &graph.nodes[node].dependents {
        if let Some(pos) = path.iter().position(|&p| p == dependent) {
            circles.push(path[pos..].to_vec());
        } else {
            path.push(dependent);
            traverse(graph, dependent, path, seen, circles);
            path.pop();
        }
    }
    seen[node] = true;
}

fn collapse(circles: Vec<Circle>) -> Vec<Circle> {
    let mut collapsed: Vec<Circle> = Vec::new();
    for circle in circles {
        let mut merged = circle;
        let mut rest = Vec::new();
        for existing in collapsed {
            if existing.iter().any(|node| merged.contains(node)) {
                for node in existing {
                    if !merged.contains(&node) {
                        merged.push(node);
                    }
                }
            } else {
                rest.push(existing);
            }
        }
        rest.insert(0, merged);
        collapsed = rest;
    }
    collapsed
}
