//! Graph-coloring vertical extension.
//!
//! Uncovered tuples become nodes of a non-conflict graph: two tuples with the
//! same new-column value are adjacent when one row could hold both. A node's
//! degree also counts the partition rows it fits into. Tuples are then
//! processed in smallest-last order and covered with the same reuse/append
//! step as the plain vertical extension.

use std::collections::BTreeSet;

use crate::coverage::{CoverageMap, Cursor, UncoveredTuple};
use crate::table::{Layout, Table};
use crate::vertical::{cover_tuple, Partitions, Placement};

/// Non-conflict graph over the uncovered tuples of one column.
#[derive(Debug, Clone)]
pub struct ConflictGraph {
    /// Nodes grouped by new-column value, ascending; cursor order inside a group.
    tuples: Vec<UncoveredTuple>,
    adjacency: Vec<Vec<usize>>,
    degrees: Vec<usize>,
}

impl ConflictGraph {
    /// Collect the uncovered tuples of `map` and connect every compatible pair.
    pub fn build(layout: &Layout, table: &Table, map: &CoverageMap<'_>, partitions: &Partitions) -> Self {
        let mut groups: Vec<Vec<UncoveredTuple>> = vec![Vec::new(); layout.sizes[partitions.column()]];
        let mut cursor = Cursor::default();
        while let Some(tuple) = map.uncovered_combination_from(cursor) {
            cursor = tuple.cursor.successor();
            groups[tuple.fixed_value()].push(tuple);
        }

        let mut tuples = Vec::new();
        let mut bounds = Vec::with_capacity(groups.len());
        for group in groups {
            let start = tuples.len();
            tuples.extend(group);
            bounds.push(start..tuples.len());
        }

        let mut adjacency = vec![Vec::new(); tuples.len()];
        let mut degrees = vec![0; tuples.len()];
        for (value, range) in bounds.into_iter().enumerate() {
            for a in range.clone() {
                for b in a + 1..range.end {
                    if compatible(&tuples[a], &tuples[b]) {
                        adjacency[a].push(b);
                        adjacency[b].push(a);
                        degrees[a] += 1;
                        degrees[b] += 1;
                    }
                }
            }
            let t = layout.strength;
            for node in range {
                let fits = |row: usize| {
                    let row = table.row(row);
                    tuples[node].parameters[..t - 1]
                        .iter()
                        .zip(&tuples[node].values)
                        .all(|(&k, &v)| layout.cell(row, k).map_or(true, |cell| cell == v))
                };
                degrees[node] += partitions.with_value(value).iter().filter(|&&r| fits(r)).count();
                degrees[node] += partitions.dont_care().iter().filter(|&&r| fits(r)).count();
            }
        }

        Self {
            tuples,
            adjacency,
            degrees,
        }
    }

    pub fn node_count(&self) -> usize {
        self.tuples.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn degree(&self, node: usize) -> usize {
        self.degrees[node]
    }

    pub fn tuple(&self, node: usize) -> &UncoveredTuple {
        &self.tuples[node]
    }

    /// Smallest-last ordering by degree-bucketed peeling: the node with the
    /// highest remaining degree is removed first and placed at the end.
    /// Runs in O(V + E) bucket moves (each move costs a set operation).
    pub fn smallest_last_order(&self) -> Vec<usize> {
        let count = self.tuples.len();
        let max_degree = self.degrees.iter().copied().max().unwrap_or(0);
        let mut degrees = self.degrees.clone();
        // (stamp, node): a bucket yields its nodes in insertion order
        let mut buckets: Vec<BTreeSet<(usize, usize)>> = vec![BTreeSet::new(); max_degree + 1];
        let mut stamps: Vec<usize> = (0..count).collect();
        let mut next_stamp = count;
        for node in 0..count {
            buckets[degrees[node]].insert((node, node));
        }

        let mut removed = vec![false; count];
        let mut order = vec![0; count];
        let mut placed = 0;
        for degree in (0..=max_degree).rev() {
            while let Some((_, node)) = buckets[degree].pop_first() {
                removed[node] = true;
                placed += 1;
                order[count - placed] = node;
                for &neighbour in &self.adjacency[node] {
                    if removed[neighbour] {
                        continue;
                    }
                    buckets[degrees[neighbour]].remove(&(stamps[neighbour], neighbour));
                    degrees[neighbour] -= 1;
                    stamps[neighbour] = next_stamp;
                    next_stamp += 1;
                    buckets[degrees[neighbour]].insert((stamps[neighbour], neighbour));
                }
            }
        }
        order
    }
}

/// Whether one row could realize both tuples: no shared parameter with two
/// different values. Parameters are sorted, the new column is compared by
/// the caller's grouping.
fn compatible(a: &UncoveredTuple, b: &UncoveredTuple) -> bool {
    let len = a.parameters.len() - 1;
    let (mut i, mut j) = (0, 0);
    while i < len && j < len {
        match a.parameters[i].cmp(&b.parameters[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                if a.values[i] != b.values[j] {
                    return false;
                }
                i += 1;
                j += 1;
            }
        }
    }
    true
}

/// Cover every uncovered tuple in smallest-last order, skipping tuples an
/// earlier step already covered. Returns the number of appended rows.
pub fn extend_vertical_by_coloring(
    layout: &Layout,
    table: &mut Table,
    map: &mut CoverageMap<'_>,
    partitions: &mut Partitions,
) -> usize {
    let graph = ConflictGraph::build(layout, table, map, partitions);
    tracing::trace!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built non-conflict graph"
    );
    let mut appended = 0;
    for node in graph.smallest_last_order() {
        let tuple = graph.tuple(node);
        if !map.is_uncovered_at(tuple.cursor) {
            continue;
        }
        if let Placement::Appended(_) = cover_tuple(layout, table, map, partitions, tuple) {
            appended += 1;
        }
    }
    appended
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parameter;

    fn layout(sizes: &[usize], strength: usize) -> Layout {
        let params: Vec<Parameter> = sizes
            .iter()
            .enumerate()
            .map(|(i, &s)| Parameter::new(format!("p{i}"), 0..s))
            .collect();
        Layout::new(&params, strength).unwrap()
    }

    fn tuple(parameters: &[usize], values: &[usize]) -> UncoveredTuple {
        UncoveredTuple {
            parameters: parameters.to_vec(),
            values: values.to_vec(),
            cursor: Cursor::default(),
        }
    }

    #[test]
    fn test_compatible() {
        assert!(compatible(&tuple(&[0, 1, 3], &[0, 1, 0]), &tuple(&[1, 2, 3], &[1, 0, 0])));
        assert!(!compatible(&tuple(&[0, 1, 3], &[0, 1, 0]), &tuple(&[1, 2, 3], &[0, 0, 0])));
        assert!(compatible(&tuple(&[0, 3], &[1, 0]), &tuple(&[1, 3], &[0, 0])));
        assert!(!compatible(&tuple(&[0, 3], &[1, 0]), &tuple(&[0, 3], &[0, 0])));
    }

    #[test]
    fn test_graph_on_empty_column() {
        let layout = layout(&[2, 2, 2], 2);
        let mut table = Table::new();
        table.push(vec![Some(0), Some(0), None]);
        table.push(vec![Some(1), Some(1), None]);
        let map = CoverageMap::new(&layout.sizes, 2, &layout.binom, &layout.order, false, usize::MAX).unwrap();
        let partitions = Partitions::new(&layout, &table, 2);
        let graph = ConflictGraph::build(&layout, &table, &map, &partitions);
        assert_eq!(graph.node_count(), 8);
        // per value: {0}x{1} pairs are all compatible (2 * 2 edges), none inside a bucket
        assert_eq!(graph.edge_count(), 8);
        // each tuple fits one of the two open rows
        for node in 0..graph.node_count() {
            assert_eq!(graph.degree(node), 3);
        }
        let order = graph.smallest_last_order();
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_smallest_last_peels_highest_degree_first() {
        let graph = ConflictGraph {
            tuples: (0..4).map(|_| tuple(&[0, 1], &[0, 0])).collect(),
            // star around node 0 plus an isolated node 3
            adjacency: vec![vec![1, 2], vec![0], vec![0], vec![]],
            degrees: vec![2, 1, 1, 0],
        };
        // node 0 goes first and lands last; its neighbours drop behind node 3
        assert_eq!(graph.smallest_last_order(), vec![2, 1, 3, 0]);
    }

    #[test]
    fn test_coloring_extension_covers_everything() {
        let layout = layout(&[3, 3, 3, 2], 2);
        let mut table = Table::new();
        for a in 0..3 {
            for b in 0..3 {
                table.push(vec![Some(a), Some(b), None, None]);
            }
        }
        let mut map = CoverageMap::new(&layout.sizes[..3], 2, &layout.binom, &layout.order, false, usize::MAX).unwrap();
        let mut partitions = Partitions::new(&layout, &table, 2);
        let appended = extend_vertical_by_coloring(&layout, &mut table, &mut map, &mut partitions);
        assert!(!map.may_have_uncovered_combinations());
        assert_eq!(map.total_covered_value_combinations_count(), 18);
        assert_eq!(table.len(), 9 + appended);
    }
}
