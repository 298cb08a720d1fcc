//! Brute-force checks of finished arrays. Used for validation only; the
//! generator never calls into this module.

use std::collections::HashSet;

use crate::combinatorics::{next_combination, CartesianProduct};
use crate::{CoveringArray, IpogError, Parameter, Result};

/// A concrete interaction: (column, value) pairs with increasing columns.
pub type Interaction = Vec<(usize, usize)>;

/// Interactions of `strength` columns the rows realize, don't-cares excluded.
fn realized(array: &CoveringArray, strength: usize) -> HashSet<Interaction> {
    let columns = array.number_of_columns();
    let mut seen = HashSet::new();
    if strength > columns {
        return seen;
    }
    for row in array.rows() {
        let mut subset: Vec<usize> = (0..strength).collect();
        loop {
            let interaction: Option<Interaction> = subset.iter().map(|&c| row[c].map(|v| (c, v))).collect();
            if let Some(interaction) = interaction {
                seen.insert(interaction);
            }
            if !next_combination(&mut subset, columns) {
                break;
            }
        }
    }
    seen
}

/// First interaction of `strength` columns that no row realizes, in
/// lexicographic (columns, values) order.
pub fn first_uncovered_tuple(array: &CoveringArray, strength: usize) -> Option<Interaction> {
    let columns = array.number_of_columns();
    if strength > columns {
        return Some(Vec::new());
    }
    let seen = realized(array, strength);
    let mut subset: Vec<usize> = (0..strength).collect();
    loop {
        let sizes: Vec<usize> = subset.iter().map(|&c| array.parameter(c).size()).collect();
        for values in CartesianProduct::new(&sizes) {
            let interaction: Interaction = subset.iter().copied().zip(values).collect();
            if !seen.contains(&interaction) {
                return Some(interaction);
            }
        }
        if !next_combination(&mut subset, columns) {
            return None;
        }
    }
}

/// Whether every value combination of every `strength` columns appears in
/// some row.
pub fn is_strength_covered(array: &CoveringArray, strength: usize) -> bool {
    match first_uncovered_tuple(array, strength) {
        None => true,
        Some(interaction) => {
            tracing::debug!(?interaction, strength, "interaction not covered");
            false
        }
    }
}

/// Highest strength the array covers, by binary search over `1..=columns`.
/// Arrays that do not even cover strength 1 report 1.
pub fn compute_strength(array: &CoveringArray) -> usize {
    let (mut low, mut high) = (1, array.number_of_columns().max(1));
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if is_strength_covered(array, mid) {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    low
}

/// Highest strength the array covers, counting up from 1. Returns 0 when not
/// even single values are all present.
pub fn compute_strength_linearly(array: &CoveringArray) -> usize {
    let mut strength = 0;
    while strength < array.number_of_columns() && is_strength_covered(array, strength + 1) {
        strength += 1;
    }
    strength
}

/// Whether every interaction in `expected` is realized. All interactions
/// are taken to have the length of the first one.
pub fn are_all_tuples_covered(array: &CoveringArray, expected: &[Interaction]) -> Result<bool> {
    let strength = match expected.first() {
        Some(first) if !first.is_empty() => first.len(),
        _ => return Err(IpogError::EmptyExpectation),
    };
    let seen = realized(array, strength);
    Ok(expected.iter().all(|interaction| {
        let mut sorted = interaction.clone();
        sorted.sort_unstable();
        seen.contains(&sorted)
    }))
}

/// Whether the parameters have more than one distinct domain size.
pub fn is_mixed_level(parameters: &[Parameter]) -> bool {
    parameters
        .iter()
        .map(Parameter::size)
        .collect::<HashSet<_>>()
        .len()
        > 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(count: usize) -> Vec<Parameter> {
        (0..count).map(|i| Parameter::new(format!("p{i}"), [0, 1])).collect()
    }

    /// Classic 4-row pairwise array for three binary parameters.
    fn pairwise() -> CoveringArray {
        let rows = [[0, 0, 0], [0, 1, 1], [1, 0, 1], [1, 1, 0]]
            .iter()
            .map(|r| r.iter().map(|&v| Some(v)).collect())
            .collect();
        CoveringArray::new(binary(3), rows).unwrap()
    }

    #[test]
    fn test_pairwise_is_not_three_way() {
        let array = pairwise();
        assert!(is_strength_covered(&array, 1));
        assert!(is_strength_covered(&array, 2));
        assert!(!is_strength_covered(&array, 3));
        assert_eq!(first_uncovered_tuple(&array, 3), Some(vec![(0, 0), (1, 0), (2, 1)]));
        assert_eq!(compute_strength(&array), 2);
        assert_eq!(compute_strength_linearly(&array), 2);
    }

    #[test]
    fn test_dont_care_matches_nothing() {
        let array = CoveringArray::new(binary(2), vec![vec![Some(0), None], vec![Some(1), Some(1)], vec![None, Some(0)]]).unwrap();
        assert!(is_strength_covered(&array, 1));
        assert_eq!(first_uncovered_tuple(&array, 2), Some(vec![(0, 0), (1, 0)]));
        assert_eq!(compute_strength_linearly(&array), 1);
    }

    #[test]
    fn test_expected_tuples() {
        let array = pairwise();
        assert_eq!(are_all_tuples_covered(&array, &[]), Err(IpogError::EmptyExpectation));
        assert_eq!(are_all_tuples_covered(&array, &[vec![]]), Err(IpogError::EmptyExpectation));
        assert_eq!(are_all_tuples_covered(&array, &[vec![(2, 1), (0, 0)]]), Ok(true));
        assert_eq!(
            are_all_tuples_covered(&array, &[vec![(0, 0), (1, 0), (2, 0)], vec![(0, 0), (1, 0), (2, 1)]]),
            Ok(false)
        );
    }

    #[test]
    fn test_mixed_level() {
        assert!(!is_mixed_level(&binary(3)));
        let mut params = binary(2);
        params.push(Parameter::new("p2", ["a", "b", "c"]));
        assert!(is_mixed_level(&params));
        assert!(!is_mixed_level(&[]));
    }
}
