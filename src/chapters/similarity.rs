use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionPair {
    pub from: char,
    pub to: char,
    pub cost: f64,
}

/// Substitution costs for character pairs; pairs not listed cost 1.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionTable {
    costs: HashMap<(char, char), f64>,
}

impl SubstitutionTable {
    pub fn from_pairs(pairs: &[SubstitutionPair]) -> Self {
        let mut table = Self::default();
        for pair in pairs {
            table.insert(pair.from, pair.to, pair.cost);
        }
        table
    }

    pub fn insert(&mut self, from: char, to: char, cost: f64) {
        self.costs.insert((from, to), cost);
        self.costs.insert((to, from), cost);
    }

    pub fn cost(&self, from: char, to: char) -> f64 {
        if from == to {
            return 0.0;
        }
        self.costs.get(&(from, to)).copied().unwrap_or(1.0)
    }
}

/// Levenshtein distance with unit insertion/deletion cost and table-driven
/// substitution cost.
pub fn weighted_levenshtein(left: &str, right: &str, table: &SubstitutionTable) -> f64 {
    if left == right {
        return 0.0;
    }

    let left = left.chars().collect::<Vec<char>>();
    let right = right.chars().collect::<Vec<char>>();
    if left.is_empty() {
        return right.len() as f64;
    }
    if right.is_empty() {
        return left.len() as f64;
    }

    let mut previous = (0..=right.len()).map(|index| index as f64).collect::<Vec<f64>>();
    let mut current = vec![0.0; right.len() + 1];

    for (row, &left_char) in left.iter().enumerate() {
        current[0] = (row + 1) as f64;
        for (column, &right_char) in right.iter().enumerate() {
            let substitution = previous[column] + table.cost(left_char, right_char);
            let insertion = current[column] + 1.0;
            let deletion = previous[column + 1] + 1.0;
            current[column + 1] = substitution.min(insertion).min(deletion);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[right.len()]
}

/// Upper bound on the matching-blocks ratio: twice the multiset overlap
/// divided by the combined length.
pub fn quick_ratio(left: &str, right: &str) -> f64 {
    let total = left.chars().count() + right.chars().count();
    if total == 0 {
        return 1.0;
    }

    let mut available = HashMap::<char, usize>::new();
    for character in right.chars() {
        *available.entry(character).or_insert(0) += 1;
    }

    let mut matches = 0usize;
    for character in left.chars() {
        if let Some(count) = available.get_mut(&character) {
            if *count > 0 {
                *count -= 1;
                matches += 1;
            }
        }
    }

    2.0 * matches as f64 / total as f64
}
