// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashSet;

use crate::categories::{CategoryNode, Taxonomy, taxonomy};
use crate::models::SpendProfile;

#[derive(Debug, Clone, PartialEq)]
pub struct SpendEntry {
    pub category_id: String,
    pub spend: f64,
}

/// Flatten a possibly hierarchical spend map into non-overlapping entries.
///
/// A parent amount only contributes what its descendants have not already
/// claimed. Ids the tree does not know pass through untouched. The result
/// holds positive amounts only, largest first.
pub fn effective_spend(monthly_spend: &SpendProfile) -> Vec<SpendEntry> {
    let tree = taxonomy();
    let mut out = Vec::new();
    let mut visited = HashSet::new();

    for root in tree.roots() {
        walk(tree, root, monthly_spend, &mut visited, &mut out);
    }

    for (category_id, &spend) in monthly_spend {
        if !visited.contains(category_id.as_str()) && spend > 0.0 {
            out.push(SpendEntry {
                category_id: category_id.clone(),
                spend,
            });
        }
    }

    out.sort_by(|a, b| b.spend.total_cmp(&a.spend));
    out
}

// Returns the effective spend claimed by `node` and its subtree.
fn walk(
    tree: &Taxonomy,
    node: &CategoryNode,
    monthly_spend: &SpendProfile,
    visited: &mut HashSet<&'static str>,
    out: &mut Vec<SpendEntry>,
) -> f64 {
    visited.insert(node.id);
    let explicit = monthly_spend.get(node.id).copied().unwrap_or(0.0);
    let child_effective: f64 = tree
        .children(node)
        .map(|child| walk(tree, child, monthly_spend, visited, out))
        .sum();
    let own = if explicit > 0.0 {
        (explicit - child_effective).max(0.0)
    } else {
        0.0
    };
    if own > 0.0 {
        out.push(SpendEntry {
            category_id: node.id.to_string(),
            spend: own,
        });
    }
    child_effective + own
}
