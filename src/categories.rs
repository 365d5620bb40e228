// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The fixed spend-category tree.
//!
//! Nodes live in a flat arena indexed by position; parent and child links are
//! indices into that arena. The tree is built once on first use.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

use crate::models::{Network, SpendProfile};

#[derive(Debug, Clone)]
pub struct CategoryNode {
    pub id: &'static str,
    pub label: &'static str,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub network_restrictions: &'static [Network],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOption {
    pub id: &'static str,
    pub label: &'static str,
    pub depth: usize,
    pub parent_id: Option<&'static str>,
}

pub struct Taxonomy {
    nodes: Vec<CategoryNode>,
    roots: Vec<usize>,
    index: HashMap<&'static str, usize>,
}

struct Seed {
    id: &'static str,
    label: &'static str,
    restrictions: &'static [Network],
    children: Vec<Seed>,
}

fn leaf(id: &'static str, label: &'static str) -> Seed {
    Seed {
        id,
        label,
        restrictions: &[],
        children: Vec::new(),
    }
}

fn branch(id: &'static str, label: &'static str, children: Vec<Seed>) -> Seed {
    Seed {
        id,
        label,
        restrictions: &[],
        children,
    }
}

fn seeds() -> Vec<Seed> {
    vec![
        branch(
            "groceries",
            "Groceries",
            vec![
                leaf("costco", "Costco"),
                leaf("wholesale-clubs", "Wholesale Clubs"),
                leaf("whole-foods", "Whole Foods"),
                leaf("supermarkets", "Supermarkets"),
            ],
        ),
        branch(
            "gas",
            "Gas",
            vec![
                Seed {
                    id: "costco-gas",
                    label: "Costco Gas",
                    restrictions: &[Network::Visa],
                    children: Vec::new(),
                },
                leaf("ev-charging", "EV Charging"),
                leaf("gas-stations", "Gas Stations"),
            ],
        ),
        branch(
            "dining",
            "Dining",
            vec![
                leaf("restaurants", "Restaurants"),
                leaf("fast-food", "Fast Food"),
                leaf("bars", "Bars"),
                leaf("coffee-shops", "Coffee Shops"),
                leaf("food-delivery", "Food Delivery"),
            ],
        ),
        branch(
            "travel",
            "Travel",
            vec![
                leaf("airlines", "Airlines"),
                leaf("hotels", "Hotels"),
                leaf("car-rental", "Car Rental"),
                leaf("public-transit", "Public Transit"),
                leaf("rideshare", "Rideshare"),
                leaf("parking", "Parking"),
                leaf("tolls", "Tolls"),
                leaf("travel-portal", "Travel Portal"),
            ],
        ),
        branch(
            "online-shopping",
            "Online Shopping",
            vec![
                leaf("amazon", "Amazon"),
                leaf("ebay", "eBay"),
                leaf("walmart-online", "Walmart Online"),
                leaf("general-online", "General Online"),
            ],
        ),
        branch(
            "entertainment",
            "Entertainment",
            vec![
                leaf("streaming", "Streaming"),
                leaf("gaming", "Gaming"),
                leaf("movies-theater", "Movies & Theater"),
                leaf("live-events", "Live Events"),
            ],
        ),
        branch(
            "bills-utilities",
            "Bills & Utilities",
            vec![
                leaf("phone-bill", "Phone Bill"),
                leaf("internet", "Internet"),
                leaf("electric", "Electric"),
                leaf("water", "Water"),
                leaf("insurance", "Insurance"),
                leaf("subscriptions", "Subscriptions"),
            ],
        ),
        leaf("drugstores-pharmacy", "Drugstores & Pharmacy"),
        branch(
            "home-improvement",
            "Home Improvement",
            vec![
                leaf("hardware-stores", "Hardware Stores"),
                leaf("furniture", "Furniture"),
            ],
        ),
        leaf("office-supplies", "Office Supplies"),
        leaf("gym-fitness", "Gym & Fitness"),
        leaf("pet", "Pet"),
        leaf("childcare-education", "Childcare & Education"),
        branch(
            "medical",
            "Medical",
            vec![
                leaf("doctors", "Doctors"),
                leaf("dental", "Dental"),
                leaf("vision", "Vision"),
            ],
        ),
        leaf("clothing", "Clothing"),
        leaf("electronics", "Electronics"),
        leaf("other", "Other"),
    ]
}

impl Taxonomy {
    fn build(seeds: Vec<Seed>) -> Self {
        let mut taxonomy = Taxonomy {
            nodes: Vec::new(),
            roots: Vec::new(),
            index: HashMap::new(),
        };
        for seed in seeds {
            let idx = taxonomy.insert(seed, None);
            taxonomy.roots.push(idx);
        }
        taxonomy
    }

    fn insert(&mut self, seed: Seed, parent: Option<usize>) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(CategoryNode {
            id: seed.id,
            label: seed.label,
            parent,
            children: Vec::new(),
            network_restrictions: seed.restrictions,
        });
        self.index.insert(seed.id, idx);
        for child in seed.children {
            let child_idx = self.insert(child, Some(idx));
            self.nodes[idx].children.push(child_idx);
        }
        idx
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&CategoryNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn roots(&self) -> impl Iterator<Item = &CategoryNode> + '_ {
        self.roots.iter().map(|&idx| &self.nodes[idx])
    }

    pub fn children<'a>(&'a self, node: &'a CategoryNode) -> impl Iterator<Item = &'a CategoryNode> + 'a {
        node.children.iter().map(|&idx| &self.nodes[idx])
    }

    pub fn top_level_ids(&self) -> Vec<&'static str> {
        self.roots().map(|n| n.id).collect()
    }

    /// `id` itself followed by each parent up to the root. Empty when unknown.
    pub fn ancestors(&self, id: &str) -> Vec<&'static str> {
        let mut out = Vec::new();
        let mut current = self.index.get(id).copied();
        while let Some(idx) = current {
            out.push(self.nodes[idx].id);
            current = self.nodes[idx].parent;
        }
        out
    }

    /// `id` itself followed by its whole subtree, depth-first. Empty when unknown.
    pub fn descendants(&self, id: &str) -> Vec<&'static str> {
        let mut out = Vec::new();
        if let Some(&idx) = self.index.get(id) {
            self.collect_subtree(idx, &mut out);
        }
        out
    }

    fn collect_subtree(&self, idx: usize, out: &mut Vec<&'static str>) {
        out.push(self.nodes[idx].id);
        for &child in &self.nodes[idx].children {
            self.collect_subtree(child, out);
        }
    }

    /// True when `ancestor` is `id` or lies on the path from `id` to its root.
    pub fn is_ancestor_or_self(&self, ancestor: &str, id: &str) -> bool {
        let mut current = self.index.get(id).copied();
        while let Some(idx) = current {
            if self.nodes[idx].id == ancestor {
                return true;
            }
            current = self.nodes[idx].parent;
        }
        false
    }

    /// Categories without restrictions (or unknown to the tree) accept every network.
    pub fn allows_network(&self, id: &str, network: Network) -> bool {
        match self.node(id) {
            Some(node) if !node.network_restrictions.is_empty() => {
                node.network_restrictions.contains(&network)
            }
            _ => true,
        }
    }

    pub fn flatten(&self) -> Vec<CategoryOption> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for &root in &self.roots {
            self.flatten_into(root, 0, &mut out);
        }
        out
    }

    fn flatten_into(&self, idx: usize, depth: usize, out: &mut Vec<CategoryOption>) {
        let node = &self.nodes[idx];
        out.push(CategoryOption {
            id: node.id,
            label: node.label,
            depth,
            parent_id: node.parent.map(|p| self.nodes[p].id),
        });
        for &child in &node.children {
            self.flatten_into(child, depth + 1, out);
        }
    }
}

static TAXONOMY: Lazy<Taxonomy> = Lazy::new(|| Taxonomy::build(seeds()));

pub fn taxonomy() -> &'static Taxonomy {
    &TAXONOMY
}

static DEFAULT_MONTHLY_SPEND: Lazy<SpendProfile> = Lazy::new(|| {
    [
        ("groceries", 600.0),
        ("gas", 180.0),
        ("dining", 320.0),
        ("travel", 200.0),
        ("online-shopping", 220.0),
        ("entertainment", 110.0),
        ("bills-utilities", 360.0),
        ("drugstores-pharmacy", 60.0),
        ("home-improvement", 90.0),
        ("office-supplies", 30.0),
        ("gym-fitness", 40.0),
        ("pet", 50.0),
        ("childcare-education", 180.0),
        ("medical", 120.0),
        ("clothing", 100.0),
        ("electronics", 70.0),
        ("other", 700.0),
    ]
    .into_iter()
    .map(|(id, amount)| (id.to_string(), amount))
    .collect()
});

/// An average household's monthly spend, used when the caller supplies none.
pub fn default_monthly_spend() -> &'static SpendProfile {
    &DEFAULT_MONTHLY_SPEND
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_has_expected_shape() {
        let t = taxonomy();
        assert_eq!(t.top_level_ids().len(), 17);
        assert_eq!(t.len(), 56);
        assert_eq!(t.flatten().len(), t.len());
    }

    #[test]
    fn ancestors_walk_to_root() {
        let t = taxonomy();
        assert_eq!(t.ancestors("fast-food"), vec!["fast-food", "dining"]);
        assert_eq!(t.ancestors("dining"), vec!["dining"]);
        assert!(t.ancestors("crypto").is_empty());
    }

    #[test]
    fn descendants_include_self_first() {
        let t = taxonomy();
        let d = t.descendants("home-improvement");
        assert_eq!(d, vec!["home-improvement", "hardware-stores", "furniture"]);
        assert!(t.descendants("nope").is_empty());
        assert!(t.is_ancestor_or_self("gas", "ev-charging"));
        assert!(!t.is_ancestor_or_self("ev-charging", "gas"));
    }

    #[test]
    fn costco_gas_is_visa_only() {
        let t = taxonomy();
        assert!(t.allows_network("costco-gas", Network::Visa));
        assert!(!t.allows_network("costco-gas", Network::Mastercard));
        assert!(t.allows_network("gas", Network::Amex));
        assert!(t.allows_network("not-a-category", Network::Discover));
    }

    #[test]
    fn flatten_tracks_depth_and_parent() {
        let rows = taxonomy().flatten();
        assert_eq!(rows[0].id, "groceries");
        assert_eq!(rows[0].depth, 0);
        assert_eq!(rows[1].id, "costco");
        assert_eq!(rows[1].depth, 1);
        assert_eq!(rows[1].parent_id, Some("groceries"));
    }

    #[test]
    fn default_spend_covers_every_root() {
        let spend = default_monthly_spend();
        for id in taxonomy().top_level_ids() {
            assert!(spend.contains_key(id), "missing {}", id);
        }
    }
}
