//! core::seed
//!
//! Deterministic sample hierarchy loaded at startup.
//!
//! 3 countries × 5 states × 3 cities × 2 districts × 2 blocks, with food
//! quantities of `base * position * multiplier` where the multiplier is the
//! 1-based country number.
//!
//! | level    | id pattern          | base |
//! |----------|---------------------|------|
//! | country  | `c<n>`              | 1000 |
//! | state    | `s-<country>-<n>`   | 100  |
//! | city     | `ci-<state>-<n>`    | 50   |
//! | district | `d-<city>-<n>`      | 30   |
//! | block    | `b-<district>-<n>`  | 20   |
//!
//! Countries are the exception: their food is `1000 * n` with no
//! multiplier.

use super::tree::HierarchyTree;
use super::types::{NodeId, NodeKind, Resources};

pub const COUNTRIES: usize = 3;
pub const STATES_PER_COUNTRY: usize = 5;
pub const CITIES_PER_STATE: usize = 3;
pub const DISTRICTS_PER_CITY: usize = 2;
pub const BLOCKS_PER_DISTRICT: usize = 2;

/// Total node count of [`sample_tree`].
pub const SAMPLE_NODE_COUNT: usize = COUNTRIES
    * (1 + STATES_PER_COUNTRY
        * (1 + CITIES_PER_STATE * (1 + DISTRICTS_PER_CITY * (1 + BLOCKS_PER_DISTRICT))));

fn seed_id(raw: String) -> NodeId {
    // Patterns above never produce empty or whitespace-bearing ids.
    NodeId::new(raw).unwrap_or_else(|e| unreachable!("seed id rejected: {e}"))
}

/// Build the sample hierarchy.
///
/// # Example
///
/// ```
/// use cadastre::core::seed::{sample_tree, SAMPLE_NODE_COUNT};
/// use cadastre::core::types::NodeId;
///
/// let tree = sample_tree();
/// assert_eq!(tree.len(), SAMPLE_NODE_COUNT);
/// let state = tree.find_node(&NodeId::new("s-c1-1").unwrap()).unwrap();
/// assert_eq!(state.resources.food, 100);
/// ```
pub fn sample_tree() -> HierarchyTree {
    let mut tree = HierarchyTree::new();
    let mut add = |parent: Option<&NodeId>, id: &NodeId, name: String, kind, food| {
        tree.insert(parent, id.clone(), name, kind, Resources::food(food))
            .unwrap_or_else(|e| unreachable!("seed violates tree invariants: {e}"));
    };

    for c in 1..=COUNTRIES {
        let multiplier = c as u64;
        let country = seed_id(format!("c{c}"));
        add(None, &country, format!("Country {c}"), NodeKind::Country, 1000 * multiplier);

        for s in 1..=STATES_PER_COUNTRY {
            let state = seed_id(format!("s-{country}-{s}"));
            let food = 100 * s as u64 * multiplier;
            add(Some(&country), &state, format!("State {c}.{s}"), NodeKind::State, food);

            for ci in 1..=CITIES_PER_STATE {
                let city = seed_id(format!("ci-{state}-{ci}"));
                let food = 50 * ci as u64 * multiplier;
                add(Some(&state), &city, format!("City {s}.{ci}"), NodeKind::City, food);

                for d in 1..=DISTRICTS_PER_CITY {
                    let district = seed_id(format!("d-{city}-{d}"));
                    let food = 30 * d as u64 * multiplier;
                    add(Some(&city), &district, format!("District {d}"), NodeKind::District, food);

                    for b in 1..=BLOCKS_PER_DISTRICT {
                        let block = seed_id(format!("b-{district}-{b}"));
                        let food = 20 * b as u64 * multiplier;
                        add(Some(&district), &block, format!("Block {b}"), NodeKind::Block, food);
                    }
                }
            }
        }
    }

    tree
}
