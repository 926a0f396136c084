use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::models::{Address, TransactionTable};

/// Pending and explored address sets for one crawl target.
///
/// Pending addresses live in a sequence plus a position index so that
/// selection is uniform by index and removal stays O(1). Selection order is
/// deliberately random: it mixes exploration across disconnected regions of
/// the transfer graph without needing a queue, at the cost of any coverage
/// or shortest-path guarantee.
#[derive(Debug, Default)]
pub struct Frontier {
    order: Vec<Address>,
    positions: HashMap<Address, usize>,
    visited: HashSet<Address>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted state. Pending entries that were already
    /// explored in an earlier run are dropped on the way in.
    pub fn from_parts(pending: Vec<Address>, visited: HashSet<Address>) -> Self {
        let mut frontier = Self {
            order: Vec::new(),
            positions: HashMap::new(),
            visited,
        };
        frontier.admit(pending);
        frontier
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_pending(&self, address: &Address) -> bool {
        self.positions.contains_key(address)
    }

    pub fn is_visited(&self, address: &Address) -> bool {
        self.visited.contains(address)
    }

    /// Pick a pending address uniformly at random, or `None` when nothing is
    /// pending. The address stays pending until `mark_explored` is called.
    pub fn select_next<R: Rng>(&self, rng: &mut R) -> Option<Address> {
        if self.order.is_empty() {
            return None;
        }
        let i = rng.random_range(0..self.order.len());
        Some(self.order[i].clone())
    }

    /// Move an address from pending to visited.
    pub fn mark_explored(&mut self, address: &Address) {
        if let Some(pos) = self.positions.remove(address) {
            self.order.swap_remove(pos);
            if pos < self.order.len() {
                self.positions.insert(self.order[pos].clone(), pos);
            }
        }
        self.visited.insert(address.clone());
    }

    /// Add every candidate that is neither visited nor already pending.
    pub fn admit<I: IntoIterator<Item = Address>>(&mut self, candidates: I) {
        for candidate in candidates {
            if candidate.is_empty()
                || self.visited.contains(&candidate)
                || self.positions.contains_key(&candidate)
            {
                continue;
            }
            self.positions.insert(candidate.clone(), self.order.len());
            self.order.push(candidate);
        }
    }

    pub fn pending(&self) -> impl Iterator<Item = &Address> {
        self.order.iter()
    }

    pub fn visited(&self) -> impl Iterator<Item = &Address> {
        self.visited.iter()
    }
}

/// Every address appearing on either side of a transfer in the table,
/// deduplicated. Blank columns are skipped.
pub fn neighbors_of(table: &TransactionTable) -> HashSet<Address> {
    let mut neighbors = HashSet::new();
    for record in &table.records {
        if !record.from.is_empty() {
            neighbors.insert(record.from.clone());
        }
        if !record.to.is_empty() {
            neighbors.insert(record.to.clone());
        }
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionRecord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn addr(tag: &str) -> Address {
        Address::normalize(tag)
    }

    fn record(from: &str, to: &str) -> TransactionRecord {
        TransactionRecord {
            block_number: 1,
            time_stamp: 1,
            hash: "0xhash".to_string(),
            from: addr(from),
            contract_address: addr("0xtoken"),
            to: addr(to),
            value: 1.0,
            token_name: "T".to_string(),
            token_symbol: "T".to_string(),
            gas: 0,
            gas_price: 0,
            gas_used: 0,
        }
    }

    #[test]
    fn neighbors_union_both_columns_and_dedupe() {
        let table = TransactionTable {
            address: addr("0xa"),
            records: vec![record("0xa", "0xb"), record("0xb", "0xc")],
            is_user: None,
        };
        let neighbors = neighbors_of(&table);
        assert_eq!(
            neighbors,
            HashSet::from([addr("0xa"), addr("0xb"), addr("0xc")])
        );
    }

    #[test]
    fn admit_skips_visited_and_duplicates() {
        let mut frontier = Frontier::new();
        frontier.admit([addr("0xa"), addr("0xb")]);
        frontier.mark_explored(&addr("0xa"));

        frontier.admit([addr("0xa"), addr("0xb"), addr("0xc")]);

        assert_eq!(frontier.len(), 2);
        assert!(frontier.is_pending(&addr("0xb")));
        assert!(frontier.is_pending(&addr("0xc")));
        assert!(!frontier.is_pending(&addr("0xa")));
    }

    #[test]
    fn mark_explored_keeps_the_sets_disjoint() {
        let mut frontier = Frontier::new();
        frontier.admit([addr("0xa"), addr("0xb"), addr("0xc")]);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..3 {
            let before = frontier.visited_len();
            let picked = frontier.select_next(&mut rng).unwrap();
            frontier.mark_explored(&picked);

            assert_eq!(frontier.visited_len(), before + 1);
            assert!(!frontier.is_pending(&picked));
            for pending in frontier.pending() {
                assert!(!frontier.is_visited(pending));
            }
        }
        assert!(frontier.is_empty());
        assert!(frontier.select_next(&mut rng).is_none());
    }

    #[test]
    fn swap_remove_keeps_the_position_index_consistent() {
        let mut frontier = Frontier::new();
        frontier.admit([addr("0xa"), addr("0xb"), addr("0xc"), addr("0xd")]);

        // Removing from the middle relocates the tail element; every
        // remaining address must still be reachable by membership checks.
        frontier.mark_explored(&addr("0xb"));
        for tag in ["0xa", "0xc", "0xd"] {
            assert!(frontier.is_pending(&addr(tag)));
        }
        frontier.mark_explored(&addr("0xd"));
        frontier.mark_explored(&addr("0xa"));
        assert_eq!(frontier.len(), 1);
        assert!(frontier.is_pending(&addr("0xc")));
    }

    #[test]
    fn from_parts_drops_pending_entries_already_visited() {
        let frontier = Frontier::from_parts(
            vec![addr("0xa"), addr("0xb")],
            HashSet::from([addr("0xa")]),
        );
        assert_eq!(frontier.len(), 1);
        assert!(frontier.is_pending(&addr("0xb")));
        assert!(frontier.is_visited(&addr("0xa")));
    }

    #[test]
    fn selection_is_uniform_over_the_pending_set() {
        let mut frontier = Frontier::new();
        frontier.admit([addr("0xa"), addr("0xb"), addr("0xc")]);
        let mut rng = StdRng::seed_from_u64(11);

        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.insert(frontier.select_next(&mut rng).unwrap());
        }
        assert_eq!(seen.len(), 3);
    }
}
