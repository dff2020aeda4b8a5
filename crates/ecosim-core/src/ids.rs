//! Per-species organism id allocation

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Hands out monotonically increasing ids, one counter per species.
///
/// Owned by a single simulation, so separate runs never share counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    next: HashMap<String, u64>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id for `species`, starting at 1
    pub fn next_id(&mut self, species: &str) -> u64 {
        let counter = self.next.entry(species.to_string()).or_insert(1);
        let id = *counter;
        *counter += 1;
        id
    }

    /// Number of ids handed out so far for `species`
    pub fn issued(&self, species: &str) -> u64 {
        self.next.get(species).map(|n| n - 1).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_per_species() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next_id("fox"), 1);
        assert_eq!(ids.next_id("fox"), 2);
        assert_eq!(ids.next_id("rabbit"), 1);
        assert_eq!(ids.next_id("fox"), 3);
        assert_eq!(ids.issued("fox"), 3);
        assert_eq!(ids.issued("rabbit"), 1);
        assert_eq!(ids.issued("wolf"), 0);
    }

    #[test]
    fn test_separate_allocators_do_not_share_state() {
        let mut a = IdAllocator::new();
        let mut b = IdAllocator::new();
        a.next_id("fox");
        a.next_id("fox");
        assert_eq!(b.next_id("fox"), 1);
    }
}
