use std::collections::HashSet;
use uuid::Uuid;

use crate::models::Record;

/// How the very first snapshot is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstSnapshot {
    /// Records present at subscription time are absorbed silently.
    Baseline,
    /// Every record of the first snapshot counts as new.
    Notify,
}

/// Identifiers a binding has already observed. Lives as long as its binding.
#[derive(Debug)]
pub struct SeenSet {
    ids: HashSet<Uuid>,
    policy: FirstSnapshot,
    primed: bool,
}

impl SeenSet {
    pub fn new(policy: FirstSnapshot) -> Self {
        Self {
            ids: HashSet::new(),
            policy,
            primed: false,
        }
    }

    /// Records whose ids were not seen before, in snapshot order. Each id is
    /// reported at most once over the lifetime of the set.
    pub fn observe<'a>(&mut self, snapshot: &'a [Record]) -> Vec<&'a Record> {
        let silent = !self.primed && self.policy == FirstSnapshot::Baseline;
        self.primed = true;

        let mut fresh = Vec::new();
        for record in snapshot {
            if self.ids.insert(record.id) && !silent {
                fresh.push(record);
            }
        }
        fresh
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for SeenSet {
    fn default() -> Self {
        Self::new(FirstSnapshot::Baseline)
    }
}
