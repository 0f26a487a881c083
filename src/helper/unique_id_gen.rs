use std::{collections::BTreeMap, error, fmt};

pub type UniqueId = u32;

/// Hands out unique ids starting at 1, preferring to reuse ids that have been recycled.
///
/// Free ids below the counter are kept as half-open ranges `start -> end`, so a generator rebuilt
/// from a few sparse ids stays small no matter how large those ids are.
#[derive(Debug, Clone)]
pub struct UniqueIdGen {
    counter: UniqueId,
    free_ranges: BTreeMap<UniqueId, UniqueId>,
}

impl UniqueIdGen {
    pub const fn new() -> Self {
        Self {
            counter: 1,
            free_ranges: BTreeMap::new(),
        }
    }

    /// Rebuilds a generator that won't hand out any of `used_ids`. Gaps below the highest used id
    /// become recycled ids.
    pub fn from_used_ids(used_ids: impl IntoIterator<Item = UniqueId>) -> Result<Self, UniqueIdError> {
        let mut used: Vec<UniqueId> = used_ids.into_iter().filter(|&id| id != 0).collect();
        used.sort_unstable();
        used.dedup();
        let Some(&max_used) = used.last() else {
            return Ok(Self::new());
        };
        if max_used == UniqueId::MAX {
            return Err(UniqueIdError::MaxReached);
        }

        let mut free_ranges = BTreeMap::new();
        let mut gap_start = 1;
        for id in used {
            if id > gap_start {
                free_ranges.insert(gap_start, id);
            }
            gap_start = id + 1;
        }
        Ok(Self {
            counter: max_used + 1,
            free_ranges,
        })
    }

    pub fn new_id(&mut self) -> Result<UniqueId, UniqueIdError> {
        // prefer recycling ids
        if let Some((start, end)) = self.free_ranges.pop_first() {
            if start + 1 < end {
                self.free_ranges.insert(start + 1, end);
            }
            return Ok(start);
        }

        let new_id = self.counter;
        if new_id == UniqueId::MAX {
            // incrementing would wrap around making the ids not unique!
            return Err(UniqueIdError::MaxReached);
        }
        self.counter += 1;
        Ok(new_id)
    }

    pub fn recycle_id(&mut self, old_id: UniqueId) -> Result<(), UniqueIdError> {
        if old_id == 0 || old_id >= self.counter {
            return Err(UniqueIdError::NeverIssued(old_id));
        }
        if self.is_free(old_id) {
            return Err(UniqueIdError::RecycledIdExists(old_id));
        }
        self.free_ranges.insert(old_id, old_id + 1);
        Ok(())
    }

    /// Number of ids waiting to be reused
    pub fn recycled_count(&self) -> usize {
        self.free_ranges
            .iter()
            .map(|(start, end)| (end - start) as usize)
            .sum()
    }

    fn is_free(&self, id: UniqueId) -> bool {
        self.free_ranges
            .range(..=id)
            .next_back()
            .is_some_and(|(_, &end)| id < end)
    }
}

impl Default for UniqueIdGen {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueIdError {
    /// No more unique ids can be generated from this instance.
    MaxReached,
    /// Id is already waiting to be reused.
    RecycledIdExists(UniqueId),
    /// Attempted to recycle an id that this generator never handed out.
    NeverIssued(UniqueId),
}

impl fmt::Display for UniqueIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxReached => {
                write!(f, "maximum id value reached in unique id generator")
            }
            Self::RecycledIdExists(recycled_id) => {
                write!(f, "id {} has already been recycled", recycled_id)
            }
            Self::NeverIssued(id) => {
                write!(f, "id {} was never issued by this generator", id)
            }
        }
    }
}

impl error::Error for UniqueIdError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_then_recycled() {
        let mut id_gen = UniqueIdGen::new();
        assert_eq!(id_gen.new_id(), Ok(1));
        assert_eq!(id_gen.new_id(), Ok(2));
        assert_eq!(id_gen.new_id(), Ok(3));
        id_gen.recycle_id(2).unwrap();
        assert_eq!(id_gen.new_id(), Ok(2));
        assert_eq!(id_gen.new_id(), Ok(4));
    }

    #[test]
    fn recycle_twice_fails() {
        let mut id_gen = UniqueIdGen::new();
        let id = id_gen.new_id().unwrap();
        id_gen.recycle_id(id).unwrap();
        assert_eq!(id_gen.recycle_id(id), Err(UniqueIdError::RecycledIdExists(id)));
        assert_eq!(id_gen.recycle_id(99), Err(UniqueIdError::NeverIssued(99)));
    }

    #[test]
    fn rebuilt_from_used_ids() {
        let mut id_gen = UniqueIdGen::from_used_ids([1, 4, 5]).unwrap();
        assert_eq!(id_gen.new_id(), Ok(2));
        assert_eq!(id_gen.new_id(), Ok(3));
        assert_eq!(id_gen.new_id(), Ok(6));
    }

    #[test]
    fn sparse_used_ids_stay_small() {
        let mut id_gen = UniqueIdGen::from_used_ids([3, UniqueId::MAX - 1]).unwrap();
        assert_eq!(id_gen.free_ranges.len(), 2);
        assert_eq!(id_gen.recycled_count(), 2 + (UniqueId::MAX - 1 - 4) as usize);
        assert_eq!(id_gen.new_id(), Ok(1));
        assert_eq!(id_gen.new_id(), Ok(2));
        assert_eq!(id_gen.new_id(), Ok(4));

        // recycling inside or outside a free range
        assert_eq!(id_gen.recycle_id(1_000), Err(UniqueIdError::RecycledIdExists(1_000)));
        id_gen.recycle_id(3).unwrap();
        assert_eq!(id_gen.new_id(), Ok(3));
        assert_eq!(id_gen.new_id(), Ok(5));
    }

    #[test]
    fn max_used_id_rejected() {
        assert!(matches!(
            UniqueIdGen::from_used_ids([UniqueId::MAX]),
            Err(UniqueIdError::MaxReached)
        ));
    }
}
