use crate::models::{MergedEntry, SeasonSlot};

/// Normalize season numbers and episode offsets of slots in chain order.
///
/// A slot whose season number does not exceed the previous slot's is a
/// continuation of that season (split cour, or a numbering quirk of the
/// source) and starts where the previous slot's episodes end. Any other slot
/// starts a new season at episode 1.
pub fn reindex(slots: &mut [SeasonSlot]) {
    let mut previous: Option<SeasonSlot> = None;

    for slot in slots.iter_mut() {
        match previous {
            Some(prev) if slot.season_number <= prev.season_number => {
                slot.season_number = prev.season_number;
                slot.start_offset = prev.start_offset + prev.episode_count;
            }
            _ => slot.start_offset = 1,
        }
        previous = Some(*slot);
    }
}

impl MergedEntry {
    /// Consume the entry and return it with re-indexed seasons.
    pub fn reindexed(mut self) -> MergedEntry {
        reindex(&mut self.seasons);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: u64, season_number: u32, episode_count: u32) -> SeasonSlot {
        SeasonSlot {
            id,
            season_number,
            episode_count,
            start_offset: 1,
        }
    }

    #[test]
    fn test_distinct_seasons_start_at_one() {
        let mut slots = vec![slot(1, 1, 24), slot(2, 2, 12), slot(3, 3, 10)];
        reindex(&mut slots);
        assert!(slots.iter().all(|s| s.start_offset == 1));
        assert_eq!(
            slots.iter().map(|s| s.season_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_split_cour_collapses() {
        let mut slots = vec![slot(1, 1, 12), slot(2, 2, 12), slot(3, 2, 13)];
        reindex(&mut slots);
        assert_eq!(slots[1].start_offset, 1);
        assert_eq!(slots[2].season_number, 2);
        assert_eq!(slots[2].start_offset, 13);
    }

    #[test]
    fn test_lower_number_continues_previous_season() {
        let mut slots = vec![slot(1, 3, 12), slot(2, 1, 12), slot(3, 1, 6)];
        reindex(&mut slots);
        assert_eq!(
            slots.iter().map(|s| (s.season_number, s.start_offset)).collect::<Vec<_>>(),
            vec![(3, 1), (3, 13), (3, 25)]
        );
    }

    #[test]
    fn test_idempotent() {
        let mut slots = vec![slot(1, 1, 12), slot(2, 2, 12), slot(3, 2, 13), slot(4, 1, 0)];
        reindex(&mut slots);
        let once = slots.clone();
        reindex(&mut slots);
        assert_eq!(slots, once);
    }

    #[test]
    fn test_empty() {
        let mut slots: Vec<SeasonSlot> = Vec::new();
        reindex(&mut slots);
        assert!(slots.is_empty());
    }
}
