//! Missions - The campaign's mission catalog and unlocking rules

use crate::hero::Hero;

/// Numeric id of a mission in the catalog.
///
/// Ids are stable and ordered; the catalog never holds more than
/// [`MissionBook::CAPACITY`] missions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MissionId(pub u8);

/// One campaign mission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mission {
    pub id: MissionId,
    pub name: &'static str,
    pub objective: &'static str,
    /// Enemies to defeat; zero when the mission is item-only
    pub targets_total: i32,
    pub targets_down: i32,
    /// Special item this mission awards, if any
    pub special_item: Option<&'static str>,
    pub item_recovered: bool,
    pub unlocked: bool,
    pub completed: bool,
}

impl Mission {
    fn new(
        id: MissionId,
        name: &'static str,
        objective: &'static str,
        targets_total: i32,
        special_item: Option<&'static str>,
        unlocked: bool,
    ) -> Self {
        Self {
            id,
            name,
            objective,
            targets_total,
            targets_down: 0,
            special_item,
            item_recovered: false,
            unlocked,
            completed: false,
        }
    }

    /// Whether the kill/recovery objectives are satisfied.
    ///
    /// Item-only missions (no enemy targets) hinge on the item alone.
    pub fn objectives_met(&self) -> bool {
        if self.targets_total == 0 {
            return self.item_recovered;
        }
        self.targets_down >= self.targets_total
    }

    /// Record one defeated target, clamped at the mission total.
    pub fn record_target_down(&mut self) {
        self.targets_down = (self.targets_down + 1).min(self.targets_total);
    }

    /// Mark the mission's special item as recovered.
    pub fn recover_item(&mut self) {
        self.item_recovered = true;
    }
}

/// The ordered mission catalog, keyed by [`MissionId`].
///
/// Replaces the original design of parallel arrays indexed by an enum:
/// the collection is explicit, the capacity is stated, and lookups go
/// through ids instead of array-bounds coupling.
#[derive(Debug, Clone)]
pub struct MissionBook {
    missions: Vec<Mission>,
}

impl MissionBook {
    /// Maximum number of missions the campaign can hold
    pub const CAPACITY: usize = 8;

    pub const SWAMP: MissionId = MissionId(0);
    pub const MANOR: MissionId = MissionId(1);
    pub const CAVE: MissionId = MissionId(2);
    pub const CASTLE: MissionId = MissionId(3);

    /// Seed the four campaign missions. Everything is unlocked from
    /// the start except the castle finale.
    pub fn new() -> Self {
        let missions = vec![
            Mission::new(
                Self::SWAMP,
                "Putrid Swamp",
                "Defeat 3 of the Dark Lord's Orc Generals",
                3,
                None,
                true,
            ),
            Mission::new(
                Self::MANOR,
                "Haunted Manor",
                "Recover the Castle Key and defeat an Elder Vampire",
                1,
                Some("Castle Key"),
                true,
            ),
            Mission::new(
                Self::CAVE,
                "Crystal Cave",
                "Recover the Hero's Sword",
                0,
                Some("Hero's Sword"),
                true,
            ),
            Mission::new(
                Self::CASTLE,
                "Castle of the Dark Lord",
                "Defeat the Dark Lord",
                1,
                None,
                false,
            ),
        ];
        debug_assert!(missions.len() <= Self::CAPACITY);
        Self { missions }
    }

    pub fn get(&self, id: MissionId) -> Option<&Mission> {
        self.missions.iter().find(|m| m.id == id)
    }

    pub fn get_mut(&mut self, id: MissionId) -> Option<&mut Mission> {
        self.missions.iter_mut().find(|m| m.id == id)
    }

    /// Missions the player can currently start: unlocked and not done.
    pub fn available(&self) -> impl Iterator<Item = &Mission> {
        self.missions.iter().filter(|m| m.unlocked && !m.completed)
    }

    /// Number of completed missions.
    pub fn completed_count(&self) -> i32 {
        self.missions.iter().filter(|m| m.completed).count() as i32
    }

    /// Whether the three preliminary missions are all complete.
    pub fn preliminaries_done(&self) -> bool {
        [Self::SWAMP, Self::MANOR, Self::CAVE]
            .iter()
            .all(|&id| self.get(id).map(|m| m.completed).unwrap_or(false))
    }

    /// Complete a mission and bump the hero's quest counter.
    ///
    /// Completing the last preliminary unlocks the castle finale.
    /// Returns `true` if the finale was unlocked by this call.
    pub fn complete(&mut self, id: MissionId, hero: &mut Hero) -> bool {
        let Some(mission) = self.get_mut(id) else {
            return false;
        };
        if mission.completed {
            return false;
        }
        mission.completed = true;
        hero.quests_completed += 1;

        if self.preliminaries_done() {
            if let Some(castle) = self.get_mut(Self::CASTLE) {
                if !castle.unlocked {
                    castle.unlocked = true;
                    return true;
                }
            }
        }
        false
    }
}

impl Default for MissionBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn campaign_seeds_four_missions() {
        let book = MissionBook::new();
        assert_eq!(book.available().count(), 3);
        assert!(!book.get(MissionBook::CASTLE).unwrap().unlocked);
    }

    #[test]
    fn castle_unlocks_after_the_three_preliminaries() {
        let mut book = MissionBook::new();
        let mut hero = Hero::new("Aria");

        assert!(!book.complete(MissionBook::SWAMP, &mut hero));
        assert!(!book.complete(MissionBook::MANOR, &mut hero));
        assert!(!book.get(MissionBook::CASTLE).unwrap().unlocked);

        // The last preliminary flips the finale open
        assert!(book.complete(MissionBook::CAVE, &mut hero));
        assert!(book.get(MissionBook::CASTLE).unwrap().unlocked);
        assert_eq!(hero.quests_completed, 3);
    }

    #[test]
    fn completing_twice_counts_once() {
        let mut book = MissionBook::new();
        let mut hero = Hero::new("Aria");

        book.complete(MissionBook::SWAMP, &mut hero);
        book.complete(MissionBook::SWAMP, &mut hero);
        assert_eq!(hero.quests_completed, 1);
        assert_eq!(book.completed_count(), 1);
    }

    #[test]
    fn target_progress_clamps_at_total() {
        let mut book = MissionBook::new();
        let swamp = book.get_mut(MissionBook::SWAMP).unwrap();

        for _ in 0..5 {
            swamp.record_target_down();
        }
        assert_eq!(swamp.targets_down, swamp.targets_total);
        assert!(swamp.objectives_met());
    }

    #[test]
    fn item_only_mission_hinges_on_the_item() {
        let mut book = MissionBook::new();
        let cave = book.get_mut(MissionBook::CAVE).unwrap();

        assert!(!cave.objectives_met());
        cave.recover_item();
        assert!(cave.objectives_met());
    }

    #[test]
    fn manor_needs_both_kill_and_key() {
        let mut book = MissionBook::new();
        let manor = book.get_mut(MissionBook::MANOR).unwrap();

        manor.record_target_down();
        assert!(manor.objectives_met());
        // The key gates the free trip home, not objectives_met; both
        // flags are tracked independently.
        assert!(!manor.item_recovered);
        manor.recover_item();
        assert!(manor.item_recovered);
    }

    #[test]
    fn unknown_id_lookup() {
        let book = MissionBook::new();
        assert!(book.get(MissionId(42)).is_none());
    }
}
