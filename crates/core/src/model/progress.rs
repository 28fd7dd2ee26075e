use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{Grade, Level, LevelResult};

/// Per-player record of level results and unlock ceilings.
///
/// A level is playable iff it is at or below the grade's unlock ceiling. The
/// ceiling starts at level 1 and only ever rises, and only when a level passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStore {
    #[serde(rename = "level_unlocked", default)]
    unlocked: BTreeMap<Grade, Level>,
    #[serde(rename = "level_progress", default)]
    results: BTreeMap<Grade, BTreeMap<Level, LevelResult>>,
}

impl ProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest playable level for `grade`.
    #[must_use]
    pub fn unlocked_ceiling(&self, grade: Grade) -> Level {
        self.unlocked.get(&grade).copied().unwrap_or(Level::FIRST)
    }

    #[must_use]
    pub fn is_playable(&self, grade: Grade, level: Level) -> bool {
        level <= self.unlocked_ceiling(grade)
    }

    #[must_use]
    pub fn result(&self, grade: Grade, level: Level) -> Option<&LevelResult> {
        self.results.get(&grade).and_then(|levels| levels.get(&level))
    }

    /// All recorded results for a grade, ordered by level.
    pub fn results_for(&self, grade: Grade) -> impl Iterator<Item = (Level, &LevelResult)> {
        self.results
            .get(&grade)
            .into_iter()
            .flat_map(|levels| levels.iter().map(|(level, result)| (*level, result)))
    }

    /// Grades that have an explicit ceiling or at least one result.
    pub fn grades(&self) -> impl Iterator<Item = Grade> + '_ {
        let mut grades: Vec<Grade> = self
            .unlocked
            .keys()
            .chain(self.results.keys())
            .copied()
            .collect();
        grades.sort_unstable();
        grades.dedup();
        grades.into_iter()
    }

    /// Store the outcome of a finished level and unlock the next one if it passed.
    ///
    /// Returns the new ceiling when it was raised.
    pub fn record_result(
        &mut self,
        grade: Grade,
        level: Level,
        result: LevelResult,
    ) -> Option<Level> {
        self.results.entry(grade).or_default().insert(level, result);
        if !result.passed() {
            return None;
        }
        let next = level.next()?;
        self.raise_ceiling(grade, next)
    }

    /// Put back a persisted result without touching any ceiling.
    pub fn restore_result(&mut self, grade: Grade, level: Level, result: LevelResult) {
        self.results.entry(grade).or_default().insert(level, result);
    }

    /// Raise the ceiling to `level` if that is higher than the current one.
    pub fn raise_ceiling(&mut self, grade: Grade, level: Level) -> Option<Level> {
        let current = self.unlocked_ceiling(grade);
        if level > current {
            self.unlocked.insert(grade, level);
            Some(level)
        } else {
            None
        }
    }

    /// Fold another snapshot into this one.
    ///
    /// Ceilings take the higher of both sides. Results from `other` only fill
    /// levels that have no result here yet.
    pub fn merge_from(&mut self, other: &ProgressStore) {
        for (grade, level) in &other.unlocked {
            self.raise_ceiling(*grade, *level);
        }
        for (grade, levels) in &other.results {
            let mine = self.results.entry(*grade).or_default();
            for (level, result) in levels {
                mine.entry(*level).or_insert(*result);
            }
        }
    }

    /// Overlay a newer snapshot of the same player.
    ///
    /// Results from `newer` replace the ones stored here, but ceilings only rise.
    pub fn overlay(&mut self, newer: &ProgressStore) {
        for (grade, level) in &newer.unlocked {
            self.raise_ceiling(*grade, *level);
        }
        for (grade, levels) in &newer.results {
            self.results.entry(*grade).or_default().extend(levels);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty() && self.results.values().all(BTreeMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(v: u8) -> Grade {
        Grade::new(v).unwrap()
    }

    fn level(v: u8) -> Level {
        Level::new(v).unwrap()
    }

    #[test]
    fn ceiling_defaults_to_first_level() {
        let store = ProgressStore::new();
        for g in Grade::all() {
            assert_eq!(store.unlocked_ceiling(g), Level::FIRST);
            assert!(store.is_playable(g, Level::FIRST));
            assert!(!store.is_playable(g, level(2)));
        }
    }

    #[test]
    fn passing_raises_and_failing_keeps_ceiling() {
        let mut store = ProgressStore::new();
        assert_eq!(
            store.record_result(grade(3), level(1), LevelResult::from_counts(6, 10)),
            None
        );
        assert_eq!(store.unlocked_ceiling(grade(3)), level(1));

        assert_eq!(
            store.record_result(grade(3), level(1), LevelResult::from_counts(7, 10)),
            Some(level(2))
        );
        assert_eq!(store.unlocked_ceiling(grade(3)), level(2));
        assert_eq!(store.unlocked_ceiling(grade(4)), level(1));
    }

    #[test]
    fn ceiling_is_never_lowered() {
        let mut store = ProgressStore::new();
        store.raise_ceiling(grade(5), level(8));
        // Replaying an early level must not pull the ceiling back.
        store.record_result(grade(5), level(2), LevelResult::from_counts(10, 10));
        assert_eq!(store.unlocked_ceiling(grade(5)), level(8));
        store.record_result(grade(5), level(3), LevelResult::from_counts(0, 10));
        assert_eq!(store.unlocked_ceiling(grade(5)), level(8));
    }

    #[test]
    fn passing_last_level_does_not_unlock_past_it() {
        let mut store = ProgressStore::new();
        store.raise_ceiling(grade(9), Level::LAST);
        let raised = store.record_result(grade(9), Level::LAST, LevelResult::from_counts(9, 10));
        assert_eq!(raised, None);
        assert_eq!(store.unlocked_ceiling(grade(9)), Level::LAST);
    }

    #[test]
    fn merge_keeps_higher_ceiling_and_existing_results() {
        let mut mine = ProgressStore::new();
        mine.record_result(grade(3), level(1), LevelResult::from_counts(8, 10));

        let mut theirs = ProgressStore::new();
        theirs.raise_ceiling(grade(3), level(5));
        theirs.raise_ceiling(grade(4), level(3));
        theirs.record_result(grade(3), level(1), LevelResult::from_counts(3, 10));
        theirs.record_result(grade(3), level(4), LevelResult::from_counts(9, 10));

        mine.merge_from(&theirs);
        assert_eq!(mine.unlocked_ceiling(grade(3)), level(5));
        assert_eq!(mine.unlocked_ceiling(grade(4)), level(3));
        assert_eq!(mine.result(grade(3), level(1)).unwrap().correct_count(), 8);
        assert_eq!(mine.result(grade(3), level(4)).unwrap().correct_count(), 9);
    }

    #[test]
    fn overlay_replaces_results_but_keeps_higher_ceiling() {
        let mut stored = ProgressStore::new();
        stored.raise_ceiling(grade(3), level(8));
        stored.record_result(grade(3), level(1), LevelResult::from_counts(9, 10));

        let mut fresh = ProgressStore::new();
        fresh.record_result(grade(3), level(1), LevelResult::from_counts(2, 10));
        fresh.record_result(grade(4), level(1), LevelResult::from_counts(7, 10));

        stored.overlay(&fresh);
        assert_eq!(stored.unlocked_ceiling(grade(3)), level(8));
        assert_eq!(stored.unlocked_ceiling(grade(4)), level(2));
        assert_eq!(stored.result(grade(3), level(1)).unwrap().correct_count(), 2);
    }

    #[test]
    fn serializes_to_snapshot_shape() {
        let mut store = ProgressStore::new();
        store.record_result(grade(3), level(1), LevelResult::from_counts(7, 10));
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["level_unlocked"]["3"], 2);
        assert_eq!(json["level_progress"]["3"]["1"]["percent"], 70);

        let back: ProgressStore = serde_json::from_value(json).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn grades_lists_each_grade_once() {
        let mut store = ProgressStore::new();
        store.record_result(grade(6), level(1), LevelResult::from_counts(9, 10));
        store.raise_ceiling(grade(2), level(3));
        let grades: Vec<u8> = store.grades().map(|g| g.value()).collect();
        assert_eq!(grades, vec![2, 6]);
        assert!(!store.is_empty());
        assert!(ProgressStore::new().is_empty());
    }
}
