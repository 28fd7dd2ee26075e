use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use thiserror::Error;

use crate::model::{Grade, Level, ProgressStore, QuestionLogEntry, QuizMode, QuizSettings};
use crate::rules::{HISTORY_LIMIT, SCORE_PER_CORRECT};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Attempt to start or select a level above the grade's unlock ceiling.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("level {level} of grade {grade} is locked (unlocked up to level {ceiling})")]
pub struct LockedLevelError {
    pub grade: Grade,
    pub level: Level,
    pub ceiling: Level,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlayerNameError {
    #[error("player name cannot be empty")]
    Empty,
}

//
// ─── PLAYER NAME ───────────────────────────────────────────────────────────────
//

/// Validated player name (trimmed, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerName(String);

impl PlayerName {
    /// Create a validated player name.
    ///
    /// # Errors
    ///
    /// Returns `PlayerNameError::Empty` if the name is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, PlayerNameError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PlayerNameError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PlayerName {
    fn default() -> Self {
        Self("Player".to_string())
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// Everything the player has chosen or earned during this process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    player: PlayerName,
    grade: Grade,
    mode: QuizMode,
    current_level: Level,
    score: u32,
    weak_topics: BTreeMap<String, u32>,
    history: VecDeque<QuestionLogEntry>,
    settings: QuizSettings,
    progress: ProgressStore,
}

impl SessionState {
    #[must_use]
    pub fn new(player: PlayerName, progress: ProgressStore) -> Self {
        Self {
            player,
            progress,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: QuizSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn player(&self) -> &PlayerName {
        &self.player
    }

    pub fn set_player(&mut self, player: PlayerName) {
        self.player = player;
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }

    /// Switch grade. The current level falls back to one that is playable there.
    pub fn select_grade(&mut self, grade: Grade) {
        self.grade = grade;
        if !self.progress.is_playable(grade, self.current_level) {
            self.current_level = self.progress.unlocked_ceiling(grade);
        }
    }

    #[must_use]
    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn select_mode(&mut self, mode: QuizMode) {
        self.mode = mode;
    }

    #[must_use]
    pub fn current_level(&self) -> Level {
        self.current_level
    }

    /// Choose the level to play next in the current grade.
    ///
    /// # Errors
    ///
    /// Returns `LockedLevelError` and keeps the current level if `level` is locked.
    pub fn select_level(&mut self, level: Level) -> Result<(), LockedLevelError> {
        self.ensure_playable(self.grade, level)?;
        self.current_level = level;
        Ok(())
    }

    pub(crate) fn ensure_playable(&self, grade: Grade, level: Level) -> Result<(), LockedLevelError> {
        let ceiling = self.progress.unlocked_ceiling(grade);
        if level > ceiling {
            return Err(LockedLevelError {
                grade,
                level,
                ceiling,
            });
        }
        Ok(())
    }

    pub(crate) fn enter_level(&mut self, grade: Grade, level: Level) {
        self.grade = grade;
        self.current_level = level;
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    pub(crate) fn award_correct(&mut self) {
        self.score = self.score.saturating_add(SCORE_PER_CORRECT);
    }

    pub fn reset_score(&mut self) {
        self.score = 0;
    }

    #[must_use]
    pub fn weak_topics(&self) -> &BTreeMap<String, u32> {
        &self.weak_topics
    }

    pub(crate) fn note_miss(&mut self, topic: &str) {
        if topic.is_empty() {
            return;
        }
        *self.weak_topics.entry(topic.to_string()).or_insert(0) += 1;
    }

    /// Topics with the most misses first; ties ordered by name.
    #[must_use]
    pub fn weakest_topics(&self, limit: usize) -> Vec<(&str, u32)> {
        let mut topics: Vec<(&str, u32)> = self
            .weak_topics
            .iter()
            .map(|(topic, misses)| (topic.as_str(), *misses))
            .collect();
        topics.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        topics.truncate(limit);
        topics
    }

    /// Graded answers across every level of this session, oldest first.
    ///
    /// Holds at most [`HISTORY_LIMIT`] entries.
    #[must_use]
    pub fn history(&self) -> &VecDeque<QuestionLogEntry> {
        &self.history
    }

    /// The `count` most recent answers, newest first.
    pub fn recent_history(&self, count: usize) -> impl Iterator<Item = &QuestionLogEntry> {
        self.history.iter().rev().take(count)
    }

    pub(crate) fn push_history(&mut self, entry: QuestionLogEntry) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(entry);
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: QuizSettings) {
        self.settings = settings;
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub(crate) fn progress_mut(&mut self) -> &mut ProgressStore {
        &mut self.progress
    }

    #[must_use]
    pub fn unlocked_ceiling(&self) -> Level {
        self.progress.unlocked_ceiling(self.grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerValue, Question};
    use crate::time::fixed_now;

    #[test]
    fn defaults_match_a_fresh_player() {
        let state = SessionState::default();
        assert_eq!(state.player().as_str(), "Player");
        assert_eq!(state.grade().value(), 3);
        assert_eq!(state.mode(), QuizMode::MathQuiz);
        assert_eq!(state.current_level(), Level::FIRST);
        assert_eq!(state.score(), 0);
        assert_eq!(state.settings().time_limit_secs(), 45);
    }

    #[test]
    fn player_name_is_trimmed_and_required() {
        assert_eq!(PlayerName::new("  Sara ").unwrap().as_str(), "Sara");
        assert_eq!(PlayerName::new("   "), Err(PlayerNameError::Empty));
    }

    #[test]
    fn locked_level_cannot_be_selected() {
        let mut state = SessionState::default();
        let err = state.select_level(Level::new(2).unwrap()).unwrap_err();
        assert_eq!(err.ceiling, Level::FIRST);
        assert_eq!(state.current_level(), Level::FIRST);
    }

    #[test]
    fn switching_grade_clamps_current_level() {
        let mut progress = ProgressStore::new();
        progress.raise_ceiling(Grade::new(3).unwrap(), Level::new(4).unwrap());
        let mut state = SessionState::new(PlayerName::default(), progress);
        state.select_level(Level::new(4).unwrap()).unwrap();

        state.select_grade(Grade::new(7).unwrap());
        assert_eq!(state.current_level(), Level::FIRST);
    }

    #[test]
    fn weakest_topics_sorted_by_misses_then_name() {
        let mut state = SessionState::default();
        for topic in ["lcm", "hcf", "lcm", "slope", "hcf", "lcm", ""] {
            state.note_miss(topic);
        }
        assert_eq!(state.weakest_topics(2), vec![("lcm", 3), ("hcf", 2)]);
        assert_eq!(state.weak_topics().len(), 3);
    }

    #[test]
    fn score_accumulates_and_resets() {
        let mut state = SessionState::default();
        state.award_correct();
        state.award_correct();
        assert_eq!(state.score(), 20);
        state.reset_score();
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn history_drops_oldest_past_limit() {
        let mut state = SessionState::default();
        let question = Question::math("addition", "1 + 1 = ?", AnswerValue::Number(2.0));
        for q_no in 1..=u32::try_from(HISTORY_LIMIT).unwrap() + 3 {
            state.push_history(QuestionLogEntry {
                q_no,
                question: question.clone(),
                given: "2".into(),
                is_correct: true,
                elapsed_secs: 1.0,
                answered_at: fixed_now(),
            });
        }
        assert_eq!(state.history().len(), HISTORY_LIMIT);
        assert_eq!(state.history().front().unwrap().q_no, 4);
        let recent: Vec<u32> = state.recent_history(2).map(|e| e.q_no).collect();
        let newest = u32::try_from(HISTORY_LIMIT).unwrap() + 3;
        assert_eq!(recent, vec![newest, newest - 1]);
    }
}
