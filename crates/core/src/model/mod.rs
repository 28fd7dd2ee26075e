mod answer;
mod ids;
mod level;
mod progress;
mod question;
mod session;
mod settings;

pub use answer::AnswerValue;
pub use ids::{AttemptId, Grade, Level, RangeError};
pub use level::{LevelProgress, LevelResult, LevelResultError, LevelSession, QuestionLogEntry};
pub use progress::ProgressStore;
pub use question::{ParseModeError, Question, QuestionKind, QuizMode, ShapeKind, ShapeSketch};
pub use session::{LockedLevelError, PlayerName, PlayerNameError, SessionState};
pub use settings::{QuizSettings, SettingsError};
