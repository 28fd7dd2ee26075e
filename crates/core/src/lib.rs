#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod model;
pub mod provider;
pub mod rules;
pub mod time;

pub use engine::{AdvanceOutcome, EngineState, LevelEngine, QuestionOutcome};
pub use error::{EngineError, Error};
pub use provider::QuestionProvider;
pub use time::Clock;
