#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod error;
pub mod leaderboard_service;
pub mod progress_transfer;
pub mod quiz_loop;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use catalog::{CatalogProvider, Topic};
pub use error::{AppServicesError, ProgressTransferError, QuizError};
pub use leaderboard_service::{DEFAULT_LEADERBOARD_LIMIT, LeaderboardService};
pub use progress_transfer::ProgressTransferService;
pub use quiz_loop::{QuizAnswerResult, QuizLoopService};
