//! Interactive terminal loop for the `play` command.

use std::io::{self, Write};

use quiz_core::model::{
    Grade, Level, PlayerName, Question, QuizMode, QuizSettings, SessionState,
};
use quiz_core::{AdvanceOutcome, EngineError, LevelEngine, QuestionOutcome};
use services::{AppServices, CatalogProvider, QuizAnswerResult};

use crate::Args;

const CHOICE_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];
const WEAK_TOPICS_SHOWN: usize = 3;
const RECENT_HISTORY_SHOWN: usize = 5;

pub(crate) struct PlayOptions {
    player: PlayerName,
    grade: Grade,
    mode: QuizMode,
    level: Option<Level>,
    settings: QuizSettings,
    seed: Option<u64>,
}

impl From<&Args> for PlayOptions {
    fn from(args: &Args) -> Self {
        Self {
            player: args.player.clone(),
            grade: args.grade,
            mode: args.mode,
            level: args.level,
            settings: args.settings,
            seed: args.seed,
        }
    }
}

enum AfterLevel {
    Continue,
    Quit,
}

pub(crate) async fn run(
    services: &AppServices,
    options: PlayOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let quiz = services.quiz_loop();
    let provider = options
        .seed
        .map_or_else(CatalogProvider::new, CatalogProvider::seeded);
    let mut engine = quiz
        .open_engine(options.player, options.settings, provider)
        .await;

    engine.state_mut().select_mode(options.mode);
    engine.state_mut().select_grade(options.grade);
    let level = options
        .level
        .unwrap_or_else(|| engine.state().unlocked_ceiling());
    engine.start(options.grade, level)?;

    println!(
        "Welcome {}! Grade {}, {} mode. Type your answer, or :q to stop.",
        engine.state().player(),
        options.grade,
        engine.state().mode()
    );

    loop {
        let question = engine.current_question()?.clone();
        render_question(&engine, &question);

        let Some(line) = read_line()? else {
            engine.abandon();
            break;
        };
        if is_quit(&line) {
            engine.abandon();
            break;
        }

        let result = if engine.is_time_up() {
            println!("Time's up!");
            quiz.submit_timeout(&mut engine).await?
        } else {
            quiz.submit(&mut engine, &resolve_choice(&question, &line))
                .await?
        };
        render_feedback(&result);

        if let QuestionOutcome::LevelComplete(_) = result.outcome {
            render_summary(&engine);
            if let AfterLevel::Quit = after_level(&mut engine)? {
                break;
            }
        }
    }

    let saved = match quiz.save_progress(engine.state()).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(
                player = %engine.state().player(),
                error = %err,
                "failed to save progress on exit"
            );
            false
        }
    };
    render_closing(&mut io::stdout().lock(), engine.state(), saved)?;
    Ok(())
}

fn after_level(engine: &mut LevelEngine) -> Result<AfterLevel, Box<dyn std::error::Error>> {
    loop {
        print!("[n]ext level, [r]etry, [q]uit > ");
        io::stdout().flush()?;
        let Some(line) = read_line()? else {
            return Ok(AfterLevel::Quit);
        };
        match line.trim().to_ascii_lowercase().as_str() {
            "n" | "next" => match engine.advance_level() {
                Ok(AdvanceOutcome::Started(level)) => {
                    println!("Level {level} unlocked. Go!");
                    return Ok(AfterLevel::Continue);
                }
                Ok(AdvanceOutcome::GradeComplete) => {
                    println!("You completed all levels for this grade!");
                    return Ok(AfterLevel::Quit);
                }
                Err(EngineError::NotPassed) => {
                    println!("You need 70% to move on. Try the level again.");
                }
                Err(err) => return Err(err.into()),
            },
            "r" | "retry" => {
                engine.retry()?;
                return Ok(AfterLevel::Continue);
            }
            "q" | "quit" | ":q" => return Ok(AfterLevel::Quit),
            _ => {}
        }
    }
}

fn render_question(engine: &LevelEngine, question: &Question) {
    let state = engine.state();
    if let Some(session) = engine.level_session() {
        let progress = session.progress();
        println!();
        println!(
            "Grade {} · Level {} · Question {}/{} · Score {} · {}s to answer",
            session.grade(),
            session.level(),
            progress.answered + 1,
            progress.total,
            state.score(),
            state.settings().time_limit_secs()
        );
    }
    if let Some(sketch) = question.sketch() {
        println!(
            "[{:?}, {}×{} px]",
            sketch.shape, sketch.width_px, sketch.height_px
        );
    }
    println!("{}", question.prompt());
    if let Some(choices) = question.choices() {
        let line = CHOICE_LABELS
            .iter()
            .zip(choices)
            .map(|(label, choice)| format!("{label}) {choice}"))
            .collect::<Vec<_>>()
            .join("   ");
        println!("{line}");
    }
    print!("> ");
    let _ = io::stdout().flush();
}

fn render_feedback(result: &QuizAnswerResult) {
    let entry = &result.entry;
    if entry.is_correct {
        println!("Correct! ({:.1}s)", entry.elapsed_secs);
    } else {
        println!(
            "Not quite. The answer was {}.",
            entry.question.expected_answer()
        );
    }
    if result.leaderboard_id.is_none() {
        println!("(this answer could not be saved to the leaderboard)");
    }
}

fn render_summary(engine: &LevelEngine) {
    let Some(session) = engine.level_session() else {
        return;
    };
    let Some(result) = session.result() else {
        return;
    };
    println!();
    println!(
        "Level {} finished: {}/{} correct ({}%).",
        session.level(),
        result.correct_count(),
        result.total(),
        result.percent()
    );
    if result.passed() {
        println!("Passed!");
    } else {
        println!("Not passed this time.");
    }
}

fn render_closing(out: &mut impl Write, state: &SessionState, saved: bool) -> io::Result<()> {
    writeln!(out)?;
    if !saved {
        writeln!(out, "(progress could not be saved this time)")?;
    }
    writeln!(out, "Final score: {}", state.score())?;

    let recent: Vec<_> = state.recent_history(RECENT_HISTORY_SHOWN).collect();
    if !recent.is_empty() {
        writeln!(out, "Recent history:")?;
        for entry in recent {
            let mark = if entry.is_correct { "✓" } else { "✗" };
            writeln!(
                out,
                "  {mark} {}  you said: {}",
                entry.question.prompt(),
                if entry.given.is_empty() { "-" } else { entry.given.as_str() }
            )?;
        }
    }

    let weakest = state.weakest_topics(WEAK_TOPICS_SHOWN);
    if weakest.is_empty() {
        return Ok(());
    }
    let listed = weakest
        .iter()
        .map(|(topic, misses)| format!("{topic} ({misses})"))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "Topics to practise: {listed}")
}

/// Map a choice letter to the value it labels; anything else passes through.
fn resolve_choice(question: &Question, line: &str) -> String {
    let trimmed = line.trim();
    let mut chars = trimmed.chars();
    if let (Some(first), None, Some(choices)) = (chars.next(), chars.next(), question.choices()) {
        let upper = first.to_ascii_uppercase();
        if let Some(index) = CHOICE_LABELS.iter().position(|label| *label == upper) {
            if let Some(choice) = choices.get(index) {
                return choice.to_string();
            }
        }
    }
    trimmed.to_owned()
}

fn is_quit(line: &str) -> bool {
    matches!(line.trim(), ":q" | ":quit")
}

fn read_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerValue, ShapeKind, ShapeSketch};
    use quiz_core::time::fixed_clock;

    fn shape_question() -> Question {
        Question::shape(
            "square_area",
            "A square has side 5 units. What is its area?",
            AnswerValue::Number(25.0),
            ShapeSketch {
                shape: ShapeKind::Square,
                width_px: 50,
                height_px: 50,
            },
        )
        .with_choices(vec![
            AnswerValue::Number(22.0),
            AnswerValue::Number(25.0),
            AnswerValue::Number(28.0),
            AnswerValue::Number(30.0),
        ])
    }

    #[test]
    fn choice_letters_map_to_values() {
        let q = shape_question();
        assert_eq!(resolve_choice(&q, "b\n"), "25");
        assert_eq!(resolve_choice(&q, " D "), "30");
        assert!(q.is_correct(&resolve_choice(&q, "B")));
    }

    #[test]
    fn non_letters_pass_through_trimmed() {
        let q = shape_question();
        assert_eq!(resolve_choice(&q, "25\n"), "25");
        assert_eq!(resolve_choice(&q, "E"), "E");

        let math = Question::math("comparison", "3 ? 4", AnswerValue::text("<"));
        assert_eq!(resolve_choice(&math, "a"), "a");
    }

    #[test]
    fn quit_commands() {
        assert!(is_quit(":q\n"));
        assert!(is_quit(" :quit"));
        assert!(!is_quit("q"));
    }

    fn closing_text(state: &SessionState, saved: bool) -> String {
        let mut out = Vec::new();
        render_closing(&mut out, state, saved).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn played_engine(answers: &[&str]) -> LevelEngine {
        let provider = |_: Grade, _: QuizMode| {
            Question::math("division", "12 ÷ 4 = ?", AnswerValue::Number(3.0))
        };
        let mut engine =
            LevelEngine::new(SessionState::default(), provider).with_clock(fixed_clock());
        engine.start(Grade::default(), Level::FIRST).unwrap();
        for answer in answers {
            engine.submit(answer).unwrap();
        }
        engine
    }

    #[test]
    fn closing_shows_score_without_misses() {
        let engine = played_engine(&["3", "3"]);
        let text = closing_text(engine.state(), true);
        assert!(text.contains("Final score: 20"));
        assert!(!text.contains("Topics to practise"));
        assert!(!text.contains("could not be saved"));
    }

    #[test]
    fn closing_after_failed_save_still_shows_summary() {
        let engine = played_engine(&["3", "5"]);
        let text = closing_text(engine.state(), false);
        assert!(text.contains("(progress could not be saved this time)"));
        assert!(text.contains("Final score: 10"));
        assert!(text.contains("Topics to practise: division (1)"));
    }

    #[test]
    fn closing_lists_five_most_recent_answers_newest_first() {
        let engine = played_engine(&["1", "2", "3", "4", "5", "6", ""]);
        let text = closing_text(engine.state(), true);
        let lines: Vec<&str> = text
            .lines()
            .filter(|line| line.starts_with("  "))
            .collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].ends_with("you said: -"));
        assert!(lines[1].ends_with("you said: 6"));
        assert!(lines[3].starts_with("  ✗") && lines[3].ends_with("you said: 4"));
        assert!(lines[4].starts_with("  ✓") && lines[4].ends_with("you said: 3"));
    }
}
