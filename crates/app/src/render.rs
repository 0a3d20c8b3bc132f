//! Plain-text rendering of session snapshots and action results.

use std::fmt::Write as _;

use quiz_core::AnswerOutcome;
use services::{FreeActionResult, QuestionView, SessionSnapshot};

const PROGRESS_BAR_WIDTH: usize = 20;

pub fn render_status(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} | Level {} | XP {} | Score {}",
        snapshot.player_name, snapshot.level, snapshot.xp, snapshot.score
    );
    let _ = writeln!(
        out,
        "Mission {} {}%",
        progress_bar(snapshot.mission_progress),
        snapshot.mission_progress
    );
    let _ = writeln!(
        out,
        "Quiz {}/{} answered{}",
        snapshot.progress.answered,
        snapshot.progress.total,
        if snapshot.quiz_completed {
            " (complete)"
        } else {
            ""
        }
    );
    if !snapshot.badges.is_empty() {
        let _ = writeln!(out, "Badges: {}", snapshot.badges.join(", "));
    }
    out
}

pub fn render_question(view: &QuestionView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Question {} of {}", view.number, view.total);
    let _ = writeln!(out, "{}", view.prompt);
    for (index, option) in view.options.iter().enumerate() {
        let marker = match (view.selected, view.correct_index) {
            (_, Some(correct)) if correct == index => "✓",
            (Some(selected), _) if selected == index => "✗",
            _ => " ",
        };
        let _ = writeln!(out, " {marker} {}. {option}", index + 1);
    }
    if let Some(rationale) = &view.rationale {
        let _ = writeln!(out, "Why: {rationale}");
    }
    out
}

pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut out = render_status(snapshot);
    if let Some(view) = &snapshot.current_question {
        out.push('\n');
        out.push_str(&render_question(view));
    }
    out
}

pub fn render_free_action(result: &FreeActionResult) -> String {
    let mut out = String::new();
    if let Some(entry) = &result.feedback {
        let _ = writeln!(out, "{}", entry.title());
        let _ = writeln!(out, "{}", entry.body());
    }
    if result.outcome.known {
        let delta = result.outcome.delta;
        let _ = writeln!(
            out,
            "Score {:+}, mission {:+}%",
            delta.score, delta.progress
        );
    } else {
        let _ = writeln!(out, "Nothing happens. Type `help` for commands.");
    }
    out
}

pub fn render_answer(outcome: &AnswerOutcome) -> String {
    let mut out = String::new();
    let verdict = if outcome.is_correct {
        "Correct!"
    } else {
        "Not quite."
    };
    let _ = writeln!(out, "{verdict} {}", outcome.rationale);
    if outcome.bonus_awarded != 0 {
        let _ = writeln!(out, "+{} points", outcome.bonus_awarded);
    } else if !outcome.first_submission {
        let _ = writeln!(out, "Answer changed; this question was already scored.");
    }
    if let Some(badge) = &outcome.badge_earned {
        let _ = writeln!(out, "Badge earned: {badge}");
    }
    if outcome.quiz_completed {
        let _ = writeln!(out, "Quiz complete.");
    }
    out
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * PROGRESS_BAR_WIDTH / 100;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}
