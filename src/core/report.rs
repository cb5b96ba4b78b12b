use crate::core::scoring::score_conversation;
use crate::domain::model::{Conversation, Scenario, ScoreReport};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::io::Write;

pub const DEFAULT_SESSION_LIMIT: usize = 50;

const SESSION_PREFIX: &str = "session_";
const SESSION_SUFFIX: &str = ".json";

#[derive(Debug, Clone, PartialEq)]
pub struct SessionScore {
    pub session: String,
    pub turns: usize,
    pub rep_turns: usize,
    pub report: ScoreReport,
}

fn is_session_file(name: &str) -> bool {
    name.starts_with(SESSION_PREFIX) && name.ends_with(SESSION_SUFFIX)
}

/// Saved transcript names, newest first.
pub async fn list_sessions<S: Storage>(storage: &S, limit: usize) -> Result<Vec<String>> {
    let mut names: Vec<String> = storage
        .list_files("")
        .await?
        .into_iter()
        .filter(|n| is_session_file(n))
        .collect();
    names.sort_unstable_by(|a, b| b.cmp(a));
    names.truncate(limit);
    Ok(names)
}

pub async fn load_conversation<S: Storage>(storage: &S, name: &str) -> Result<Conversation> {
    let bytes = storage.read_file(name).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub async fn score_sessions<S: Storage>(
    storage: &S,
    scenario: &Scenario,
) -> Result<Vec<SessionScore>> {
    let mut rows = Vec::new();
    for name in list_sessions(storage, usize::MAX).await? {
        let conversation = match load_conversation(storage, &name).await {
            Ok(conversation) => conversation,
            Err(e) => {
                tracing::warn!("⚠️ Skipping unreadable session {}: {}", name, e);
                continue;
            }
        };

        rows.push(SessionScore {
            turns: conversation.len(),
            rep_turns: conversation.rep_turns().count(),
            report: score_conversation(&conversation, scenario),
            session: name,
        });
    }
    Ok(rows)
}

pub fn write_csv_report<W: Write>(rows: &[SessionScore], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "session",
        "turns",
        "rep_turns",
        "confidence_score",
        "objection_score",
        "outcome_rating",
        "tips",
    ])?;

    for row in rows {
        let scores = &row.report.scores;
        csv.write_record([
            row.session.clone(),
            row.turns.to_string(),
            row.rep_turns.to_string(),
            scores.confidence_score.to_string(),
            scores.objection_score.to_string(),
            scores.outcome_rating.to_string(),
            row.report.tips.join(" | "),
        ])?;
    }

    csv.flush()?;
    Ok(())
}
