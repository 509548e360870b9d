//! Interactive chat shell.
//!
//! One readline iteration is one turn: the user line is persisted, the
//! agent runs against the full stored transcript, and the final answer is
//! persisted and printed. A failed turn prints the error instead and stores
//! no assistant message; the user line stays in the transcript.

use std::sync::Arc;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{info, warn};

use crate::agent::AgentLoop;
use crate::config::Config;
use crate::providers::OpenAiCompatProvider;
use crate::session::{Role, Session, SessionStore, DEFAULT_TITLE};
use crate::tools::ToolContext;

pub async fn run(config: Config, session_id: Option<String>) -> anyhow::Result<()> {
    let store = SessionStore::open(&config.db_path).await?;
    let session = resolve_session(&store, session_id).await?;

    let registry = Arc::new(super::build_registry(&config));
    info!(tools = registry.len(), session = %session.id, "chat ready");

    let provider = Arc::new(OpenAiCompatProvider::new(&config.llm));
    let agent = AgentLoop::new(provider, registry);

    println!("FitCoach  (model {}, session {})", config.llm.model, session.id);
    println!("Type 'exit' to quit.\n");
    replay(&store, &session).await?;

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline("you> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
                    break;
                }
                let _ = editor.add_history_entry(line);
                run_one_turn(&store, &agent, &session.id, line).await?;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    println!("Until next session. Lift well.");
    Ok(())
}

async fn resolve_session(
    store: &SessionStore,
    session_id: Option<String>,
) -> anyhow::Result<Session> {
    match session_id {
        Some(id) => store
            .get_session(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("no such session: {id}")),
        None => Ok(store.create_session(DEFAULT_TITLE).await?),
    }
}

/// Print the transcript so far when resuming a session.
async fn replay(store: &SessionStore, session: &Session) -> anyhow::Result<()> {
    let history = store.history(&session.id).await?;
    for message in &history {
        match message.role {
            Role::User => println!("you> {}", message.content),
            Role::Assistant => println!("coach> {}\n", message.content),
            _ => {}
        }
    }
    Ok(())
}

/// Persist the user line, run the agent, persist and print the answer.
///
/// Agent failures are reported to the user but swallowed: the user message
/// stays in the transcript and the next turn starts clean.
async fn run_one_turn(
    store: &SessionStore,
    agent: &AgentLoop,
    session_id: &str,
    line: &str,
) -> anyhow::Result<()> {
    store.append_message(session_id, Role::User, line).await?;
    let history = store.history(session_id).await?;

    match agent.run_turn(&history, &ToolContext::new()).await {
        Ok(answer) => {
            store
                .append_message(session_id, Role::Assistant, &answer)
                .await?;
            println!("coach> {answer}\n");
        }
        Err(err) => {
            warn!(error = %err, "turn failed");
            println!("coach> (something went wrong: {err})\n");
        }
    }
    Ok(())
}
