//! Readiness-adjusted routine planning.
//!
//! `fitcoach plan` reads today's recovery signals from Fitbit, hands the
//! target Hevy routine to the model with instructions to scale the work to
//! the athlete's state, then PUTs the adjusted routine back to Hevy after
//! the user confirms.

use std::io::{self, Write};

use chrono::Local;
use serde_json::Value;
use tracing::info;

use crate::config::Config;
use crate::fitness::{classify_readiness, find_routine, resting_heart_rate, sleep_minutes, Readiness};
use crate::providers::{LLMProvider, ModelReply, OpenAiCompatProvider};
use crate::session::Message;

/// Routines fetched when searching for the target by name.
const ROUTINE_PAGE: u32 = 20;

const PLANNER_PROMPT: &str = "You are a strength and conditioning coach adjusting one Hevy \
routine for today's training session. You will receive the athlete's recovery state and the \
routine as JSON. When recovery is poor, reduce sets or load; when recovery is good, keep the \
plan or progress it slightly. Never change which exercises appear. Reply with a single JSON \
object of the shape {\"exercises\": [...], \"notes\": \"...\"} where exercises is the full \
adjusted exercise list in Hevy's routine format and notes is one short sentence explaining \
the adjustment. Reply with JSON only, no prose and no markdown fences.";

pub async fn run(config: Config, routine: Option<String>, yes: bool) -> anyhow::Result<()> {
    let hevy = super::hevy_client(&config)
        .ok_or_else(|| anyhow::anyhow!("HEVY_API_KEY is required for planning"))?;
    let fitbit = super::fitbit_client(&config)
        .ok_or_else(|| anyhow::anyhow!("FITBIT_ACCESS_TOKEN is required for planning"))?;
    let provider = OpenAiCompatProvider::new(&config.llm);

    let today = Local::now().date_naive();
    let sleep = fitbit.get_sleep_summary(today).await?;
    let heart = fitbit.get_heart_rate(today).await?;
    let readiness = classify_readiness(today, sleep_minutes(&sleep));
    let resting_hr = resting_heart_rate(&heart);

    match resting_hr {
        Some(hr) => println!(
            "Readiness: {} ({:.1}h sleep, resting HR {hr})",
            readiness.status, readiness.sleep_hours
        ),
        None => println!(
            "Readiness: {} ({:.1}h sleep)",
            readiness.status, readiness.sleep_hours
        ),
    }

    let routines = hevy.get_routines(1, ROUTINE_PAGE).await?;
    if let Some(api_err) = routines.pointer("/error").and_then(Value::as_str) {
        anyhow::bail!("Hevy returned an error: {api_err}");
    }
    let target = match &routine {
        Some(query) => find_routine(&routines, query),
        None => routines.pointer("/routines/0"),
    }
    .ok_or_else(|| anyhow::anyhow!("no matching routine found"))?;

    let title = target
        .pointer("/title")
        .and_then(Value::as_str)
        .unwrap_or("Untitled")
        .to_string();
    let routine_id = target
        .pointer("/id")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("routine '{title}' carries no id"))?
        .to_string();

    let update = propose(&provider, &readiness, resting_hr, target).await?;
    let set_count = update
        .pointer("/exercises")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    let notes = update
        .pointer("/notes")
        .and_then(Value::as_str)
        .unwrap_or("(no notes)");

    println!("\nProposed update for '{title}' ({set_count} exercises):");
    println!("  {notes}");

    if !yes && !confirm(&format!("Apply this update to '{title}'?"))? {
        println!("Left '{title}' unchanged.");
        return Ok(());
    }

    let outcome = hevy.update_routine(&routine_id, &update).await?;
    if let Some(api_err) = outcome.pointer("/error").and_then(Value::as_str) {
        anyhow::bail!("Hevy rejected the update: {api_err}");
    }
    info!(routine = %routine_id, "routine updated");
    println!("Updated '{title}'.");
    Ok(())
}

/// Ask the model for the adjusted routine.
async fn propose(
    provider: &dyn LLMProvider,
    readiness: &Readiness,
    resting_hr: Option<i64>,
    routine: &Value,
) -> anyhow::Result<Value> {
    let brief = format!(
        "Recovery state: {}\nSleep last night: {:.1} hours\nResting heart rate: {}\n\nRoutine:\n{}",
        readiness.status,
        readiness.sleep_hours,
        resting_hr.map_or_else(|| "unknown".to_string(), |hr| format!("{hr} bpm")),
        serde_json::to_string_pretty(routine)?,
    );
    let messages = [Message::system(PLANNER_PROMPT), Message::user(brief)];

    let update = match provider.chat(&messages, &[]).await? {
        ModelReply::Answer(text) => parse_json_reply(&text)?,
        ModelReply::ToolCalls { .. } => {
            anyhow::bail!("model requested tools while drafting a plan")
        }
    };
    if update.pointer("/exercises").and_then(Value::as_array).is_none() {
        anyhow::bail!("plan carried no exercise list");
    }
    Ok(update)
}

/// Pull the JSON object out of a model reply.
///
/// Models wrap JSON in markdown fences or lead-in prose often enough that
/// slicing from the first `{` to the last `}` is the reliable move.
fn parse_json_reply(text: &str) -> anyhow::Result<Value> {
    let start = text
        .find('{')
        .ok_or_else(|| anyhow::anyhow!("model reply carried no JSON object"))?;
    let end = text
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| anyhow::anyhow!("model reply carried no JSON object"))?;
    Ok(serde_json::from_str(&text[start..=end])?)
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
