//! Fitness tools backed by the Hevy and Fitbit gateways.
//!
//! These are the read-only operations the model may call during a chat
//! turn. Gateway error payloads pass through as tool output so the model
//! can tell the user what the service said.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::clients::{FitbitClient, HevyClient};
use crate::error::{CoachError, Result};
use crate::fitness;

use super::{Tool, ToolContext};

/// Workouts fetched when the model does not say how many it wants.
const DEFAULT_WORKOUT_LIMIT: u64 = 3;
/// Routines scanned per lookup; generous enough for a personal account.
const ROUTINE_SEARCH_PAGE: u32 = 20;

/// Summarizes the most recent logged workouts.
pub struct RecentWorkoutsTool {
    hevy: Arc<HevyClient>,
}

impl RecentWorkoutsTool {
    pub fn new(hevy: Arc<HevyClient>) -> Self {
        Self { hevy }
    }
}

#[async_trait]
impl Tool for RecentWorkoutsTool {
    fn name(&self) -> &str {
        "get_recent_workouts"
    }

    fn description(&self) -> &str {
        "Fetch the most recent completed workouts: title, start time, total volume and exercise count. Use this to understand recent training."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "description": "How many workouts to fetch (default: 3)"
                }
            },
            "required": []
        })
    }

    async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<String> {
        let limit = args
            .get("limit")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_WORKOUT_LIMIT)
            .clamp(1, 50) as u32;
        let payload = self.hevy.get_workouts(1, limit).await?;
        if payload.get("error").is_some() {
            return Ok(payload.to_string());
        }
        Ok(serde_json::to_string(&fitness::summarize_workouts(
            &payload,
        ))?)
    }
}

/// Classifies today's training readiness from last night's sleep.
pub struct TodaysReadinessTool {
    fitbit: Arc<FitbitClient>,
}

impl TodaysReadinessTool {
    pub fn new(fitbit: Arc<FitbitClient>) -> Self {
        Self { fitbit }
    }
}

#[async_trait]
impl Tool for TodaysReadinessTool {
    fn name(&self) -> &str {
        "get_todays_readiness"
    }

    fn description(&self) -> &str {
        "Check today's recovery readiness from sleep data. Call this before recommending training intensity."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _args: Value, ctx: &ToolContext) -> Result<String> {
        let payload = self.fitbit.get_sleep_summary(ctx.today).await?;
        if payload.get("error").is_some() {
            return Ok(payload.to_string());
        }
        let readiness = fitness::classify_readiness(ctx.today, fitness::sleep_minutes(&payload));
        Ok(serde_json::to_string(&readiness)?)
    }
}

/// Looks up one saved routine by name.
pub struct RoutineDetailsTool {
    hevy: Arc<HevyClient>,
}

impl RoutineDetailsTool {
    pub fn new(hevy: Arc<HevyClient>) -> Self {
        Self { hevy }
    }
}

#[async_trait]
impl Tool for RoutineDetailsTool {
    fn name(&self) -> &str {
        "get_routine_details"
    }

    fn description(&self) -> &str {
        "Look up a saved workout routine by (partial) name and list its exercises with set counts."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "routine_name": {
                    "type": "string",
                    "description": "Name of the routine to search for, e.g. 'Leg Day'"
                }
            },
            "required": ["routine_name"]
        })
    }

    async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<String> {
        let query = args
            .get("routine_name")
            .and_then(Value::as_str)
            .ok_or_else(|| CoachError::Tool("missing 'routine_name' argument".into()))?;

        let payload = self.hevy.get_routines(1, ROUTINE_SEARCH_PAGE).await?;
        if payload.get("error").is_some() {
            return Ok(payload.to_string());
        }

        match fitness::find_routine(&payload, query) {
            Some(routine) => {
                let details = json!({
                    "id": routine.get("id").cloned().unwrap_or(Value::Null),
                    "title": routine.get("title").cloned().unwrap_or(Value::Null),
                    "exercises": fitness::compact_exercises(routine),
                });
                Ok(details.to_string())
            }
            None => Ok("Routine not found.".to_string()),
        }
    }
}
