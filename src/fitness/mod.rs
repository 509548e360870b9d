//! Pure transforms over fitness API payloads.
//!
//! Everything here is I/O-free: gateway JSON in, typed summaries out. The
//! tools and the planning workflow both build on these functions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Minutes asleep above which the athlete counts as fully recovered (7h).
const HIGH_READINESS_MINUTES: i64 = 420;
/// Minutes asleep at or below which training should be dialed back (5h).
const HIGH_FATIGUE_MINUTES: i64 = 300;

/// Compact projection of one logged workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub title: String,
    pub start_time: String,
    pub volume_kg: f64,
    pub exercises_count: usize,
}

/// Training-readiness buckets derived from sleep duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessStatus {
    #[serde(rename = "High Readiness")]
    HighReadiness,
    #[serde(rename = "Moderate Fatigue")]
    ModerateFatigue,
    #[serde(rename = "High Fatigue - Caution Recommended")]
    HighFatigue,
}

impl ReadinessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighReadiness => "High Readiness",
            Self::ModerateFatigue => "Moderate Fatigue",
            Self::HighFatigue => "High Fatigue - Caution Recommended",
        }
    }
}

impl std::fmt::Display for ReadinessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Daily readiness classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readiness {
    pub date: NaiveDate,
    pub sleep_minutes: i64,
    pub sleep_hours: f64,
    pub status: ReadinessStatus,
}

/// Classify recovery from minutes slept.
///
/// More than seven hours is full readiness, more than five is moderate
/// fatigue, anything at or below five hours calls for caution.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use fitcoach::fitness::{classify_readiness, ReadinessStatus};
///
/// let date = NaiveDate::from_ymd_opt(2026, 8, 22).unwrap();
/// let readiness = classify_readiness(date, 480);
/// assert_eq!(readiness.status, ReadinessStatus::HighReadiness);
/// assert_eq!(readiness.sleep_hours, 8.0);
/// ```
pub fn classify_readiness(date: NaiveDate, sleep_minutes: i64) -> Readiness {
    let status = if sleep_minutes > HIGH_READINESS_MINUTES {
        ReadinessStatus::HighReadiness
    } else if sleep_minutes > HIGH_FATIGUE_MINUTES {
        ReadinessStatus::ModerateFatigue
    } else {
        ReadinessStatus::HighFatigue
    };
    Readiness {
        date,
        sleep_minutes,
        sleep_hours: round_tenth(sleep_minutes as f64 / 60.0),
        status,
    }
}

/// Total minutes asleep from a Fitbit sleep payload, zero when absent.
pub fn sleep_minutes(payload: &Value) -> i64 {
    payload
        .pointer("/summary/totalMinutesAsleep")
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

/// Resting heart rate from a Fitbit heart payload, when reported.
pub fn resting_heart_rate(payload: &Value) -> Option<i64> {
    payload
        .pointer("/activities-heart/0/value/restingHeartRate")
        .and_then(Value::as_i64)
}

/// Project a Hevy workouts payload into per-workout summaries.
///
/// Tolerates missing fields: absent titles and volumes become empty / zero
/// rather than dropping the workout.
pub fn summarize_workouts(payload: &Value) -> Vec<WorkoutSummary> {
    let Some(workouts) = payload.get("workouts").and_then(Value::as_array) else {
        return Vec::new();
    };
    workouts
        .iter()
        .map(|workout| WorkoutSummary {
            title: text_field(workout, "title"),
            start_time: text_field(workout, "start_time"),
            volume_kg: workout
                .get("volume_kg")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            exercises_count: workout
                .get("exercises")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
        })
        .collect()
}

/// Find a routine by case-insensitive title substring; first match wins.
///
/// Search order is the gateway's order, so duplicated names resolve to the
/// earliest page entry.
pub fn find_routine<'a>(payload: &'a Value, query: &str) -> Option<&'a Value> {
    let needle = query.to_lowercase();
    payload
        .get("routines")?
        .as_array()?
        .iter()
        .find(|routine| {
            routine
                .get("title")
                .and_then(Value::as_str)
                .is_some_and(|title| title.to_lowercase().contains(&needle))
        })
}

/// Render a routine's exercises as `"<title> (<N> sets)"` lines, dropping
/// per-set weight and rep detail.
pub fn compact_exercises(routine: &Value) -> Vec<String> {
    routine
        .get("exercises")
        .and_then(Value::as_array)
        .map(|exercises| {
            exercises
                .iter()
                .map(|exercise| {
                    let title = exercise
                        .get("title")
                        .and_then(Value::as_str)
                        .unwrap_or("Unknown Exercise");
                    let sets = exercise
                        .get("sets")
                        .and_then(Value::as_array)
                        .map_or(0, Vec::len);
                    format!("{title} ({sets} sets)")
                })
                .collect()
        })
        .unwrap_or_default()
}

fn text_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 22).unwrap()
    }

    #[test]
    fn test_readiness_above_seven_hours_is_high() {
        assert_eq!(
            classify_readiness(date(), 421).status,
            ReadinessStatus::HighReadiness
        );
        assert_eq!(
            classify_readiness(date(), 480).status,
            ReadinessStatus::HighReadiness
        );
    }

    #[test]
    fn test_readiness_boundary_at_seven_hours() {
        // Exactly 420 minutes is not "more than seven hours".
        assert_eq!(
            classify_readiness(date(), 420).status,
            ReadinessStatus::ModerateFatigue
        );
    }

    #[test]
    fn test_readiness_boundary_at_five_hours() {
        assert_eq!(
            classify_readiness(date(), 301).status,
            ReadinessStatus::ModerateFatigue
        );
        assert_eq!(
            classify_readiness(date(), 300).status,
            ReadinessStatus::HighFatigue
        );
    }

    #[test]
    fn test_readiness_zero_minutes_is_high_fatigue() {
        let readiness = classify_readiness(date(), 0);
        assert_eq!(readiness.status, ReadinessStatus::HighFatigue);
        assert_eq!(readiness.sleep_hours, 0.0);
    }

    #[test]
    fn test_sleep_hours_rounds_to_one_decimal() {
        assert_eq!(classify_readiness(date(), 400).sleep_hours, 6.7);
        assert_eq!(classify_readiness(date(), 380).sleep_hours, 6.3);
        assert_eq!(classify_readiness(date(), 432).sleep_hours, 7.2);
    }

    #[test]
    fn test_status_serializes_to_display_strings() {
        let readiness = classify_readiness(date(), 200);
        let encoded = serde_json::to_value(&readiness).unwrap();
        assert_eq!(encoded["status"], "High Fatigue - Caution Recommended");
        assert_eq!(encoded["date"], "2026-08-22");
    }

    #[test]
    fn test_sleep_minutes_extraction() {
        let payload = json!({"summary": {"totalMinutesAsleep": 432}});
        assert_eq!(sleep_minutes(&payload), 432);
        assert_eq!(sleep_minutes(&json!({"summary": {}})), 0);
        assert_eq!(sleep_minutes(&json!({"error": "expired"})), 0);
    }

    #[test]
    fn test_resting_heart_rate_extraction() {
        let payload = json!({
            "activities-heart": [{"dateTime": "2026-08-22", "value": {"restingHeartRate": 58}}]
        });
        assert_eq!(resting_heart_rate(&payload), Some(58));
        assert_eq!(resting_heart_rate(&json!({"activities-heart": []})), None);
    }

    #[test]
    fn test_summarize_workouts_projects_fields() {
        let payload = json!({
            "workouts": [
                {
                    "id": "w1",
                    "title": "Push Day",
                    "start_time": "2026-08-20T17:05:00+00:00",
                    "volume_kg": 5120.5,
                    "exercises": [{"title": "Bench Press"}, {"title": "Dips"}]
                },
                {
                    "id": "w2",
                    "title": "Pull Day",
                    "start_time": "2026-08-18T17:10:00+00:00",
                    "volume_kg": 4300.0,
                    "exercises": [{"title": "Deadlift"}]
                }
            ]
        });
        let summaries = summarize_workouts(&payload);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].title, "Push Day");
        assert_eq!(summaries[0].volume_kg, 5120.5);
        assert_eq!(summaries[0].exercises_count, 2);
        assert_eq!(summaries[1].exercises_count, 1);
    }

    #[test]
    fn test_summarize_workouts_tolerates_missing_fields() {
        let payload = json!({"workouts": [{"id": "w1"}]});
        let summaries = summarize_workouts(&payload);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].title, "");
        assert_eq!(summaries[0].volume_kg, 0.0);
        assert_eq!(summaries[0].exercises_count, 0);
    }

    #[test]
    fn test_summarize_workouts_without_list_is_empty() {
        assert!(summarize_workouts(&json!({"error": "nope"})).is_empty());
        assert!(summarize_workouts(&json!({})).is_empty());
    }

    #[test]
    fn test_find_routine_is_case_insensitive_first_match() {
        let payload = json!({
            "routines": [
                {"id": "r1", "title": "Leg Day"},
                {"id": "r2", "title": "leg press focus"}
            ]
        });
        let found = find_routine(&payload, "LEG").unwrap();
        assert_eq!(found["title"], "Leg Day");
    }

    #[test]
    fn test_find_routine_substring_match() {
        let payload = json!({
            "routines": [
                {"id": "r1", "title": "Upper Body A"},
                {"id": "r2", "title": "Lower Body A"}
            ]
        });
        let found = find_routine(&payload, "lower").unwrap();
        assert_eq!(found["id"], "r2");
        assert!(find_routine(&payload, "conditioning").is_none());
    }

    #[test]
    fn test_find_routine_skips_untitled_entries() {
        let payload = json!({
            "routines": [
                {"id": "r1"},
                {"id": "r2", "title": "Full Body"}
            ]
        });
        let found = find_routine(&payload, "full").unwrap();
        assert_eq!(found["id"], "r2");
    }

    #[test]
    fn test_compact_exercises_renders_set_counts() {
        let routine = json!({
            "title": "Leg Day",
            "exercises": [
                {"title": "Squat", "sets": [{}, {}, {}]},
                {"title": "Leg Curl", "sets": [{}, {}]},
                {"sets": [{}]}
            ]
        });
        assert_eq!(
            compact_exercises(&routine),
            vec![
                "Squat (3 sets)",
                "Leg Curl (2 sets)",
                "Unknown Exercise (1 sets)"
            ]
        );
    }

    #[test]
    fn test_compact_exercises_empty_without_list() {
        assert!(compact_exercises(&json!({"title": "Leg Day"})).is_empty());
    }
}
