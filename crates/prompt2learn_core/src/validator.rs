//! crates/prompt2learn_core/src/validator.rs
//!
//! Checks a recovered JSON value against the plan shape and copies it into a
//! normalized [`StudyPlan`], applying defaults for optional fields.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::{PlanDay, PlanLesson, StudyPlan};
use crate::error::PlanError;

/// Title used when the model does not supply a usable `courseTitle`.
pub const DEFAULT_FALLBACK_TITLE: &str = "7-Day Study Plan";

/// Caller-controlled knobs for plan validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub fallback_title: String,
    /// When set, the plan must contain exactly this many days.
    pub expected_days: Option<usize>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            fallback_title: DEFAULT_FALLBACK_TITLE.to_string(),
            expected_days: None,
        }
    }
}

/// Validates `value` and returns the normalized plan, or the first violated constraint.
pub fn validate_plan(value: &Value, policy: &ValidationPolicy) -> Result<StudyPlan, PlanError> {
    let root = match value {
        Value::Null => return Err(invalid("plan is null")),
        Value::Object(map) => map,
        _ => return Err(invalid("plan is not a JSON object")),
    };

    let raw_days = match root.get("days") {
        Some(Value::Array(days)) => days,
        Some(_) => return Err(invalid("`days` is not an array")),
        None => return Err(invalid("plan has no `days`")),
    };
    if raw_days.is_empty() {
        return Err(invalid("`days` is empty"));
    }
    if let Some(expected) = policy.expected_days {
        if raw_days.len() != expected {
            return Err(invalid(format!(
                "expected {expected} days, got {}",
                raw_days.len()
            )));
        }
    }

    let course_title = match optional_str(root, "courseTitle", "plan")? {
        Some(title) => title,
        None => policy.fallback_title.clone(),
    };

    let mut seen = HashSet::with_capacity(raw_days.len());
    let mut days = Vec::with_capacity(raw_days.len());
    for (position, raw_day) in raw_days.iter().enumerate() {
        let day = normalize_day(raw_day, position)?;
        if !seen.insert(day.day_index) {
            return Err(invalid(format!("duplicate dayIndex {}", day.day_index)));
        }
        // Storage holds lessons only, so an empty day could not be read back.
        if day.lessons.is_empty() {
            warn!(day_index = day.day_index, "Dropping plan day with no lessons");
            continue;
        }
        days.push(day);
    }

    if days.is_empty() {
        return Err(invalid("plan contains no lessons"));
    }
    Ok(StudyPlan { course_title, days })
}

fn normalize_day(raw: &Value, position: usize) -> Result<PlanDay, PlanError> {
    let context = format!("days[{position}]");
    let day = raw
        .as_object()
        .ok_or_else(|| invalid(format!("{context} is not an object")))?;

    let day_index = match day.get("dayIndex") {
        None | Some(Value::Null) => position as i32 + 1,
        Some(v) => positive_index(v).ok_or_else(|| {
            invalid(format!("{context}.dayIndex must be a positive integer"))
        })?,
    };

    let day_title = optional_str(day, "dayTitle", &context)?
        .unwrap_or_else(|| format!("Day {day_index}"));

    let raw_lessons = match day.get("lessons") {
        Some(Value::Array(lessons)) => lessons,
        Some(_) => return Err(invalid(format!("{context}.lessons is not an array"))),
        None => return Err(invalid(format!("{context} has no `lessons`"))),
    };

    let lessons = raw_lessons
        .iter()
        .enumerate()
        .map(|(i, lesson)| normalize_lesson(lesson, &format!("{context}.lessons[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PlanDay {
        day_index,
        day_title,
        lessons,
    })
}

fn normalize_lesson(raw: &Value, context: &str) -> Result<PlanLesson, PlanError> {
    let lesson = raw
        .as_object()
        .ok_or_else(|| invalid(format!("{context} is not an object")))?;

    let title = match lesson.get("title") {
        Some(Value::String(title)) if !title.trim().is_empty() => {
            text_field(title, &format!("{context}.title"))?
        }
        Some(Value::String(_)) => return Err(invalid(format!("{context}.title is empty"))),
        Some(_) => return Err(invalid(format!("{context}.title is not a string"))),
        None => return Err(invalid(format!("{context} has no `title`"))),
    };

    let description = match lesson.get("description") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text_field(text, &format!("{context}.description"))?,
        Some(_) => return Err(invalid(format!("{context}.description is not a string"))),
    };

    Ok(PlanLesson { title, description })
}

/// Reads an optional string field. Missing, null and blank values all count as absent.
fn optional_str(
    map: &Map<String, Value>,
    key: &str,
    context: &str,
) -> Result<Option<String>, PlanError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => text_field(s, &format!("{context}.{key}")).map(Some),
        Some(_) => Err(invalid(format!("{context}.{key} is not a string"))),
    }
}

/// PostgreSQL text columns cannot hold NUL, so such text is model garbage.
fn text_field(text: &str, field: &str) -> Result<String, PlanError> {
    if text.contains('\0') {
        return Err(invalid(format!("{field} contains a NUL character")));
    }
    Ok(text.to_string())
}

/// Accepts positive integers, including integral floats such as `2.0`.
fn positive_index(value: &Value) -> Option<i32> {
    let n = match value.as_i64() {
        Some(n) => n,
        None => {
            let f = value.as_f64()?;
            if f.fract() != 0.0 {
                return None;
            }
            f as i64
        }
    };
    i32::try_from(n).ok().filter(|n| *n > 0)
}

fn invalid(msg: impl Into<String>) -> PlanError {
    PlanError::InvalidPlanShape(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(value: Value) -> Result<StudyPlan, PlanError> {
        validate_plan(&value, &ValidationPolicy::default())
    }

    fn shape_error(value: Value) -> String {
        match validate(value) {
            Err(PlanError::InvalidPlanShape(msg)) => msg,
            other => panic!("expected InvalidPlanShape, got {other:?}"),
        }
    }

    #[test]
    fn accepts_complete_plan() {
        let plan = validate(json!({
            "courseTitle": "Learn Rust",
            "days": [
                {"dayIndex": 1, "dayTitle": "Basics", "lessons": [
                    {"title": "Install", "description": "rustup"},
                    {"title": "Hello", "description": "cargo new"}
                ]},
                {"dayIndex": 2, "dayTitle": "Ownership", "lessons": [
                    {"title": "Moves", "description": "who owns what"}
                ]}
            ]
        }))
        .unwrap();
        assert_eq!(plan.course_title, "Learn Rust");
        assert_eq!(plan.days.len(), 2);
        assert_eq!(plan.days[0].lessons[1].title, "Hello");
        assert_eq!(plan.lesson_count(), 3);
    }

    #[test]
    fn applies_defaults() {
        let policy = ValidationPolicy {
            fallback_title: "Fallback".to_string(),
            expected_days: None,
        };
        let plan = validate_plan(
            &json!({"days": [{"dayIndex": 4, "lessons": [{"title": "T", "description": null}]}]}),
            &policy,
        )
        .unwrap();
        assert_eq!(plan.course_title, "Fallback");
        assert_eq!(plan.days[0].day_title, "Day 4");
        assert_eq!(plan.days[0].lessons[0].description, "");
    }

    #[test]
    fn blank_title_uses_fallback() {
        let plan = validate(json!({
            "courseTitle": "  ",
            "days": [{"dayIndex": 1, "lessons": [{"title": "T"}]}]
        }))
        .unwrap();
        assert_eq!(plan.course_title, DEFAULT_FALLBACK_TITLE);
    }

    #[test]
    fn missing_day_index_defaults_to_position() {
        let plan = validate(json!({
            "days": [
                {"lessons": [{"title": "A"}]},
                {"lessons": [{"title": "B"}]}
            ]
        }))
        .unwrap();
        let indices: Vec<i32> = plan.days.iter().map(|d| d.day_index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(plan.days[1].day_title, "Day 2");
    }

    #[test]
    fn rejects_null_and_non_objects() {
        assert_eq!(shape_error(Value::Null), "plan is null");
        assert_eq!(shape_error(json!([1, 2])), "plan is not a JSON object");
    }

    #[test]
    fn rejects_missing_or_empty_days() {
        assert_eq!(shape_error(json!({"courseTitle": "X"})), "plan has no `days`");
        assert_eq!(shape_error(json!({"courseTitle": "X", "days": []})), "`days` is empty");
        assert_eq!(
            shape_error(json!({"courseTitle": "X", "days": "soon"})),
            "`days` is not an array"
        );
    }

    #[test]
    fn enforces_expected_day_count() {
        let policy = ValidationPolicy {
            expected_days: Some(2),
            ..ValidationPolicy::default()
        };
        let err = validate_plan(
            &json!({"days": [{"dayIndex": 1, "lessons": [{"title": "T"}]}]}),
            &policy,
        )
        .unwrap_err();
        assert_eq!(err, PlanError::InvalidPlanShape("expected 2 days, got 1".into()));
    }

    #[test]
    fn rejects_day_without_lessons_sequence() {
        assert_eq!(
            shape_error(json!({"days": [{"dayIndex": 1, "dayTitle": "D"}]})),
            "days[0] has no `lessons`"
        );
    }

    #[test]
    fn drops_empty_day_when_others_have_lessons() {
        let plan = validate(json!({"days": [
            {"dayIndex": 1, "dayTitle": "Rest", "lessons": []},
            {"dayIndex": 2, "lessons": [{"title": "T"}]}
        ]}))
        .unwrap();
        assert_eq!(plan.days.len(), 1);
        assert_eq!(plan.days[0].day_index, 2);
    }

    #[test]
    fn rejects_nul_characters_in_text() {
        assert_eq!(
            shape_error(json!({"days": [{"dayIndex": 1, "lessons": [{"title": "Scor\0ing"}]}]})),
            "days[0].lessons[0].title contains a NUL character"
        );
        assert_eq!(
            shape_error(json!({"days": [{"dayIndex": 1, "lessons": [{"title": "T", "description": "a\0"}]}]})),
            "days[0].lessons[0].description contains a NUL character"
        );
        assert_eq!(
            shape_error(json!({"courseTitle": "\0x", "days": [{"dayIndex": 1, "lessons": [{"title": "T"}]}]})),
            "plan.courseTitle contains a NUL character"
        );
        assert_eq!(
            shape_error(json!({"days": [{"dayIndex": 1, "dayTitle": "D\0", "lessons": [{"title": "T"}]}]})),
            "days[0].dayTitle contains a NUL character"
        );
    }

    #[test]
    fn rejects_plan_without_any_lesson() {
        assert_eq!(
            shape_error(json!({"days": [{"dayIndex": 1, "lessons": []}]})),
            "plan contains no lessons"
        );
    }

    #[test]
    fn rejects_bad_day_index() {
        assert_eq!(
            shape_error(json!({"days": [{"dayIndex": 0, "lessons": [{"title": "T"}]}]})),
            "days[0].dayIndex must be a positive integer"
        );
        assert_eq!(
            shape_error(json!({"days": [{"dayIndex": "one", "lessons": [{"title": "T"}]}]})),
            "days[0].dayIndex must be a positive integer"
        );
        assert!(validate(json!({"days": [{"dayIndex": 2.0, "lessons": [{"title": "T"}]}]})).is_ok());
    }

    #[test]
    fn rejects_duplicate_day_index() {
        assert_eq!(
            shape_error(json!({"days": [
                {"dayIndex": 1, "lessons": [{"title": "A"}]},
                {"dayIndex": 1, "lessons": [{"title": "B"}]}
            ]})),
            "duplicate dayIndex 1"
        );
    }

    #[test]
    fn rejects_bad_lessons() {
        assert_eq!(
            shape_error(json!({"days": [{"dayIndex": 1, "lessons": ["just text"]}]})),
            "days[0].lessons[0] is not an object"
        );
        assert_eq!(
            shape_error(json!({"days": [{"dayIndex": 1, "lessons": [{"description": "d"}]}]})),
            "days[0].lessons[0] has no `title`"
        );
        assert_eq!(
            shape_error(json!({"days": [{"dayIndex": 1, "lessons": [{"title": "T", "description": 5}]}]})),
            "days[0].lessons[0].description is not a string"
        );
    }

    #[test]
    fn ignores_model_supplied_lesson_indices() {
        let plan = validate(json!({"days": [{"dayIndex": 1, "lessons": [
            {"title": "A", "lessonIndex": 9},
            {"title": "B", "lessonIndex": 3}
        ]}]}))
        .unwrap();
        let rows = plan.lesson_rows();
        assert_eq!(rows[0].lesson_index, 1);
        assert_eq!(rows[1].lesson_index, 2);
    }
}
