// Validation of model output into quiz items.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{Difficulty, QuizConfig, QuizItem, MAX_GRADE, MIN_GRADE};
use crate::error::QuizError;

pub const OPTIONS_PER_QUESTION: usize = 4;

const REQUIRED_FIELDS: [&str; 3] = ["question", "options", "correct"];

/// Remove surrounding whitespace and markdown code-fence markers, repeating
/// until nothing changes so that a second pass is always a no-op.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    loop {
        let before = text;
        if let Some(rest) = text
            .strip_prefix("```json")
            .or_else(|| text.strip_prefix("```JSON"))
            .or_else(|| text.strip_prefix("```"))
        {
            text = rest.trim();
        }
        if let Some(rest) = text.strip_suffix("```") {
            text = rest.trim();
        }
        if text.len() == before.len() {
            return text;
        }
    }
}

/// Parse and validate the model's text into quiz items, in order.
pub fn parse_questions(raw: &str, config: &QuizConfig) -> Result<Vec<QuizItem>, QuizError> {
    let content = strip_code_fence(raw);
    let value: Value = serde_json::from_str(content).map_err(|e| {
        tracing::warn!("JSON parse error: {e}; raw content: {content}");
        QuizError::Parse(e.to_string())
    })?;

    let entries = match value {
        Value::Array(entries) if !entries.is_empty() => entries,
        _ => {
            return Err(QuizError::Schema(
                "题目格式不正确，应为非空的题目数组".to_string(),
            ))
        }
    };

    let pending = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| validate_entry(i + 1, entry, config))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(assign_ids(pending))
}

/// A validated entry whose id may still be missing.
struct Pending {
    id: Option<i64>,
    item: QuizItem,
}

fn validate_entry(position: usize, entry: &Value, config: &QuizConfig) -> Result<Pending, QuizError> {
    let obj = entry.as_object().ok_or_else(|| {
        QuizError::Schema(format!("第{position}道题目不是对象"))
    })?;

    if !REQUIRED_FIELDS.iter().all(|key| obj.contains_key(*key)) {
        return Err(QuizError::Schema(format!(
            "第{position}道题目缺少必要字段"
        )));
    }

    let options = match &obj["options"] {
        Value::Array(options) if options.len() == OPTIONS_PER_QUESTION => options
            .iter()
            .map(scalar_text)
            .collect::<Option<Vec<_>>>(),
        _ => None,
    }
    .ok_or_else(|| {
        QuizError::Schema(format!(
            "第{position}道题目选项数量不正确，应为{OPTIONS_PER_QUESTION}个"
        ))
    })?;

    let question = non_empty_text(obj, "question");
    let correct = non_empty_text(obj, "correct");
    let (Some(question), Some(correct)) = (question, correct) else {
        return Err(QuizError::Schema(format!(
            "第{position}道题目的题干或答案为空"
        )));
    };

    let grade = obj
        .get("grade")
        .and_then(Value::as_u64)
        .and_then(|g| u8::try_from(g).ok())
        .filter(|g| (MIN_GRADE..=MAX_GRADE).contains(g))
        .unwrap_or(config.grade);
    let subject = obj
        .get("subject")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(config.subject.display_name())
        .to_string();
    let difficulty = obj
        .get("difficulty")
        .and_then(Value::as_str)
        .and_then(Difficulty::parse);

    Ok(Pending {
        id: obj.get("id").map(|id| id.as_i64().unwrap_or(0)),
        item: QuizItem {
            id: 0,
            question,
            options,
            correct,
            grade,
            subject,
            difficulty,
        },
    })
}

/// Render a scalar JSON value as option/answer text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_empty_text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(scalar_text)
        .filter(|s| !s.trim().is_empty())
}

/// Back-fill missing ids with the 1-based position. When the model's own
/// ids would leave a non-positive or duplicate id, renumber everything.
fn assign_ids(pending: Vec<Pending>) -> Vec<QuizItem> {
    let ids: Vec<i64> = pending
        .iter()
        .enumerate()
        .map(|(i, p)| p.id.unwrap_or(i as i64 + 1))
        .collect();

    let mut seen = HashSet::new();
    let usable = ids
        .iter()
        .all(|&id| id > 0 && u32::try_from(id).is_ok() && seen.insert(id));
    if !usable {
        tracing::debug!("Model ids unusable ({ids:?}), renumbering by position");
    }

    pending
        .into_iter()
        .zip(ids)
        .enumerate()
        .map(|(i, (p, id))| QuizItem {
            id: if usable { id as u32 } else { i as u32 + 1 },
            ..p.item
        })
        .collect()
}
