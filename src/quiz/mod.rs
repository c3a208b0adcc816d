// Question request pipeline: config → prompt → Gemini → validated questions.

pub mod prompt;
pub mod validate;

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::QuizError;
use crate::gemini::GeminiClient;
use crate::metrics;

pub const MIN_GRADE: u8 = 1;
pub const MAX_GRADE: u8 = 6;
pub const DEFAULT_QUESTIONS_COUNT: u32 = 8;
pub const MAX_QUESTIONS_COUNT: u32 = 50;

/// School subject a question set is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Math,
    Chinese,
    English,
}

impl Subject {
    /// Resolve a wire code. Unknown codes fall back to math.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "math" => Subject::Math,
            "chinese" => Subject::Chinese,
            "english" => Subject::English,
            other => {
                tracing::warn!("Unknown subject {other:?}, falling back to math");
                Subject::Math
            }
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Subject::Math => "math",
            Subject::Chinese => "chinese",
            Subject::English => "english",
        }
    }

    /// Name used inside the prompt and as the default item subject.
    pub fn display_name(self) -> &'static str {
        match self {
            Subject::Math => "数学",
            Subject::Chinese => "语文",
            Subject::English => "英语",
        }
    }
}

/// Validated parameters for one question set.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizConfig {
    pub grade: u8,
    pub subject: Subject,
    pub custom_topic: String,
    pub count: u32,
}

impl QuizConfig {
    pub fn new(grade: u8, subject: Subject) -> Self {
        QuizConfig {
            grade,
            subject,
            custom_topic: String::new(),
            count: DEFAULT_QUESTIONS_COUNT,
        }
    }
}

/// Body of `POST /generate_questions`. Every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsRequest {
    #[serde(default = "default_grade")]
    pub grade: i64,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default)]
    pub custom_content: Option<String>,
    #[serde(default = "default_questions_count")]
    pub questions_count: i64,
}

fn default_grade() -> i64 {
    MIN_GRADE as i64
}

fn default_subject() -> String {
    Subject::Math.code().to_string()
}

fn default_questions_count() -> i64 {
    DEFAULT_QUESTIONS_COUNT as i64
}

impl TryFrom<GenerateQuestionsRequest> for QuizConfig {
    type Error = QuizError;

    fn try_from(req: GenerateQuestionsRequest) -> Result<Self, Self::Error> {
        let grade = u8::try_from(req.grade)
            .ok()
            .filter(|g| (MIN_GRADE..=MAX_GRADE).contains(g))
            .ok_or_else(|| {
                QuizError::InvalidRequest(format!(
                    "年级应在{MIN_GRADE}到{MAX_GRADE}之间，实际为{}",
                    req.grade
                ))
            })?;
        let count = u32::try_from(req.questions_count)
            .ok()
            .filter(|c| (1..=MAX_QUESTIONS_COUNT).contains(c))
            .ok_or_else(|| {
                QuizError::InvalidRequest(format!(
                    "题目数量应在1到{MAX_QUESTIONS_COUNT}之间，实际为{}",
                    req.questions_count
                ))
            })?;

        Ok(QuizConfig {
            grade,
            subject: Subject::from_code(&req.subject),
            custom_topic: req.custom_content.unwrap_or_default(),
            count,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// One validated question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizItem {
    pub id: u32,
    pub question: String,
    pub options: Vec<String>,
    pub correct: String,
    pub grade: u8,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

/// Echo of the effective request config in a success envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEcho {
    pub grade: u8,
    pub subject: &'static str,
    pub custom_content: String,
    pub questions_count: usize,
}

/// Uniform response body of `POST /generate_questions`.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuizItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigEcho>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn success(config: &QuizConfig, questions: Vec<QuizItem>) -> Self {
        let echo = ConfigEcho {
            grade: config.grade,
            subject: config.subject.code(),
            custom_content: config.custom_topic.clone(),
            questions_count: questions.len(),
        };
        Envelope {
            success: true,
            questions: Some(questions),
            config: Some(echo),
            error: None,
        }
    }

    pub fn failure(err: &QuizError) -> Self {
        Envelope {
            success: false,
            questions: None,
            config: None,
            error: Some(err.to_string()),
        }
    }
}

/// Run the whole pipeline for one request.
pub async fn generate_questions(
    client: &GeminiClient,
    config: &QuizConfig,
) -> Result<Vec<QuizItem>, QuizError> {
    let prompt = prompt::build_prompt(config);
    tracing::debug!("Generated prompt:\n{prompt}");

    let started = Instant::now();
    let reply = client.generate(&prompt).await;
    metrics::UPSTREAM_DURATION_SECONDS.observe(started.elapsed().as_secs_f64());
    let text = reply?;
    tracing::debug!("Gemini returned:\n{text}");

    let questions = validate::parse_questions(&text, config)?;
    metrics::QUESTIONS_RETURNED_TOTAL.inc_by(questions.len() as u64);
    tracing::info!("Generated {} questions", questions.len());
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> GenerateQuestionsRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_defaults() {
        let config = QuizConfig::try_from(request("{}")).unwrap();
        assert_eq!(config.grade, 1);
        assert_eq!(config.subject, Subject::Math);
        assert_eq!(config.custom_topic, "");
        assert_eq!(config.count, 8);
    }

    #[test]
    fn test_request_camel_case_fields() {
        let config = QuizConfig::try_from(request(
            r#"{"grade":5,"subject":"english","customContent":"animals","questionsCount":3}"#,
        ))
        .unwrap();
        assert_eq!(config.grade, 5);
        assert_eq!(config.subject, Subject::English);
        assert_eq!(config.custom_topic, "animals");
        assert_eq!(config.count, 3);
    }

    #[test]
    fn test_null_custom_content_is_empty() {
        let config = QuizConfig::try_from(request(r#"{"customContent":null}"#)).unwrap();
        assert_eq!(config.custom_topic, "");
    }

    #[test]
    fn test_grade_out_of_range_rejected() {
        for grade in [0, 7, -1, 300] {
            let err = QuizConfig::try_from(request(&format!(r#"{{"grade":{grade}}}"#))).unwrap_err();
            assert!(matches!(err, QuizError::InvalidRequest(_)), "grade {grade}");
        }
    }

    #[test]
    fn test_count_out_of_range_rejected() {
        for count in [0, 51, -3] {
            let err = QuizConfig::try_from(request(&format!(r#"{{"questionsCount":{count}}}"#)))
                .unwrap_err();
            assert!(matches!(err, QuizError::InvalidRequest(_)), "count {count}");
        }
    }

    #[test]
    fn test_unknown_subject_falls_back_to_math() {
        assert_eq!(Subject::from_code("history"), Subject::Math);
        assert_eq!(Subject::from_code(" Chinese "), Subject::Chinese);
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(Difficulty::parse("Hard"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::parse("easy/medium/hard"), None);
    }

    #[test]
    fn test_failure_envelope_has_no_questions() {
        let body = serde_json::to_value(Envelope::failure(&QuizError::Timeout)).unwrap();
        assert_eq!(body["success"], false);
        assert!(body.get("questions").is_none());
        assert!(body.get("config").is_none());
        assert!(body["error"].as_str().unwrap().contains("请求超时"));
    }

    #[test]
    fn test_success_envelope_echoes_config() {
        let mut config = QuizConfig::new(4, Subject::Chinese);
        config.custom_topic = "成语".into();
        let item = QuizItem {
            id: 1,
            question: "q".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct: "a".into(),
            grade: 4,
            subject: "语文".into(),
            difficulty: None,
        };
        let body = serde_json::to_value(Envelope::success(&config, vec![item])).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["config"]["subject"], "chinese");
        assert_eq!(body["config"]["customContent"], "成语");
        assert_eq!(body["config"]["questionsCount"], 1);
        assert!(body["questions"][0].get("difficulty").is_none());
        assert!(body.get("error").is_none());
    }
}
