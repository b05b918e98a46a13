use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

pub const QUESTIONS_PER_PAGE: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuestionView {
    pub id: i64,
    pub question: String,
    pub category: i64,
    pub answer: String,
    pub difficulty: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuizQuestion {
    pub id: i64,
    pub question: String,
    pub answer: String,
}

impl From<&Question> for QuizQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            question: q.question.clone(),
            answer: q.answer.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionFilter {
    All,
    Category(i64),
    Search(String),
}

impl QuestionFilter {
    pub fn matches(&self, q: &Question) -> bool {
        match self {
            QuestionFilter::All => true,
            QuestionFilter::Category(id) => q.category == *id,
            QuestionFilter::Search(term) => q.question.to_lowercase().contains(&term.to_lowercase()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "IntOrString")]
pub struct LenientId(pub i64);

impl TryFrom<IntOrString> for LenientId {
    type Error = String;

    fn try_from(value: IntOrString) -> Result<Self, Self::Error> {
        match value {
            IntOrString::Int(v) => Ok(LenientId(v)),
            IntOrString::Str(s) => s
                .trim()
                .parse::<i64>()
                .map(LenientId)
                .map_err(|_| format!("wrong value {s}, can not parse to i64")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizCategory {
    pub id: LenientId,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizRequest {
    pub quiz_category: QuizCategory,
    pub previous_questions: Vec<LenientId>,
}

impl QuizRequest {
    pub fn filter(&self) -> QuestionFilter {
        match self.quiz_category.id.0 {
            0 => QuestionFilter::All,
            id => QuestionFilter::Category(id),
        }
    }

    pub fn previous_ids(&self) -> Vec<i64> {
        self.previous_questions.iter().map(|id| id.0).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub issue: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("question {question_id} references missing category {category_id}")]
pub struct DanglingCategory {
    pub question_id: i64,
    pub category_id: i64,
}

pub fn page_offset(page: i64) -> Option<i64> {
    if page < 1 {
        return None;
    }
    (page - 1).checked_mul(QUESTIONS_PER_PAGE)
}

pub fn annotate(questions: Vec<Question>, categories: &[Category]) -> Result<Vec<QuestionView>, DanglingCategory> {
    let names: HashMap<i64, &str> = categories.iter().map(|c| (c.id, c.kind.as_str())).collect();
    questions
        .into_iter()
        .map(|q| {
            let kind = names.get(&q.category).ok_or(DanglingCategory {
                question_id: q.id,
                category_id: q.category,
            })?;
            Ok(QuestionView {
                id: q.id,
                kind: kind.to_string(),
                question: q.question,
                category: q.category,
                answer: q.answer,
                difficulty: q.difficulty,
            })
        })
        .collect()
}

pub fn pick_quiz_question<R: Rng + ?Sized>(rng: &mut R, pool: &[Question], previous: &[i64]) -> Option<QuizQuestion> {
    let seen: HashSet<i64> = previous.iter().copied().collect();
    let candidates: Vec<&Question> = pool.iter().filter(|q| !seen.contains(&q.id)).collect();
    candidates.choose(rng).map(|q| QuizQuestion::from(*q))
}

fn lenient_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn validate_new_question(body: &Value) -> Result<NewQuestion, Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let Some(obj) = body.as_object() else {
        return Err(vec![ValidationIssue {
            field: "body".into(),
            issue: "must be a JSON object".into(),
        }]);
    };

    let mut text_field = |name: &str| -> Option<String> {
        match obj.get(name) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::String(_)) => {
                issues.push(ValidationIssue {
                    field: name.into(),
                    issue: "must not be empty".into(),
                });
                None
            }
            Some(_) => {
                issues.push(ValidationIssue {
                    field: name.into(),
                    issue: "must be a string".into(),
                });
                None
            }
            None => {
                issues.push(ValidationIssue {
                    field: name.into(),
                    issue: "is required".into(),
                });
                None
            }
        }
    };
    let question = text_field("question");
    let answer = text_field("answer");

    let mut int_field = |name: &str| -> Option<i64> {
        match obj.get(name) {
            None => {
                issues.push(ValidationIssue {
                    field: name.into(),
                    issue: "is required".into(),
                });
                None
            }
            Some(v) => {
                let parsed = lenient_int(v);
                if parsed.is_none() {
                    issues.push(ValidationIssue {
                        field: name.into(),
                        issue: "must be an integer".into(),
                    });
                }
                parsed
            }
        }
    };
    let difficulty = int_field("difficulty");
    let category = int_field("category");

    match (question, answer, difficulty, category) {
        (Some(question), Some(answer), Some(difficulty), Some(category)) if issues.is_empty() => Ok(NewQuestion {
            question,
            answer,
            category,
            difficulty,
        }),
        _ => Err(issues),
    }
}
