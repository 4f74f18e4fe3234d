// ********* Form schema ***********

use std::collections::{HashMap, HashSet};
use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use snafu::{ensure, Snafu};
use uuid::Uuid;

/// The public identifier of a form. It is the id that appears in the public URL.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(pub Uuid);

impl FormId {
    pub fn new_random() -> FormId {
        FormId(Uuid::new_v4())
    }
}

impl Display for FormId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u32);

impl Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseId(pub u64);

impl Display for ResponseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a question.
///
/// On the wire, the kind is carried by the `question_type` field and the
/// `options` field of the question record. The options of a text question are ignored.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "question_type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Free-form text.
    Text,
    /// A single choice among a list of options.
    /// An empty list means that no options were configured: no choice can then be valid.
    MultipleChoice {
        #[serde(default, deserialize_with = "null_as_empty")]
        options: Vec<String>,
    },
}

// Missing or null options mean that no options were configured.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl QuestionKind {
    /// The name of the kind, as used on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            QuestionKind::Text => "text",
            QuestionKind::MultipleChoice { .. } => "multiple_choice",
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    #[serde(default = "default_true")]
    pub is_required: bool,
    /// Position of the question in the form, starting at 0.
    pub order: u32,
}

impl Question {
    pub fn options(&self) -> Option<&[String]> {
        match &self.kind {
            QuestionKind::MultipleChoice { options } => Some(options.as_slice()),
            QuestionKind::Text => None,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    pub id: FormId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Only active forms accept submissions.
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub questions: Vec<Question>,
}

/// Violations of the structure of a form.
#[derive(Debug, Snafu, PartialEq, Eq, Clone)]
#[snafu(visibility(pub(crate)))]
pub enum FormError {
    #[snafu(display("the form title is empty"))]
    EmptyTitle {},
    #[snafu(display("form {form_id} has no questions"))]
    NoQuestions { form_id: FormId },
    #[snafu(display("question {question_id} appears more than once"))]
    DuplicateQuestion { question_id: QuestionId },
    #[snafu(display("question {question_id} has order {found} but is at position {expected}"))]
    OrderMismatch {
        question_id: QuestionId,
        expected: u32,
        found: u32,
    },
    #[snafu(display("question {question_id} has no text"))]
    EmptyQuestionText { question_id: QuestionId },
    #[snafu(display("option {option:?} of question {question_id} is blank or not trimmed"))]
    InvalidOption {
        question_id: QuestionId,
        option: String,
    },
}

impl Form {
    /// Checks the structure of the form:
    /// - the title and all the question texts are non-empty
    /// - there is at least one question
    /// - the question ids are unique
    /// - the order of each question is its position in the list
    /// - the options of choice questions are trimmed and non-empty
    pub fn check(&self) -> Result<(), FormError> {
        ensure!(!self.title.trim().is_empty(), EmptyTitleSnafu);
        ensure!(
            !self.questions.is_empty(),
            NoQuestionsSnafu { form_id: self.id }
        );
        let mut seen: HashSet<QuestionId> = HashSet::new();
        for (idx, q) in self.questions.iter().enumerate() {
            ensure!(
                seen.insert(q.id),
                DuplicateQuestionSnafu { question_id: q.id }
            );
            ensure!(
                q.order as usize == idx,
                OrderMismatchSnafu {
                    question_id: q.id,
                    expected: idx as u32,
                    found: q.order,
                }
            );
            ensure!(
                !q.text.trim().is_empty(),
                EmptyQuestionTextSnafu { question_id: q.id }
            );
            if let QuestionKind::MultipleChoice { options } = &q.kind {
                if let Some(bad) = options
                    .iter()
                    .find(|o| o.is_empty() || o.trim() != o.as_str())
                {
                    return InvalidOptionSnafu {
                        question_id: q.id,
                        option: bad.clone(),
                    }
                    .fail();
                }
            }
        }
        Ok(())
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

// ********* Collected data ***********

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question: QuestionId,
    /// The chosen option for choice questions, the text otherwise.
    /// The empty string means that no answer was given.
    pub answer_text: String,
}

impl Answer {
    pub fn new(question: QuestionId, answer_text: impl Into<String>) -> Answer {
        Answer {
            question,
            answer_text: answer_text.into(),
        }
    }
}

/// A stored response. Responses are only created by a store, after validation,
/// and never modified afterwards.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: ResponseId,
    pub form: FormId,
    pub submitted_at: DateTime<Utc>,
    pub answers: Vec<Answer>,
}

impl Response {
    /// The answer to the given question, if any.
    /// Only the first answer is considered if the question appears multiple times.
    pub fn answer_for(&self, question: QuestionId) -> Option<&Answer> {
        self.answers.iter().find(|a| a.question == question)
    }
}

/// A submission, as sent by a respondent to the public form.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub form: FormId,
    pub answers: Vec<Answer>,
}

impl Submission {
    /// The raw values indexed by question.
    /// If a question appears multiple times, the last value wins.
    pub fn answers_by_question(&self) -> HashMap<QuestionId, String> {
        self.answers
            .iter()
            .map(|a| (a.question, a.answer_text.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn question(id: u32, order: u32, kind: QuestionKind) -> Question {
        Question {
            id: QuestionId(id),
            text: format!("Question {}", id),
            kind,
            is_required: true,
            order,
        }
    }

    fn form(questions: Vec<Question>) -> Form {
        Form {
            id: FormId(Uuid::nil()),
            title: "Team survey".to_string(),
            description: None,
            is_active: true,
            questions,
        }
    }

    #[test]
    fn check_accepts_well_formed_form() {
        let f = form(vec![
            question(10, 0, QuestionKind::Text),
            question(
                11,
                1,
                QuestionKind::MultipleChoice {
                    options: vec!["Yes".to_string(), "No".to_string()],
                },
            ),
        ]);
        assert_eq!(f.check(), Ok(()));
    }

    #[test]
    fn check_rejects_empty_form() {
        let f = form(vec![]);
        assert_eq!(
            f.check(),
            Err(FormError::NoQuestions {
                form_id: FormId(Uuid::nil())
            })
        );
    }

    #[test]
    fn check_rejects_order_gaps() {
        let f = form(vec![
            question(1, 0, QuestionKind::Text),
            question(2, 2, QuestionKind::Text),
        ]);
        assert_eq!(
            f.check(),
            Err(FormError::OrderMismatch {
                question_id: QuestionId(2),
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn check_rejects_duplicate_ids() {
        let f = form(vec![
            question(1, 0, QuestionKind::Text),
            question(1, 1, QuestionKind::Text),
        ]);
        assert_eq!(
            f.check(),
            Err(FormError::DuplicateQuestion {
                question_id: QuestionId(1)
            })
        );
    }

    #[test]
    fn check_rejects_untrimmed_options() {
        let f = form(vec![question(
            1,
            0,
            QuestionKind::MultipleChoice {
                options: vec!["Yes".to_string(), " No".to_string()],
            },
        )]);
        assert_eq!(
            f.check(),
            Err(FormError::InvalidOption {
                question_id: QuestionId(1),
                option: " No".to_string()
            })
        );
    }

    #[test]
    fn check_accepts_choice_without_options() {
        let f = form(vec![question(
            1,
            0,
            QuestionKind::MultipleChoice { options: vec![] },
        )]);
        assert_eq!(f.check(), Ok(()));
    }

    #[test]
    fn question_wire_format() {
        let js = r#"{
            "id": 4,
            "text": "Would you recommend us?",
            "question_type": "multiple_choice",
            "options": ["Yes", "No"],
            "is_required": false,
            "order": 0
        }"#;
        let q: Question = serde_json::from_str(js).unwrap();
        assert_eq!(
            q.kind,
            QuestionKind::MultipleChoice {
                options: vec!["Yes".to_string(), "No".to_string()]
            }
        );
        assert!(!q.is_required);

        // Text questions may carry an empty or null list of options.
        let js = r#"{"id": 5, "text": "Comments", "question_type": "text", "options": null, "order": 1}"#;
        let q: Question = serde_json::from_str(js).unwrap();
        assert_eq!(q.kind, QuestionKind::Text);
        assert!(q.is_required);
        assert_eq!(q.options(), None);
    }

    #[test]
    fn choice_without_configured_options() {
        for js in [
            r#"{"id": 6, "text": "Pick one", "question_type": "multiple_choice", "options": null, "order": 0}"#,
            r#"{"id": 6, "text": "Pick one", "question_type": "multiple_choice", "order": 0}"#,
        ] {
            let q: Question = serde_json::from_str(js).unwrap();
            assert_eq!(q.kind, QuestionKind::MultipleChoice { options: vec![] });
        }
    }

    #[test]
    fn submission_last_value_wins() {
        let s = Submission {
            form: FormId(Uuid::nil()),
            answers: vec![
                Answer::new(QuestionId(1), "first"),
                Answer::new(QuestionId(1), "second"),
            ],
        };
        let m = s.answers_by_question();
        assert_eq!(m.get(&QuestionId(1)).map(|s| s.as_str()), Some("second"));
    }
}
