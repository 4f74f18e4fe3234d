use log::debug;
use snafu::{ensure, Snafu};
use std::collections::HashMap;

use crate::model::*;

/// Reasons for rejecting a submission.
///
/// The submission is never stored when one of these errors is returned.
#[derive(Debug, Snafu, PartialEq, Eq, Clone)]
#[snafu(visibility(pub(crate)))]
pub enum ValidationError {
    #[snafu(display("question {question_id} requires an answer"))]
    MissingRequiredAnswer { question_id: QuestionId },
    #[snafu(display("{value:?} is not one of the options of question {question_id}"))]
    InvalidChoice {
        question_id: QuestionId,
        value: String,
    },
}

/// The answers of a submission that passed validation.
///
/// It contains exactly one answer per question of the form, in the order of the form.
/// The only way to obtain this structure is through [validate].
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ValidatedAnswers(Vec<Answer>);

impl ValidatedAnswers {
    pub fn answers(&self) -> &[Answer] {
        &self.0
    }

    pub fn into_answers(self) -> Vec<Answer> {
        self.0
    }
}

/// Checks a submission against the questions of a form.
///
/// Arguments:
/// * `form` the form being answered
/// * `submission` the raw values sent by the respondent, indexed by question. Values
/// for questions that are not in the form are ignored.
///
/// The questions are checked in order and the first problem is reported.
/// A value only counts as an answer if it is not blank after trimming. The text
/// itself is kept as typed by the respondent.
pub fn validate(
    form: &Form,
    submission: &HashMap<QuestionId, String>,
) -> Result<ValidatedAnswers, ValidationError> {
    let mut answers: Vec<Answer> = Vec::with_capacity(form.questions.len());
    for q in form.questions.iter() {
        let raw: Option<&String> = submission.get(&q.id);
        let is_present = raw.map(|s| !s.trim().is_empty()).unwrap_or(false);
        ensure!(
            is_present || !q.is_required,
            MissingRequiredAnswerSnafu { question_id: q.id }
        );
        let answer_text: String = match (&q.kind, raw) {
            (QuestionKind::MultipleChoice { options }, Some(value)) if is_present => {
                ensure!(
                    options.iter().any(|o| o == value),
                    InvalidChoiceSnafu {
                        question_id: q.id,
                        value: value.clone(),
                    }
                );
                value.clone()
            }
            // A blank choice is recorded as no answer.
            (QuestionKind::MultipleChoice { .. }, _) => "".to_string(),
            (QuestionKind::Text, Some(value)) => value.clone(),
            (QuestionKind::Text, None) => "".to_string(),
        };
        answers.push(Answer {
            question: q.id,
            answer_text,
        });
    }

    let ignored = submission
        .keys()
        .filter(|qid| form.question(**qid).is_none())
        .count();
    if ignored > 0 {
        debug!(
            "validate: form {}: ignored {} values for unknown questions",
            form.id, ignored
        );
    }
    Ok(ValidatedAnswers(answers))
}
