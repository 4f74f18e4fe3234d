mod model;
mod validate;

pub mod builder;
pub mod export;
pub mod manual;
pub mod quick_start;
pub mod store;

use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;

pub use crate::model::*;
pub use crate::validate::*;

/// The label under which empty answers to a choice question are counted.
pub const NO_ANSWER: &str = "No Answer";

// ******** Output data structures *********

/// The tally for one option of a choice question.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct OptionTally {
    pub option: String,
    pub count: u64,
    /// Share of the answers to the question, in percent, rounded to one decimal.
    pub percentage: f64,
}

/// What is reported for a question depends on its kind.
#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SummaryDetail {
    /// The options in the order in which they first appeared in the answers.
    MultipleChoice { options: Vec<OptionTally> },
    /// All the answers, in the order of the responses, including the empty ones.
    Text {
        #[serde(rename = "textResponses")]
        text_responses: Vec<String>,
    },
}

/// Statistics for one question
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct QuestionSummary {
    pub question: String,
    #[serde(skip)]
    pub question_id: QuestionId,
    #[serde(rename = "totalResponses")]
    pub total_responses: u64,
    #[serde(flatten)]
    pub detail: SummaryDetail,
}

/// The analytics of a form: its header and the statistics of all its questions.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct FormReport {
    #[serde(rename = "formId")]
    pub form_id: FormId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "responseCount")]
    pub response_count: u64,
    pub questions: Vec<QuestionSummary>,
}

/// Computes the statistics of all the questions of a form.
///
/// Arguments:
/// * `form` the form, which defines the order and the kind of the questions
/// * `responses` all the responses collected for this form
///
/// One summary is returned for each question, in the order of the form. Answers to
/// questions that are not part of the form, and responses to other forms, are not
/// accounted for.
pub fn summarize(form: &Form, responses: &[Response]) -> Vec<QuestionSummary> {
    let own = own_responses(form, responses);
    debug!(
        "summarize: form {}: {} questions, {} responses ({} for other forms)",
        form.id,
        form.questions.len(),
        own.len(),
        responses.len() - own.len()
    );
    form.questions
        .iter()
        .map(|q| summarize_question(q, &own))
        .collect()
}

fn own_responses<'a>(form: &Form, responses: &'a [Response]) -> Vec<&'a Response> {
    responses.iter().filter(|r| r.form == form.id).collect()
}

fn summarize_question(question: &Question, responses: &[&Response]) -> QuestionSummary {
    // Each response contributes at most one answer.
    let answers: Vec<&str> = responses
        .iter()
        .filter_map(|r| r.answer_for(question.id))
        .map(|a| a.answer_text.as_str())
        .collect();
    let total_responses = answers.len() as u64;
    debug!(
        "summarize_question: question {}: {} answers",
        question.id, total_responses
    );

    let detail = match &question.kind {
        QuestionKind::MultipleChoice { .. } => SummaryDetail::MultipleChoice {
            options: tally_choices(&answers),
        },
        QuestionKind::Text => SummaryDetail::Text {
            text_responses: answers.iter().map(|s| s.to_string()).collect(),
        },
    };

    QuestionSummary {
        question: question.text.clone(),
        question_id: question.id,
        total_responses,
        detail,
    }
}

// Groups the answers by value. The empty answers are grouped under NO_ANSWER.
fn tally_choices(answers: &[&str]) -> Vec<OptionTally> {
    let total = answers.len() as u64;
    let mut buckets: Vec<(String, u64)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for answer in answers.iter().copied() {
        let label: &str = if answer.is_empty() { NO_ANSWER } else { answer };
        if let Some(idx) = positions.get(label) {
            buckets[*idx].1 += 1;
        } else {
            positions.insert(label, buckets.len());
            buckets.push((label.to_string(), 1));
        }
    }
    buckets
        .into_iter()
        .map(|(option, count)| OptionTally {
            percentage: percentage(count, total),
            option,
            count,
        })
        .collect()
}

/// The share of `count` in `total`, in percent, rounded to one decimal.
///
/// It is 0 when the total is 0.
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = (count as f64) / (total as f64) * 100.0;
    (raw * 10.0).round() / 10.0
}

/// Builds the full report of a form.
pub fn build_report(form: &Form, responses: &[Response]) -> FormReport {
    let response_count = own_responses(form, responses).len() as u64;
    info!(
        "Processing {} responses for form {:?} ({})",
        response_count,
        form.title,
        form.id
    );
    let questions = summarize(form, responses);
    for (idx, qs) in questions.iter().enumerate() {
        info!(
            "Question {}: {} ({} answers)",
            idx + 1,
            qs.question,
            qs.total_responses
        );
        if let SummaryDetail::MultipleChoice { options } = &qs.detail {
            for o in options.iter() {
                info!("{:>8} {} ({}%)", o.count, o.option, o.percentage);
            }
        }
    }
    FormReport {
        form_id: form.id,
        title: form.title.clone(),
        description: form.description.clone(),
        response_count,
        questions,
    }
}
