use chrono::Utc;
use log::{debug, info};
use snafu::{ResultExt, Snafu};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::model::*;
use crate::validate::{validate, ValidatedAnswers, ValidationError};
use crate::{build_report, FormReport};

#[derive(Debug, Snafu, PartialEq, Eq, Clone)]
#[snafu(visibility(pub))]
pub enum StoreError {
    #[snafu(display("form {form_id} not found or no longer available"))]
    FormNotFound { form_id: FormId },
    #[snafu(display("form {form_id} is not well formed"))]
    InvalidForm { form_id: FormId, source: FormError },
    #[snafu(display("storage failure: {message}"))]
    Backend { message: String },
}

/// Access to the forms and to the responses collected for them.
///
/// Implementations must guarantee that:
/// - appending a response is atomic, and never loses responses appended concurrently
/// - listing the responses returns a consistent snapshot, in the order of submission
pub trait ResponseStore {
    fn get_form(&self, form_id: &FormId) -> Result<Form, StoreError>;

    /// Stores a new response. The store assigns the id and the submission time.
    fn append_response(
        &self,
        form_id: &FormId,
        answers: ValidatedAnswers,
    ) -> Result<Response, StoreError>;

    fn list_responses(&self, form_id: &FormId) -> Result<Vec<Response>, StoreError>;
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SubmitError {
    #[snafu(display("Cannot accept responses for form {form_id}"))]
    Lookup { form_id: FormId, source: StoreError },
    #[snafu(display("The submission is for form {found}, not for form {expected}"))]
    FormMismatch { expected: FormId, found: FormId },
    #[snafu(display("Please fill in all required fields"))]
    Rejected { source: ValidationError },
    #[snafu(display("Error storing the response"))]
    Persist { source: StoreError },
}

/// Accepts a submission from a respondent.
///
/// The submission is validated against the current version of the form. Nothing is
/// stored if the form is unknown or inactive, or if the validation fails.
pub fn submit_response<S: ResponseStore + ?Sized>(
    store: &S,
    form_id: &FormId,
    submission: &Submission,
) -> Result<Response, SubmitError> {
    let form = store
        .get_form(form_id)
        .context(LookupSnafu { form_id: *form_id })?;
    if !form.is_active {
        return Err(StoreError::FormNotFound { form_id: *form_id })
            .context(LookupSnafu { form_id: *form_id });
    }
    if submission.form != *form_id {
        return FormMismatchSnafu {
            expected: *form_id,
            found: submission.form,
        }
        .fail();
    }
    let answers = validate(&form, &submission.answers_by_question()).context(RejectedSnafu)?;
    let response = store
        .append_response(form_id, answers)
        .context(PersistSnafu)?;
    info!(
        "submit_response: form {}: stored response {}",
        form_id, response.id
    );
    Ok(response)
}

/// Loads the form and its responses from the store and builds its report.
pub fn form_report<S: ResponseStore + ?Sized>(
    store: &S,
    form_id: &FormId,
) -> Result<FormReport, StoreError> {
    let form = store.get_form(form_id)?;
    let responses = store.list_responses(form_id)?;
    Ok(build_report(&form, &responses))
}

// ********* In-memory store ***********

#[derive(Debug, Default)]
struct MemoryState {
    forms: HashMap<FormId, Form>,
    responses: HashMap<FormId, Vec<Response>>,
    last_response_id: u64,
}

/// A store that keeps everything in memory.
///
/// It can be shared between threads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Registers a form, or replaces it if it has not received any response yet.
    /// The structure of the form is checked first.
    pub fn add_form(&self, form: Form) -> Result<(), StoreError> {
        form.check().context(InvalidFormSnafu { form_id: form.id })?;
        let mut state = self.lock()?;
        let has_responses = state
            .responses
            .get(&form.id)
            .map(|l| !l.is_empty())
            .unwrap_or(false);
        if has_responses {
            return BackendSnafu {
                message: format!("form {} already has responses", form.id),
            }
            .fail();
        }
        debug!("add_form: registering form {}", form.id);
        state.forms.insert(form.id, form);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Backend {
            message: "memory store lock poisoned".to_string(),
        })
    }
}

impl ResponseStore for MemoryStore {
    fn get_form(&self, form_id: &FormId) -> Result<Form, StoreError> {
        let state = self.lock()?;
        match state.forms.get(form_id) {
            Some(f) => Ok(f.clone()),
            None => FormNotFoundSnafu { form_id: *form_id }.fail(),
        }
    }

    fn append_response(
        &self,
        form_id: &FormId,
        answers: ValidatedAnswers,
    ) -> Result<Response, StoreError> {
        let mut state = self.lock()?;
        if !state.forms.contains_key(form_id) {
            return FormNotFoundSnafu { form_id: *form_id }.fail();
        }
        state.last_response_id += 1;
        let response = Response {
            id: ResponseId(state.last_response_id),
            form: *form_id,
            submitted_at: Utc::now(),
            answers: answers.into_answers(),
        };
        state
            .responses
            .entry(*form_id)
            .or_default()
            .push(response.clone());
        Ok(response)
    }

    fn list_responses(&self, form_id: &FormId) -> Result<Vec<Response>, StoreError> {
        let state = self.lock()?;
        if !state.forms.contains_key(form_id) {
            return FormNotFoundSnafu { form_id: *form_id }.fail();
        }
        Ok(state.responses.get(form_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{split_options, Builder};
    use crate::export::{export_form, ExportSettings};
    use crate::SummaryDetail;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;
    use uuid::Uuid;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn store_with_form() -> (MemoryStore, Form) {
        let mut b = Builder::new("Office survey").id(FormId(Uuid::nil()));
        b.add_text_question("Name a coworker who helped you", true);
        b.add_choice_question("Coffee quality", &split_options("Good, Bad"), false);
        let form = b.build().unwrap();
        let store = MemoryStore::new();
        store.add_form(form.clone()).unwrap();
        (store, form)
    }

    fn submission(form: &Form, values: &[(u32, &str)]) -> Submission {
        Submission {
            form: form.id,
            answers: values
                .iter()
                .map(|(qid, v)| Answer::new(QuestionId(*qid), *v))
                .collect(),
        }
    }

    #[test]
    fn submit_then_report() {
        init();
        let (store, form) = store_with_form();
        let r1 = submit_response(&store, &form.id, &submission(&form, &[(1, "Ann"), (2, "Good")]))
            .unwrap();
        let r2 = submit_response(&store, &form.id, &submission(&form, &[(1, "Bob")])).unwrap();
        assert_eq!(r1.id, ResponseId(1));
        assert_eq!(r2.id, ResponseId(2));
        assert_eq!(
            r2.answers,
            vec![Answer::new(QuestionId(1), "Bob"), Answer::new(QuestionId(2), "")]
        );

        let report = form_report(&store, &form.id).unwrap();
        assert_eq!(report.response_count, 2);
        match &report.questions[1].detail {
            SummaryDetail::MultipleChoice { options } => {
                let labels: Vec<&str> = options.iter().map(|o| o.option.as_str()).collect();
                assert_eq!(labels, vec!["Good", "No Answer"]);
            }
            x => panic!("unexpected detail {:?}", x),
        }
    }

    #[test]
    fn rejected_submission_is_not_stored() {
        let (store, form) = store_with_form();
        let res = submit_response(&store, &form.id, &submission(&form, &[(2, "Good")]));
        assert!(matches!(
            res,
            Err(SubmitError::Rejected {
                source: ValidationError::MissingRequiredAnswer { .. }
            })
        ));
        let res = submit_response(
            &store,
            &form.id,
            &submission(&form, &[(1, "Ann"), (2, "Excellent")]),
        );
        assert!(matches!(
            res,
            Err(SubmitError::Rejected {
                source: ValidationError::InvalidChoice { .. }
            })
        ));
        assert_eq!(store.list_responses(&form.id).unwrap(), vec![]);
    }

    #[test]
    fn unknown_form() {
        let (store, form) = store_with_form();
        let other = FormId(Uuid::from_u128(7));
        let res = submit_response(&store, &other, &submission(&form, &[(1, "Ann")]));
        assert!(matches!(
            res,
            Err(SubmitError::Lookup {
                source: StoreError::FormNotFound { .. },
                ..
            })
        ));
        assert_eq!(
            form_report(&store, &other),
            Err(StoreError::FormNotFound { form_id: other })
        );
    }

    #[test]
    fn inactive_form_rejects_submissions() {
        let (store, mut form) = store_with_form();
        form.is_active = false;
        store.add_form(form.clone()).unwrap();
        let res = submit_response(&store, &form.id, &submission(&form, &[(1, "Ann")]));
        assert!(matches!(
            res,
            Err(SubmitError::Lookup {
                source: StoreError::FormNotFound { .. },
                ..
            })
        ));
        // The analytics remain available.
        assert!(form_report(&store, &form.id).is_ok());
    }

    #[test]
    fn submission_for_another_form() {
        let (store, form) = store_with_form();
        let mut s = submission(&form, &[(1, "Ann")]);
        s.form = FormId(Uuid::from_u128(3));
        let res = submit_response(&store, &form.id, &s);
        assert!(matches!(res, Err(SubmitError::FormMismatch { .. })));
    }

    #[test]
    fn malformed_forms_are_refused() {
        let store = MemoryStore::new();
        let question = Question {
            id: QuestionId(1),
            text: "Anything else?".to_string(),
            kind: QuestionKind::Text,
            is_required: false,
            order: 7,
        };
        let form = Form {
            id: FormId(Uuid::nil()),
            title: "".to_string(),
            description: None,
            is_active: true,
            questions: vec![question.clone(), question],
        };
        assert_eq!(
            store.add_form(form.clone()),
            Err(StoreError::InvalidForm {
                form_id: form.id,
                source: FormError::EmptyTitle {}
            })
        );

        let mut form = form;
        form.title = "Exit survey".to_string();
        assert!(matches!(
            store.add_form(form.clone()),
            Err(StoreError::InvalidForm {
                source: FormError::OrderMismatch { .. },
                ..
            })
        ));
        // Nothing was registered.
        let res = submit_response(&store, &form.id, &submission(&form, &[(1, "x")]));
        assert!(matches!(
            res,
            Err(SubmitError::Lookup {
                source: StoreError::FormNotFound { .. },
                ..
            })
        ));
    }

    #[test]
    fn form_is_frozen_after_first_response() {
        let (store, form) = store_with_form();
        submit_response(&store, &form.id, &submission(&form, &[(1, "Ann")])).unwrap();
        assert!(matches!(
            store.add_form(form.clone()),
            Err(StoreError::Backend { .. })
        ));
    }

    #[test]
    fn concurrent_appends_are_not_lost() {
        init();
        let (store, form) = store_with_form();
        let store = Arc::new(store);
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                let form = form.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        let name = format!("thread {} response {}", t, i);
                        let s = submission(&form, &[(1, name.as_str())]);
                        submit_response(store.as_ref(), &form.id, &s).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let responses = store.list_responses(&form.id).unwrap();
        assert_eq!(responses.len(), 200);
        let ids: HashSet<ResponseId> = responses.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 200);
        // Submission order is preserved.
        let ordered: Vec<u64> = responses.iter().map(|r| r.id.0).collect();
        assert_eq!(ordered, (1..=200).collect::<Vec<u64>>());
    }

    #[test]
    fn export_from_store() {
        let (store, form) = store_with_form();
        submit_response(&store, &form.id, &submission(&form, &[(1, "Ann"), (2, "Bad")]))
            .unwrap();
        let out = export_form(&store, &form.id, &ExportSettings::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.split("\r\n").collect();
        assert_eq!(
            lines[0],
            "Response ID,Submitted At,Name a coworker who helped you,Coffee quality"
        );
        assert!(lines[1].starts_with("1,"));
        assert!(lines[1].ends_with(",Ann,Bad"));
    }
}
