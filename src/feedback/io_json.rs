// Primitives for reading and writing the JSON files of a form.

use chrono::Utc;
use fd_lock::RwLock;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use form_feedback::store::FormNotFoundSnafu;

use crate::feedback::*;

pub fn read_form(path: &Path) -> FeedbackResult<Form> {
    let path_s = path.display().to_string();
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path: &path_s })?;
    let form: Form =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path: &path_s })?;
    form.check().context(InvalidFormSnafu { path: path_s })?;
    debug!(
        "read_form: {:?}: {} questions",
        form.title,
        form.questions.len()
    );
    Ok(form)
}

pub fn read_submission(path: &str) -> FeedbackResult<Submission> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

/// Reads the stored responses. A missing file means that nothing was submitted yet.
pub fn read_responses(path: &Path) -> FeedbackResult<Vec<Response>> {
    let path_s = path.display().to_string();
    if !path.exists() {
        debug!("read_responses: {} does not exist yet", path_s);
        return Ok(Vec::new());
    }
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path: &path_s })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path: path_s })
}

// The file is replaced in one step, so that readers never see a partial list.
fn write_responses(path: &Path, responses: &[Response]) -> FeedbackResult<()> {
    let js = serde_json::to_string_pretty(responses).context(WritingJsonSnafu)?;
    let dir = io_common::parent_dir(path);
    let mut tmp = NamedTempFile::new_in(&dir).context(WritingFileSnafu {
        path: dir.display().to_string(),
    })?;
    tmp.write_all(js.as_bytes()).context(WritingFileSnafu {
        path: tmp.path().display().to_string(),
    })?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .context(WritingFileSnafu {
            path: path.display().to_string(),
        })?;
    Ok(())
}

/// A store backed by a form file and a responses file.
pub struct JsonFileStore {
    form: Form,
    responses_path: PathBuf,
}

impl JsonFileStore {
    pub fn open(form_path: &Path, responses_path: &Path) -> FeedbackResult<JsonFileStore> {
        let form = read_form(form_path)?;
        Ok(JsonFileStore {
            form,
            responses_path: responses_path.to_path_buf(),
        })
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    fn check_form_id(&self, form_id: &FormId) -> Result<(), StoreError> {
        if *form_id != self.form.id {
            return FormNotFoundSnafu { form_id: *form_id }.fail();
        }
        Ok(())
    }

    // Appends under an exclusive lock on the lock file, which also excludes the
    // other processes working on the same responses.
    fn locked_append(&self, form_id: &FormId, answers: Vec<Answer>) -> FeedbackResult<Response> {
        let lock_p = io_common::lock_sibling(&self.responses_path);
        let lock_s = lock_p.display().to_string();
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_p)
            .context(LockingSnafu { path: &lock_s })?;
        let mut lock = RwLock::new(lock_file);
        let _guard = lock.write().context(LockingSnafu { path: &lock_s })?;

        let mut responses = read_responses(&self.responses_path)?;
        let last_id = responses.iter().map(|r| r.id.0).max().unwrap_or(0);
        let response = Response {
            id: ResponseId(last_id + 1),
            form: *form_id,
            submitted_at: Utc::now(),
            answers,
        };
        responses.push(response.clone());
        write_responses(&self.responses_path, &responses)?;
        debug!(
            "append_response: {} now holds {} responses",
            self.responses_path.display(),
            responses.len()
        );
        Ok(response)
    }
}

fn backend_error(e: FeedbackError) -> StoreError {
    StoreError::Backend {
        message: e.to_string(),
    }
}

impl ResponseStore for JsonFileStore {
    fn get_form(&self, form_id: &FormId) -> Result<Form, StoreError> {
        self.check_form_id(form_id)?;
        Ok(self.form.clone())
    }

    fn append_response(
        &self,
        form_id: &FormId,
        answers: ValidatedAnswers,
    ) -> Result<Response, StoreError> {
        self.check_form_id(form_id)?;
        self.locked_append(form_id, answers.into_answers())
            .map_err(backend_error)
    }

    fn list_responses(&self, form_id: &FormId) -> Result<Vec<Response>, StoreError> {
        self.check_form_id(form_id)?;
        let responses = read_responses(&self.responses_path).map_err(backend_error)?;
        let (own, others): (Vec<Response>, Vec<Response>) =
            responses.into_iter().partition(|r| r.form == *form_id);
        if !others.is_empty() {
            warn!(
                "list_responses: skipping {} responses that belong to other forms",
                others.len()
            );
        }
        Ok(own)
    }
}
