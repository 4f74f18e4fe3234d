// Primitives for writing CSV files.

use chrono::SecondsFormat;
use log::debug;
use snafu::{ResultExt, Snafu};
use std::io;

use crate::model::*;
use crate::store::{ResponseStore, StoreError};

/// The name of the exported file, unless the caller picks another one.
pub const CSV_FILE_NAME: &str = "responses.csv";

pub const CSV_CONTENT_TYPE: &str = "text/csv";

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ExportSettings {
    /// Prefix the question columns with their position (`Q1: ...`).
    pub numbered_headers: bool,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ExportError {
    #[snafu(display("Error loading the responses of form {form_id}"))]
    Load { form_id: FormId, source: StoreError },
    #[snafu(display("Error writing a CSV record"))]
    WriteRecord { source: csv::Error },
    #[snafu(display("Error finishing the CSV document"))]
    Finish { source: io::Error },
}

/// Writes all the responses of a form as a CSV document.
///
/// The first row is the header: `Response ID`, `Submitted At` and then the text of
/// every question, in the order of the form. Each response is then written on its own
/// row, in the order given. A question without an answer gets an empty cell.
///
/// Fields that contain a comma, a double quote or a line break are quoted. Records are
/// separated by CRLF.
pub fn export_csv(
    form: &Form,
    responses: &[Response],
    settings: &ExportSettings,
) -> Result<Vec<u8>, ExportError> {
    write_csv(form, responses, settings, Vec::new())
}

/// Same as [export_csv], but writes into `out`, which is returned once flushed.
pub fn write_csv<W: io::Write>(
    form: &Form,
    responses: &[Response],
    settings: &ExportSettings,
    out: W,
) -> Result<W, ExportError> {
    debug!(
        "write_csv: form {}: {} responses",
        form.id,
        responses.len()
    );
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(out);

    let mut header: Vec<String> = vec!["Response ID".to_string(), "Submitted At".to_string()];
    for (idx, q) in form.questions.iter().enumerate() {
        if settings.numbered_headers {
            header.push(format!("Q{}: {}", idx + 1, q.text));
        } else {
            header.push(q.text.clone());
        }
    }
    wtr.write_record(&header).context(WriteRecordSnafu)?;

    for r in responses.iter() {
        let mut row: Vec<&str> = Vec::with_capacity(header.len());
        let id = r.id.to_string();
        let submitted_at = r.submitted_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        row.push(&id);
        row.push(&submitted_at);
        for q in form.questions.iter() {
            row.push(
                r.answer_for(q.id)
                    .map(|a| a.answer_text.as_str())
                    .unwrap_or(""),
            );
        }
        wtr.write_record(&row).context(WriteRecordSnafu)?;
    }

    wtr.into_inner()
        .map_err(|e| e.into_error())
        .context(FinishSnafu)
}

/// Loads the form and its responses from the store and exports them.
pub fn export_form<S: ResponseStore + ?Sized>(
    store: &S,
    form_id: &FormId,
    settings: &ExportSettings,
) -> Result<Vec<u8>, ExportError> {
    let form = store
        .get_form(form_id)
        .context(LoadSnafu { form_id: *form_id })?;
    let responses = store
        .list_responses(form_id)
        .context(LoadSnafu { form_id: *form_id })?;
    export_csv(&form, &responses, settings)
}
