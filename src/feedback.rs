use log::{debug, info, warn};

use form_feedback::export::{export_csv, ExportError, ExportSettings, CSV_FILE_NAME};
use form_feedback::store::{form_report, submit_response, ResponseStore, StoreError, SubmitError};
use form_feedback::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::PathBuf;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Sources;
use crate::feedback::config_reader::*;
use crate::feedback::io_json::*;

pub mod config_reader;
mod io_common;
pub mod io_json;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FeedbackError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error locking {path}"))]
    Locking {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error producing JSON output"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("The form in {path} is not valid"))]
    InvalidForm { source: FormError, path: String },
    #[snafu(display("No form file provided (use --form or --config)"))]
    MissingForm {},
    #[snafu(display("No responses file provided (use --responses or --config)"))]
    MissingResponses {},
    #[snafu(display("Cannot find the directory of {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("Error accessing the responses"))]
    Store { source: StoreError },
    #[snafu(display("The submission was not accepted"))]
    Submit { source: SubmitError },
    #[snafu(display("Error exporting the responses"))]
    Export { source: ExportError },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},
}

pub type FeedbackResult<T> = Result<T, FeedbackError>;

fn build_summary_js(report: &FormReport) -> FeedbackResult<JSValue> {
    let results = serde_json::to_value(&report.questions).context(WritingJsonSnafu)?;
    Ok(json!({
        "form": {
            "id": report.form_id.to_string(),
            "title": report.title,
            "description": report.description,
        },
        "responseCount": report.response_count,
        "results": results
    }))
}

fn open_store(setup: &Setup) -> FeedbackResult<JsonFileStore> {
    let responses_path = setup
        .responses_path
        .clone()
        .context(MissingResponsesSnafu)?;
    JsonFileStore::open(&setup.form_path, &responses_path)
}

/// Computes the summary of a form and writes it out.
///
/// If a reference summary is provided, the computed summary must match it.
pub fn run_summary(
    sources: &Sources,
    out: Option<String>,
    reference: Option<String>,
) -> FeedbackResult<JSValue> {
    let setup = resolve_sources(sources)?;
    let store = open_store(&setup)?;
    let form_id = store.form().id;
    let report = form_report(&store, &form_id).context(StoreSnafu)?;
    let result_js = build_summary_js(&report)?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(WritingJsonSnafu)?;

    match out.as_deref() {
        None | Some("stdout") => {
            println!("{}", pretty_js_stats);
        }
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, &pretty_js_stats).context(WritingFileSnafu { path })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = reference {
        let summary_ref = read_summary(summary_p)?;
        debug!("summary: {:?}", summary_ref);
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(WritingJsonSnafu)?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu.fail();
        }
    }
    Ok(result_js)
}

/// Exports the responses as a CSV file and returns the location of the file.
pub fn run_export(
    sources: &Sources,
    out: Option<String>,
    numbered_headers: bool,
) -> FeedbackResult<PathBuf> {
    let setup = resolve_sources(sources)?;
    let store = open_store(&setup)?;
    let form = store.form().clone();
    let responses = store.list_responses(&form.id).context(StoreSnafu)?;
    if responses.is_empty() {
        warn!(
            "No responses found for form {:?}: only the header will be written",
            form.title
        );
    }

    let settings = ExportSettings {
        numbered_headers: numbered_headers
            || setup.output_settings.numbered_headers.unwrap_or(false),
    };
    let data = export_csv(&form, &responses, &settings).context(ExportSnafu)?;

    let out_p: PathBuf = match out {
        Some(p) => PathBuf::from(p),
        None => {
            let file_name = setup
                .output_settings
                .csv_file_name
                .clone()
                .unwrap_or_else(|| CSV_FILE_NAME.to_string());
            match setup.output_settings.output_directory.as_deref() {
                Some(dir) => io_common::resolve_path(&setup.root, dir).join(file_name),
                None => PathBuf::from(file_name),
            }
        }
    };
    let out_s = out_p.display().to_string();
    if let Some(parent) = out_p.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context(WritingFileSnafu {
                path: parent.display().to_string(),
            })?;
        }
    }
    fs::write(&out_p, &data).context(WritingFileSnafu { path: out_s.clone() })?;
    info!(
        "Wrote {} responses ({} bytes) to {}",
        responses.len(),
        data.len(),
        out_s
    );
    Ok(out_p)
}

/// Validates a submission and stores it.
pub fn run_submit(sources: &Sources, input: &str) -> FeedbackResult<Response> {
    let setup = resolve_sources(sources)?;
    let store = open_store(&setup)?;
    let submission = read_submission(input)?;
    let form_id = store.form().id;
    let response = submit_response(&store, &form_id, &submission).context(SubmitSnafu)?;
    let pretty = serde_json::to_string_pretty(&response).context(WritingJsonSnafu)?;
    println!("{}", pretty);
    Ok(response)
}

/// Loads a form and checks its structure.
pub fn run_check(sources: &Sources) -> FeedbackResult<Form> {
    let setup = resolve_sources(sources)?;
    let form = read_form(&setup.form_path)?;
    info!("Form {:?} ({}) is valid", form.title, form.id);
    for q in form.questions.iter() {
        info!(
            "Question {}: {} [{}{}]",
            q.order + 1,
            q.text,
            q.kind.type_name(),
            if q.is_required { ", required" } else { "" }
        );
        if let Some(options) = q.options() {
            if options.is_empty() {
                warn!(
                    "Question {} has no options: it can only be left blank",
                    q.id
                );
            }
        }
    }
    if !form.is_active {
        warn!("Form {} is not active: submissions will be refused", form.id);
    }
    Ok(form)
}
