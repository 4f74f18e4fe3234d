use crate::feedback::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "csvFileName")]
    pub csv_file_name: Option<String>,
    #[serde(rename = "numberedHeaders")]
    pub numbered_headers: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(rename = "formFile")]
    pub form_file: Option<String>,
    #[serde(rename = "responsesFile")]
    pub responses_file: Option<String>,
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
}

/// The locations resolved from the command line and the configuration file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Setup {
    pub form_path: PathBuf,
    pub responses_path: Option<PathBuf>,
    pub output_settings: OutputSettings,
    /// The directory against which relative paths of the configuration are resolved.
    pub root: PathBuf,
}

pub fn read_config(path: &str) -> FeedbackResult<FeedbackConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

/// Combines the command line flags with the configuration file, if any.
/// The flags take precedence.
pub fn resolve_sources(sources: &Sources) -> FeedbackResult<Setup> {
    let (config, root): (Option<FeedbackConfig>, PathBuf) = match sources.config.as_deref() {
        Some(config_path) => {
            let config = read_config(config_path)?;
            info!("config: {:?}", config);
            let root = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu { path: config_path })?
                .to_path_buf();
            (Some(config), root)
        }
        None => (None, PathBuf::new()),
    };

    let form_path: PathBuf = match (&sources.form, config.as_ref().and_then(|c| c.form_file.as_ref())) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => io_common::resolve_path(&root, p),
        (None, None) => return MissingFormSnafu.fail(),
    };
    let responses_path: Option<PathBuf> = match (
        &sources.responses,
        config.as_ref().and_then(|c| c.responses_file.as_ref()),
    ) {
        (Some(p), _) => Some(PathBuf::from(p)),
        (None, Some(p)) => Some(io_common::resolve_path(&root, p)),
        (None, None) => None,
    };
    let output_settings = config.map(|c| c.output_settings).unwrap_or_default();
    debug!(
        "resolve_sources: form: {:?} responses: {:?}",
        form_path, responses_path
    );
    Ok(Setup {
        form_path,
        responses_path,
        output_settings,
        root,
    })
}

/// Reads a reference summary.
pub fn read_summary(path: String) -> FeedbackResult<JSValue> {
    let contents = fs::read_to_string(&path).context(OpeningFileSnafu { path: &path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}
