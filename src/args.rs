use clap::{Parser, Subcommand};

/// This is a program to validate, tabulate and export the responses of feedback forms.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, global = true, takes_value = false)]
    pub verbose: bool,
}

/// Where to find the form and its responses.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct Sources {
    /// (file path, optional) The configuration file of the form, in JSON format.
    /// For more information about the file format, read the documentation of the manual.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The form definition, in JSON format. Setting this option overrides the
    /// path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub form: Option<String>,

    /// (file path) The file holding the responses, in JSON format. It is created on the first
    /// submission if it does not exist. Setting this option overrides the path that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub responses: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Computes the statistics of every question of the form.
    Summary {
        #[clap(flatten)]
        sources: Sources,

        /// (file path, 'stdout' or empty) Where to write the summary in JSON format.
        #[clap(short, long, value_parser)]
        out: Option<String>,

        /// (file path) A reference file containing a summary in JSON format. If provided,
        /// feedbackctl will check that the computed summary matches the reference.
        #[clap(long, value_parser)]
        reference: Option<String>,
    },
    /// Exports all the responses as a CSV file.
    Export {
        #[clap(flatten)]
        sources: Sources,

        /// (file path) The CSV file to write. Defaults to the output settings of the
        /// configuration, or to responses.csv.
        #[clap(short, long, value_parser)]
        out: Option<String>,

        /// Prefix the question columns with their number (Q1, Q2, ...).
        #[clap(long, takes_value = false)]
        numbered_headers: bool,
    },
    /// Validates a submission and appends it to the responses.
    Submit {
        #[clap(flatten)]
        sources: Sources,

        /// (file path) The submission, in JSON format.
        #[clap(short, long, value_parser)]
        input: String,
    },
    /// Checks that a form is well formed.
    Check {
        #[clap(flatten)]
        sources: Sources,
    },
}
