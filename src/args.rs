use clap::Parser;
use std::path::PathBuf;

/// Computes the Fleiss' Kappa agreement between raters from a CSV file of votes.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct KappaArgs {
    /// (file path) CSV file containing the votes for the subjects. No header: each row is a
    /// subject, each column is a rater.
    #[clap(value_parser)]
    pub csv_file: PathBuf,

    /// Compute Kappa for binary categories (Accept|Reject). All the numeric votes are
    /// considered as Reject.
    #[clap(short, long, takes_value = false)]
    pub binary: bool,

    /// (list of comma-separated values, default A,1,2,3,4,5,6) The labels of the categories
    /// in multi-category mode. This overrides the categories of the --config file.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub categories: Option<Vec<String>>,

    /// If passed, a vote that is not one of the categories is an error instead of being dropped.
    #[clap(long, takes_value = false)]
    pub strict: bool,

    /// (file path, optional) A JSON configuration file. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<PathBuf>,

    /// (file path or 'stdout') If specified, the summary of the computation will be written in
    /// JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, the computed summary must
    /// match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<PathBuf>,

    /// If passed as an argument, will turn on verbose logging to the standard error.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

/// Selects randomly a subset of papers that were not selected in the previous rounds.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct SelectArgs {
    /// (file path) CSV file containing the list of all the papers, with a header row.
    #[clap(value_parser)]
    pub csv_file: PathBuf,

    /// (default 35) Number of papers to select.
    #[clap(short, long, value_parser)]
    pub number: Option<usize>,

    /// (integer, optional) Seed of the random generator, to make the selection reproducible.
    #[clap(short, long, value_parser)]
    pub seed: Option<u64>,

    /// (default Article) The column holding the title of the paper. Titles must be unique.
    #[clap(short, long, value_parser)]
    pub key_column: Option<String>,

    /// (file path, optional) A JSON configuration file. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<PathBuf>,

    /// If passed as an argument, will turn on verbose logging to the standard error.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
