// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// One row of the vote table: the labels given by each rater to a subject.
pub type VoteRow = Vec<String>;

/// A table of papers, as read from a CSV file with a header row.
///
/// The column order of the header is preserved by all the operations.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PaperTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PaperTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> PaperTable {
        PaperTable { headers, rows }
    }

    /// An empty table with the same columns.
    pub fn with_headers_of(other: &PaperTable) -> PaperTable {
        PaperTable {
            headers: other.headers.clone(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The position of the given column in the header.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }
}

/// A previously drawn subset of papers.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Round {
    pub number: u32,
    pub papers: PaperTable,
}

// ******** Output data structures *********

/// The count matrix: `counts[i][j]` is the number of raters that put
/// subject `i` in category `j`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CountMatrix {
    pub categories: Vec<String>,
    pub counts: Vec<Vec<u64>>,
    /// Number of votes of each subject that matched no category. May be empty.
    pub dropped: Vec<u64>,
}

impl CountMatrix {
    pub fn num_subjects(&self) -> usize {
        self.counts.len()
    }

    pub fn num_categories(&self) -> usize {
        self.categories.len()
    }

    pub fn dropped_in(&self, row: usize) -> u64 {
        self.dropped.get(row).cloned().unwrap_or(0)
    }

    pub fn total_dropped(&self) -> u64 {
        self.dropped.iter().sum()
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct KappaResult {
    pub kappa: f64,
    /// Mean observed agreement.
    pub observed_agreement: f64,
    /// Agreement expected by chance.
    pub expected_agreement: f64,
    pub num_subjects: usize,
    pub num_raters: u64,
    /// Votes that matched no category and were not counted.
    pub dropped_votes: u64,
    /// Marginal proportion of each category, in category order.
    pub category_proportions: Vec<(String, f64)>,
}

/// Errors that prevent the agreement from being computed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum KappaErrors {
    /// No subject or no category.
    EmptyMatrix,
    /// A subject was not rated by the same number of raters as the first one.
    InconsistentRaters {
        row: usize,
        expected: u64,
        found: u64,
        /// Unknown votes dropped from the first subject and from this one.
        dropped: u64,
    },
    /// A vote outside of the category set, under the reject policy.
    UnknownVote { row: usize, token: String },
    /// The formula is undefined for this input (too few raters or all the votes
    /// in a single category).
    DegenerateInput(String),
}

impl Error for KappaErrors {}

impl Display for KappaErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KappaErrors::EmptyMatrix => write!(f, "no subject or no category to rate"),
            KappaErrors::InconsistentRaters {
                row,
                expected,
                found,
                dropped,
            } => {
                write!(
                    f,
                    "subject {} has {} votes but the first subject has {}",
                    row, found, expected
                )?;
                if *dropped > 0 {
                    write!(f, " ({} unknown vote(s) dropped from these subjects)", dropped)?;
                }
                Ok(())
            }
            KappaErrors::UnknownVote { row, token } => {
                write!(f, "subject {}: vote {:?} is not a known category", row, token)
            }
            KappaErrors::DegenerateInput(msg) => write!(f, "degenerate input: {}", msg),
        }
    }
}

/// Errors raised while excluding prior rounds or drawing a sample.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SamplingErrors {
    MissingKeyColumn { column: String },
    DuplicateKey { column: String, key: String },
    InsufficientPool { requested: usize, available: usize },
}

impl Error for SamplingErrors {}

impl Display for SamplingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SamplingErrors::MissingKeyColumn { column } => {
                write!(f, "missing key column {:?}", column)
            }
            SamplingErrors::DuplicateKey { column, key } => {
                write!(f, "value {:?} appears more than once in column {:?}", key, column)
            }
            SamplingErrors::InsufficientPool {
                requested,
                available,
            } => write!(
                f,
                "cannot select {} papers: only {} remain in the pool",
                requested, available
            ),
        }
    }
}

// ********* Configuration **********

/// How the votes are mapped to categories.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum VoteMode {
    /// Every label of the category set is its own category.
    MultiCategory,
    /// Two categories: digit labels are Reject, everything else is Accept.
    Binary,
}

/// What happens to a vote that is not in the category set.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum UnknownVotePolicy {
    /// The vote is not counted. A warning is logged.
    Drop,
    /// The computation fails.
    Reject,
}

pub const ACCEPT: &str = "Accept";
pub const REJECT: &str = "Reject";

pub const DEFAULT_CATEGORIES: [&str; 7] = ["A", "1", "2", "3", "4", "5", "6"];

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct KappaRules {
    pub mode: VoteMode,
    /// The labels used in multi-category mode, in matrix column order.
    pub categories: Vec<String>,
    pub unknown_vote_policy: UnknownVotePolicy,
}

impl KappaRules {
    pub fn binary() -> KappaRules {
        KappaRules {
            mode: VoteMode::Binary,
            ..KappaRules::default()
        }
    }
}

impl Default for KappaRules {
    fn default() -> Self {
        KappaRules {
            mode: VoteMode::MultiCategory,
            categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            unknown_vote_policy: UnknownVotePolicy::Drop,
        }
    }
}

pub const DEFAULT_KEY_COLUMN: &str = "Article";
pub const DEFAULT_SAMPLE_SIZE: usize = 35;
