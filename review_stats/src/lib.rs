mod config;
pub mod manual;
pub mod sampling;

use log::{debug, info, warn};

use std::collections::BTreeMap;

pub use crate::config::*;
pub use crate::sampling::*;

/// Builds the count matrix out of the raw votes.
///
/// Arguments:
/// * `votes` one row per subject, one label per rater
/// * `rules` the mode and the category set to use
///
/// In multi-category mode, the columns of the matrix follow the order of
/// `rules.categories`. In binary mode, the columns are `[Accept, Reject]`.
pub fn build_count_matrix(
    votes: &[VoteRow],
    rules: &KappaRules,
) -> Result<CountMatrix, KappaErrors> {
    let categories: Vec<String> = match rules.mode {
        VoteMode::MultiCategory => rules.categories.clone(),
        VoteMode::Binary => vec![ACCEPT.to_string(), REJECT.to_string()],
    };
    debug!(
        "build_count_matrix: {:?} subjects, mode: {:?}, categories: {:?}",
        votes.len(),
        rules.mode,
        categories
    );

    let mut counts: Vec<Vec<u64>> = Vec::with_capacity(votes.len());
    let mut dropped: Vec<u64> = Vec::with_capacity(votes.len());
    for (idx, row) in votes.iter().enumerate() {
        let tally = tally_votes(row);
        let matrix_row = match rules.mode {
            VoteMode::MultiCategory => {
                multi_category_row(idx, &tally, &categories, rules.unknown_vote_policy)?
            }
            VoteMode::Binary => binary_row(&tally),
        };
        let counted: u64 = matrix_row.iter().sum();
        dropped.push(row.len() as u64 - counted);
        counts.push(matrix_row);
    }
    Ok(CountMatrix {
        categories,
        counts,
        dropped,
    })
}

// Ordered by label so that warnings come out in a stable order.
fn tally_votes(row: &[String]) -> BTreeMap<&str, u64> {
    let mut tally: BTreeMap<&str, u64> = BTreeMap::new();
    for vote in row {
        *tally.entry(vote.as_str()).or_insert(0) += 1;
    }
    tally
}

fn multi_category_row(
    row_idx: usize,
    tally: &BTreeMap<&str, u64>,
    categories: &[String],
    policy: UnknownVotePolicy,
) -> Result<Vec<u64>, KappaErrors> {
    for (token, count) in tally.iter() {
        if categories.iter().any(|c| c == token) {
            continue;
        }
        match policy {
            UnknownVotePolicy::Drop => {
                warn!(
                    "subject {}: dropping {} vote(s) for unknown category {:?}",
                    row_idx, count, token
                );
            }
            UnknownVotePolicy::Reject => {
                return Err(KappaErrors::UnknownVote {
                    row: row_idx,
                    token: token.to_string(),
                });
            }
        }
    }
    Ok(categories
        .iter()
        .map(|c| tally.get(c.as_str()).cloned().unwrap_or(0))
        .collect())
}

fn binary_row(tally: &BTreeMap<&str, u64>) -> Vec<u64> {
    let mut accept = 0;
    let mut reject = 0;
    for (token, count) in tally.iter() {
        if is_reject_label(token) {
            reject += count;
        } else {
            accept += count;
        }
    }
    vec![accept, reject]
}

/// A label made only of decimal digits is one of the Reject reasons.
pub fn is_reject_label(label: &str) -> bool {
    !label.is_empty() && label.chars().all(|c| c.is_ascii_digit())
}

/// Computes Fleiss' Kappa for the given count matrix.
///
/// Every subject must have been rated by the same number of raters, and there must be at
/// least two raters. The result is undefined when all the votes fall in a single category.
/// These cases are reported as errors.
///
/// See [Fleiss' Kappa](https://en.wikipedia.org/wiki/Fleiss%27_kappa).
pub fn fleiss_kappa(matrix: &CountMatrix) -> Result<KappaResult, KappaErrors> {
    let num_subjects = matrix.num_subjects();
    let num_categories = matrix.num_categories();
    if num_subjects == 0 || num_categories == 0 {
        return Err(KappaErrors::EmptyMatrix);
    }

    let num_raters: u64 = matrix.counts[0].iter().sum();
    for (row, counts) in matrix.counts.iter().enumerate() {
        if counts.len() != num_categories {
            return Err(KappaErrors::DegenerateInput(format!(
                "subject {} has {} categories instead of {}",
                row,
                counts.len(),
                num_categories
            )));
        }
        let found: u64 = counts.iter().sum();
        if found != num_raters {
            return Err(KappaErrors::InconsistentRaters {
                row,
                expected: num_raters,
                found,
                dropped: matrix.dropped_in(0) + matrix.dropped_in(row),
            });
        }
    }
    if num_raters <= 1 {
        return Err(KappaErrors::DegenerateInput(format!(
            "{} rater(s) per subject, at least 2 are required",
            num_raters
        )));
    }

    let column_totals: Vec<u64> = (0..num_categories)
        .map(|j| matrix.counts.iter().map(|row| row[j]).sum())
        .collect();
    let total_votes = num_subjects as u64 * num_raters;
    if let Some(j) = column_totals.iter().position(|c| *c == total_votes) {
        return Err(KappaErrors::DegenerateInput(format!(
            "all the votes are in category {:?}",
            matrix.categories[j]
        )));
    }

    let n = num_raters as f64;
    let proportions: Vec<f64> = column_totals
        .iter()
        .map(|c| *c as f64 / total_votes as f64)
        .collect();
    let observed_agreement: f64 = matrix
        .counts
        .iter()
        .map(|row| {
            let squares: u64 = row.iter().map(|c| c * c).sum();
            (squares as f64 - n) / (n * (n - 1.0))
        })
        .sum::<f64>()
        / num_subjects as f64;
    let expected_agreement: f64 = proportions.iter().map(|p| p * p).sum();
    let kappa = (observed_agreement - expected_agreement) / (1.0 - expected_agreement);

    debug!(
        "fleiss_kappa: subjects: {:?} raters: {:?} observed: {:?} expected: {:?}",
        num_subjects, num_raters, observed_agreement, expected_agreement
    );

    Ok(KappaResult {
        kappa,
        observed_agreement,
        expected_agreement,
        num_subjects,
        num_raters,
        dropped_votes: matrix.total_dropped(),
        category_proportions: matrix
            .categories
            .iter()
            .cloned()
            .zip(proportions)
            .collect(),
    })
}

/// Runs the whole computation: count matrix, then agreement.
pub fn compute_kappa(votes: &[VoteRow], rules: &KappaRules) -> Result<KappaResult, KappaErrors> {
    info!(
        "Processing {:?} subjects, rules: {:?}",
        votes.len(),
        rules
    );
    let matrix = build_count_matrix(votes, rules)?;
    fleiss_kappa(&matrix)
}
