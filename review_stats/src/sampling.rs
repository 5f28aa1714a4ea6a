// Exclusion of the papers selected in prior rounds, and selection of the next round.

use log::{debug, info, warn};
use rand::Rng;
use std::collections::HashSet;

use crate::config::*;

/// All the files of previous rounds contain this marker in their name.
pub const ROUND_FILE_MARKER: &str = "papers_round";

// Lock and backup files created by office suites.
const BACKUP_FILE_PREFIX: &str = ".~";

/// The file name of the given round: `papers_round_<number>.csv`.
pub fn round_file_name(number: u32) -> String {
    format!("{}_{}.csv", ROUND_FILE_MARKER, number)
}

/// True if the file name looks like the output of a previous round.
pub fn is_round_file_name(file_name: &str) -> bool {
    file_name.contains(ROUND_FILE_MARKER) && !file_name.starts_with(BACKUP_FILE_PREFIX)
}

/// Extracts the round number from a name such as `papers_round_3.csv`.
pub fn parse_round_number(file_name: &str) -> Option<u32> {
    let stem = file_name.strip_suffix(".csv")?;
    let (_, digits) = stem.rsplit_once('_')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok()
}

/// The number of the round following all the given rounds (1 if there is none).
pub fn next_round_number(rounds: &[Round]) -> u32 {
    rounds.iter().map(|r| r.number).max().unwrap_or(0) + 1
}

/// Checks that the key column exists and that every key is unique in this table.
///
/// Returns the position of the key column.
pub fn check_unique_keys(table: &PaperTable, key_column: &str) -> Result<usize, SamplingErrors> {
    let idx = table
        .column_index(key_column)
        .ok_or_else(|| SamplingErrors::MissingKeyColumn {
            column: key_column.to_string(),
        })?;
    let mut seen: HashSet<&str> = HashSet::new();
    for row in table.rows.iter() {
        let key = key_of(row, idx);
        if !seen.insert(key) {
            return Err(SamplingErrors::DuplicateKey {
                column: key_column.to_string(),
                key: key.to_string(),
            });
        }
    }
    Ok(idx)
}

fn key_of(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.as_str()).unwrap_or("")
}

/// The papers of the pool that were not selected in any of the given rounds.
///
/// The order of the pool is preserved. Papers of a round that are not part of
/// the pool are ignored.
pub fn remaining_pool(
    pool: &PaperTable,
    rounds: &[Round],
    key_column: &str,
) -> Result<PaperTable, SamplingErrors> {
    let pool_idx = check_unique_keys(pool, key_column)?;
    let pool_keys: HashSet<&str> = pool.rows.iter().map(|r| key_of(r, pool_idx)).collect();

    let mut selected: HashSet<&str> = HashSet::new();
    for round in rounds.iter() {
        let idx = check_unique_keys(&round.papers, key_column)?;
        for row in round.papers.rows.iter() {
            let key = key_of(row, idx);
            if !pool_keys.contains(key) {
                warn!(
                    "round {}: paper {:?} is not in the pool, ignoring it",
                    round.number, key
                );
            }
            selected.insert(key);
        }
        debug!(
            "remaining_pool: round {} has {} papers",
            round.number,
            round.papers.len()
        );
    }

    let rows: Vec<Vec<String>> = pool
        .rows
        .iter()
        .filter(|r| !selected.contains(key_of(r, pool_idx)))
        .cloned()
        .collect();
    info!(
        "{} papers in the pool, {} remaining after {} round(s)",
        pool.len(),
        rows.len(),
        rounds.len()
    );
    Ok(PaperTable::new(pool.headers.clone(), rows))
}

/// Draws `number` distinct papers uniformly at random, in random order.
pub fn sample_papers<R: Rng + ?Sized>(
    pool: &PaperTable,
    number: usize,
    rng: &mut R,
) -> Result<PaperTable, SamplingErrors> {
    if number > pool.len() {
        return Err(SamplingErrors::InsufficientPool {
            requested: number,
            available: pool.len(),
        });
    }
    let mut selection = PaperTable::with_headers_of(pool);
    for idx in rand::seq::index::sample(rng, pool.len(), number).iter() {
        selection.rows.push(pool.rows[idx].clone());
    }
    Ok(selection)
}

/// Computes the next round: excludes the prior rounds from the pool, then draws the sample.
///
/// Returns the number of the new round and its papers.
pub fn select_next_round<R: Rng + ?Sized>(
    pool: &PaperTable,
    rounds: &[Round],
    key_column: &str,
    number: usize,
    rng: &mut R,
) -> Result<Round, SamplingErrors> {
    let remaining = remaining_pool(pool, rounds, key_column)?;
    let papers = sample_papers(&remaining, number, rng)?;
    Ok(Round {
        number: next_round_number(rounds),
        papers,
    })
}
