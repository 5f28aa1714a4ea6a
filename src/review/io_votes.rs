// Primitives for reading the CSV files of votes.

use crate::review::*;

/// Reads a vote file: no header, one row per subject, one column per rater.
///
/// Rows may have different lengths. They are checked later, when the count
/// matrix is validated.
pub fn read_votes(path: &Path) -> ReviewResult<Vec<VoteRow>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;

    let mut res: Vec<VoteRow> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let votes: VoteRow = line.iter().map(|s| s.to_string()).collect();
        debug!("read_votes: lineno: {:?} votes: {:?}", lineno, votes);
        res.push(votes);
    }
    info!("Read {} subjects from {:?}", res.len(), path);
    Ok(res)
}
