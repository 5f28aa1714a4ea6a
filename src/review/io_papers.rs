// Reading and writing the tables of papers, and discovery of the previous rounds.

use std::fs::OpenOptions;
use std::io::ErrorKind;

use crate::review::*;

/// A file holding the papers of a previous round.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundFile {
    pub number: u32,
    pub path: PathBuf,
}

pub fn read_paper_table(path: &Path) -> ReviewResult<PaperTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let headers: Vec<String> = rdr
        .headers()
        .context(CsvHeaderSnafu { path })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_paper_table: header: {:?}", headers);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        rows.push(line.iter().map(|s| s.to_string()).collect());
    }
    Ok(PaperTable::new(headers, rows))
}

/// Writes the table to a new file. An existing file is never overwritten.
pub fn write_paper_table(path: &Path, table: &PaperTable) -> ReviewResult<()> {
    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return OutputExistsSnafu { path }.fail();
        }
        Err(e) => return Err(e).context(CreateOutputSnafu { path }),
    };
    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(&table.headers)
        .context(CsvWriteSnafu { path })?;
    for row in table.rows.iter() {
        wtr.write_record(row).context(CsvWriteSnafu { path })?;
    }
    wtr.flush().context(CreateOutputSnafu { path })?;
    info!("Wrote {} papers to {:?}", table.len(), path);
    Ok(())
}

/// Finds the files of the previous rounds in the given directory, in file name order.
///
/// The file of the pool itself is never considered as a round, even if its name
/// looks like one.
pub fn find_round_files(dir: &Path, pool_path: &Path) -> ReviewResult<Vec<RoundFile>> {
    let pool_name = pool_path.file_name();
    let mut names: Vec<String> = Vec::new();
    for entry_r in fs::read_dir(dir).context(ListDirectorySnafu { path: dir })? {
        let entry = entry_r.context(ListDirectorySnafu { path: dir })?;
        if Some(entry.file_name().as_os_str()) == pool_name || !entry.path().is_file() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) if is_round_file_name(name) => names.push(name.to_string()),
            Some(_) => {}
            None => {
                debug!("find_round_files: skipping {:?}", entry.file_name());
            }
        }
    }
    names.sort();

    let mut res: Vec<RoundFile> = Vec::new();
    for name in names {
        let number = parse_round_number(&name).context(InvalidRoundFileNameSnafu {
            name: name.as_str(),
        })?;
        debug!("find_round_files: round {} in {:?}", number, name);
        res.push(RoundFile {
            number,
            path: dir.join(&name),
        });
    }
    Ok(res)
}
