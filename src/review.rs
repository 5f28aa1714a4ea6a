use env_logger::Env;
use log::{debug, info, warn};

use review_stats::*;
use snafu::{prelude::*, Snafu};

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::{KappaArgs, SelectArgs};
use crate::review::config_reader::*;
use crate::review::io_common::simplify_file_name;
use crate::review::io_papers::*;
use crate::review::io_votes::read_votes;

pub mod config_reader;
pub mod io_common;
pub mod io_papers;
pub mod io_votes;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ReviewError {
    #[snafu(display("Error opening file {}", path.display()))]
    CsvOpen { source: csv::Error, path: PathBuf },
    #[snafu(display("Error reading the header of {}", path.display()))]
    CsvHeader { source: csv::Error, path: PathBuf },
    #[snafu(display("Error parsing line {} of {}", lineno, path.display()))]
    CsvLineParse {
        source: csv::Error,
        path: PathBuf,
        lineno: usize,
    },
    #[snafu(display("Error writing {}", path.display()))]
    CsvWrite { source: csv::Error, path: PathBuf },
    #[snafu(display("Refusing to overwrite the existing file {}", path.display()))]
    OutputExists { path: PathBuf },
    #[snafu(display("Error creating file {}", path.display()))]
    CreateOutput {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Error opening file {}", path.display()))]
    OpeningInput {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Could not find the directory of {}", path.display()))]
    MissingParentDir { path: PathBuf },
    #[snafu(display("Error listing the directory {}", path.display()))]
    ListDirectory {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Cannot find a round number in the file name {:?}, expected papers_round_<number>.csv", name))]
    InvalidRoundFileName { name: String },
    #[snafu(display("Error opening file {}", path.display()))]
    OpeningJson {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error serializing JSON"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {}", path.display()))]
    WritingJson {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Invalid configuration: {}", message))]
    InvalidConfig { message: String },
    #[snafu(display("Cannot compute Fleiss Kappa for {}", path.display()))]
    Kappa { source: KappaErrors, path: PathBuf },
    #[snafu(display("Cannot select the papers from {}", path.display()))]
    Sampling {
        source: SamplingErrors,
        path: PathBuf,
    },
    #[snafu(display("Difference detected between the computed summary and the reference summary {}", path.display()))]
    ReferenceMismatch { path: PathBuf },
}

pub type ReviewResult<T> = Result<T, ReviewError>;

/// Sets up the logger on the standard error. Warnings are shown by default, `RUST_LOG`
/// is honoured unless `verbose` is set.
pub fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

/// Prints an error and all its causes on the standard error.
pub fn report_error(e: &ReviewError) {
    warn!("Error occured {:?}", e);
    eprintln!("An error occured: {}", e);
    let mut source = e.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}

fn mode_name(mode: VoteMode) -> &'static str {
    match mode {
        VoteMode::MultiCategory => MULTI_CATEGORY_MODE,
        VoteMode::Binary => BINARY_MODE,
    }
}

fn build_summary_js(input: &Path, rules: &KappaRules, res: &KappaResult) -> JSValue {
    let mut proportions: JSMap<String, JSValue> = JSMap::new();
    for (name, p) in res.category_proportions.iter() {
        proportions.insert(name.clone(), json!(p));
    }
    json!({
        "input": simplify_file_name(input),
        "mode": mode_name(rules.mode),
        "subjects": res.num_subjects,
        "raters": res.num_raters,
        "droppedVotes": res.dropped_votes,
        "categoryProportions": proportions,
        "observedAgreement": res.observed_agreement,
        "expectedAgreement": res.expected_agreement,
        "kappa": res.kappa,
    })
}

fn write_summary(out: &str, pretty_js: &str) -> ReviewResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js);
    } else {
        let path = PathBuf::from(out);
        info!("Writing summary to {:?}", path);
        fs::write(&path, pretty_js).context(WritingJsonSnafu { path: path.clone() })?;
    }
    Ok(())
}

fn check_reference(reference: &Path, pretty_js: &str) -> ReviewResult<()> {
    let summary_ref = read_summary(reference)?;
    debug!("reference summary: {:?}", summary_ref);
    let pretty_js_ref =
        serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu {})?;
    if pretty_js_ref != pretty_js {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_ref.as_str(), pretty_js, "\n");
        return ReferenceMismatchSnafu { path: reference }.fail();
    }
    Ok(())
}

// Debug formatting keeps the decimal point of whole values (1.0, not 1).
fn kappa_line(kappa: f64) -> String {
    format!("The value of Fleiss Kappa is: {:?}", kappa)
}

/// Computes the agreement for the vote file given in the arguments.
pub fn run_kappa(args: &KappaArgs) -> ReviewResult<KappaResult> {
    let config = match &args.config {
        Some(p) => read_config(p)?,
        None => ReviewConfig::default(),
    };
    let rules = validate_kappa_rules(&config.kappa.unwrap_or_default(), args)?;
    info!("rules: {:?}", rules);

    let path = args.csv_file.as_path();
    println!("Computing Fleiss Kappa for file: {}", path.display());
    let votes = read_votes(path)?;
    let res = compute_kappa(&votes, &rules).context(KappaSnafu { path })?;
    if res.dropped_votes > 0 {
        println!(
            "Dropped {} vote(s) that match none of the categories {:?}.",
            res.dropped_votes, rules.categories
        );
    }
    println!("{}", kappa_line(res.kappa));

    if args.out.is_some() || args.reference.is_some() {
        let summary_js = build_summary_js(path, &rules, &res);
        let pretty_js =
            serde_json::to_string_pretty(&summary_js).context(SerializingJsonSnafu {})?;
        if let Some(out) = &args.out {
            write_summary(out, &pretty_js)?;
        }
        if let Some(reference) = &args.reference {
            check_reference(reference, &pretty_js)?;
        }
    }
    Ok(res)
}

/// Selects the papers of the next round and writes them next to the input file.
///
/// Returns the path of the new round file and its content.
pub fn run_selection(args: &SelectArgs) -> ReviewResult<(PathBuf, PaperTable)> {
    let config = match &args.config {
        Some(p) => read_config(p)?,
        None => ReviewConfig::default(),
    };
    let rules = validate_selection_rules(&config.selection.unwrap_or_default(), args)?;
    info!("rules: {:?}", rules);

    let pool_path = fs::canonicalize(&args.csv_file).context(OpeningInputSnafu {
        path: args.csv_file.as_path(),
    })?;
    let input_dir = pool_path
        .parent()
        .context(MissingParentDirSnafu { path: &pool_path })?;

    println!("Processing: {}", pool_path.display());
    let pool = read_paper_table(&pool_path)?;
    println!("Total of papers: {}", pool.len());

    let mut rounds: Vec<Round> = Vec::new();
    for round_file in find_round_files(input_dir, &pool_path)? {
        println!("Processing: {}", round_file.path.display());
        let papers = read_paper_table(&round_file.path)?;
        println!(
            "Round {} containing {} papers.",
            round_file.number,
            papers.len()
        );
        rounds.push(Round {
            number: round_file.number,
            papers,
        });
    }

    let remaining =
        remaining_pool(&pool, &rounds, &rules.key_column).context(SamplingSnafu {
            path: &pool_path,
        })?;
    println!("Number of papers after rounds: {}", remaining.len());

    let mut rng: Box<dyn RngCore> = match rules.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::rng()),
    };
    let selection = sample_papers(&remaining, rules.number, &mut rng).context(SamplingSnafu {
        path: &pool_path,
    })?;

    let round_number = next_round_number(&rounds);
    let out_path = input_dir.join(round_file_name(round_number));
    write_paper_table(&out_path, &selection)?;
    println!(
        "Selected {} papers for round {}.",
        selection.len(),
        round_number
    );
    println!("Selected papers saved at: {}", out_path.display());
    Ok((out_path, selection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    const HEADER: &str = "Responsável,Database,Tipo,Duplicado_na_linha,Downloaded,Autor(YEAR),Article,Link,Classificação\n";

    fn paper_line(title: &str) -> String {
        format!("Ana,Scopus,Journal,,yes,Doe(2020),{},http://x/{},\n", title, title)
    }

    fn write_papers(dir: &TempDir, name: &str, titles: &[&str]) -> PathBuf {
        let mut contents = HEADER.to_string();
        for t in titles {
            contents.push_str(&paper_line(t));
        }
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn select_args(csv_file: PathBuf, number: usize) -> SelectArgs {
        SelectArgs {
            csv_file,
            number: Some(number),
            seed: Some(1),
            key_column: None,
            config: None,
            verbose: false,
        }
    }

    fn kappa_args(csv_file: PathBuf) -> KappaArgs {
        KappaArgs {
            csv_file,
            binary: false,
            categories: None,
            strict: false,
            config: None,
            out: None,
            reference: None,
            verbose: false,
        }
    }

    fn titles(t: &PaperTable) -> HashSet<String> {
        t.rows.iter().map(|r| r[6].clone()).collect()
    }

    #[test]
    fn selection_writes_next_round() {
        let dir = TempDir::new().unwrap();
        let pool = write_papers(&dir, "all_papers.csv", &["P1", "P2", "P3", "P4", "P5"]);
        write_papers(&dir, "papers_round_1.csv", &["P1"]);
        write_papers(&dir, "papers_round_2.csv", &["P3"]);

        let (out, selection) = run_selection(&select_args(pool, 3)).unwrap();
        assert_eq!(out.file_name().unwrap(), "papers_round_3.csv");
        let expected: HashSet<String> = ["P2", "P4", "P5"].iter().map(|s| s.to_string()).collect();
        assert_eq!(titles(&selection), expected);

        let written = read_paper_table(&out).unwrap();
        assert_eq!(written, selection);
        assert_eq!(written.headers.len(), 9);
        assert_eq!(written.headers[6], "Article");
    }

    #[test]
    fn consecutive_rounds_never_repeat_papers() {
        let dir = TempDir::new().unwrap();
        let pool = write_papers(&dir, "all_papers.csv", &["P1", "P2", "P3", "P4"]);

        let (first_path, first) = run_selection(&select_args(pool.clone(), 2)).unwrap();
        let (second_path, second) = run_selection(&select_args(pool.clone(), 2)).unwrap();
        assert_eq!(first_path.file_name().unwrap(), "papers_round_1.csv");
        assert_eq!(second_path.file_name().unwrap(), "papers_round_2.csv");
        assert!(titles(&first).is_disjoint(&titles(&second)));

        let res = run_selection(&select_args(pool, 1));
        assert!(matches!(
            res,
            Err(ReviewError::Sampling {
                source: SamplingErrors::InsufficientPool {
                    requested: 1,
                    available: 0
                },
                ..
            })
        ));
        assert!(!dir.path().join("papers_round_3.csv").exists());
    }

    #[test]
    fn selection_numbers_after_highest_round() {
        let dir = TempDir::new().unwrap();
        let pool = write_papers(&dir, "papers_round_all.csv", &["P1", "P2", "P3", "P4"]);
        write_papers(&dir, "papers_round_9.csv", &["P1"]);
        write_papers(&dir, "papers_round_10.csv", &["P2"]);

        let (out, selection) = run_selection(&select_args(pool, 2)).unwrap();
        assert_eq!(out.file_name().unwrap(), "papers_round_11.csv");
        let expected: HashSet<String> = ["P3", "P4"].iter().map(|s| s.to_string()).collect();
        assert_eq!(titles(&selection), expected);
        assert!(!dir.path().join("papers_round_3.csv").exists());
    }

    #[test]
    fn selection_rejects_duplicate_titles() {
        let dir = TempDir::new().unwrap();
        let pool = write_papers(&dir, "all_papers.csv", &["P1", "P2", "P1"]);
        let res = run_selection(&select_args(pool, 1));
        assert!(matches!(
            res,
            Err(ReviewError::Sampling {
                source: SamplingErrors::DuplicateKey { .. },
                ..
            })
        ));
    }

    #[test]
    fn kappa_with_summary_and_reference() {
        let dir = TempDir::new().unwrap();
        let votes = dir.path().join("round_2_scores.csv");
        fs::write(&votes, "A,A,A\n1,1,1\n4,4,4\n").unwrap();
        let summary = dir.path().join("summary.json");

        let mut args = kappa_args(votes);
        args.out = Some(summary.display().to_string());
        let res = run_kappa(&args).unwrap();
        assert_eq!(res.kappa, 1.0);

        let js: JSValue = serde_json::from_str(&fs::read_to_string(&summary).unwrap()).unwrap();
        assert_eq!(js["input"], json!("round_2_scores.csv"));
        assert_eq!(js["mode"], json!("multiCategory"));
        assert_eq!(js["kappa"], json!(1.0));
        assert_eq!(js["raters"], json!(3));

        args.out = None;
        args.reference = Some(summary.clone());
        assert!(run_kappa(&args).is_ok());

        args.binary = true;
        let res = run_kappa(&args);
        assert!(matches!(res, Err(ReviewError::ReferenceMismatch { .. })));
    }

    #[test]
    fn kappa_binary_mode() {
        let dir = TempDir::new().unwrap();
        let votes = dir.path().join("votes.csv");
        fs::write(&votes, "A,1,2\nA,A,A\n3,5,6\n").unwrap();
        let mut args = kappa_args(votes);
        args.binary = true;
        let res = run_kappa(&args).unwrap();
        assert_eq!(res.category_proportions[0].0, ACCEPT);
        // Accept: 1 + 3 + 0 out of 9
        assert!((res.category_proportions[0].1 - 4.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn kappa_inconsistent_rows() {
        let dir = TempDir::new().unwrap();
        let votes = dir.path().join("votes.csv");
        fs::write(&votes, "A,1,2\nA,A\n").unwrap();
        let res = run_kappa(&kappa_args(votes));
        assert!(matches!(
            res,
            Err(ReviewError::Kappa {
                source: KappaErrors::InconsistentRaters { row: 1, .. },
                ..
            })
        ));
    }

    #[test]
    fn kappa_reports_dropped_votes() {
        let dir = TempDir::new().unwrap();
        let votes = dir.path().join("votes.csv");
        fs::write(&votes, "A,1,7\nA,1,1\n").unwrap();
        let err = run_kappa(&kappa_args(votes.clone())).unwrap_err();
        let cause = err.source().unwrap().to_string();
        assert!(cause.contains("1 unknown vote(s) dropped"), "cause: {}", cause);

        fs::write(&votes, "A,1,7\n1,1,7\n").unwrap();
        let summary = dir.path().join("summary.json");
        let mut args = kappa_args(votes);
        args.out = Some(summary.display().to_string());
        let res = run_kappa(&args).unwrap();
        assert_eq!(res.dropped_votes, 2);
        assert_eq!(res.num_raters, 2);
        let js: JSValue = serde_json::from_str(&fs::read_to_string(&summary).unwrap()).unwrap();
        assert_eq!(js["droppedVotes"], json!(2));
    }

    #[test]
    fn kappa_line_keeps_decimal_point() {
        assert_eq!(kappa_line(1.0), "The value of Fleiss Kappa is: 1.0");
        assert_eq!(kappa_line(-0.25), "The value of Fleiss Kappa is: -0.25");
    }

    #[test]
    fn kappa_strict_mode() {
        let dir = TempDir::new().unwrap();
        let votes = dir.path().join("votes.csv");
        fs::write(&votes, "A,1,X\nA,A,1\n").unwrap();
        let mut args = kappa_args(votes);
        args.strict = true;
        let res = run_kappa(&args);
        assert!(matches!(
            res,
            Err(ReviewError::Kappa {
                source: KappaErrors::UnknownVote { row: 0, .. },
                ..
            })
        ));
    }
}
