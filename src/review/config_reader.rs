use crate::args::{KappaArgs, SelectArgs};
use crate::review::*;

use serde::{Deserialize, Serialize};

pub const MULTI_CATEGORY_MODE: &str = "multiCategory";
pub const BINARY_MODE: &str = "binary";

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct KappaSettings {
    pub mode: Option<String>,
    pub categories: Option<Vec<String>>,
    #[serde(rename = "unknownVotes")]
    pub unknown_votes: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct SelectionSettings {
    pub number: Option<usize>,
    pub seed: Option<u64>,
    #[serde(rename = "keyColumn")]
    pub key_column: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReviewConfig {
    pub kappa: Option<KappaSettings>,
    pub selection: Option<SelectionSettings>,
}

/// The settings of a selection, once the configuration file and the command line are merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SelectionRules {
    pub number: usize,
    pub seed: Option<u64>,
    pub key_column: String,
}

pub fn read_config(path: &Path) -> ReviewResult<ReviewConfig> {
    info!("Reading configuration {:?}", path);
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ReviewConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &Path) -> ReviewResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

/// Merges the kappa settings with the command line. Flags take precedence.
pub fn validate_kappa_rules(settings: &KappaSettings, args: &KappaArgs) -> ReviewResult<KappaRules> {
    let defaults = KappaRules::default();
    let mode = if args.binary {
        VoteMode::Binary
    } else {
        match settings.mode.as_deref() {
            None | Some(MULTI_CATEGORY_MODE) => VoteMode::MultiCategory,
            Some(BINARY_MODE) => VoteMode::Binary,
            Some(x) => {
                return InvalidConfigSnafu {
                    message: format!(
                        "unknown mode {:?}, expected {:?} or {:?}",
                        x, MULTI_CATEGORY_MODE, BINARY_MODE
                    ),
                }
                .fail()
            }
        }
    };

    let categories = args
        .categories
        .clone()
        .or_else(|| settings.categories.clone())
        .unwrap_or(defaults.categories);
    ensure!(
        !categories.is_empty(),
        InvalidConfigSnafu {
            message: "the list of categories is empty"
        }
    );
    for (idx, c) in categories.iter().enumerate() {
        ensure!(
            !categories[..idx].contains(c),
            InvalidConfigSnafu {
                message: format!("category {:?} is listed twice", c)
            }
        );
    }

    let unknown_vote_policy = if args.strict {
        UnknownVotePolicy::Reject
    } else {
        match settings.unknown_votes.as_deref() {
            None | Some("drop") => UnknownVotePolicy::Drop,
            Some("reject") => UnknownVotePolicy::Reject,
            Some(x) => {
                return InvalidConfigSnafu {
                    message: format!("unknown policy for unknown votes {:?}, expected \"drop\" or \"reject\"", x),
                }
                .fail()
            }
        }
    };

    Ok(KappaRules {
        mode,
        categories,
        unknown_vote_policy,
    })
}

/// Merges the selection settings with the command line. Flags take precedence.
pub fn validate_selection_rules(
    settings: &SelectionSettings,
    args: &SelectArgs,
) -> ReviewResult<SelectionRules> {
    let key_column = args
        .key_column
        .clone()
        .or_else(|| settings.key_column.clone())
        .unwrap_or_else(|| DEFAULT_KEY_COLUMN.to_string());
    ensure!(
        !key_column.is_empty(),
        InvalidConfigSnafu {
            message: "the key column cannot be empty"
        }
    );
    Ok(SelectionRules {
        number: args
            .number
            .or(settings.number)
            .unwrap_or(DEFAULT_SAMPLE_SIZE),
        seed: args.seed.or(settings.seed),
        key_column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kappa_args() -> KappaArgs {
        KappaArgs {
            csv_file: PathBuf::from("votes.csv"),
            binary: false,
            categories: None,
            strict: false,
            config: None,
            out: None,
            reference: None,
            verbose: false,
        }
    }

    fn select_args() -> SelectArgs {
        SelectArgs {
            csv_file: PathBuf::from("all_papers.csv"),
            number: None,
            seed: None,
            key_column: None,
            config: None,
            verbose: false,
        }
    }

    #[test]
    fn parse_config() {
        let js = r#"{
            "kappa": { "mode": "binary", "categories": ["A", "R"], "unknownVotes": "reject" },
            "selection": { "number": 12, "seed": 4, "keyColumn": "Title" }
        }"#;
        let config: ReviewConfig = serde_json::from_str(js).unwrap();
        let kappa = config.kappa.unwrap();
        assert_eq!(kappa.mode.as_deref(), Some("binary"));
        assert_eq!(kappa.unknown_votes.as_deref(), Some("reject"));
        let selection = config.selection.unwrap();
        assert_eq!(selection.number, Some(12));
        assert_eq!(selection.key_column.as_deref(), Some("Title"));
    }

    #[test]
    fn empty_config() {
        let config: ReviewConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ReviewConfig::default());
    }

    #[test]
    fn default_kappa_rules() {
        let rules = validate_kappa_rules(&KappaSettings::default(), &kappa_args()).unwrap();
        assert_eq!(rules, KappaRules::default());
    }

    #[test]
    fn flags_override_kappa_settings() {
        let settings = KappaSettings {
            mode: Some(MULTI_CATEGORY_MODE.to_string()),
            categories: Some(vec!["A".to_string(), "B".to_string()]),
            unknown_votes: Some("drop".to_string()),
        };
        let mut args = kappa_args();
        args.binary = true;
        args.strict = true;
        args.categories = Some(vec!["yes".to_string(), "no".to_string()]);
        let rules = validate_kappa_rules(&settings, &args).unwrap();
        assert_eq!(rules.mode, VoteMode::Binary);
        assert_eq!(rules.unknown_vote_policy, UnknownVotePolicy::Reject);
        assert_eq!(rules.categories, vec!["yes".to_string(), "no".to_string()]);
    }

    #[test]
    fn invalid_kappa_settings() {
        let settings = KappaSettings {
            mode: Some("ternary".to_string()),
            ..KappaSettings::default()
        };
        assert!(matches!(
            validate_kappa_rules(&settings, &kappa_args()),
            Err(ReviewError::InvalidConfig { .. })
        ));

        let settings = KappaSettings {
            categories: Some(vec!["A".to_string(), "A".to_string()]),
            ..KappaSettings::default()
        };
        assert!(matches!(
            validate_kappa_rules(&settings, &kappa_args()),
            Err(ReviewError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn selection_rules() {
        let rules = validate_selection_rules(&SelectionSettings::default(), &select_args()).unwrap();
        assert_eq!(rules.number, DEFAULT_SAMPLE_SIZE);
        assert_eq!(rules.key_column, DEFAULT_KEY_COLUMN);
        assert_eq!(rules.seed, None);

        let settings = SelectionSettings {
            number: Some(10),
            seed: Some(3),
            key_column: Some("Title".to_string()),
        };
        let mut args = select_args();
        args.number = Some(50);
        let rules = validate_selection_rules(&settings, &args).unwrap();
        assert_eq!(rules.number, 50);
        assert_eq!(rules.seed, Some(3));
        assert_eq!(rules.key_column, "Title");
    }
}
