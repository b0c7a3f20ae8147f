use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, command, value_parser};
use versionista_versioning::Bump;

const RELEASE: &str = "release";
const REVIEW: &str = "review";
const CONFIG: &str = "config";
const VERBOSE: &str = "verbose";
const TARGET: &str = "target";
const PROJECT: &str = "project";
const BUMP: &str = "bump";
const DRY_RUN: &str = "dry-run";

/// What was asked for on the command line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Cli {
    pub(crate) config: Option<PathBuf>,
    pub(crate) verbose: bool,
    pub(crate) action: Action,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Action {
    Release {
        target: Target,
        bump: Option<Bump>,
        dry_run: bool,
    },
    Review {
        target: Target,
    },
}

/// The positional target and `--project`, before they're looked up in the config.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Target {
    pub(crate) project: Option<String>,
    pub(crate) name: Option<String>,
}

impl Cli {
    pub(crate) fn parse() -> Self {
        Self::from_matches(&build().get_matches())
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let action = match matches.subcommand() {
            Some((RELEASE, matches)) => Action::Release {
                target: Target::from_matches(matches),
                bump: matches.get_one::<String>(BUMP).map(|bump| Bump::from(bump.as_str())),
                dry_run: matches.get_flag(DRY_RUN),
            },
            // `review` is the only other subcommand
            subcommand => Action::Review {
                target: subcommand
                    .map(|(_, matches)| Target::from_matches(matches))
                    .unwrap_or_default(),
            },
        };
        Self {
            config: matches.get_one::<PathBuf>(CONFIG).cloned(),
            verbose: matches.get_flag(VERBOSE),
            action,
        }
    }
}

impl Target {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            project: matches.get_one::<String>(PROJECT).cloned(),
            name: matches.get_one::<String>(TARGET).cloned(),
        }
    }
}

fn build() -> Command {
    let target = Arg::new(TARGET).help(
        "A project, a repository of a project, or any repository as owner/name. \
        Defaults to the only configured project.",
    );
    let project = Arg::new(PROJECT)
        .long(PROJECT)
        .short('p')
        .help("The project to work on, or the project TARGET belongs to");
    command!()
        .subcommand_required(true)
        .arg(
            Arg::new(CONFIG)
                .long(CONFIG)
                .short('c')
                .global(true)
                .env("VERSIONISTA_CONFIG")
                .value_parser(value_parser!(PathBuf))
                .help("Config file to use instead of .versionista.yml in the current or home directory"),
        )
        .arg(
            Arg::new(VERBOSE)
                .long(VERBOSE)
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Show every pull request as it's collected"),
        )
        .subcommand(
            Command::new(RELEASE)
                .about("Publish new releases of everything that changed since its latest release")
                .arg(target.clone())
                .arg(project.clone())
                .arg(
                    Arg::new(BUMP)
                        .long(BUMP)
                        .short('b')
                        .value_parser(["patch", "minor", "major"])
                        .ignore_case(true)
                        .help("Bump every repository with changes this way, without asking anything"),
                )
                .arg(
                    Arg::new(DRY_RUN)
                        .long(DRY_RUN)
                        .action(ArgAction::SetTrue)
                        .help("Do everything except publishing, and show what would be published"),
                ),
        )
        .subcommand(
            Command::new(REVIEW)
                .about("Show the latest released version of each repository")
                .arg(target)
                .arg(project),
        )
}
