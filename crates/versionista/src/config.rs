use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use miette::Diagnostic;
use tracing::debug;
use versionista_config::Config;

const CONFIG_FILE: &str = ".versionista.yml";
const TOKEN_VARIABLE: &str = "GITHUB_TOKEN";

/// Find, read, and validate the config file.
///
/// `explicit` is used as-is. Otherwise `.versionista.yml` is looked for in the current directory,
/// then the home directory. `GITHUB_TOKEN` stands in for a missing `gh_token`.
pub(crate) fn load(explicit: Option<&Path>) -> Result<Config, Error> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => find()?,
    };
    debug!("Using config file {}", path.display());
    let source = fs::read_to_string(&path).map_err(|source| Error::Read {
        path: path.clone(),
        source,
    })?;
    let config = Config::from_yaml(&source)?.with_token_fallback(env::var(TOKEN_VARIABLE).ok());
    config.validate()?;
    Ok(config)
}

fn find() -> Result<PathBuf, Error> {
    let candidates = env::current_dir()
        .ok()
        .into_iter()
        .chain(dirs::home_dir())
        .map(|dir| dir.join(CONFIG_FILE))
        .collect_vec();
    candidates
        .iter()
        .find(|path| path.is_file())
        .cloned()
        .ok_or_else(|| Error::NotFound {
            searched: candidates
                .iter()
                .map(|path| path.display().to_string())
                .join(", "),
        })
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error("No config file found, looked for {searched}")]
    #[diagnostic(
        code(config::not_found),
        help("Create .versionista.yml, or pass --config with the path to one")
    )]
    NotFound { searched: String },
    #[error("Could not read {}: {source}", .path.display())]
    #[diagnostic(code(config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] versionista_config::Error),
}
