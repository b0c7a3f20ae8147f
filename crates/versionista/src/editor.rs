use std::{fs, io, process::ExitStatus};

use miette::Diagnostic;
use tracing::debug;

/// Lets the operator rewrite release notes before they're published.
pub(crate) trait Editor {
    /// The text after editing, verbatim.
    fn edit(&self, initial: &str) -> Result<String, Error>;
}

/// Opens a temporary Markdown file in an external program and waits for it to exit.
#[derive(Clone, Debug)]
pub(crate) struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    const FALLBACK: &'static str = "vi";

    /// `configured` wins, then `$EDITOR`, then `vi`.
    pub(crate) fn new(configured: Option<&str>) -> Self {
        let command = configured
            .map(String::from)
            .or_else(|| std::env::var("EDITOR").ok())
            .map(|command| command.trim().to_string())
            .filter(|command| !command.is_empty())
            .unwrap_or_else(|| Self::FALLBACK.to_string());
        Self { command }
    }
}

impl Editor for ExternalEditor {
    fn edit(&self, initial: &str) -> Result<String, Error> {
        // Removed when dropped, however this function returns
        let file = tempfile::Builder::new()
            .prefix("changelog-")
            .suffix(".md")
            .tempfile()
            .map_err(Error::TempFile)?;
        fs::write(file.path(), initial).map_err(Error::TempFile)?;
        debug!("Running {} {}", self.command, file.path().display());
        let status = execute::command(&self.command)
            .arg(file.path())
            .status()
            .map_err(|source| Error::Spawn {
                command: self.command.clone(),
                source,
            })?;
        if !status.success() {
            return Err(Error::Exit {
                command: self.command.clone(),
                status,
            });
        }
        fs::read_to_string(file.path()).map_err(Error::TempFile)
    }
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error("Could not prepare the file to edit: {0}")]
    #[diagnostic(code(editor::temp_file))]
    TempFile(#[source] io::Error),
    #[error("Could not run editor {command}: {source}")]
    #[diagnostic(
        code(editor::spawn),
        help("Set `editor` in the config file or the EDITOR environment variable")
    )]
    Spawn {
        command: String,
        source: io::Error,
    },
    #[error("Editor {command} exited with {status}")]
    #[diagnostic(code(editor::failed))]
    Exit { command: String, status: ExitStatus },
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod test_external_editor {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn unchanged_file() {
        let editor = ExternalEditor::new(Some("true"));
        assert_eq!(editor.edit("| notes |\n").unwrap(), "| notes |\n");
    }

    #[test]
    fn edits_replace_everything() {
        let editor = ExternalEditor::new(Some(r#"sh -c 'printf edited > "$0"'"#));
        assert_eq!(editor.edit("generated").unwrap(), "edited");
    }

    #[test]
    fn failing_editor() {
        let editor = ExternalEditor::new(Some("false"));
        assert!(matches!(editor.edit("notes"), Err(Error::Exit { .. })));
    }

    #[test]
    fn missing_editor() {
        let editor = ExternalEditor::new(Some("definitely-not-an-editor-on-path"));
        assert!(matches!(editor.edit("notes"), Err(Error::Spawn { .. })));
    }
}
