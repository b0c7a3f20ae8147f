use inquire::{Confirm, InquireError, Select, Text};
use miette::Diagnostic;

/// The questions asked while releasing. Answers come from a terminal, or a script in tests.
pub(crate) trait Prompt {
    /// Index of the chosen option.
    fn select(&self, prompt: &str, options: Vec<String>) -> Result<usize, Error>;
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, Error>;
    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String, Error>;
}

/// Interactive prompts on the terminal.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Terminal;

impl Prompt for Terminal {
    fn select(&self, prompt: &str, options: Vec<String>) -> Result<usize, Error> {
        Select::new(prompt, options)
            .raw_prompt()
            .map(|choice| choice.index)
            .map_err(Error::from)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, Error> {
        Confirm::new(prompt)
            .with_default(default)
            .prompt()
            .map_err(Error::from)
    }

    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String, Error> {
        let mut text = Text::new(prompt);
        if let Some(default) = default {
            text = text.with_default(default);
        }
        text.prompt().map_err(Error::from)
    }
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    /// The operator backed out of a question with escape.
    #[error("Prompt cancelled")]
    #[diagnostic(code(prompt::cancelled))]
    Cancelled,
    #[error("Failed to get user input")]
    #[diagnostic(
        code(prompt),
        help(
            "This step requires user input, but no user input was provided. \
            Run in a terminal, or pass --bump to release without prompts."
        )
    )]
    Failed(#[source] InquireError),
}

impl From<InquireError> for Error {
    fn from(err: InquireError) -> Self {
        match err {
            InquireError::OperationCanceled => Self::Cancelled,
            err => Self::Failed(err),
        }
    }
}
