use std::fmt::{self, Display};

/// Indentation of each action in terminal output.
const ACTION_INDENT: &str = "      ";

/// Every command and API call a test issued, in order.
///
/// Starts empty; a test that never touched the shell or the API ends with an
/// empty trace and gets no record row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandTrace {
    actions: Vec<String>,
}

impl CommandTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: impl Into<String>) {
        self.actions.push(action.into());
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn last(&self) -> Option<&str> {
        self.actions.last().map(String::as_str)
    }

    /// Value of the record file's `command` column: one action per line.
    pub fn command_column(&self) -> String {
        self.actions.join("\n")
    }
}

/// Indented, one action per line, each line newline-terminated.
impl Display for CommandTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in &self.actions {
            writeln!(f, "{ACTION_INDENT}{action}")?;
        }
        Ok(())
    }
}
