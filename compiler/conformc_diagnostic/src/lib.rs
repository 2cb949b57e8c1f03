//! Contains the definition of the [`Diagnostic`] struct and related types.

use std::fmt::{self, Display};

use colored::Colorize;

/// Implement this trait for a type that can report a diagnostic.
///
/// Error structs stay small and hold IDs only. The parameter (usually the
/// declaration model) supplies the names needed to render a readable message.
pub trait Report<Param> {
    /// Creates a diagnostic.
    fn report(&self, parameter: Param) -> Diagnostic;
}

/// Enumeration of the severity levels of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// The analysed program is rejected.
    Error,

    /// An informational message.
    Info,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "{}", "[error]:".bright_red().bold()),
            Self::Info => write!(f, "{}", "[info]:".bright_green().bold()),
        }
    }
}

/// Additional information displayed alongside the main [`Diagnostic`].
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_new::new,
)]
pub struct Related {
    /// The entity the note is about (a trait, struct or transition site).
    pub subject: String,

    /// The message to display to the user.
    pub message: String,
}

/// A struct containing all the information required to display the
/// diagnostic to the user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Diagnostic {
    /// The message to display to the user.
    pub message: String,

    /// The severity of the diagnostic.
    pub severity: Severity,

    /// The optional help message displayed after the main message.
    pub help_message: Option<String>,

    /// List of related useful information to display to the user.
    ///
    /// For example, for an ambiguous implementation, this lists every
    /// candidate that matched.
    pub related: Vec<Related>,
}

impl Diagnostic {
    /// Creates an error diagnostic with the given message and nothing else.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
            help_message: None,
            related: Vec::new(),
        }
    }

    /// Attaches a help message.
    #[must_use]
    pub fn with_help(mut self, help_message: impl Into<String>) -> Self {
        self.help_message = Some(help_message.into());
        self
    }

    /// Appends a related note.
    #[must_use]
    pub fn with_related(mut self, related: Related) -> Self {
        self.related.push(related);
        self
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.severity, self.message.bold())?;

        for related in &self.related {
            write!(
                f,
                "\n  {} {}: {}",
                "-->".bright_cyan().bold(),
                related.subject.bold(),
                related.message
            )?;
        }

        if let Some(help_message) = &self.help_message {
            write!(f, "\n  {} {help_message}", "help:".bright_cyan().bold())?;
        }

        Ok(())
    }
}
