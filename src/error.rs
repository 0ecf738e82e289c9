use std::fmt::{Debug, Display};

/// Error raised while loading drafts or profiles from outside the engine.
///
/// The calculation itself never fails; this type only appears at the I/O boundary.
pub struct Error {
    kind: ErrorKind,
    context: Vec<String>,
}

pub enum ErrorKind {
    Io(std::io::Error),
    Json(serde_json::Error),
    Other(String),
}

pub trait AddContext<T> {
    fn add_context(self, ctx: &str) -> Result<T, Error>;
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut context = self.context.clone();
        context.reverse();
        let context = if context.is_empty() {
            String::from("no context")
        } else {
            context.join(" -> ")
        };
        write!(f, "{context}")
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(e) => Some(e),
            ErrorKind::Json(e) => Some(e),
            ErrorKind::Other(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error {
            context: vec![value.to_string()],
            kind: ErrorKind::Io(value),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error {
            context: vec![value.to_string()],
            kind: ErrorKind::Json(value),
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error {
            context: vec![value.to_string()],
            kind: ErrorKind::Other(value),
        }
    }
}

impl Error {
    /// Add more context to the given error. This context will ultimately be displayed to the user
    /// and could be useful for correcting bad input files.
    ///
    /// Generally a single layer of context should be added for every level that an error is
    /// surfaced. If the error is surfaced all the way to main and not handled there, then all the
    /// context will be displayed to the user in reverse order
    ///
    /// # Arguments
    /// * `context` - Any additional information that would be useful for the user to see if the
    /// error is surfaced to them
    pub fn add_context(self, context: &str) -> Error {
        let mut existing = self.context;
        existing.push(context.to_string());
        Self {
            context: existing,
            ..self
        }
    }

    /// The underlying cause of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl<T> AddContext<T> for Result<T, Error> {
    fn add_context(self, ctx: &str) -> Result<T, Error> {
        match self {
            Ok(d) => Ok(d),
            Err(e) => Err(e.add_context(ctx)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_displayed_outermost_first() {
        let err = Error::from(String::from("bad profile"))
            .add_context("reading profile")
            .add_context("starting cli");
        assert_eq!(err.to_string(), "starting cli -> reading profile -> bad profile");
    }

    #[test]
    fn add_context_passes_ok_through() {
        let ok: Result<u8, Error> = Ok(3);
        assert_eq!(ok.add_context("unused").unwrap(), 3);
    }

    #[test]
    fn json_errors_keep_their_kind() {
        let err = Error::from(serde_json::from_str::<u8>("nope").unwrap_err());
        assert!(matches!(err.kind(), ErrorKind::Json(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
