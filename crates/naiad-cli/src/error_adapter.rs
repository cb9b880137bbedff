//! Error adapter for converting NaiadError to miette diagnostics.
//!
//! Naiad's errors carry user-facing messages but no source spans, so the
//! adapter only contributes an error code per variant for the graphical
//! report handler.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use naiad::NaiadError;

/// Adapter wrapping a [`NaiadError`] for miette rendering.
pub struct ErrorAdapter<'a>(pub &'a NaiadError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            NaiadError::Io(_) => "naiad::io",
            NaiadError::Share(_) => "naiad::share",
            NaiadError::Export(_) => "naiad::export",
            NaiadError::Render(_) => "naiad::render",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        None
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// Convert a [`NaiadError`] into the list of reportable errors.
pub fn to_reportables(err: &NaiadError) -> Vec<ErrorAdapter<'_>> {
    vec![ErrorAdapter(err)]
}
