use std::error::Error;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use shuntspan::Spanned;

/// Anything that can render itself as a codespan diagnostic.
pub trait Report {
    fn diagnose(&self) -> Diagnostic<()>;
}

impl<T: Error> Report for Spanned<T> {
    fn diagnose(&self) -> Diagnostic<()> {
        Diagnostic::error()
            .with_message(self.node())
            .with_label(Label::primary((), self.span))
    }
}
