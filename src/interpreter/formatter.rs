use super::RuntimeError;
use crate::lexer::LineBreaks;
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::path::Path;

const ARIADNE_MSG: &'static str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &'static str = "Write into buffer should not fail.";

pub trait RuntimeErrorFormatter {
    fn format_error(&self, error: &RuntimeError) -> String;
}

pub struct DebugRuntimeErrorFormatter;

impl RuntimeErrorFormatter for DebugRuntimeErrorFormatter {
    fn format_error(&self, error: &RuntimeError) -> String {
        format!("{error:?}")
    }
}

pub struct BasicRuntimeErrorFormatter {
    line_breaks: LineBreaks,
}

impl BasicRuntimeErrorFormatter {
    pub fn new(text: &str) -> Self {
        Self {
            line_breaks: LineBreaks::new(text),
        }
    }
}

impl RuntimeErrorFormatter for BasicRuntimeErrorFormatter {
    fn format_error(&self, error: &RuntimeError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        format!("{}\n[line {line}]", error.kind)
    }
}

pub struct PrettyRuntimeErrorFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyRuntimeErrorFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }
}

impl<'src> RuntimeErrorFormatter for PrettyRuntimeErrorFormatter<'src> {
    fn format_error(&self, error: &RuntimeError) -> String {
        let path = &self.path.to_string_lossy();
        let mut output = std::io::Cursor::new(Vec::new());
        let span = error.span;
        let message = if error.is_arithmetic() {
            "Arithmetic error"
        } else {
            "Runtime error"
        };
        Report::build(ReportKind::Error, (path, span.range()))
            .with_code(error.code())
            .with_message(message)
            .with_label(
                Label::new((path, span.range()))
                    .with_message(error.kind.to_string())
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((path, Source::from(self.text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}
