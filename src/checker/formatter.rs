use super::TypeError;
use crate::lexer::LineBreaks;
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::path::Path;

const ARIADNE_MSG: &'static str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &'static str = "Write into buffer should not fail.";

pub trait TypeErrorFormatter {
    fn format_error(&self, error: &TypeError) -> String;

    fn format_errors(&self, errors: &[TypeError]) -> String {
        let mut buffer = String::new();
        for error in errors {
            buffer.push_str(&self.format_error(error));
            buffer.push('\n');
        }
        buffer
    }
}

pub struct DebugTypeErrorFormatter;

impl TypeErrorFormatter for DebugTypeErrorFormatter {
    fn format_error(&self, error: &TypeError) -> String {
        format!("{error:?}")
    }
}

pub struct BasicTypeErrorFormatter {
    line_breaks: LineBreaks,
}

impl BasicTypeErrorFormatter {
    pub fn new(text: &str) -> Self {
        Self {
            line_breaks: LineBreaks::new(text),
        }
    }
}

impl TypeErrorFormatter for BasicTypeErrorFormatter {
    fn format_error(&self, error: &TypeError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        format!("[line {line}] Error: {}", error.kind)
    }
}

pub struct PrettyTypeErrorFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyTypeErrorFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }
}

impl<'src> TypeErrorFormatter for PrettyTypeErrorFormatter<'src> {
    fn format_error(&self, error: &TypeError) -> String {
        let path = &self.path.to_string_lossy();
        let mut output = std::io::Cursor::new(Vec::new());
        let span = error.span;
        Report::build(ReportKind::Error, (path, span.range()))
            .with_code(error.code())
            .with_message("Type error")
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
