//! Source span tracking for diagnostics

/// A span in the directive source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

/// Line and column position in source code (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span used for directives built in code rather than parsed from text
    pub fn dummy() -> Self {
        Self::default()
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn to_line_col(&self, source: &str) -> LineCol {
        offset_to_line_col(source, self.start)
    }

    /// Format span as "line:col"
    pub fn format_position(&self, source: &str) -> String {
        let pos = self.to_line_col(source);
        format!("{}:{}", pos.line, pos.col)
    }

    /// Render the offending source line with a caret marker under the span
    ///
    /// ```text
    ///   --> leaf.zs:3:5
    ///    |
    ///  3 |     .local foo
    ///    |     ^^^^^^^^^^ local 'foo' is already defined
    /// ```
    pub fn format_error_context(&self, source: &str, filename: Option<&str>, label: &str) -> String {
        let pos = self.to_line_col(source);
        let line_text = source.lines().nth(pos.line - 1).unwrap_or("");
        let gutter = pos.line.to_string().len();

        let line_remaining = line_text.chars().count().saturating_sub(pos.col - 1);
        let width = self.end.saturating_sub(self.start).clamp(1, line_remaining.max(1));

        let location = match filename {
            Some(name) => format!("{}:{}:{}", name, pos.line, pos.col),
            None => format!("{}:{}", pos.line, pos.col),
        };

        format!(
            "{pad}--> {location}\n{pad} |\n{line:>gutter$} | {text}\n{pad} | {indent}{marker} {label}",
            pad = " ".repeat(gutter),
            line = pos.line,
            text = line_text,
            indent = " ".repeat(pos.col - 1),
            marker = "^".repeat(width),
        )
    }
}

fn offset_to_line_col(source: &str, offset: usize) -> LineCol {
    let mut line = 1;
    let mut col = 1;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }

        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    LineCol { line, col }
}

/// A node with an associated span
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    pub fn dummy(node: T) -> Self {
        Self {
            node,
            span: Span::dummy(),
        }
    }
}
