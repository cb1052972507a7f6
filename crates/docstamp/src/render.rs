//! Single-pass rendering of a [`HeaderDraft`] into comment text.
//!
//! Two output flavours exist: plain text, written straight into a file, and
//! editor snippets, where every editable region becomes a numbered
//! `${n:default}` tab stop. Column alignment is computed on visible width, so
//! both flavours line up identically once the snippet is expanded.

use crate::model::{DraftLine, Fragment, HeaderDraft, TagLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Plain,
    Snippet,
}

/// Column starts for the value, name and description of tag lines, counted
/// in visible characters after the ` * ` line prefix. `0` disables a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Columns {
    pub value: usize,
    pub name: usize,
    pub description: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RenderStyle {
    pub mode: RenderMode,
    /// Indentation of the declaration line, repeated on every comment line.
    pub indent: String,
    pub single_line: bool,
    pub columns: Columns,
}

impl RenderStyle {
    pub fn plain(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_single_line(mut self, single_line: bool) -> Self {
        self.single_line = single_line;
        self
    }

    pub fn with_columns(mut self, columns: Columns) -> Self {
        self.columns = columns;
        self
    }
}

/// Renders the draft as a comment block meant to be inserted at the
/// declaration anchor. The text ends with a newline plus the indentation, so
/// the declaration keeps its original column.
///
/// Lines whose content renders empty (a plain-mode description with no text)
/// count as blank lines, so they are trimmed at the delimiters and collapsed
/// with neighbouring blanks.
pub fn render(draft: &HeaderDraft, style: &RenderStyle) -> String {
    let mut writer = LineWriter::new(style);
    let indent = style.indent.as_str();

    let mut rows: Vec<Option<String>> = Vec::with_capacity(draft.lines().len());
    for line in draft.lines() {
        let row = match line {
            DraftLine::Blank => None,
            DraftLine::Tag(tag) => Some(writer.line(tag)).filter(|content| !content.is_empty()),
        };
        if row.is_none() && rows.last().is_none_or(Option::is_none) {
            continue;
        }
        rows.push(row);
    }
    while rows.last().is_some_and(Option::is_none) {
        rows.pop();
    }

    if style.single_line {
        if let [Some(content)] = rows.as_slice() {
            return format!("/** {content} */\n{indent}");
        }
    }

    let mut out = String::from("/**\n");
    for row in &rows {
        out.push_str(indent);
        match row {
            Some(content) => {
                out.push_str(" * ");
                out.push_str(content);
                out.push('\n');
            }
            None => out.push_str(" *\n"),
        }
    }
    out.push_str(indent);
    out.push_str(" */\n");
    out.push_str(indent);
    out
}

struct LineWriter<'s> {
    style: &'s RenderStyle,
    next_stop: usize,
}

impl<'s> LineWriter<'s> {
    fn new(style: &'s RenderStyle) -> Self {
        Self {
            style,
            next_stop: 1,
        }
    }

    fn snippet(&self) -> bool {
        self.style.mode == RenderMode::Snippet
    }

    fn line(&mut self, line: &TagLine) -> String {
        let mut content = Content::default();

        if let Some(tag) = &line.tag {
            content.push_text(&format!("@{tag}"), self.snippet());
        }

        if let Some(value) = &line.value {
            let column = self.column(line, self.style.columns.value);
            content.separate(column);
            if let Some(prefix) = &line.value_prefix {
                content.push_text(prefix, self.snippet());
            }
            if let Some(wrapper) = line.wrapper {
                content.push_text(wrapper.open, self.snippet());
            }
            let value = if line.force_placeholder {
                Fragment::placeholder(value.as_str())
            } else {
                value.clone()
            };
            self.push_fragment(&mut content, &value);
            if let Some(wrapper) = line.wrapper {
                content.push_text(wrapper.close, self.snippet());
            }
        }

        if let Some(name) = &line.name {
            let column = self.column(line, self.style.columns.name);
            content.separate(column);
            self.push_fragment(&mut content, name);
        }

        if let Some(description) = &line.description {
            let visible = !description.as_str().is_empty()
                || (self.snippet() && description.is_placeholder());
            if visible {
                let column = self.column(line, self.style.columns.description);
                content.separate(column);
                self.push_fragment(&mut content, description);
            }
        }

        content.text
    }

    fn column(&self, line: &TagLine, column: usize) -> usize {
        if line.align { column } else { 0 }
    }

    fn push_fragment(&mut self, content: &mut Content, fragment: &Fragment) {
        match fragment {
            Fragment::Text(text) => content.push_text(text, self.snippet()),
            Fragment::Placeholder(text) if self.snippet() => {
                let stop = self.next_stop;
                self.next_stop += 1;
                let rendered = if text.is_empty() {
                    format!("${{{stop}}}")
                } else {
                    format!("${{{stop}:{}}}", escape_placeholder(text))
                };
                content.push_raw(&rendered, fragment.visible_width());
            }
            Fragment::Placeholder(text) => content.push_text(text, false),
        }
    }
}

/// Rendered line content plus its visible width.
#[derive(Default)]
struct Content {
    text: String,
    width: usize,
}

impl Content {
    fn separate(&mut self, column: usize) {
        if self.width == 0 && self.text.is_empty() {
            if column > 0 {
                self.pad(column);
            }
            return;
        }
        if column > self.width {
            self.pad(column - self.width);
        } else {
            self.pad(1);
        }
    }

    fn pad(&mut self, count: usize) {
        for _ in 0..count {
            self.text.push(' ');
        }
        self.width += count;
    }

    fn push_text(&mut self, text: &str, snippet: bool) {
        if snippet {
            self.text.push_str(&escape_text(text));
        } else {
            self.text.push_str(text);
        }
        self.width += text.chars().count();
    }

    fn push_raw(&mut self, raw: &str, visible: usize) {
        self.text.push_str(raw);
        self.width += visible;
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '$' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn escape_placeholder(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '$' | '\\' | '}') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
