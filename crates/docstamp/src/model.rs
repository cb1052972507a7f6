use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of declaration categories; each selects a fixed header pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationKind {
    /// Class declaration or expression, or an interface.
    #[serde(rename = "class")]
    ClassLike,
    Property,
    Accessor,
    Enum,
    /// Function declaration, method, method signature, or (optionally) a
    /// variable initialized with a function.
    Method,
    Constructor,
    TypeAlias,
    Variable,
    /// File-level header; only produced as a position fallback.
    File,
}

impl DeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClassLike => "class",
            Self::Property => "property",
            Self::Accessor => "accessor",
            Self::Enum => "enum",
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::TypeAlias => "typeAlias",
            Self::Variable => "variable",
            Self::File => "file",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A piece of header text: either fixed, or an editable region with default
/// text (a numbered placeholder in snippet output).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Placeholder(String),
}

impl Fragment {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn placeholder(value: impl Into<String>) -> Self {
        Self::Placeholder(value.into())
    }

    /// An editable region with no default text.
    pub fn empty() -> Self {
        Self::Placeholder(String::new())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(text) | Self::Placeholder(text) => text,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// Width the fragment occupies once rendered, ignoring snippet syntax.
    pub fn visible_width(&self) -> usize {
        self.as_str().chars().count()
    }
}

/// Balanced delimiters around a tag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrapper {
    pub open: &'static str,
    pub close: &'static str,
}

impl Wrapper {
    pub const BRACES: Wrapper = Wrapper {
        open: "{",
        close: "}",
    };
}

/// One line of a header: `@tag prefix{value} name description`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagLine {
    /// Tag name without the leading `@`.
    pub tag: Option<String>,
    /// Emitted directly before the wrapper (`...` for rest parameters).
    pub value_prefix: Option<String>,
    pub value: Option<Fragment>,
    pub wrapper: Option<Wrapper>,
    pub name: Option<Fragment>,
    pub description: Option<Fragment>,
    /// Subject to column alignment.
    pub align: bool,
    /// Render the value as an editable region even when it is fixed text.
    pub force_placeholder: bool,
}

impl TagLine {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            align: true,
            ..Self::default()
        }
    }

    /// Free-text line (the declaration description).
    pub fn description(text: Fragment) -> Self {
        Self {
            description: Some(text),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: Fragment, wrapper: Option<Wrapper>) -> Self {
        self.value = Some(value);
        self.wrapper = wrapper;
        self
    }

    pub fn with_value_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.value_prefix = Some(prefix.into());
        self
    }

    pub fn with_name(mut self, name: Fragment) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_description(mut self, description: Fragment) -> Self {
        self.description = Some(description);
        self
    }

    pub fn editable_value(mut self) -> Self {
        self.force_placeholder = true;
        self
    }

    /// `true` when the wrapped value has balanced delimiters.
    pub fn is_balanced(&self) -> bool {
        match (&self.value, self.wrapper) {
            (Some(value), Some(wrapper)) => {
                let text = value.as_str();
                text.matches(wrapper.open).count() == text.matches(wrapper.close).count()
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftLine {
    Blank,
    Tag(TagLine),
}

/// Ordered, append-only sequence of header lines for one declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderDraft {
    lines: Vec<DraftLine>,
}

impl HeaderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: TagLine) {
        self.lines.push(DraftLine::Tag(line));
    }

    pub fn push_blank(&mut self) {
        self.lines.push(DraftLine::Blank);
    }

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    pub fn tag_lines(&self) -> impl Iterator<Item = &TagLine> {
        self.lines.iter().filter_map(|line| match line {
            DraftLine::Tag(tag) => Some(tag),
            DraftLine::Blank => None,
        })
    }

    /// Names of the tags in emission order.
    pub fn tags(&self) -> Vec<&str> {
        self.tag_lines().filter_map(|line| line.tag.as_deref()).collect()
    }

    /// Number of non-blank lines.
    pub fn content_len(&self) -> usize {
        self.tag_lines().count()
    }

    /// Drops blank lines adjacent to either comment delimiter and collapses
    /// runs of blank lines into one.
    pub fn terminate(&mut self) {
        let mut result: Vec<DraftLine> = Vec::with_capacity(self.lines.len());
        for line in self.lines.drain(..) {
            let is_blank = line == DraftLine::Blank;
            let after_blank_or_start = result.last().is_none_or(|prev| *prev == DraftLine::Blank);
            if is_blank && after_blank_or_start {
                continue;
            }
            result.push(line);
        }
        while result.last() == Some(&DraftLine::Blank) {
            result.pop();
        }
        self.lines = result;
    }
}
