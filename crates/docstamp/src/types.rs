//! Type strings for header lines.
//!
//! Explicit annotations are used verbatim; everything else goes through a
//! [`TypeOracle`]. The bundled [`SyntacticOracle`] only looks at what the
//! parser recorded (literal initializers, `new X()`, patterns, return
//! statements) and never resolves symbols.

use crate::syntax::{BindingElement, NodeFlags, Parameter, Signature, SyntaxNode};

/// The JSDoc wildcard type.
pub const WILDCARD: &str = "*";

/// What a [`TypeOracle`] is asked about.
#[derive(Debug, Clone, Copy)]
pub enum TypeQuery<'a> {
    /// Type of a property, variable or accessor.
    Declaration(&'a SyntaxNode),
    Parameter(&'a Parameter),
    BindingElement(&'a BindingElement),
    /// Return type of a callable without a return annotation.
    Return(&'a Signature),
}

/// Type information provider for declarations without annotations.
pub trait TypeOracle: Send + Sync {
    /// Type text for the queried item, or `None` when unknown.
    fn type_of(&self, query: TypeQuery<'_>) -> Option<String>;
}

/// Oracle backed by the facts the parser extracted from the syntax alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntacticOracle;

impl TypeOracle for SyntacticOracle {
    fn type_of(&self, query: TypeQuery<'_>) -> Option<String> {
        match query {
            TypeQuery::Declaration(node) => node.inferred_type.clone(),
            TypeQuery::Parameter(param) => param.inferred_type.clone(),
            TypeQuery::BindingElement(element) => element.inferred_type.clone(),
            TypeQuery::Return(signature) => Some(infer_return(signature)),
        }
    }
}

fn infer_return(signature: &Signature) -> String {
    match (signature.is_async, signature.is_generator) {
        (true, true) => "AsyncGenerator".to_string(),
        (false, true) => "Generator".to_string(),
        (true, false) if signature.returns_value => format!("Promise<{WILDCARD}>"),
        (true, false) => "Promise<void>".to_string(),
        (false, false) if signature.returns_value => WILDCARD.to_string(),
        (false, false) => "void".to_string(),
    }
}

/// Modifier prefix attached to a rendered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePrefix {
    Optional,
    Definite,
    Rest,
    Generator,
}

impl TypePrefix {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Optional => "?",
            Self::Definite => "!",
            Self::Rest => "...",
            Self::Generator => "*",
        }
    }

    /// `true` when the prefix is written inside the braces (`{?T}`).
    pub fn binds_inside(self) -> bool {
        !matches!(self, Self::Rest)
    }

    /// Prefix for a non-parameter typed node. Precedence: optional, definite,
    /// generator.
    pub fn for_flags(flags: &NodeFlags) -> Option<Self> {
        if flags.optional {
            Some(Self::Optional)
        } else if flags.definite {
            Some(Self::Definite)
        } else if flags.generator {
            Some(Self::Generator)
        } else {
            None
        }
    }

    /// Prefix for a parameter; parameters only ever carry the rest prefix.
    pub fn for_parameter(param: &Parameter) -> Option<Self> {
        param.rest.then_some(Self::Rest)
    }
}

/// A type ready to be placed on a tag line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedType {
    /// Text emitted before the opening brace.
    pub outer_prefix: Option<&'static str>,
    /// Text emitted between the braces.
    pub value: String,
}

impl RenderedType {
    /// Full display form, braces included.
    pub fn display(&self) -> String {
        format!("{}{{{}}}", self.outer_prefix.unwrap_or(""), self.value)
    }
}

/// Turns annotations and oracle answers into display strings.
pub struct TypeRenderer<'o> {
    oracle: &'o dyn TypeOracle,
    parenthesize_compound: bool,
}

impl<'o> TypeRenderer<'o> {
    pub fn new(oracle: &'o dyn TypeOracle, parenthesize_compound: bool) -> Self {
        Self {
            oracle,
            parenthesize_compound,
        }
    }

    /// Display text for an item: the annotation when present, otherwise the
    /// oracle's answer, with `any`/`unknown`/absent mapped to `*`.
    pub fn resolve(&self, annotation: Option<&str>, query: TypeQuery<'_>) -> String {
        let text = match annotation {
            Some(text) => Some(text.to_string()),
            None => self.oracle.type_of(query),
        };
        canonicalize(text.as_deref())
    }

    /// Applies prefix and parenthesization to resolved type text.
    pub fn format(&self, text: &str, prefix: Option<TypePrefix>) -> RenderedType {
        let inside = prefix.filter(|prefix| prefix.binds_inside());
        let outer_prefix = prefix
            .filter(|prefix| !prefix.binds_inside())
            .map(TypePrefix::symbol);
        let wrap = is_compound(text) && (self.parenthesize_compound || inside.is_some());
        let body = if wrap {
            format!("({text})")
        } else {
            text.to_string()
        };
        let value = match inside {
            Some(prefix) => format!("{}{body}", prefix.symbol()),
            None => body,
        };
        RenderedType {
            outer_prefix,
            value,
        }
    }

    /// Return type text for a signature; `None` when nothing is returned.
    pub fn return_type(&self, signature: &Signature) -> Option<String> {
        let text = self.resolve(
            signature.return_annotation.as_deref(),
            TypeQuery::Return(signature),
        );
        (!is_no_value(&text)).then_some(text)
    }
}

/// Maps `any`, `unknown` and missing types to the wildcard.
pub fn canonicalize(text: Option<&str>) -> String {
    match text.map(str::trim) {
        None | Some("") | Some("any") | Some("unknown") => WILDCARD.to_string(),
        Some(text) => text.to_string(),
    }
}

/// `true` for type text that denotes the absence of a value.
pub fn is_no_value(text: &str) -> bool {
    let compact: String = text.chars().filter(|ch| !ch.is_whitespace()).collect();
    matches!(
        compact.as_str(),
        "void" | "undefined" | "never" | "Promise<void>" | "Promise<undefined>"
    )
}

/// `true` when the text has a `|` or `&` outside any brackets or strings.
pub fn is_compound(text: &str) -> bool {
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut prev = '\0';
    let mut seen_content = false;
    for ch in text.trim().chars() {
        if let Some(open) = quote {
            if ch == open && prev != '\\' {
                quote = None;
            }
            prev = ch;
            continue;
        }
        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '>' if prev != '=' => depth -= 1,
            // a leading `|` is a formatting artifact, not a union
            '|' | '&' if depth == 0 && seen_content => return true,
            _ => {}
        }
        if !ch.is_whitespace() && !matches!(ch, '|' | '&') {
            seen_content = true;
        }
        prev = ch;
    }
    false
}
