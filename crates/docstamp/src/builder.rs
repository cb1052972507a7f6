//! Header assembly.
//!
//! [`HeaderBuilder::build`] runs a fixed pipeline of stages per
//! [`DeclarationKind`] and appends lines to a [`HeaderDraft`]. Stage order is
//! never changed at runtime; configuration can only switch individual tags
//! off.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::classify::Classified;
use crate::config::GeneratorConfig;
use crate::description::{DescriptionRequest, DescriptionSource};
use crate::jsdoc::parse_header;
use crate::model::{DeclarationKind, Fragment, HeaderDraft, TagLine, Wrapper};
use crate::render::{RenderMode, RenderStyle};
use crate::syntax::{
    BindingShape, HeritageClause, Modifier, NodeId, Parameter, ParameterName, SyntaxKind,
    SyntaxNode, SyntaxTree,
};
use crate::types::{RenderedType, TypePrefix, TypeQuery, TypeRenderer, TypeOracle, canonicalize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Header,
    Modifiers,
    Kind,
    Heritage,
    Generics,
    Parameters,
    Return,
    Custom,
}

fn pipeline(kind: DeclarationKind) -> &'static [Stage] {
    use Stage::*;
    match kind {
        DeclarationKind::ClassLike => &[Header, Modifiers, Kind, Heritage, Generics, Custom],
        DeclarationKind::TypeAlias => &[Header, Modifiers, Kind, Generics, Custom],
        DeclarationKind::Enum => &[Header, Modifiers, Kind, Custom],
        DeclarationKind::Method => &[Header, Modifiers, Generics, Parameters, Return, Custom],
        DeclarationKind::Constructor => &[Header, Modifiers, Kind, Parameters, Custom],
        DeclarationKind::Property | DeclarationKind::Accessor | DeclarationKind::Variable => {
            &[Header, Modifiers, Kind, Custom]
        }
        DeclarationKind::File => &[Header, Custom],
    }
}

/// Builds header drafts for classified declarations.
pub struct HeaderBuilder {
    config: Arc<GeneratorConfig>,
    oracle: Arc<dyn TypeOracle>,
    descriptions: Arc<dyn DescriptionSource>,
    timestamp: Option<NaiveDateTime>,
}

impl HeaderBuilder {
    pub fn new(
        config: Arc<GeneratorConfig>,
        oracle: Arc<dyn TypeOracle>,
        descriptions: Arc<dyn DescriptionSource>,
    ) -> Self {
        Self {
            config,
            oracle,
            descriptions,
            timestamp: None,
        }
    }

    /// Pins the time used for `@date` lines.
    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Render style for a header inserted on a line indented by `indent`.
    pub fn render_style(&self, indent: &str, mode: RenderMode) -> RenderStyle {
        RenderStyle::plain(indent)
            .with_mode(mode)
            .with_single_line(self.config.single_line_comments)
            .with_columns(self.config.columns())
    }

    /// Builds the header for a file-level comment.
    pub async fn build_file(&self, tree: &SyntaxTree) -> HeaderDraft {
        let target = Classified {
            node: tree.root(),
            kind: DeclarationKind::File,
        };
        self.build(tree, target).await
    }

    /// Builds the header for one declaration.
    pub async fn build(&self, tree: &SyntaxTree, target: Classified) -> HeaderDraft {
        let node = tree.node(target.node);
        let mut draft = HeaderDraft::new();

        if node.has_modifier(Modifier::Override) {
            draft.push(TagLine::tag("override"));
            draft.push(TagLine::tag("inheritdoc"));
            return draft;
        }

        if target.kind == DeclarationKind::Accessor {
            if let Some(summary) = paired_summary(tree, target.node) {
                draft.push(TagLine::description(Fragment::text(summary)));
                draft.push(TagLine::tag("inheritdoc"));
                draft.terminate();
                return draft;
            }
        }

        let snippet = if target.kind == DeclarationKind::File {
            ""
        } else {
            tree.text(target.node)
        };
        let class_name = (target.kind == DeclarationKind::Constructor)
            .then(|| tree.parent(target.node))
            .flatten()
            .and_then(|parent| tree.node(parent).name.as_deref());
        let request = DescriptionRequest {
            kind: target.kind,
            name: node.name_or_default(),
            snippet,
            class_name,
        };

        let context = StageContext {
            builder: self,
            node,
            kind: target.kind,
            request,
            renderer: TypeRenderer::new(
                self.oracle.as_ref(),
                self.config.include_parenthesis_for_multiple_types,
            ),
        };
        for stage in pipeline(target.kind) {
            match stage {
                Stage::Header => context.header(&mut draft).await,
                Stage::Modifiers => context.modifiers(&mut draft),
                Stage::Kind => context.kind_tag(&mut draft),
                Stage::Heritage => context.heritage(&mut draft),
                Stage::Generics => context.generics(&mut draft).await,
                Stage::Parameters => context.parameters(&mut draft).await,
                Stage::Return => context.returns(&mut draft).await,
                Stage::Custom => context.custom_tags(&mut draft),
            }
        }
        draft.terminate();
        if !draft.tag_lines().all(TagLine::is_balanced) {
            warn!(
                path = %tree.path().display(),
                name = node.name_or_default(),
                "header carries a type with unbalanced braces"
            );
        }
        debug!(
            path = %tree.path().display(),
            kind = %target.kind,
            name = node.name_or_default(),
            tags = draft.content_len(),
            "built header"
        );
        draft
    }

    fn now(&self) -> NaiveDateTime {
        self.timestamp.unwrap_or_else(|| Local::now().naive_local())
    }
}

/// Description of the opposite accessor, when that accessor has a header.
fn paired_summary(tree: &SyntaxTree, accessor: NodeId) -> Option<String> {
    let opposite = tree.opposite_accessor(accessor)?;
    let header = tree.node(opposite).existing_header.as_ref()?;
    parse_header(&header.text).summary
}

struct StageContext<'b> {
    builder: &'b HeaderBuilder,
    node: &'b SyntaxNode,
    kind: DeclarationKind,
    request: DescriptionRequest<'b>,
    renderer: TypeRenderer<'b>,
}

impl StageContext<'_> {
    fn config(&self) -> &GeneratorConfig {
        &self.builder.config
    }

    async fn header(&self, draft: &mut HeaderDraft) {
        let description = self
            .builder
            .descriptions
            .describe_declaration(&self.request)
            .await;
        draft.push(TagLine::description(description));

        if let Some(author) = &self.config().author {
            let mut line = TagLine::tag("author").with_description(Fragment::text(author));
            line.align = false;
            draft.push(line);
        }
        if let Some(format) = &self.config().date_format {
            let mut date = String::new();
            // invalid patterns surface as fmt errors rather than panics
            if write!(date, "{}", self.builder.now().format(format)).is_ok() {
                let mut line = TagLine::tag("date").with_description(Fragment::text(date));
                line.align = false;
                draft.push(line);
            }
        }
        if self.config().empty_line_after_header {
            draft.push_blank();
        }
    }

    fn modifiers(&self, draft: &mut HeaderDraft) {
        let config = self.config();
        for modifier in &self.node.modifiers {
            let tag = match modifier {
                Modifier::Export if config.include_export => "export",
                Modifier::Public if config.include_visibility => "public",
                Modifier::Protected if config.include_visibility => "protected",
                Modifier::Private if config.include_visibility => "private",
                Modifier::Static if config.include_static => "static",
                Modifier::Abstract if config.include_abstract => "abstract",
                Modifier::Async if config.include_async => "async",
                Modifier::Readonly if config.include_readonly => "readonly",
                _ => continue,
            };
            draft.push(TagLine::tag(tag));
        }

        // `const f = async () => {}` carries `async` after the name
        let async_initializer = self
            .node
            .signature
            .as_ref()
            .is_some_and(|signature| signature.is_async);
        if config.include_async
            && async_initializer
            && self.node.kind == SyntaxKind::VariableDeclarator
            && !self.node.has_modifier(Modifier::Async)
        {
            draft.push(TagLine::tag("async"));
        }
    }

    fn kind_tag(&self, draft: &mut HeaderDraft) {
        let name = self.node.name.as_deref();
        match self.kind {
            DeclarationKind::ClassLike => {
                let tag = if self.node.kind == SyntaxKind::InterfaceDeclaration {
                    "interface"
                } else {
                    "class"
                };
                let mut line = TagLine::tag(tag);
                if let Some(name) = name {
                    line = line.with_name(Fragment::text(name));
                }
                draft.push(line);
                if let Some(name) = name {
                    draft.push(
                        TagLine::tag("typedef")
                            .with_value(Fragment::text(name), Some(Wrapper::BRACES)),
                    );
                }
            }
            DeclarationKind::TypeAlias => {
                if let Some(name) = name {
                    draft.push(
                        TagLine::tag("typedef")
                            .with_value(Fragment::text(name), Some(Wrapper::BRACES)),
                    );
                }
            }
            DeclarationKind::Enum => {
                let mut line = TagLine::tag("enum");
                if self.config().include_types {
                    let value = canonicalize(self.node.inferred_type.as_deref());
                    line = line.with_value(Fragment::text(value), Some(Wrapper::BRACES));
                }
                draft.push(line);
            }
            DeclarationKind::Constructor => draft.push(TagLine::tag("constructor")),
            DeclarationKind::Property | DeclarationKind::Accessor | DeclarationKind::Variable => {
                if !self.config().include_types {
                    return;
                }
                let text = self.renderer.resolve(
                    self.node.type_annotation.as_deref(),
                    TypeQuery::Declaration(self.node),
                );
                let rendered = self
                    .renderer
                    .format(&text, TypePrefix::for_flags(&self.node.flags));
                draft.push(typed(TagLine::tag("type"), rendered));
            }
            DeclarationKind::Method | DeclarationKind::File => {}
        }
    }

    fn heritage(&self, draft: &mut HeaderDraft) {
        for heritage in &self.node.heritage {
            let tag = match heritage.clause {
                HeritageClause::Extends => "extends",
                HeritageClause::Implements => "implements",
            };
            draft.push(
                TagLine::tag(tag).with_value(Fragment::text(&heritage.text), Some(Wrapper::BRACES)),
            );
        }
    }

    async fn generics(&self, draft: &mut HeaderDraft) {
        let parameters = &self.node.type_parameters;
        if parameters.is_empty() {
            return;
        }
        let names: Vec<String> = parameters.iter().map(|param| param.name.clone()).collect();
        let descriptions = self
            .builder
            .descriptions
            .describe_type_parameters(&self.request, &names)
            .await;

        for (param, description) in parameters.iter().zip(padded(descriptions)) {
            let mut line = TagLine::tag("template");
            if self.config().include_types {
                if let Some(constraint) = &param.constraint {
                    line = line.with_value(Fragment::text(constraint), Some(Wrapper::BRACES));
                }
            }
            let name = match &param.default {
                Some(default) => format!("[{}={default}]", param.name),
                None => param.name.clone(),
            };
            draft.push(
                line.with_name(Fragment::text(name))
                    .with_description(description),
            );
        }
    }

    async fn parameters(&self, draft: &mut HeaderDraft) {
        let Some(signature) = &self.node.signature else {
            return;
        };
        let mut destructured = 0usize;
        let names: Vec<String> = signature
            .parameters
            .iter()
            .map(|param| match &param.name {
                ParameterName::Identifier(name) => name.clone(),
                ParameterName::Pattern(_) => {
                    let name = format!("param{destructured}");
                    destructured += 1;
                    name
                }
            })
            .collect();
        let descriptions = self
            .builder
            .descriptions
            .describe_parameters(&self.request, &names)
            .await;

        let lines = signature.parameters.iter().zip(&names);
        for ((param, name), description) in lines.zip(padded(descriptions)) {
            self.parameter_line(draft, param, name, description);
            if let ParameterName::Pattern(shape) = &param.name {
                self.binding_lines(draft, shape, name);
            }
        }
    }

    fn parameter_line(
        &self,
        draft: &mut HeaderDraft,
        param: &Parameter,
        name: &str,
        description: Fragment,
    ) {
        let display = bracketed(
            name,
            param.optional || param.initializer.is_some(),
            param.initializer.as_deref(),
        );
        let mut line = TagLine::tag("param");
        if self.config().include_types {
            let text = self
                .renderer
                .resolve(param.type_annotation.as_deref(), TypeQuery::Parameter(param));
            let rendered = self
                .renderer
                .format(&text, TypePrefix::for_parameter(param));
            line = typed(line, rendered);
        }
        draft.push(
            line.with_name(Fragment::text(display))
                .with_description(description),
        );
    }

    fn binding_lines(&self, draft: &mut HeaderDraft, shape: &BindingShape, prefix: &str) {
        for element in &shape.elements {
            let path = format!("{prefix}.{}", element.name);
            let display = bracketed(
                &path,
                element.initializer.is_some(),
                element.initializer.as_deref(),
            );
            let mut line = TagLine::tag("param");
            if self.config().include_types {
                let text = self
                    .renderer
                    .resolve(None, TypeQuery::BindingElement(element));
                let prefix = element.rest.then_some(TypePrefix::Rest);
                line = typed(line, self.renderer.format(&text, prefix));
            }
            draft.push(
                line.with_name(Fragment::text(display))
                    .with_description(Fragment::empty()),
            );
            if let Some(nested) = &element.nested {
                self.binding_lines(draft, nested, &path);
            }
        }
    }

    async fn returns(&self, draft: &mut HeaderDraft) {
        if !self.config().include_return {
            return;
        }
        let Some(signature) = &self.node.signature else {
            return;
        };
        let Some(text) = self.renderer.return_type(signature) else {
            return;
        };
        let description = self
            .builder
            .descriptions
            .describe_return(&self.request, &text)
            .await;
        let mut line = TagLine::tag("returns");
        if self.config().include_types {
            line = typed(line, self.renderer.format(&text, None));
        }
        draft.push(line.with_description(description));
    }

    fn custom_tags(&self, draft: &mut HeaderDraft) {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for tag in &self.config().custom_tags {
            let name = tag.tag.trim();
            if seen.contains(name) || !tag.admits(self.kind) {
                continue;
            }
            seen.insert(name);
            draft.push(
                TagLine::tag(name).with_value(Fragment::placeholder(&tag.placeholder), None),
            );
        }
    }
}

/// Descriptions followed by empty regions, for sources that answer short.
fn padded(descriptions: Vec<Fragment>) -> impl Iterator<Item = Fragment> {
    descriptions
        .into_iter()
        .chain(std::iter::repeat_with(Fragment::empty))
}

fn typed(line: TagLine, rendered: RenderedType) -> TagLine {
    let mut line = line
        .with_value(Fragment::text(rendered.value), Some(Wrapper::BRACES))
        .editable_value();
    if let Some(prefix) = rendered.outer_prefix {
        line = line.with_value_prefix(prefix);
    }
    line
}

fn bracketed(name: &str, optional: bool, default: Option<&str>) -> String {
    match (optional, default) {
        (_, Some(default)) => format!("[{name}={default}]"),
        (true, None) => format!("[{name}]"),
        (false, None) => name.to_string(),
    }
}
