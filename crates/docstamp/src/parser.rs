//! oxc-backed lowering of JavaScript / TypeScript sources into a
//! [`SyntaxTree`].

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    AccessorProperty, ArrayPattern, ArrowFunctionExpression, BindingPattern, BindingPatternKind,
    Class, ClassElement, Declaration, Decorator, ExportDefaultDeclarationKind, Expression,
    FormalParameters, Function, FunctionBody, MethodDefinition, MethodDefinitionKind,
    ObjectPattern, PropertyDefinition, PropertyKey, ReturnStatement, Statement,
    TSEnumDeclaration, TSInterfaceDeclaration, TSMethodSignatureKind, TSSignature,
    TSTypeAliasDeclaration, TSTypeAnnotation, TSTypeParameterDeclaration, VariableDeclaration,
};
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use oxc_semantic::ScopeFlags;
use oxc_span::{GetSpan, SourceType, Span};
use tracing::debug;

use crate::error::{DocError, Result};
use crate::syntax::{
    BindingElement, BindingShape, ExistingHeader, Heritage, HeritageClause, Modifier, NodeId,
    Parameter, ParameterName, PatternKind, Signature, SyntaxKind, SyntaxNode, SyntaxTree,
    TextSpan, TypeParameter,
};

/// Produces a [`SyntaxTree`] for a source file.
pub trait SourceParser: Send + Sync {
    /// Whether files at `path` can be parsed at all.
    fn supports(&self, path: &Path) -> bool;

    /// Parses `text` as the contents of `path`.
    fn parse(&self, path: &Path, text: &str) -> Result<SyntaxTree>;
}

/// Parser adapter over `oxc_parser`. The source type (JS, JSX, TS, TSX,
/// module or script) is derived from the file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxcParser;

impl OxcParser {
    pub fn new() -> Self {
        Self
    }

    fn source_type(path: &Path) -> Result<SourceType> {
        SourceType::from_path(path).map_err(|_| DocError::UnsupportedScope {
            path: path.to_path_buf(),
        })
    }
}

impl SourceParser for OxcParser {
    fn supports(&self, path: &Path) -> bool {
        Self::source_type(path).is_ok()
    }

    fn parse(&self, path: &Path, text: &str) -> Result<SyntaxTree> {
        let source_type = Self::source_type(path)?;
        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, text, source_type).parse();

        if parsed.panicked || !parsed.errors.is_empty() {
            let mut diagnostics: Vec<String> =
                parsed.errors.iter().map(|error| error.to_string()).collect();
            if diagnostics.is_empty() {
                diagnostics.push("parser aborted".to_string());
            }
            return Err(DocError::parse_error(path.to_path_buf(), &diagnostics));
        }

        let mut lowering = Lowering::new(path, text);
        let root = lowering.tree.root();
        lowering.statements(root, &parsed.program.body);
        let tree = lowering.tree;
        debug!(path = %path.display(), nodes = tree.len(), "lowered syntax tree");
        Ok(tree)
    }
}

enum Initializer<'b, 'a> {
    Body(&'b FunctionBody<'a>),
    Class(&'b Class<'a>),
}

struct Lowering<'s> {
    source: &'s str,
    tree: SyntaxTree,
}

impl<'s> Lowering<'s> {
    fn new(path: &Path, source: &'s str) -> Self {
        Self {
            source,
            tree: SyntaxTree::new(path, source),
        }
    }

    fn statements(&mut self, parent: NodeId, statements: &[Statement<'_>]) {
        for statement in statements {
            self.statement(parent, statement);
        }
    }

    fn statement(&mut self, parent: NodeId, statement: &Statement<'_>) {
        match statement {
            Statement::ExportNamedDeclaration(export) => {
                if let Some(declaration) = &export.declaration {
                    self.declaration(parent, declaration, export.span);
                }
            }
            Statement::ExportDefaultDeclaration(export) => match &export.declaration {
                ExportDefaultDeclarationKind::FunctionDeclaration(function) => {
                    self.function(parent, function, export.span);
                }
                ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                    self.class(parent, class, export.span);
                }
                ExportDefaultDeclarationKind::TSInterfaceDeclaration(interface) => {
                    self.interface(parent, interface, export.span);
                }
                _ => {}
            },
            Statement::FunctionDeclaration(function) => {
                self.function(parent, function, function.span);
            }
            Statement::ClassDeclaration(class) => {
                self.class(parent, class, class.span);
            }
            Statement::VariableDeclaration(variable) => {
                self.variables(parent, variable, variable.span);
            }
            Statement::TSInterfaceDeclaration(interface) => {
                self.interface(parent, interface, interface.span);
            }
            Statement::TSTypeAliasDeclaration(alias) => {
                self.type_alias(parent, alias, alias.span);
            }
            Statement::TSEnumDeclaration(enumeration) => {
                self.enumeration(parent, enumeration, enumeration.span);
            }
            _ => {}
        }
    }

    fn declaration(&mut self, parent: NodeId, declaration: &Declaration<'_>, outer: Span) {
        match declaration {
            Declaration::VariableDeclaration(variable) => self.variables(parent, variable, outer),
            Declaration::FunctionDeclaration(function) => {
                self.function(parent, function, outer);
            }
            Declaration::ClassDeclaration(class) => {
                self.class(parent, class, outer);
            }
            Declaration::TSTypeAliasDeclaration(alias) => self.type_alias(parent, alias, outer),
            Declaration::TSInterfaceDeclaration(interface) => {
                self.interface(parent, interface, outer);
            }
            Declaration::TSEnumDeclaration(enumeration) => {
                self.enumeration(parent, enumeration, outer);
            }
            _ => {}
        }
    }

    fn function(&mut self, parent: NodeId, function: &Function<'_>, outer: Span) -> NodeId {
        let mut node = self.node(SyntaxKind::FunctionDeclaration, outer, &[]);
        node.name = function.id.as_ref().map(|id| id.name.to_string());
        let name_start = function
            .id
            .as_ref()
            .map_or(function.params.span.start, |id| id.span.start);
        node.modifiers = self.scan_modifiers(node.anchor(), name_start, &[]);
        node.type_parameters = self.type_parameters(function.type_parameters.as_deref());
        node.flags.generator = function.generator;
        node.signature = Some(self.function_signature(function));

        let id = self.tree.push(parent, node);
        if let Some(body) = &function.body {
            self.statements(id, &body.statements);
        }
        id
    }

    fn class(&mut self, parent: NodeId, class: &Class<'_>, outer: Span) -> NodeId {
        let mut node = self.node(SyntaxKind::ClassDeclaration, outer, &class.decorators);
        node.name = class.id.as_ref().map(|id| id.name.to_string());
        let name_start = class
            .id
            .as_ref()
            .map_or(class.body.span.start, |id| id.span.start);
        node.modifiers = self.scan_modifiers(node.anchor(), name_start, &class.decorators);
        node.type_parameters = self.type_parameters(class.type_parameters.as_deref());
        node.heritage = self.class_heritage(class);

        let id = self.tree.push(parent, node);
        self.class_members(id, class);
        id
    }

    fn class_heritage(&self, class: &Class<'_>) -> Vec<Heritage> {
        let mut heritage = Vec::new();
        if let Some(super_class) = &class.super_class {
            // the slice covers type arguments; cut it at `implements`
            let end = class
                .implements
                .first()
                .map_or(class.body.span.start, |clause| clause.span.start);
            let raw = self.slice(super_class.span().start, end).trim();
            let text = raw.strip_suffix("implements").unwrap_or(raw).trim();
            heritage.push(Heritage {
                clause: HeritageClause::Extends,
                text: text.to_string(),
            });
        }
        for clause in &class.implements {
            heritage.push(Heritage {
                clause: HeritageClause::Implements,
                text: self.text(clause.span),
            });
        }
        heritage
    }

    fn class_members(&mut self, parent: NodeId, class: &Class<'_>) {
        for element in &class.body.body {
            match element {
                ClassElement::MethodDefinition(method) => self.method(parent, method),
                ClassElement::PropertyDefinition(property) => self.property(parent, property),
                ClassElement::AccessorProperty(accessor) => {
                    self.accessor_property(parent, accessor)
                }
                _ => {}
            }
        }
    }

    fn method(&mut self, parent: NodeId, method: &MethodDefinition<'_>) {
        let kind = match method.kind {
            MethodDefinitionKind::Constructor => SyntaxKind::Constructor,
            MethodDefinitionKind::Method => SyntaxKind::Method,
            MethodDefinitionKind::Get => SyntaxKind::GetAccessor,
            MethodDefinitionKind::Set => SyntaxKind::SetAccessor,
        };
        let mut node = self.node(kind, method.span, &method.decorators);
        node.name = Some(self.key_name(&method.key));
        node.modifiers =
            self.scan_modifiers(node.anchor(), method.key.span().start, &method.decorators);

        let function = &method.value;
        node.flags.optional = method.optional;
        node.flags.generator = function.generator;
        node.type_parameters = self.type_parameters(function.type_parameters.as_deref());
        let signature = self.function_signature(function);
        accessor_type(&mut node, kind, &signature);
        node.signature = Some(signature);

        let id = self.tree.push(parent, node);
        if let Some(body) = &function.body {
            self.statements(id, &body.statements);
        }
    }

    fn property(&mut self, parent: NodeId, property: &PropertyDefinition<'_>) {
        let mut node = self.node(SyntaxKind::Property, property.span, &property.decorators);
        node.name = Some(self.key_name(&property.key));
        node.modifiers =
            self.scan_modifiers(node.anchor(), property.key.span().start, &property.decorators);
        node.flags.optional = property.optional;
        node.flags.definite = property.definite;
        node.type_annotation = self.annotation(property.type_annotation.as_deref());
        let initializer = property
            .value
            .as_ref()
            .and_then(|value| self.apply_initializer(&mut node, value));

        let id = self.tree.push(parent, node);
        self.initializer_children(id, initializer);
    }

    fn accessor_property(&mut self, parent: NodeId, accessor: &AccessorProperty<'_>) {
        let mut node = self.node(SyntaxKind::Property, accessor.span, &accessor.decorators);
        node.name = Some(self.key_name(&accessor.key));
        node.modifiers =
            self.scan_modifiers(node.anchor(), accessor.key.span().start, &accessor.decorators);
        node.flags.definite = accessor.definite;
        node.type_annotation = self.annotation(accessor.type_annotation.as_deref());
        if let Some(value) = &accessor.value {
            node.inferred_type = literal_type(value, self.source);
        }
        self.tree.push(parent, node);
    }

    fn variables(&mut self, parent: NodeId, variable: &VariableDeclaration<'_>, outer: Span) {
        let mut statement = self.node(SyntaxKind::VariableStatement, outer, &[]);
        let first_name_start = variable
            .declarations
            .first()
            .map_or(outer.end, |declarator| declarator.id.span().start);
        let anchor = statement.anchor();
        let modifiers = self.scan_modifiers(anchor, first_name_start, &[]);
        let header = statement.existing_header.clone();
        statement.modifiers = modifiers.clone();
        let statement_id = self.tree.push(parent, statement);

        let single = variable.declarations.len() == 1;
        for (index, declarator) in variable.declarations.iter().enumerate() {
            // the first declarator carries the statement's anchor and header
            let start = if index == 0 {
                anchor
            } else {
                declarator.span.start
            };
            let end = if single { outer.end } else { declarator.span.end };
            let mut node =
                SyntaxNode::new(SyntaxKind::VariableDeclarator, TextSpan::new(start, end));
            node.existing_header = if index == 0 {
                header.clone()
            } else {
                self.existing_header(start)
            };
            node.name = binding_name(&declarator.id);
            node.modifiers = modifiers.clone();
            node.type_annotation = self.annotation(declarator.id.type_annotation.as_deref());
            let initializer = declarator
                .init
                .as_ref()
                .and_then(|init| self.apply_initializer(&mut node, init));

            let id = self.tree.push(statement_id, node);
            self.initializer_children(id, initializer);
        }
    }

    fn interface(&mut self, parent: NodeId, interface: &TSInterfaceDeclaration<'_>, outer: Span) {
        let mut node = self.node(SyntaxKind::InterfaceDeclaration, outer, &[]);
        node.name = Some(interface.id.name.to_string());
        node.modifiers = self.scan_modifiers(node.anchor(), interface.id.span.start, &[]);
        node.type_parameters = self.type_parameters(interface.type_parameters.as_deref());
        node.heritage = interface
            .extends
            .iter()
            .map(|clause| Heritage {
                clause: HeritageClause::Extends,
                text: self.text(clause.span),
            })
            .collect();
        let id = self.tree.push(parent, node);

        for signature in &interface.body.body {
            match signature {
                TSSignature::TSPropertySignature(property) => {
                    let mut member = self.node(SyntaxKind::PropertySignature, property.span, &[]);
                    member.name = Some(self.key_name(&property.key));
                    member.modifiers =
                        self.scan_modifiers(member.anchor(), property.key.span().start, &[]);
                    member.flags.optional = property.optional;
                    member.type_annotation =
                        self.annotation(property.type_annotation.as_deref());
                    self.tree.push(id, member);
                }
                TSSignature::TSMethodSignature(method) => {
                    let kind = match method.kind {
                        TSMethodSignatureKind::Method => SyntaxKind::MethodSignature,
                        TSMethodSignatureKind::Get => SyntaxKind::GetAccessor,
                        TSMethodSignatureKind::Set => SyntaxKind::SetAccessor,
                    };
                    let mut member = self.node(kind, method.span, &[]);
                    member.name = Some(self.key_name(&method.key));
                    member.modifiers =
                        self.scan_modifiers(member.anchor(), method.key.span().start, &[]);
                    member.flags.optional = method.optional;
                    member.type_parameters =
                        self.type_parameters(method.type_parameters.as_deref());
                    let signature = Signature {
                        parameters: self.parameters(&method.params),
                        return_annotation: self.annotation(method.return_type.as_deref()),
                        ..Signature::default()
                    };
                    accessor_type(&mut member, kind, &signature);
                    member.signature = Some(signature);
                    self.tree.push(id, member);
                }
                _ => {}
            }
        }
    }

    fn type_alias(&mut self, parent: NodeId, alias: &TSTypeAliasDeclaration<'_>, outer: Span) {
        let mut node = self.node(SyntaxKind::TypeAliasDeclaration, outer, &[]);
        node.name = Some(alias.id.name.to_string());
        node.modifiers = self.scan_modifiers(node.anchor(), alias.id.span.start, &[]);
        node.type_parameters = self.type_parameters(alias.type_parameters.as_deref());
        node.type_annotation = Some(self.text(alias.type_annotation.span()));
        self.tree.push(parent, node);
    }

    fn enumeration(&mut self, parent: NodeId, enumeration: &TSEnumDeclaration<'_>, outer: Span) {
        let mut node = self.node(SyntaxKind::EnumDeclaration, outer, &[]);
        node.name = Some(enumeration.id.name.to_string());
        node.modifiers = self.scan_modifiers(node.anchor(), enumeration.id.span.start, &[]);
        let string_valued = enumeration.body.members.iter().any(|member| {
            matches!(
                member.initializer,
                Some(Expression::StringLiteral(_) | Expression::TemplateLiteral(_))
            )
        });
        node.inferred_type = Some(if string_valued { "string" } else { "number" }.to_string());
        self.tree.push(parent, node);
    }

    /// Records facts about an initializer; returns nested content that needs
    /// lowering once the owning node is in the tree.
    fn apply_initializer<'b, 'a>(
        &self,
        node: &mut SyntaxNode,
        init: &'b Expression<'a>,
    ) -> Option<Initializer<'b, 'a>> {
        match init {
            Expression::ArrowFunctionExpression(arrow) => {
                node.flags.function_initializer = true;
                node.inferred_type = Some("Function".to_string());
                node.type_parameters = self.type_parameters(arrow.type_parameters.as_deref());
                node.signature = Some(self.arrow_signature(arrow));
                Some(Initializer::Body(&arrow.body))
            }
            Expression::FunctionExpression(function) => {
                node.flags.function_initializer = true;
                node.flags.generator = function.generator;
                node.inferred_type = Some("Function".to_string());
                node.type_parameters = self.type_parameters(function.type_parameters.as_deref());
                node.signature = Some(self.function_signature(function));
                function.body.as_deref().map(Initializer::Body)
            }
            Expression::ClassExpression(class) => {
                node.flags.class_initializer = true;
                node.type_parameters = self.type_parameters(class.type_parameters.as_deref());
                node.heritage = self.class_heritage(class);
                Some(Initializer::Class(class))
            }
            Expression::ParenthesizedExpression(inner) => {
                self.apply_initializer(node, &inner.expression)
            }
            other => {
                node.inferred_type = literal_type(other, self.source);
                None
            }
        }
    }

    fn initializer_children(&mut self, id: NodeId, initializer: Option<Initializer<'_, '_>>) {
        match initializer {
            Some(Initializer::Body(body)) => self.statements(id, &body.statements),
            Some(Initializer::Class(class)) => self.class_members(id, class),
            None => {}
        }
    }

    fn function_signature(&self, function: &Function<'_>) -> Signature {
        Signature {
            parameters: self.parameters(&function.params),
            return_annotation: self.annotation(function.return_type.as_deref()),
            is_async: function.r#async,
            is_generator: function.generator,
            returns_value: function.body.as_deref().is_some_and(returns_value),
        }
    }

    fn arrow_signature(&self, arrow: &ArrowFunctionExpression<'_>) -> Signature {
        Signature {
            parameters: self.parameters(&arrow.params),
            return_annotation: self.annotation(arrow.return_type.as_deref()),
            is_async: arrow.r#async,
            is_generator: false,
            returns_value: arrow.expression || returns_value(&arrow.body),
        }
    }

    fn parameters(&self, params: &FormalParameters<'_>) -> Vec<Parameter> {
        let mut parameters: Vec<Parameter> = params
            .items
            .iter()
            .map(|item| self.parameter(&item.pattern))
            .collect();
        if let Some(rest) = &params.rest {
            let mut parameter = self.parameter(&rest.argument);
            parameter.rest = true;
            parameters.push(parameter);
        }
        parameters
    }

    fn parameter(&self, pattern: &BindingPattern<'_>) -> Parameter {
        let mut parameter = Parameter::identifier(String::new());
        parameter.type_annotation = self.annotation(pattern.type_annotation.as_deref());
        parameter.optional = pattern.optional;

        let target = match &pattern.kind {
            BindingPatternKind::AssignmentPattern(assign) => {
                parameter.initializer = Some(self.text(assign.right.span()));
                parameter.inferred_type = literal_type(&assign.right, self.source);
                if parameter.type_annotation.is_none() {
                    parameter.type_annotation =
                        self.annotation(assign.left.type_annotation.as_deref());
                }
                &assign.left
            }
            _ => pattern,
        };

        parameter.name = match &target.kind {
            BindingPatternKind::BindingIdentifier(id) => {
                ParameterName::Identifier(id.name.to_string())
            }
            BindingPatternKind::ObjectPattern(object) => {
                parameter
                    .inferred_type
                    .get_or_insert_with(|| "Object".to_string());
                ParameterName::Pattern(self.object_shape(object))
            }
            BindingPatternKind::ArrayPattern(array) => {
                parameter
                    .inferred_type
                    .get_or_insert_with(|| "Array".to_string());
                ParameterName::Pattern(self.array_shape(array))
            }
            BindingPatternKind::AssignmentPattern(_) => {
                ParameterName::Identifier(self.text(target.span()))
            }
        };
        parameter
    }

    fn object_shape(&self, object: &ObjectPattern<'_>) -> BindingShape {
        let mut elements: Vec<BindingElement> = object
            .properties
            .iter()
            .map(|property| self.binding_element(self.key_name(&property.key), &property.value))
            .collect();
        if let Some(rest) = &object.rest {
            let name = binding_name(&rest.argument).unwrap_or_default();
            let mut element = self.binding_element(name, &rest.argument);
            element.rest = true;
            elements.push(element);
        }
        BindingShape {
            kind: PatternKind::Object,
            elements,
        }
    }

    fn array_shape(&self, array: &ArrayPattern<'_>) -> BindingShape {
        let mut elements: Vec<BindingElement> = array
            .elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| {
                element.as_ref().map(|pattern| {
                    let name = binding_name(pattern).unwrap_or_else(|| index.to_string());
                    self.binding_element(name, pattern)
                })
            })
            .collect();
        if let Some(rest) = &array.rest {
            let name = binding_name(&rest.argument).unwrap_or_default();
            let mut element = self.binding_element(name, &rest.argument);
            element.rest = true;
            elements.push(element);
        }
        BindingShape {
            kind: PatternKind::Array,
            elements,
        }
    }

    fn binding_element(&self, name: String, pattern: &BindingPattern<'_>) -> BindingElement {
        let mut element = BindingElement {
            name,
            initializer: None,
            inferred_type: None,
            rest: false,
            nested: None,
        };
        let target = match &pattern.kind {
            BindingPatternKind::AssignmentPattern(assign) => {
                element.initializer = Some(self.text(assign.right.span()));
                element.inferred_type = literal_type(&assign.right, self.source);
                &assign.left
            }
            _ => pattern,
        };
        match &target.kind {
            BindingPatternKind::ObjectPattern(object) => {
                element.nested = Some(self.object_shape(object));
                element
                    .inferred_type
                    .get_or_insert_with(|| "Object".to_string());
            }
            BindingPatternKind::ArrayPattern(array) => {
                element.nested = Some(self.array_shape(array));
                element
                    .inferred_type
                    .get_or_insert_with(|| "Array".to_string());
            }
            _ => {}
        }
        element
    }

    fn type_parameters(
        &self,
        declaration: Option<&TSTypeParameterDeclaration<'_>>,
    ) -> Vec<TypeParameter> {
        let Some(declaration) = declaration else {
            return Vec::new();
        };
        declaration
            .params
            .iter()
            .map(|param| TypeParameter {
                name: param.name.name.to_string(),
                constraint: param.constraint.as_ref().map(|ty| self.text(ty.span())),
                default: param.default.as_ref().map(|ty| self.text(ty.span())),
            })
            .collect()
    }

    fn annotation(&self, annotation: Option<&TSTypeAnnotation<'_>>) -> Option<String> {
        annotation.map(|annotation| self.text(annotation.type_annotation.span()))
    }

    fn key_name(&self, key: &PropertyKey<'_>) -> String {
        match key {
            PropertyKey::PrivateIdentifier(ident) => format!("#{}", ident.name),
            _ => key
                .static_name()
                .map(|name| name.to_string())
                .unwrap_or_else(|| self.text(key.span())),
        }
    }

    /// New node spanning from its anchor (first decorator or the outer
    /// start, whichever comes first) to the end of `outer`.
    fn node(&self, kind: SyntaxKind, outer: Span, decorators: &[Decorator<'_>]) -> SyntaxNode {
        let anchor = decorators
            .iter()
            .map(|decorator| decorator.span.start)
            .fold(outer.start, u32::min);
        let mut node = SyntaxNode::new(kind, TextSpan::new(anchor, outer.end));
        node.existing_header = self.existing_header(anchor);
        node
    }

    /// Documentation comment separated from `anchor` by whitespace only.
    fn existing_header(&self, anchor: u32) -> Option<ExistingHeader> {
        let before = self.source[..anchor as usize].trim_end();
        if !before.ends_with("*/") {
            return None;
        }
        let start = before[..before.len() - 2].rfind("/*")?;
        let text = &before[start..];
        if !text.starts_with("/**") || text == "/**/" {
            return None;
        }
        Some(ExistingHeader {
            span: TextSpan::new(start as u32, before.len() as u32),
            text: text.to_string(),
        })
    }

    /// Modifier keywords between `start` and `end`, skipping decorator text.
    fn scan_modifiers(&self, start: u32, end: u32, decorators: &[Decorator<'_>]) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        let mut cursor = start;
        for decorator in decorators {
            if decorator.span.start > cursor {
                self.collect_keywords(cursor, decorator.span.start.min(end), &mut modifiers);
            }
            cursor = cursor.max(decorator.span.end);
        }
        if cursor < end {
            self.collect_keywords(cursor, end, &mut modifiers);
        }
        modifiers
    }

    fn collect_keywords(&self, start: u32, end: u32, modifiers: &mut Vec<Modifier>) {
        if start >= end {
            return;
        }
        let words = self
            .slice(start, end)
            .split(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'));
        modifiers.extend(words.filter_map(Modifier::from_keyword));
    }

    fn slice(&self, start: u32, end: u32) -> &'s str {
        &self.source[start as usize..end as usize]
    }

    fn text(&self, span: Span) -> String {
        self.slice(span.start, span.end).to_string()
    }
}

/// Getters are typed by their return annotation, setters by their parameter.
fn accessor_type(node: &mut SyntaxNode, kind: SyntaxKind, signature: &Signature) {
    match kind {
        SyntaxKind::GetAccessor => {
            node.type_annotation = signature.return_annotation.clone();
        }
        SyntaxKind::SetAccessor => {
            if let Some(first) = signature.parameters.first() {
                node.type_annotation = first.type_annotation.clone();
                node.inferred_type = first.inferred_type.clone();
            }
        }
        _ => {}
    }
}

fn binding_name(pattern: &BindingPattern<'_>) -> Option<String> {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(ident) => Some(ident.name.to_string()),
        BindingPatternKind::AssignmentPattern(assign) => binding_name(&assign.left),
        _ => None,
    }
}

/// Type of an initializer expression, as far as syntax alone tells.
fn literal_type(expression: &Expression<'_>, source: &str) -> Option<String> {
    let ty = match expression {
        Expression::BooleanLiteral(_) => "boolean",
        Expression::NumericLiteral(_) => "number",
        Expression::BigIntLiteral(_) => "bigint",
        Expression::StringLiteral(_) | Expression::TemplateLiteral(_) => "string",
        Expression::NullLiteral(_) => "null",
        Expression::RegExpLiteral(_) => "RegExp",
        Expression::ArrayExpression(_) => "Array",
        Expression::ObjectExpression(_) => "Object",
        Expression::ArrowFunctionExpression(_) | Expression::FunctionExpression(_) => "Function",
        Expression::UnaryExpression(unary) => {
            let operator = source[unary.span.start as usize..unary.argument.span().start as usize]
                .trim();
            match operator {
                "-" | "+" | "~" => "number",
                "!" => "boolean",
                "typeof" => "string",
                _ => return None,
            }
        }
        Expression::NewExpression(new) => {
            let callee = new.callee.span();
            return Some(source[callee.start as usize..callee.end as usize].to_string());
        }
        Expression::TSAsExpression(cast) => {
            let span = cast.type_annotation.span();
            return Some(source[span.start as usize..span.end as usize].to_string());
        }
        Expression::TSSatisfiesExpression(satisfies) => {
            return literal_type(&satisfies.expression, source);
        }
        Expression::ParenthesizedExpression(inner) => {
            return literal_type(&inner.expression, source);
        }
        _ => return None,
    };
    Some(ty.to_string())
}

/// Looks for `return <expr>` in a body without entering nested functions or
/// classes.
#[derive(Default)]
struct ReturnScan {
    found: bool,
}

impl<'a> Visit<'a> for ReturnScan {
    fn visit_return_statement(&mut self, statement: &ReturnStatement<'a>) {
        if statement.argument.is_some() {
            self.found = true;
        }
    }

    fn visit_function(&mut self, _function: &Function<'a>, _flags: ScopeFlags) {}

    fn visit_arrow_function_expression(&mut self, _arrow: &ArrowFunctionExpression<'a>) {}

    fn visit_class(&mut self, _class: &Class<'a>) {}
}

fn returns_value(body: &FunctionBody<'_>) -> bool {
    let mut scan = ReturnScan::default();
    scan.visit_function_body(body);
    scan.found
}
