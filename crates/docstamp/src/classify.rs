//! Mapping of syntax nodes and positions to declaration kinds.

use crate::config::GeneratorConfig;
use crate::model::DeclarationKind;
use crate::syntax::{NodeId, SyntaxKind, SyntaxNode, SyntaxTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifyOptions {
    /// Variables initialized with a function classify as methods.
    pub function_variables_as_functions: bool,
}

impl From<&GeneratorConfig> for ClassifyOptions {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            function_variables_as_functions: config.function_variables_as_functions,
        }
    }
}

/// A documentable node together with its declaration kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    pub node: NodeId,
    pub kind: DeclarationKind,
}

/// Declaration kind of a node, if the node itself is documentable.
pub fn declaration_kind(node: &SyntaxNode, options: ClassifyOptions) -> Option<DeclarationKind> {
    let kind = match node.kind {
        SyntaxKind::ClassDeclaration | SyntaxKind::InterfaceDeclaration => {
            DeclarationKind::ClassLike
        }
        SyntaxKind::Property | SyntaxKind::PropertySignature => DeclarationKind::Property,
        SyntaxKind::GetAccessor | SyntaxKind::SetAccessor => DeclarationKind::Accessor,
        SyntaxKind::EnumDeclaration => DeclarationKind::Enum,
        SyntaxKind::FunctionDeclaration | SyntaxKind::Method | SyntaxKind::MethodSignature => {
            DeclarationKind::Method
        }
        SyntaxKind::Constructor => DeclarationKind::Constructor,
        SyntaxKind::TypeAliasDeclaration => DeclarationKind::TypeAlias,
        SyntaxKind::VariableDeclarator if node.flags.class_initializer => {
            DeclarationKind::ClassLike
        }
        SyntaxKind::VariableDeclarator
            if options.function_variables_as_functions && node.flags.function_initializer =>
        {
            DeclarationKind::Method
        }
        SyntaxKind::VariableDeclarator => DeclarationKind::Variable,
        SyntaxKind::SourceFile | SyntaxKind::VariableStatement => return None,
    };
    Some(kind)
}

/// Walks from `node` up to the nearest documentable ancestor. A variable
/// statement resolves to its first declarator.
pub fn classify_node(
    tree: &SyntaxTree,
    node: NodeId,
    options: ClassifyOptions,
) -> Option<Classified> {
    for id in tree.ancestors(node) {
        let current = tree.node(id);
        if current.kind == SyntaxKind::VariableStatement {
            let first = *tree.children(id).first()?;
            let kind = declaration_kind(tree.node(first), options)?;
            return Some(Classified { node: first, kind });
        }
        if let Some(kind) = declaration_kind(current, options) {
            return Some(Classified { node: id, kind });
        }
    }
    None
}

/// Classifies the deepest node containing `offset`.
pub fn classify_position(
    tree: &SyntaxTree,
    offset: u32,
    options: ClassifyOptions,
) -> Option<Classified> {
    classify_node(tree, tree.node_at(offset), options)
}

/// Top-level declarations plus the direct members of class-like ones
/// (class expressions included), in source order.
pub fn file_declarations(tree: &SyntaxTree, options: ClassifyOptions) -> Vec<Classified> {
    let mut declarations = Vec::new();
    for &child in tree.children(tree.root()) {
        let Some(classified) = classify_node(tree, child, options) else {
            continue;
        };
        declarations.push(classified);
        // class expressions keep their members under the declarator
        if classified.kind == DeclarationKind::ClassLike {
            let owner = classified.node;
            declarations.extend(
                tree.children(owner)
                    .iter()
                    .filter_map(|&member| classify_node(tree, member, options))
                    .filter(|member| tree.parent(member.node) == Some(owner)),
            );
        }
    }
    declarations
}
