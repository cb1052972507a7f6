//! Owned, parser-independent declaration tree.
//!
//! The parser adapter lowers whatever AST it produces into a [`SyntaxTree`]:
//! an arena of [`SyntaxNode`]s with parent/child links, byte spans and the
//! already-extracted facts the header builder needs (annotation text,
//! modifiers in source order, signatures, heritage clauses). Only the shapes
//! relevant to documentation are kept; expressions and statements that never
//! host a declaration are dropped.

use std::path::{Path, PathBuf};

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Half-open byte range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextSpan {
    pub start: u32,
    pub end: u32,
}

impl TextSpan {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Syntactic category of a node, as reported by the parser adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    SourceFile,
    ClassDeclaration,
    InterfaceDeclaration,
    TypeAliasDeclaration,
    EnumDeclaration,
    FunctionDeclaration,
    /// Binding-list container such as `let a = 1, b = 2;`.
    VariableStatement,
    VariableDeclarator,
    Constructor,
    Method,
    GetAccessor,
    SetAccessor,
    Property,
    PropertySignature,
    MethodSignature,
}

/// Declaration modifiers, recorded in the order they appear in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Export,
    Default,
    Declare,
    Public,
    Protected,
    Private,
    Static,
    Abstract,
    Async,
    Readonly,
    Override,
}

impl Modifier {
    /// Maps a source keyword to a modifier.
    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "export" => Self::Export,
            "default" => Self::Default,
            "declare" => Self::Declare,
            "public" => Self::Public,
            "protected" => Self::Protected,
            "private" => Self::Private,
            "static" => Self::Static,
            "abstract" => Self::Abstract,
            "async" => Self::Async,
            "readonly" => Self::Readonly,
            "override" => Self::Override,
            _ => return None,
        })
    }
}

/// Boolean facts about a node that influence type prefixes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    /// `x?: T`
    pub optional: bool,
    /// `x!: T`
    pub definite: bool,
    /// Generator function, or a property/variable initialized with one.
    pub generator: bool,
    /// Variable or property initialized with a function/arrow expression.
    pub function_initializer: bool,
    /// Variable initialized with a class expression.
    pub class_initializer: bool,
}

/// A generic type parameter, with source text for constraint and default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub constraint: Option<String>,
    pub default: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeritageClause {
    Extends,
    Implements,
}

/// One inherited or implemented type reference, type arguments included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heritage {
    pub clause: HeritageClause,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Object,
    Array,
}

/// One element of a destructuring pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingElement {
    /// Property key for object patterns, binding name for array patterns.
    pub name: String,
    pub initializer: Option<String>,
    pub inferred_type: Option<String>,
    pub rest: bool,
    /// Nested pattern (`{ a: { b } }`).
    pub nested: Option<BindingShape>,
}

/// Shape of a destructured parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingShape {
    pub kind: PatternKind,
    pub elements: Vec<BindingElement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterName {
    Identifier(String),
    Pattern(BindingShape),
}

/// A formal parameter of a callable declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: ParameterName,
    pub type_annotation: Option<String>,
    pub inferred_type: Option<String>,
    pub initializer: Option<String>,
    pub optional: bool,
    pub rest: bool,
}

impl Parameter {
    pub fn identifier(name: impl Into<String>) -> Self {
        Self {
            name: ParameterName::Identifier(name.into()),
            type_annotation: None,
            inferred_type: None,
            initializer: None,
            optional: false,
            rest: false,
        }
    }

    pub fn is_destructured(&self) -> bool {
        matches!(self.name, ParameterName::Pattern(_))
    }
}

/// Signature facts of a callable declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub parameters: Vec<Parameter>,
    pub return_annotation: Option<String>,
    pub is_async: bool,
    pub is_generator: bool,
    /// Whether the body contains a `return <expr>` (or is an expression body).
    pub returns_value: bool,
}

/// A documentation comment already attached to a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingHeader {
    pub span: TextSpan,
    pub text: String,
}

/// One node of the declaration tree.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub name: Option<String>,
    /// Full extent, starting at the anchor (leading `export` / decorators).
    pub span: TextSpan,
    pub modifiers: Vec<Modifier>,
    pub flags: NodeFlags,
    pub type_annotation: Option<String>,
    /// Type derived from the initializer, for the syntactic oracle.
    pub inferred_type: Option<String>,
    pub signature: Option<Signature>,
    pub type_parameters: Vec<TypeParameter>,
    pub heritage: Vec<Heritage>,
    pub existing_header: Option<ExistingHeader>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl SyntaxNode {
    pub fn new(kind: SyntaxKind, span: TextSpan) -> Self {
        Self {
            kind,
            name: None,
            span,
            modifiers: Vec::new(),
            flags: NodeFlags::default(),
            type_annotation: None,
            inferred_type: None,
            signature: None,
            type_parameters: Vec::new(),
            heritage: Vec::new(),
            existing_header: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Offset at which a header for this node is inserted.
    pub fn anchor(&self) -> u32 {
        self.span.start
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn has_header(&self) -> bool {
        self.existing_header.is_some()
    }

    pub fn name_or_default(&self) -> &str {
        self.name.as_deref().unwrap_or("default")
    }
}

/// Arena of [`SyntaxNode`]s for one source file. Node 0 is the source file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    path: PathBuf,
    source: String,
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    /// Creates a tree containing only the source-file root.
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        let source = source.into();
        let root = SyntaxNode::new(
            SyntaxKind::SourceFile,
            TextSpan::new(0, source.len() as u32),
        );
        Self {
            path: path.into(),
            source,
            nodes: vec![root],
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Appends `node` as the last child of `parent`.
    pub fn push(&mut self, parent: NodeId, mut node: SyntaxNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut SyntaxNode {
        &mut self.nodes[id.index()]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// The node itself followed by each ancestor up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| self.parent(*current))
    }

    /// Source text covered by a node.
    pub fn text(&self, id: NodeId) -> &str {
        let span = self.node(id).span;
        &self.source[span.start as usize..span.end as usize]
    }

    /// Deepest node whose span contains `offset`; the root when none does.
    pub fn node_at(&self, offset: u32) -> NodeId {
        let mut current = self.root();
        'descend: loop {
            for &child in self.children(current) {
                if self.node(child).span.contains(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// Finds the sibling accessor paired with `id` (same name, same
    /// static-ness, opposite direction).
    pub fn opposite_accessor(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        let wanted = match node.kind {
            SyntaxKind::GetAccessor => SyntaxKind::SetAccessor,
            SyntaxKind::SetAccessor => SyntaxKind::GetAccessor,
            _ => return None,
        };
        let is_static = node.has_modifier(Modifier::Static);
        let parent = node.parent?;
        self.children(parent).iter().copied().find(|&sibling| {
            let other = self.node(sibling);
            other.kind == wanted
                && other.name == node.name
                && other.has_modifier(Modifier::Static) == is_static
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (SyntaxTree, NodeId, NodeId) {
        let mut tree = SyntaxTree::new("a.ts", "class A { get x() { return 1; } }");
        let root = tree.root();
        let mut class = SyntaxNode::new(SyntaxKind::ClassDeclaration, TextSpan::new(0, 33));
        class.name = Some("A".into());
        let class = tree.push(root, class);
        let mut getter = SyntaxNode::new(SyntaxKind::GetAccessor, TextSpan::new(10, 31));
        getter.name = Some("x".into());
        let getter = tree.push(class, getter);
        (tree, class, getter)
    }

    #[test]
    fn node_at_finds_deepest() {
        let (tree, class, getter) = sample();
        assert_eq!(tree.node_at(12), getter);
        assert_eq!(tree.node_at(2), class);
        assert_eq!(tree.node_at(40), tree.root());
    }

    #[test]
    fn ancestors_walk_to_root() {
        let (tree, class, getter) = sample();
        let chain: Vec<_> = tree.ancestors(getter).collect();
        assert_eq!(chain, vec![getter, class, tree.root()]);
    }

    #[test]
    fn opposite_accessor_requires_matching_name() {
        let (mut tree, class, getter) = sample();
        assert_eq!(tree.opposite_accessor(getter), None);
        let mut setter = SyntaxNode::new(SyntaxKind::SetAccessor, TextSpan::new(31, 32));
        setter.name = Some("x".into());
        let setter = tree.push(class, setter);
        assert_eq!(tree.opposite_accessor(getter), Some(setter));
        assert_eq!(tree.opposite_accessor(setter), Some(getter));
    }
}
