//! Header assembly on parsed sources.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use docstamp::{
    ClassifyOptions, DeclarationKind, DescriptionService, DescriptionStyle, GenerativeDescriptions,
    GeneratorConfig, HeaderBuilder, OxcParser, RenderMode, RenderStyle, SourceParser,
    SyntacticOracle, SyntaxKind, SyntaxTree, TagLine, configured_source, file_declarations, render,
};
use rustc_hash::FxHashMap;

fn parse(path: &str, source: &str) -> SyntaxTree {
    OxcParser::new()
        .parse(Path::new(path), source)
        .expect("source should parse")
}

fn builder(config: GeneratorConfig) -> HeaderBuilder {
    let descriptions = configured_source(&config);
    HeaderBuilder::new(Arc::new(config), Arc::new(SyntacticOracle), descriptions)
}

/// Plain header for the declaration called `name`.
async fn header(config: GeneratorConfig, path: &str, source: &str, name: &str) -> String {
    let tree = parse(path, source);
    let options = ClassifyOptions::from(&config);
    let target = file_declarations(&tree, options)
        .into_iter()
        .find(|target| tree.node(target.node).name.as_deref() == Some(name))
        .unwrap_or_else(|| panic!("no declaration named {name}"));
    let draft = builder(config).build(&tree, target).await;
    render(&draft, &RenderStyle::plain(""))
}

#[tokio::test]
async fn function_header_lists_params_and_return() {
    let text = header(
        GeneratorConfig::default(),
        "math.ts",
        "function add(a: number, b: number): number {\n  return a + b;\n}\n",
        "add",
    )
    .await;
    assert_eq!(
        text,
        "/**\n * Description placeholder\n *\n * @param {number} a\n * @param {number} b\n * @returns {number}\n */\n"
    );
}

#[tokio::test]
async fn no_value_returns_are_suppressed() {
    let source = "function log(msg: string): void {}\nfunction quiet(x) { console.log(x); }\nfunction done(): Promise<void> { return run(); }\n";
    for name in ["log", "quiet", "done"] {
        let text = header(GeneratorConfig::default(), "log.ts", source, name).await;
        assert!(!text.contains("@returns"), "{name}: {text}");
    }
}

#[tokio::test]
async fn inferred_returns_are_emitted() {
    let source = "export async function load() {\n  return fetchIt();\n}\nfunction* ids() { yield 1; }\n";
    let load = header(GeneratorConfig::default(), "load.js", source, "load").await;
    assert!(load.contains(" * @export\n * @async\n"), "{load}");
    assert!(load.contains(" * @returns {Promise<*>}\n"), "{load}");

    let ids = header(GeneratorConfig::default(), "load.js", source, "ids").await;
    assert!(ids.contains(" * @returns {Generator}\n"), "{ids}");
}

#[tokio::test]
async fn rest_union_parenthesization_follows_policy() {
    let source = "function pick(...values: A | B) {}\n";
    let wrapped = header(GeneratorConfig::default(), "p.ts", source, "pick").await;
    assert!(wrapped.contains("@param ...{(A | B)} values"), "{wrapped}");

    let bare = header(
        GeneratorConfig::default().with_parenthesized_unions(false),
        "p.ts",
        source,
        "pick",
    )
    .await;
    assert!(bare.contains("@param ...{A | B} values"), "{bare}");
}

#[tokio::test]
async fn plain_union_parenthesization_follows_policy() {
    let source = "function set(value: A | B, label?: string) {}\n";
    let wrapped = header(GeneratorConfig::default(), "s.ts", source, "set").await;
    assert!(wrapped.contains("@param {(A | B)} value"), "{wrapped}");
    assert!(wrapped.contains("@param {string} [label]"), "{wrapped}");

    let bare = header(
        GeneratorConfig::default().with_parenthesized_unions(false),
        "s.ts",
        source,
        "set",
    )
    .await;
    assert!(bare.contains("@param {A | B} value"), "{bare}");
}

#[tokio::test]
async fn optional_property_binds_prefix_inside_braces() {
    let source = "class Cell {\n  value?: A | B;\n}\n";
    let text = header(
        GeneratorConfig::default().with_parenthesized_unions(false),
        "c.ts",
        source,
        "value",
    )
    .await;
    assert!(text.contains("@type {?(A | B)}"), "{text}");
}

#[tokio::test]
async fn destructured_parameter_expands_in_order() {
    let text = header(
        GeneratorConfig::default(),
        "d.js",
        "function draw({ x, y = 1 }) {}\n",
        "draw",
    )
    .await;
    let params: Vec<&str> = text
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("* @param "))
        .collect();
    assert_eq!(
        params,
        vec!["{Object} param0", "{*} param0.x", "{number} [param0.y=1]"]
    );
}

#[tokio::test]
async fn setter_reuses_documented_getter() {
    let source = "class Box {\n  /** The stored value. */\n  get value(): number { return 1; }\n  set value(v: number) {}\n}\n";
    let tree = parse("box.ts", source);
    let options = ClassifyOptions::default();
    let setter = file_declarations(&tree, options)
        .into_iter()
        .find(|target| tree.node(target.node).kind == SyntaxKind::SetAccessor)
        .expect("setter is a member");
    let draft = builder(GeneratorConfig::default()).build(&tree, setter).await;
    assert_eq!(
        render(&draft, &RenderStyle::plain("  ")),
        "/**\n   * The stored value.\n   * @inheritdoc\n   */\n  "
    );
}

#[tokio::test]
async fn class_header_has_kind_and_heritage() {
    let source = "export class Repo<T> extends Base implements Store {}\n";
    let tree = parse("repo.ts", source);
    let target = file_declarations(&tree, ClassifyOptions::default())[0];
    let draft = builder(GeneratorConfig::default()).build(&tree, target).await;
    assert_eq!(
        draft.tags(),
        vec!["export", "class", "typedef", "extends", "implements", "template"]
    );
}

#[tokio::test]
async fn constructor_names_its_class() {
    let source = "class Repo {\n  constructor(db: Db) {}\n}\n";
    let text = header(
        GeneratorConfig::default().with_description_style(DescriptionStyle::Static),
        "repo.ts",
        source,
        "constructor",
    )
    .await;
    assert_eq!(
        text,
        "/**\n * Creates an instance of Repo.\n *\n * @constructor\n * @param {Db} db\n */\n"
    );
}

#[tokio::test]
async fn function_variable_classification_is_configurable() {
    let source = "const add = (a: number, b: number) => a + b;\n";
    let as_function = header(GeneratorConfig::default(), "v.ts", source, "add").await;
    assert!(as_function.contains("@param {number} a"), "{as_function}");
    assert!(as_function.contains("@returns {*}"), "{as_function}");

    let mut config = GeneratorConfig::default();
    config.function_variables_as_functions = false;
    let as_variable = header(config, "v.ts", source, "add").await;
    assert!(as_variable.contains("@type {Function}"), "{as_variable}");
    assert!(!as_variable.contains("@param"), "{as_variable}");
}

#[tokio::test]
async fn types_can_be_switched_off() {
    let source = "export const limit = 10;\nfunction f(a: number) {}\n";
    let limit = header(
        GeneratorConfig::default().with_types(false),
        "l.ts",
        source,
        "limit",
    )
    .await;
    assert_eq!(limit, "/**\n * Description placeholder\n *\n * @export\n */\n");

    let f = header(GeneratorConfig::default().with_types(false), "l.ts", source, "f").await;
    assert!(f.contains(" * @param a\n"), "{f}");
}

#[tokio::test]
async fn single_line_style_for_bare_headers() {
    let mut config = GeneratorConfig::default()
        .with_single_line_comments(true)
        .with_empty_line_after_header(false)
        .with_types(false);
    config.include_export = false;
    let tree = parse("x.ts", "export let x;\n");
    let target = file_declarations(&tree, ClassifyOptions::from(&config))[0];
    let builder = builder(config);
    let draft = builder.build(&tree, target).await;
    let style = builder.render_style("", RenderMode::Plain);
    assert_eq!(render(&draft, &style), "/** Description placeholder */\n");
}

#[tokio::test]
async fn snippet_mode_numbers_editable_regions() {
    let tree = parse("f.ts", "function f(a: string) {}\n");
    let config = GeneratorConfig::default();
    let target = file_declarations(&tree, ClassifyOptions::from(&config))[0];
    let builder = builder(config);
    let draft = builder.build(&tree, target).await;
    let text = render(&draft, &builder.render_style("", RenderMode::Snippet));
    assert_eq!(
        text,
        "/**\n * ${1:Description placeholder}\n *\n * @param {${2:string}} a ${3}\n */\n"
    );
}

/// A description service that never answers.
struct SilentService;

#[async_trait]
impl DescriptionService for SilentService {
    async fn describe_snippet(&self, _kind: DeclarationKind, _snippet: &str) -> Option<String> {
        None
    }

    async fn describe_parameters(
        &self,
        _snippet: &str,
        _names: &[String],
        _is_generic: bool,
    ) -> Option<FxHashMap<String, String>> {
        None
    }

    async fn describe_return(&self, _snippet: &str, _return_type: &str) -> Option<String> {
        None
    }
}

#[tokio::test]
async fn unavailable_service_leaves_no_blank_description() {
    let tree = parse("f.ts", "function f(a: string): number {\n  return 1;\n}\n");
    let config = GeneratorConfig::default();
    let target = file_declarations(&tree, ClassifyOptions::from(&config))[0];
    let builder = HeaderBuilder::new(
        Arc::new(config),
        Arc::new(SyntacticOracle),
        Arc::new(GenerativeDescriptions::new(Arc::new(SilentService))),
    );
    let draft = builder.build(&tree, target).await;

    assert_eq!(
        render(&draft, &builder.render_style("", RenderMode::Plain)),
        "/**\n * @param {string} a\n * @returns {number}\n */\n"
    );
    assert!(
        render(&draft, &builder.render_style("", RenderMode::Snippet)).starts_with("/**\n * ${1}\n *\n")
    );
}

#[tokio::test]
async fn empty_placeholder_with_blank_after_header() {
    let mut config = GeneratorConfig::default().with_empty_line_after_header(true);
    config.description_placeholder = String::new();
    let text = header(config, "f.ts", "function f(a: string) {}\n", "f").await;
    assert_eq!(text, "/**\n * @param {string} a\n */\n");
}

#[tokio::test]
async fn class_expression_is_documented_as_a_class() {
    let source = "const Foo = class extends Base {\n  bar() {}\n};\n";
    let tree = parse("foo.ts", source);
    let targets = file_declarations(&tree, ClassifyOptions::default());
    let found: Vec<_> = targets
        .iter()
        .map(|target| (tree.node(target.node).name.as_deref(), target.kind))
        .collect();
    assert_eq!(
        found,
        vec![
            (Some("Foo"), DeclarationKind::ClassLike),
            (Some("bar"), DeclarationKind::Method),
        ]
    );

    let text = header(GeneratorConfig::default(), "foo.ts", source, "Foo").await;
    assert!(text.contains(" * @class Foo\n"), "{text}");
    assert!(text.contains(" * @typedef {Foo}\n"), "{text}");
    assert!(text.contains(" * @extends {Base}\n"), "{text}");
}

#[tokio::test]
async fn built_type_values_are_balanced() {
    let source = "export class Cache<T extends { id: string }> {\n  get(key: { id: string; tags: { name: string }[] }): Map<string, { hit: T }> {\n    return new Map();\n  }\n}\n";
    let tree = parse("cache.ts", source);
    let config = GeneratorConfig::default();
    let builder = builder(config.clone());
    for target in file_declarations(&tree, ClassifyOptions::from(&config)) {
        let draft = builder.build(&tree, target).await;
        assert!(draft.content_len() > 0);
        assert!(
            draft.tag_lines().all(TagLine::is_balanced),
            "{:?}",
            draft.lines()
        );
    }
}
