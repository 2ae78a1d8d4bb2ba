//! Module linking integration tests
//!
//! Each test wires a small module graph through an in-memory source reader
//! and checks what ends up bound in the entry's scope.

use std::cell::RefCell;
use std::rc::Rc;
use tether_engine::module::{ModuleLinkContext, NameBinding, RequestNode};
use tether_engine::parser::{ParseOptions, Parser};
use tether_engine::{
    Engine, EngineOptions, Error, FsSourceReader, MemorySourceReader, ModuleError,
    ModuleErrorKind, Value,
};

fn engine_with(files: &[(&str, &str)]) -> Engine {
    let mut reader = MemorySourceReader::new();
    for (path, source) in files {
        reader.insert(*path, *source);
    }
    Engine::new().with_source_reader(reader)
}

fn global(engine: &Engine, name: &str) -> Option<Value> {
    engine.global().lookup(name)
}

fn module_context(source: &str) -> ModuleLinkContext {
    let mut parser = Parser::with_options(source, ParseOptions::module());
    parser.parse_program().unwrap();
    parser.into_module_context().unwrap()
}

fn kind_of(result: Result<Value, Error>) -> Option<ModuleErrorKind> {
    result.unwrap_err().module_kind()
}

#[test]
fn test_duplicate_import_alias_across_paths() {
    let mut engine = engine_with(&[("x.js", "export var a = 1;"), ("y.js", "export var a = 2;")]);
    let result = engine.run_module(
        "main.js",
        r#"import { a } from "x.js"; import { a } from "y.js";"#,
    );
    assert_eq!(kind_of(result), Some(ModuleErrorKind::DuplicateBinding));
}

#[test]
fn test_reexport_and_import_share_alias() {
    let files = [("x.js", "export var a = 1;"), ("y.js", "export var a = 2;")];

    let mut engine = engine_with(&files);
    let result = engine.run_module(
        "main.js",
        r#"export { a } from "x.js"; import { a } from "y.js"; var seen = a;"#,
    );
    assert_eq!(kind_of(result), Some(ModuleErrorKind::DuplicateBinding));
    assert_eq!(global(&engine, "seen"), None);

    let mut engine = engine_with(&files);
    let result = engine.run_module(
        "main.js",
        r#"import { a } from "y.js"; export { a } from "x.js"; var seen = a;"#,
    );
    assert_eq!(kind_of(result), Some(ModuleErrorKind::DuplicateBinding));
    assert_eq!(global(&engine, "seen"), None);
}

#[test]
fn test_default_export_uniqueness() {
    let mut engine = Engine::new();
    let result = engine.run_module("main.js", "export default 1; export default 2;");
    assert_eq!(kind_of(result), Some(ModuleErrorKind::DuplicateDefaultExport));

    let context = module_context("export default 1; export var a = 1, b = 2; export function f() {}");
    let exports = context.exports().unwrap();
    assert_eq!(exports.request_count(), 4);
    assert!(exports.has_default());
}

#[test]
fn test_named_import_with_alias() {
    let mut engine = engine_with(&[("b.js", "export var foo = 1;")]);
    engine
        .run_module("main.js", r#"import { foo as bar } from "b.js";"#)
        .unwrap();
    assert_eq!(global(&engine, "bar"), Some(Value::Number(1.0)));
    assert_eq!(global(&engine, "foo"), None);
}

#[test]
fn test_default_import_matches_by_flag() {
    let mut engine = engine_with(&[("b.js", "export default 42;")]);
    engine
        .run_module("main.js", r#"import x from "b.js";"#)
        .unwrap();
    assert_eq!(global(&engine, "x"), Some(Value::Number(42.0)));
}

#[test]
fn test_default_function_export() {
    let mut engine = engine_with(&[(
        "b.js",
        "export default function twice(n) { return n * 2; }",
    )]);
    let result = engine
        .run_module("main.js", r#"import twice from "b.js"; twice(4);"#)
        .unwrap();
    assert_eq!(result, Value::Number(8.0));
}

#[test]
fn test_namespace_import_excludes_default() {
    let mut engine = engine_with(&[(
        "b.js",
        "export var a = 1; export var b = 2; export default 3;",
    )]);
    engine
        .run_module("main.js", r#"import * as NS from "b.js";"#)
        .unwrap();

    let namespace = global(&engine, "NS").unwrap();
    let namespace = namespace.as_object().unwrap();
    assert_eq!(namespace.get("a"), Some(Value::Number(1.0)));
    assert_eq!(namespace.get("b"), Some(Value::Number(2.0)));
    assert!(!namespace.has("default"));
    assert_eq!(namespace.len(), 2);
}

#[test]
fn test_namespace_and_default_together() {
    let mut engine = engine_with(&[("b.js", "export var a = 1; export default 3;")]);
    engine
        .run_module("main.js", r#"import d, * as NS from "b.js";"#)
        .unwrap();
    assert_eq!(global(&engine, "d"), Some(Value::Number(3.0)));
    assert!(global(&engine, "NS").unwrap().as_object().unwrap().has("a"));
}

#[test]
fn test_unaliased_namespace_rejected() {
    let mut engine = engine_with(&[("b.js", "export var a = 1;")]);
    let result = engine.run_module("main.js", r#"import * from "b.js";"#);
    assert_eq!(kind_of(result), Some(ModuleErrorKind::InvalidAlias));
}

#[test]
fn test_side_effect_import_binds_nothing() {
    let mut engine = engine_with(&[(
        "b.js",
        "var local = 1; export var a = 2; record('loaded');",
    )]);
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    engine.define_native("record", move |_, _, args| {
        sink.borrow_mut().push(args[0].to_string());
        Ok(Value::Undefined)
    });
    let before = engine.global().enumerate_own_properties().len();

    engine.run_module("main.js", r#"import "b.js";"#).unwrap();

    assert_eq!(*log.borrow(), vec!["loaded".to_string()]);
    assert_eq!(engine.global().enumerate_own_properties().len(), before);
    assert_eq!(global(&engine, "a"), None);
    assert_eq!(global(&engine, "local"), None);
}

#[test]
fn test_unresolved_imports_are_all_reported() {
    let mut engine = engine_with(&[("b.js", "export var present = 1;")]);
    let err = engine
        .run_module(
            "main.js",
            r#"import { present, missing, gone } from "b.js";"#,
        )
        .unwrap_err();
    assert_eq!(err.module_kind(), Some(ModuleErrorKind::ModuleNotFound));
    match err {
        Error::Module(ModuleError::UnresolvedImport { path, names }) => {
            assert_eq!(path, "b.js");
            assert_eq!(names, vec!["missing".to_string(), "gone".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(global(&engine, "present"), None);
}

#[test]
fn test_reexport_passthrough() {
    let mut engine = engine_with(&[
        ("b.js", r#"export { x } from "c.js";"#),
        ("c.js", "export var x = 7;"),
    ]);
    engine
        .run_module("main.js", r#"import { x } from "b.js";"#)
        .unwrap();
    assert_eq!(global(&engine, "x"), Some(Value::Number(7.0)));
}

#[test]
fn test_renamed_reexport() {
    let mut engine = engine_with(&[
        ("b.js", r#"export { x as y } from "c.js";"#),
        ("c.js", "export var x = 7;"),
    ]);
    engine
        .run_module("main.js", r#"import { y } from "b.js";"#)
        .unwrap();
    assert_eq!(global(&engine, "y"), Some(Value::Number(7.0)));
    assert_eq!(global(&engine, "x"), None);
}

#[test]
fn test_star_reexport() {
    let mut engine = engine_with(&[
        ("b.js", r#"export * from "c.js"; export var own = 0;"#),
        ("c.js", "export var one = 1; export var two = 2; export default 9;"),
    ]);
    engine
        .run_module("main.js", r#"import { one, two, own } from "b.js";"#)
        .unwrap();
    assert_eq!(global(&engine, "one"), Some(Value::Number(1.0)));
    assert_eq!(global(&engine, "two"), Some(Value::Number(2.0)));
    assert_eq!(global(&engine, "own"), Some(Value::Number(0.0)));
}

#[test]
fn test_property_exported_under_two_names() {
    let mut engine = engine_with(&[("b.js", "var a = 1; export { a, a as b };")]);
    engine
        .run_module("main.js", r#"import { a, b } from "b.js";"#)
        .unwrap();
    assert_eq!(global(&engine, "a"), Some(Value::Number(1.0)));
    assert_eq!(global(&engine, "b"), Some(Value::Number(1.0)));
}

#[test]
fn test_request_limit() {
    let mut node = RequestNode::new("big.js");
    for index in 0..u16::MAX {
        let name = format!("n{index}");
        node.push(NameBinding::named(&name, &name)).unwrap();
    }
    assert_eq!(node.request_count(), 65535);

    let err = node.push(NameBinding::named("last", "last")).unwrap_err();
    assert_eq!(err.kind(), ModuleErrorKind::RequestLimitExceeded);
}

fn export_list(count: usize) -> String {
    let names: Vec<String> = (0..count).map(|index| format!("n{index}")).collect();
    format!("export {{ {} }};", names.join(", "))
}

#[test]
fn test_export_table_limit() {
    let source = export_list(65535);
    let mut parser = Parser::with_options(&source, ParseOptions::module());
    parser.parse_program().unwrap();
    let context = parser.into_module_context().unwrap();
    assert_eq!(context.exports().unwrap().request_count(), 65535);

    let source = export_list(65536);
    let mut parser = Parser::with_options(&source, ParseOptions::module());
    let err = parser.parse_program().unwrap_err();
    assert_eq!(err.module_kind(), Some(ModuleErrorKind::RequestLimitExceeded));
}

#[test]
fn test_imports_from_same_path_merge() {
    let context = module_context(r#"import { a } from "p.js"; import { b } from "p.js";"#);
    assert_eq!(context.imports().len(), 1);

    let node = &context.imports()[0];
    assert_eq!(node.script_path(), "p.js");
    let aliases: Vec<&str> = node.bindings().iter().map(|b| b.alias()).collect();
    assert_eq!(aliases, vec!["a", "b"]);
}

#[test]
fn test_dependency_scope_is_private() {
    let mut engine = engine_with(&[("b.js", "var hidden = 1; export var shown = 2;")]);
    engine
        .run_module("main.js", r#"import { shown } from "b.js";"#)
        .unwrap();
    assert_eq!(global(&engine, "hidden"), None);
    assert_eq!(global(&engine, "shown"), Some(Value::Number(2.0)));
}

#[test]
fn test_imported_binding_is_read_only() {
    let mut engine = engine_with(&[("b.js", "export var b = 1;")]);
    let err = engine
        .run_module("main.js", r#"import { b } from "b.js"; b = 2;"#)
        .unwrap_err();
    assert!(matches!(err, Error::Type(_)));
    assert_eq!(global(&engine, "b"), Some(Value::Number(1.0)));
}

#[test]
fn test_nested_dependencies_link_in_module_scope() {
    let mut engine = engine_with(&[
        ("b.js", r#"import { c } from "c.js"; export var b = c + 1;"#),
        ("c.js", "export var c = 1;"),
    ]);
    engine
        .run_module("main.js", r#"import { b } from "b.js";"#)
        .unwrap();
    assert_eq!(global(&engine, "b"), Some(Value::Number(2.0)));
    assert_eq!(global(&engine, "c"), None);
}

#[test]
fn test_circular_import_rejected() {
    let mut engine = engine_with(&[
        ("a.js", r#"import { b } from "b.js"; export var a = 1;"#),
        ("b.js", r#"import { a } from "a.js"; export var b = 2;"#),
    ]);
    let err = engine
        .run_module("main.js", r#"import { a } from "a.js";"#)
        .unwrap_err();
    match err {
        Error::Module(ModuleError::CircularImport { chain }) => {
            assert_eq!(chain, vec!["a.js", "b.js", "a.js"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(engine.link_stack().is_empty());
}

#[test]
fn test_link_depth_limit() {
    let options = EngineOptions {
        max_link_depth: 2,
        ..EngineOptions::default()
    };
    let reader = MemorySourceReader::new()
        .with_file("one.js", r#"import { two } from "two.js"; export var one = two;"#)
        .with_file("two.js", r#"import { three } from "three.js"; export var two = three;"#)
        .with_file("three.js", "export var three = 3;");
    let mut engine = Engine::with_options(options).with_source_reader(reader);

    let result = engine.run_module("main.js", r#"import { one } from "one.js";"#);
    assert_eq!(kind_of(result), Some(ModuleErrorKind::LinkDepthExceeded));
}

#[test]
fn test_missing_file() {
    let mut engine = Engine::new().with_source_reader(MemorySourceReader::new());
    let result = engine.run_module("main.js", r#"import { a } from "nowhere.js";"#);
    assert_eq!(kind_of(result), Some(ModuleErrorKind::FileNotFound));
}

#[test]
fn test_module_statements_outside_top_level() {
    let mut engine = engine_with(&[("b.js", "export var a = 1;")]);

    let result = engine.run_module(
        "main.js",
        r#"function f() { import { a } from "b.js"; }"#,
    );
    assert_eq!(kind_of(result), Some(ModuleErrorKind::ModuleStatementMisplaced));

    let result = engine.eval(r#"eval('import { a } from "b.js";');"#);
    assert_eq!(kind_of(result), Some(ModuleErrorKind::ModuleStatementMisplaced));
}

#[test]
fn test_unsupported_forms() {
    let mut engine = engine_with(&[("b.js", "export var a = 1;")]);
    let result = engine.run_module("main.js", r#"export * as ns from "b.js";"#);
    assert_eq!(kind_of(result), Some(ModuleErrorKind::NotImplemented));

    let result = engine.run_module("main.js", r#"import("b.js");"#);
    assert_eq!(kind_of(result), Some(ModuleErrorKind::NotImplemented));
}

#[test]
fn test_malformed_specifier() {
    let mut engine = Engine::new();
    let result = engine.run_module("main.js", "import { a } from b;");
    assert_eq!(kind_of(result), Some(ModuleErrorKind::MalformedSpecifierSyntax));

    let result = engine.run_module("main.js", r#"import { a } from "";"#);
    assert_eq!(kind_of(result), Some(ModuleErrorKind::MalformedSpecifierSyntax));
}

#[test]
fn test_modules_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("math.js"), "export function square(n) { return n * n; }").unwrap();
    std::fs::write(
        dir.path().join("main.js"),
        r#"import { square } from "math.js"; square(5);"#,
    )
    .unwrap();

    let mut engine = Engine::new().with_source_reader(FsSourceReader::with_base_dir(dir.path()));
    assert_eq!(engine.run_module_file("main.js").unwrap(), Value::Number(25.0));
}
