//! Integration tests for binding generation
//!
//! These tests drive the generator the way the CLI does: an `Interface` in, Rust source or a typed error out.
//! Small, stable reports are pinned with inline insta snapshots; generated files are checked for the
//! fragments that matter and for being valid Rust.
//!
//! Review changes: `cargo insta review`

use std::fs;
use std::path::PathBuf;

use webidl_bindgen::backend::classify::are_distinguishable;
use webidl_bindgen::backend::overload::plan_overloads;
use webidl_bindgen::cli::commands::{self, GenerateOptions};
use webidl_bindgen::{BindingsCodegen, GenerationError, GeneratorConfig};
use webidl_core::{
    Attribute, Constant, Constructor, Dictionary, DictionaryMember, Enumeration, Function, Interface, Parameter, Type,
};

fn canvas() -> Interface {
    let mut interface = Interface::new("CanvasRenderingContext2D");
    interface.module_path = "src/web/HTML/CanvasRenderingContext2D".into();
    interface.attributes.push(Attribute::new("lineWidth", Type::plain("unrestricted double")));
    interface
        .attributes
        .push(Attribute::new("canvas", Type::plain("HTMLCanvasElement")).readonly());
    interface.enumerations.insert(
        "CanvasFillRule".into(),
        Enumeration::from_values(["nonzero", "evenodd"]),
    );
    interface.functions.push(Function::new(
        "fill",
        Type::plain("undefined"),
        vec![Parameter::new("fillRule", Type::plain("CanvasFillRule")).with_default("\"nonzero\"")],
    ));
    interface.functions.push(Function::new(
        "fill",
        Type::plain("undefined"),
        vec![
            Parameter::new("path", Type::plain("Path2D")),
            Parameter::new("fillRule", Type::plain("CanvasFillRule")).with_default("\"nonzero\""),
        ],
    ));
    interface.functions.push(Function::new(
        "measureText",
        Type::plain("TextMetrics"),
        vec![Parameter::new("text", Type::plain("DOMString"))],
    ));
    interface.functions.push(Function::new(
        "setLineDash",
        Type::plain("undefined"),
        vec![Parameter::new("segments", Type::sequence(Type::plain("unrestricted double")))],
    ));
    interface
}

fn unformatted(interface: &Interface) -> String {
    let config = GeneratorConfig::new().with_format_output(false).with_header(false);
    BindingsCodegen::new(config).try_generate(interface).unwrap()
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("webidl-bindgen-{}-{name}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

// ============================================================================
// Generated source
// ============================================================================

#[test]
fn generated_file_is_valid_rust() {
    let source = BindingsCodegen::new(GeneratorConfig::new()).try_generate(&canvas()).unwrap();
    assert!(source.starts_with("// Generated by webidl-bindgen v"));
    syn::parse_file(&source).unwrap();
}

#[test]
fn overloaded_fill_dispatches_on_the_first_argument() {
    let out = unformatted(&canvas());
    assert!(out.contains("fn fill0("));
    assert!(out.contains("fn fill1("));
    assert!(out.contains("DispatchGroup::new(Some(0), vec!["));
    assert!(out.contains("ArgumentTest::Interface(\"Path2D\".to_string())"));
    assert!(out.contains("resolve_overload(realm, &dispatch, arguments)?"));
}

#[test]
fn readonly_attributes_have_no_setter() {
    let out = unformatted(&canvas());
    assert!(out.contains("fn line_width_getter("));
    assert!(out.contains("fn line_width_setter("));
    assert!(out.contains("fn canvas_getter("));
    assert!(!out.contains("fn canvas_setter("));
}

#[test]
fn sequences_convert_through_the_iterator_protocol() {
    let out = unformatted(&canvas());
    assert!(out.contains("get_iterator_method"));
    assert!(out.contains("iterator_step"));
    assert!(out.contains("ErrorType::NotIterable"));
}

#[test]
fn constants_are_defined_read_only() {
    let mut interface = Interface::new("Node");
    interface.constants.push(Constant {
        ty: Type::plain("unsigned short"),
        name: "TEXT_NODE".into(),
        value: "3".into(),
    });
    let out = unformatted(&interface);
    assert!(out.contains("pub fn define_constants(realm: &mut Realm, object: ObjectId)"));
    assert!(out.contains("realm.define_property(object, \"TEXT_NODE\", Value::Number(3.0), false);"));
}

// ============================================================================
// Reports
// ============================================================================

#[test]
fn classification_report_snapshot() {
    let report = commands::classification_report(&canvas()).unwrap();
    insta::assert_snapshot!(report.trim_end(), @r"
    unrestricted double -> f64 (flat)
    HTMLCanvasElement -> Handle<HTMLCanvasElement> (heap-tracked)
    undefined -> Value (heap-tracked)
    CanvasFillRule -> CanvasFillRule (flat)
    Path2D -> Handle<Path2D> (heap-tracked)
    TextMetrics -> Handle<TextMetrics> (heap-tracked)
    DOMString -> String (flat)
    sequence<unrestricted double> -> Vec<f64> (flat)
    ");
}

#[test]
fn overload_bucket_snapshot() {
    let interface = canvas();
    let plans = commands::overload_plans(&interface).unwrap();
    let fill = plans.iter().find(|plan| plan.name == "fill").unwrap();
    let summary: Vec<String> = fill
        .buckets
        .iter()
        .map(|(count, bucket)| {
            let ids: Vec<String> = bucket.items.iter().map(|item| item.callable_id.to_string()).collect();
            match bucket.distinguishing_argument_index {
                Some(index) => format!("{count} => [{}] distinguished at {index}", ids.join(", ")),
                None => format!("{count} => [{}]", ids.join(", ")),
            }
        })
        .collect();
    insta::assert_snapshot!(summary.join("\n"), @r"
    0 => [0]
    1 => [0, 1] distinguished at 0
    2 => [1]
    ");
}

#[test]
fn distinguishing_indices_separate_every_pair() {
    let interface = canvas();
    for plan in commands::overload_plans(&interface).unwrap() {
        for bucket in plan.buckets.values() {
            let Some(index) = bucket.distinguishing_argument_index else {
                assert_eq!(bucket.items.len(), 1);
                continue;
            };
            for (i, a) in bucket.items.iter().enumerate() {
                for b in &bucket.items[i + 1..] {
                    assert!(are_distinguishable(&a.types[index], &b.types[index], &interface).unwrap());
                }
            }
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn indistinguishable_overloads_are_rejected() {
    let interface = Interface::new("Math");
    let long = [Parameter::new("x", Type::plain("long"))];
    let short = [Parameter::new("x", Type::plain("short"))];
    let err = plan_overloads("abs", &[&long, &short], &interface).unwrap_err();
    assert!(matches!(
        err,
        GenerationError::NoDistinguishingIndex { ref operation, argument_count: 1 } if operation == "abs"
    ));
}

#[test]
fn inconsistent_unions_fail_generation() {
    let mut interface = Interface::new("Mixer");
    interface.functions.push(Function::new(
        "mix",
        Type::plain("undefined"),
        vec![Parameter::new(
            "amount",
            Type::union(vec![Type::plain("long"), Type::plain("double")]),
        )],
    ));
    let err = BindingsCodegen::new(GeneratorConfig::new()).try_generate(&interface).unwrap_err();
    assert!(matches!(err, GenerationError::InconsistentUnion { .. }));
}

#[test]
fn empty_enumerations_fail_generation() {
    let mut interface = Interface::new("Picker");
    interface
        .enumerations
        .insert("Nothing".into(), Enumeration::from_values(Vec::<String>::new()));
    let err = BindingsCodegen::new(GeneratorConfig::new()).try_generate(&interface).unwrap_err();
    assert!(matches!(err, GenerationError::EmptyEnumeration { .. }));
}

#[test]
fn unknown_parent_dictionaries_fail_generation() {
    let mut interface = Interface::new("Scroller");
    interface.dictionaries.insert(
        "ScrollToOptions".into(),
        Dictionary::new(vec![DictionaryMember::new("top", Type::plain("double"))]).inheriting("ScrollOptions"),
    );
    interface.functions.push(Function::new(
        "scrollTo",
        Type::plain("undefined"),
        vec![Parameter::new("options", Type::plain("ScrollToOptions")).optional()],
    ));
    let err = BindingsCodegen::new(GeneratorConfig::new()).try_generate(&interface).unwrap_err();
    assert!(matches!(err, GenerationError::UnknownDictionary { .. }));
}

// ============================================================================
// CLI driver
// ============================================================================

#[test]
fn generate_writes_the_output_file() {
    let dir = scratch_dir("generate");
    let input = dir.join("canvas.json");
    let output = dir.join("canvas.rs");
    fs::write(&input, serde_json::to_string(&canvas()).unwrap()).unwrap();

    let options = GenerateOptions {
        output: Some(output.clone()),
        format_output: true,
        ..GenerateOptions::default()
    };
    commands::generate(&input, &options).unwrap();
    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("pub struct CanvasRenderingContext2DPrototype"));
}

#[test]
fn failed_generation_writes_nothing() {
    let dir = scratch_dir("failed");
    let input = dir.join("broken.json");
    let output = dir.join("broken.rs");
    let mut interface = Interface::new("Broken");
    interface.attributes.push(Attribute::new("thing", Type::plain("Mystery")));
    fs::write(&input, serde_json::to_string(&interface).unwrap()).unwrap();

    let options = GenerateOptions {
        output: Some(output.clone()),
        ..GenerateOptions::default()
    };
    let err = commands::generate(&input, &options).unwrap_err();
    assert!(err.message.contains("Mystery"));
    assert!(!output.exists());
}

#[test]
fn malformed_json_is_an_input_error() {
    let dir = scratch_dir("malformed");
    let input = dir.join("bad.json");
    fs::write(&input, "{ \"name\": 3 }").unwrap();
    let err = commands::read_interface(&input).unwrap_err();
    assert_eq!(err.exit_code, webidl_bindgen::cli::ExitCode::INPUT);
}

#[test]
fn constructors_get_their_own_plan() {
    let mut interface = Interface::new("Request");
    interface.constructors.push(Constructor::new(vec![Parameter::new("input", Type::plain("USVString"))]));
    let plans = commands::overload_plans(&interface).unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].name, "constructor");
    assert_eq!(plans[0].maximum_argument_count, 1);
}
