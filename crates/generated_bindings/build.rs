//! Generate the `Widget` bindings into `OUT_DIR`.
//!
//! The interface covers every dictionary member shape whose host field tracks presence (enumeration, union with
//! `undefined`, `any`, nullable) next to a required and a defaulted member, an operation taking and returning the
//! dictionary, and an enumeration attribute.

use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use webidl_bindgen::backend::{BindingsCodegen, GeneratorConfig};
use webidl_core::{Attribute, Dictionary, DictionaryMember, Enumeration, Function, Interface, Parameter, Type};

fn widget() -> Interface {
    let mut interface = Interface::new("Widget");
    interface
        .enumerations
        .insert("Mode".into(), Enumeration::from_values(["open", "closed"]));
    interface.dictionaries.insert(
        "Options".into(),
        Dictionary::new(vec![
            DictionaryMember::new("mode", Type::plain("Mode")),
            DictionaryMember::new("count", Type::union(vec![Type::plain("long"), Type::plain("undefined")])),
            DictionaryMember::new("extra", Type::plain("any")),
            DictionaryMember::new("label", Type::plain("DOMString").nullable()),
            DictionaryMember::new("size", Type::plain("long")).required(),
            DictionaryMember::new("fit", Type::plain("Mode")).with_default("\"closed\""),
        ]),
    );
    interface.functions.push(Function::new(
        "echo",
        Type::plain("Options"),
        vec![Parameter::new("options", Type::plain("Options"))],
    ));
    interface.attributes.push(Attribute::new("mode", Type::plain("Mode")));
    interface
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../../src/backend");
    println!("cargo:rerun-if-changed=../webidl_core/src");

    let source = BindingsCodegen::new(GeneratorConfig::new().with_header(false)).try_generate(&widget())?;
    // Inner attributes are not allowed in `include!`d files; the including module carries them instead.
    let body: String = source
        .lines()
        .filter(|line| !line.starts_with("#!["))
        .map(|line| format!("{line}\n"))
        .collect();
    let out = PathBuf::from(env::var("OUT_DIR")?).join("widget_bindings.rs");
    fs::write(out, body)?;
    Ok(())
}
