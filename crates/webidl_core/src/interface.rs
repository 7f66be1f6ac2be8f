//! Interface, member and declaration descriptors.
//!
//! An [`Interface`] is the unit of generation: one IDL interface together with the dictionaries, enumerations
//! and callback functions declared next to it, plus the interfaces it imports for cross-file lookups.
//!
//! ## Notes
//! - Named declarations live in [`IndexMap`]s so iteration follows declaration order.
//! - Lookups search this interface first, then its imports breadth-first.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::lang::extended_attributes::{self, ExtendedAttributeId};
use crate::types::Type;

// ============================================================================
// Extended attributes
// ============================================================================

/// The extended attributes that influence generation, as typed fields.
///
/// Input descriptions may carry any attribute bag (`{"Clamp": "", "ImplementedAs": "foo"}`); names outside the
/// recognized vocabulary are dropped with a debug event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, String>", into = "IndexMap<String, String>")]
pub struct ExtendedAttributes {
    pub legacy_null_to_empty_string: bool,
    pub clamp: bool,
    pub enforce_range: bool,
    pub implemented_as: Option<String>,
    pub legacy_treat_non_object_as_null: bool,
}

impl ExtendedAttributes {
    pub fn with_clamp(mut self) -> Self {
        self.clamp = true;
        self
    }

    pub fn with_enforce_range(mut self) -> Self {
        self.enforce_range = true;
        self
    }

    pub fn with_legacy_null_to_empty_string(mut self) -> Self {
        self.legacy_null_to_empty_string = true;
        self
    }

    pub fn with_legacy_treat_non_object_as_null(mut self) -> Self {
        self.legacy_treat_non_object_as_null = true;
        self
    }

    pub fn with_implemented_as(mut self, name: impl Into<String>) -> Self {
        self.implemented_as = Some(name.into());
        self
    }
}

impl From<IndexMap<String, String>> for ExtendedAttributes {
    fn from(bag: IndexMap<String, String>) -> Self {
        let mut attributes = ExtendedAttributes::default();
        for (name, value) in bag {
            match extended_attributes::from_str(&name) {
                Some(ExtendedAttributeId::LegacyNullToEmptyString) => attributes.legacy_null_to_empty_string = true,
                Some(ExtendedAttributeId::Clamp) => attributes.clamp = true,
                Some(ExtendedAttributeId::EnforceRange) => attributes.enforce_range = true,
                Some(ExtendedAttributeId::ImplementedAs) => attributes.implemented_as = Some(value),
                Some(ExtendedAttributeId::LegacyTreatNonObjectAsNull) => {
                    attributes.legacy_treat_non_object_as_null = true
                }
                None => tracing::debug!(attribute = %name, "ignoring unrecognized extended attribute"),
            }
        }
        attributes
    }
}

impl From<ExtendedAttributes> for IndexMap<String, String> {
    fn from(attributes: ExtendedAttributes) -> Self {
        let mut bag = IndexMap::new();
        let flags = [
            (ExtendedAttributeId::LegacyNullToEmptyString, attributes.legacy_null_to_empty_string),
            (ExtendedAttributeId::Clamp, attributes.clamp),
            (ExtendedAttributeId::EnforceRange, attributes.enforce_range),
            (ExtendedAttributeId::LegacyTreatNonObjectAsNull, attributes.legacy_treat_non_object_as_null),
        ];
        for (id, set) in flags {
            if set {
                bag.insert(extended_attributes::as_str(id).to_string(), String::new());
            }
        }
        if let Some(name) = attributes.implemented_as {
            bag.insert(extended_attributes::as_str(ExtendedAttributeId::ImplementedAs).to_string(), name);
        }
        bag
    }
}

// ============================================================================
// Members
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub ty: Type,
    pub name: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub variadic: bool,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Parameter {
            ty,
            name: name.into(),
            optional: false,
            variadic: false,
            default_value: None,
            extended_attributes: ExtendedAttributes::default(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn with_default(mut self, literal: impl Into<String>) -> Self {
        self.optional = true;
        self.default_value = Some(literal.into());
        self
    }

    pub fn with_extended_attributes(mut self, attributes: ExtendedAttributes) -> Self {
        self.extended_attributes = attributes;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub ty: Type,
    pub name: String,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

impl Attribute {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Attribute {
            ty,
            name: name.into(),
            readonly: false,
            extended_attributes: ExtendedAttributes::default(),
        }
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }
}

/// An operation (regular or static).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub return_type: Type,
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

impl Function {
    pub fn new(name: impl Into<String>, return_type: Type, parameters: Vec<Parameter>) -> Self {
        Function {
            return_type,
            name: name.into(),
            parameters,
            extended_attributes: ExtendedAttributes::default(),
        }
    }

    /// Number of leading parameters that are neither optional nor variadic.
    pub fn shortest_length(&self) -> usize {
        shortest_length(&self.parameters)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constructor {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl Constructor {
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Constructor { parameters }
    }

    pub fn shortest_length(&self) -> usize {
        shortest_length(&self.parameters)
    }
}

fn shortest_length(parameters: &[Parameter]) -> usize {
    parameters.iter().take_while(|p| !p.optional && !p.variadic).count()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    #[serde(rename = "type")]
    pub ty: Type,
    pub name: String,
    pub value: String,
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryMember {
    #[serde(rename = "type")]
    pub ty: Type,
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

impl DictionaryMember {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        DictionaryMember {
            ty,
            name: name.into(),
            required: false,
            default_value: None,
            extended_attributes: ExtendedAttributes::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, literal: impl Into<String>) -> Self {
        self.default_value = Some(literal.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dictionary {
    #[serde(default)]
    pub parent_name: Option<String>,
    #[serde(default)]
    pub members: Vec<DictionaryMember>,
}

impl Dictionary {
    pub fn new(members: Vec<DictionaryMember>) -> Self {
        Dictionary {
            parent_name: None,
            members,
        }
    }

    pub fn inheriting(mut self, parent: impl Into<String>) -> Self {
        self.parent_name = Some(parent.into());
        self
    }
}

/// An enumeration: wire strings mapped to host identifiers, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Enumeration {
    members: IndexMap<String, String>,
}

impl Enumeration {
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = values
            .into_iter()
            .map(|value| {
                let wire = value.into();
                let host = host_identifier(&wire);
                (wire, host)
            })
            .collect();
        Enumeration { members }
    }

    /// Wire string to host identifier, in declaration order.
    pub fn members(&self) -> &IndexMap<String, String> {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The implicit default: the first declared member.
    pub fn first_member(&self) -> Option<(&str, &str)> {
        self.members.first().map(|(wire, host)| (wire.as_str(), host.as_str()))
    }

    pub fn host_identifier_for(&self, wire: &str) -> Option<&str> {
        self.members.get(wire).map(String::as_str)
    }

    pub fn wire_string_for(&self, host: &str) -> Option<&str> {
        self.members.iter().find(|(_, h)| h.as_str() == host).map(|(wire, _)| wire.as_str())
    }
}

impl From<Vec<String>> for Enumeration {
    fn from(values: Vec<String>) -> Self {
        Enumeration::from_values(values)
    }
}

impl From<Enumeration> for Vec<String> {
    fn from(enumeration: Enumeration) -> Self {
        enumeration.members.into_keys().collect()
    }
}

/// Turn a wire string into an UpperCamelCase identifier (`"no-referrer"` -> `NoReferrer`, `""` -> `Empty`).
fn host_identifier(wire: &str) -> String {
    let mut identifier = String::new();
    for part in wire.split(|c: char| !c.is_ascii_alphanumeric()).filter(|p| !p.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            identifier.push(first.to_ascii_uppercase());
            identifier.push_str(chars.as_str());
        }
    }
    if identifier.is_empty() {
        return "Empty".to_string();
    }
    if identifier.starts_with(|c: char| c.is_ascii_digit()) {
        identifier.insert(0, '_');
    }
    identifier
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackFunction {
    pub return_type: Type,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub is_legacy_treat_non_object_as_null: bool,
}

// ============================================================================
// Interface
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    #[serde(default)]
    pub parent_name: Option<String>,
    /// Location of the implementation module, e.g. `src/web/DOM/Document`.
    #[serde(default)]
    pub module_path: String,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub static_attributes: Vec<Attribute>,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub static_functions: Vec<Function>,
    #[serde(default)]
    pub constructors: Vec<Constructor>,
    #[serde(default)]
    pub constants: Vec<Constant>,
    #[serde(default)]
    pub dictionaries: IndexMap<String, Dictionary>,
    #[serde(default)]
    pub enumerations: IndexMap<String, Enumeration>,
    #[serde(default)]
    pub callback_functions: IndexMap<String, CallbackFunction>,
    #[serde(default)]
    pub imported_interfaces: Vec<Interface>,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Interface {
            name: name.into(),
            ..Interface::default()
        }
    }

    /// Name of the host implementation type (`[ImplementedAs]` wins over the IDL name).
    pub fn implemented_name(&self) -> &str {
        self.extended_attributes.implemented_as.as_deref().unwrap_or(&self.name)
    }

    pub fn prototype_class(&self) -> String {
        format!("{}Prototype", self.name)
    }

    pub fn constructor_class(&self) -> String {
        format!("{}Constructor", self.name)
    }

    /// This interface followed by every transitively imported interface, breadth-first, each name once.
    pub fn transitive_imports(&self) -> Vec<&Interface> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        let mut queue = VecDeque::from([self]);
        while let Some(interface) = queue.pop_front() {
            if !seen.insert(interface.name.as_str()) {
                continue;
            }
            ordered.push(interface);
            queue.extend(interface.imported_interfaces.iter());
        }
        ordered
    }

    pub fn dictionary(&self, name: &str) -> Option<&Dictionary> {
        self.transitive_imports()
            .into_iter()
            .find_map(|interface| interface.dictionaries.get(name))
    }

    pub fn enumeration(&self, name: &str) -> Option<&Enumeration> {
        self.transitive_imports()
            .into_iter()
            .find_map(|interface| interface.enumerations.get(name))
    }

    pub fn callback_function(&self, name: &str) -> Option<&CallbackFunction> {
        self.transitive_imports()
            .into_iter()
            .find_map(|interface| interface.callback_functions.get(name))
    }

    pub fn is_dictionary(&self, name: &str) -> bool {
        self.dictionary(name).is_some()
    }

    pub fn is_enumeration(&self, name: &str) -> bool {
        self.enumeration(name).is_some()
    }

    pub fn is_callback_function(&self, name: &str) -> bool {
        self.callback_function(name).is_some()
    }

    /// The inheritance chain of a dictionary, most-derived first.
    ///
    /// ## Errors
    /// - [`ModelError::UnknownDictionary`] if `name` or any ancestor is not declared.
    /// - [`ModelError::CyclicDictionary`] if the chain revisits a dictionary.
    pub fn dictionary_chain<'a>(&'a self, name: &'a str) -> Result<Vec<(&'a str, &'a Dictionary)>, ModelError> {
        let mut chain: Vec<(&'a str, &'a Dictionary)> = Vec::new();
        let mut current = Some(name);
        while let Some(dictionary_name) = current {
            if chain.iter().any(|(seen, _)| *seen == dictionary_name) {
                return Err(ModelError::CyclicDictionary {
                    name: dictionary_name.to_string(),
                });
            }
            let dictionary = self.dictionary(dictionary_name).ok_or_else(|| ModelError::UnknownDictionary {
                name: dictionary_name.to_string(),
                interface: self.name.clone(),
            })?;
            chain.push((dictionary_name, dictionary));
            current = dictionary.parent_name.as_deref();
        }
        Ok(chain)
    }

    /// Regular operations grouped by name, in first-declaration order.
    pub fn overload_sets(&self) -> IndexMap<&str, Vec<&Function>> {
        group_by_name(&self.functions)
    }

    /// Static operations grouped by name, in first-declaration order.
    pub fn static_overload_sets(&self) -> IndexMap<&str, Vec<&Function>> {
        group_by_name(&self.static_functions)
    }
}

fn group_by_name(functions: &[Function]) -> IndexMap<&str, Vec<&Function>> {
    let mut sets: IndexMap<&str, Vec<&Function>> = IndexMap::new();
    for function in functions {
        sets.entry(function.name.as_str()).or_default().push(function);
    }
    sets
}
