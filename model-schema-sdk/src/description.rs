/*
 * Copyright Cedar Contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use smol_str::SmolStr;
use std::collections::HashMap;
use std::path::Path;

use super::data::{Instance, ModelOutput, OutputShape};
use super::deserializer;
use super::err::{DeserializationError, ValidationError};
use super::parser::json_parser::JsonParser;
use super::validation;

/// The type a `FieldDeclaration` can take
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Null,
    /// One of a fixed set of string literals. Generated grammars accept each
    /// variant in its canonical JSON spelling only (see `json_string_literal`).
    Enum {
        variants: Vec<SmolStr>,
    },
    /// The inner type, or `null`
    Optional(Box<FieldType>),
    List(Box<FieldType>),
    Union(Vec<FieldType>),
    /// A nested model declared inline
    Model(Box<ModelDeclaration>),
    /// A model declared elsewhere (a top-level model or a definition)
    Ref(SmolStr),
    /// No usable type information was given
    Unknown,
}

impl FieldType {
    /// Create an `Enum` type from its variants
    pub fn enumeration<S: Into<SmolStr>>(variants: impl IntoIterator<Item = S>) -> Self {
        Self::Enum {
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn optional(inner: FieldType) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn list(element: FieldType) -> Self {
        Self::List(Box::new(element))
    }

    pub fn model(model: ModelDeclaration) -> Self {
        Self::Model(Box::new(model))
    }

    pub fn reference(name: impl Into<SmolStr>) -> Self {
        Self::Ref(name.into())
    }

    /// Returns if this type is written as a single terminal in a grammar
    /// (i.e., it never needs an auxiliary rule of its own)
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::String | Self::Integer | Self::Number | Self::Boolean | Self::Null
        )
    }
}

/// A single named field of a `ModelDeclaration`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    pub(crate) name: SmolStr,
    pub(crate) description: Option<String>,
    pub(crate) required: bool,
    pub(crate) field_type: FieldType,
}

impl FieldDeclaration {
    pub fn new(
        name: impl Into<SmolStr>,
        required: bool,
        field_type: FieldType,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            required,
            field_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A field that is not required may be left out of the output object
    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }
}

/// A structured output: a named record of ordered fields
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDeclaration {
    pub(crate) name: SmolStr,
    pub(crate) description: Option<String>,
    pub(crate) fields: Vec<FieldDeclaration>,
    pub(crate) definitions: Vec<ModelDeclaration>,
}

impl ModelDeclaration {
    pub fn new(
        name: impl Into<SmolStr>,
        fields: Vec<FieldDeclaration>,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            fields,
            definitions: Vec::new(),
        }
    }

    /// Attach the supporting models that `Ref` fields of this model may point to
    pub fn with_definitions(mut self, definitions: Vec<ModelDeclaration>) -> Self {
        self.definitions = definitions;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDeclaration> {
        self.fields.iter()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDeclaration> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ModelDeclaration> {
        self.definitions.iter()
    }

    /// Every model this declaration depends on, depth-first in declaration order:
    /// inline nested models in field order first, then definitions (each
    /// followed by the models it depends on in turn). `Ref`s are not
    /// followed, so a model may appear more than once if it is both nested
    /// inline and declared as a definition.
    pub fn referenced_models(&self) -> Vec<&ModelDeclaration> {
        let mut found = Vec::new();
        self.collect_referenced(&mut found);
        found
    }

    fn collect_referenced<'a>(&'a self, found: &mut Vec<&'a ModelDeclaration>) {
        for field in &self.fields {
            collect_inline(&field.field_type, found);
        }
        for definition in &self.definitions {
            found.push(definition);
            definition.collect_referenced(found);
        }
    }

    /// Find this model or one it depends on by name
    pub fn lookup(&self, name: &str) -> Option<&ModelDeclaration> {
        if self.name == name {
            return Some(self);
        }
        self.referenced_models()
            .into_iter()
            .find(|model| model.name == name)
    }

    /// Check a JSON object against this model, resolving references among the
    /// models this declaration carries with it
    pub fn validate_json_str(&self, json_str: &str) -> Result<Instance, ValidationError> {
        let value = JsonParser::parse_document(json_str)?;
        let index = model_index(std::iter::once(self));
        validation::validate_instance(self, &value, &index)
    }
}

fn collect_inline<'a>(field_type: &'a FieldType, found: &mut Vec<&'a ModelDeclaration>) {
    match field_type {
        FieldType::Model(model) => {
            found.push(model);
            model.collect_referenced(found);
        }
        FieldType::Optional(inner) | FieldType::List(inner) => collect_inline(inner, found),
        FieldType::Union(members) => {
            for member in members {
                collect_inline(member, found);
            }
        }
        FieldType::String
        | FieldType::Integer
        | FieldType::Number
        | FieldType::Boolean
        | FieldType::Null
        | FieldType::Enum { .. }
        | FieldType::Ref(_)
        | FieldType::Unknown => (),
    }
}

/// Map every model reachable from `roots` by name. The first declaration of a
/// name wins.
pub(crate) fn model_index<'a>(
    roots: impl Iterator<Item = &'a ModelDeclaration>,
) -> HashMap<&'a str, &'a ModelDeclaration> {
    let mut index = HashMap::new();
    let roots: Vec<_> = roots.collect();
    // Top-level names shadow nested ones
    for &model in &roots {
        index.entry(model.name()).or_insert(model);
    }
    for model in roots {
        for nested in model.referenced_models() {
            index.entry(nested.name()).or_insert(nested);
        }
    }
    index
}

/// An ordered collection of top-level Model Declarations,
/// e.g., the functions a model may call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSet {
    models: Vec<ModelDeclaration>,
}

impl ModelSet {
    pub fn new(models: Vec<ModelDeclaration>) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &[ModelDeclaration] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Find a top-level model, or a nested model or definition of one, by name.
    /// Top-level models take precedence.
    pub fn lookup(&self, name: &str) -> Option<&ModelDeclaration> {
        self.models
            .iter()
            .find(|model| model.name() == name)
            .or_else(|| {
                self.models
                    .iter()
                    .flat_map(ModelDeclaration::referenced_models)
                    .find(|model| model.name() == name)
            })
    }

    /// Deserialize function definitions, OpenAI style tools or JSON Schema models
    /// (singly, as an array, or as a `tools` list) into a `ModelSet`
    pub fn from_json_str(json_str: &str) -> Result<Self, DeserializationError> {
        deserializer::model_set_from_json_value(JsonParser::parse_document(json_str)?)
    }

    /// Read and deserialize a JSON file, see `from_json_str`
    pub fn from_json_file<P: AsRef<Path>>(json_file: P) -> Result<Self, DeserializationError> {
        let contents = std::fs::read_to_string(json_file.as_ref()).map_err(|e| {
            DeserializationError::read_error(json_file.as_ref().into(), format!("{e}"))
        })?;
        Self::from_json_str(&contents)
    }

    /// Validate a generated output (as JSON text) against this set of models
    /// and split it into the selected models and their typed instances
    pub fn decode_output(
        &self,
        text: &str,
        shape: &OutputShape,
    ) -> Result<Vec<ModelOutput>, ValidationError> {
        let value = JsonParser::parse_document(text)?;
        validation::decode_output(self, &value, shape)
    }
}

impl FromIterator<ModelDeclaration> for ModelSet {
    fn from_iter<T: IntoIterator<Item = ModelDeclaration>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ModelSet {
    type Item = &'a ModelDeclaration;
    type IntoIter = std::slice::Iter<'a, ModelDeclaration>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::err::ContentType;
    use cool_asserts::assert_matches;

    fn address() -> ModelDeclaration {
        ModelDeclaration::new(
            "Address",
            vec![FieldDeclaration::new("city", true, FieldType::String, None)],
            None,
        )
    }

    fn person() -> ModelDeclaration {
        ModelDeclaration::new(
            "Person",
            vec![
                FieldDeclaration::new(
                    "name",
                    true,
                    FieldType::String,
                    Some("Full name".to_string()),
                ),
                FieldDeclaration::new("home", false, FieldType::model(address()), None),
                FieldDeclaration::new("pet", false, FieldType::reference("Pet"), None),
            ],
            Some("A person".to_string()),
        )
        .with_definitions(vec![ModelDeclaration::new(
            "Pet",
            vec![FieldDeclaration::new(
                "kind",
                true,
                FieldType::enumeration(["cat", "dog"]),
                None,
            )],
            None,
        )])
    }

    #[test]
    fn test_field_declaration() {
        let field = FieldDeclaration::new(
            "count",
            true,
            FieldType::Integer,
            Some("How many".to_string()),
        );
        assert_eq!(field.name(), "count");
        assert!(field.is_required());
        assert_matches!(field.field_type(), FieldType::Integer);
        assert_matches!(field.description(), Some("How many"));
    }

    #[test]
    fn test_model_accessors() {
        let model = person();
        assert_eq!(model.name(), "Person");
        assert_matches!(model.description(), Some("A person"));
        assert_eq!(
            model.fields().map(FieldDeclaration::name).collect::<Vec<_>>(),
            ["name", "home", "pet"]
        );
        assert_matches!(model.field("home"), Some(f) if !f.is_required());
        assert_matches!(model.field("missing"), None);
    }

    #[test]
    fn test_referenced_models_order() {
        let model = person();
        assert_eq!(
            model
                .referenced_models()
                .into_iter()
                .map(ModelDeclaration::name)
                .collect::<Vec<_>>(),
            ["Address", "Pet"]
        );
    }

    #[test]
    fn test_referenced_models_through_wrappers() {
        let model = ModelDeclaration::new(
            "Outer",
            vec![FieldDeclaration::new(
                "items",
                true,
                FieldType::list(FieldType::optional(FieldType::Union(vec![
                    FieldType::Integer,
                    FieldType::model(address()),
                ]))),
                None,
            )],
            None,
        );
        assert_matches!(
            model.referenced_models().as_slice(),
            [m] if m.name() == "Address"
        );
    }

    #[test]
    fn test_lookup() {
        let model = person();
        assert_matches!(model.lookup("Person"), Some(m) if m.name() == "Person");
        assert_matches!(model.lookup("Pet"), Some(m) if m.name() == "Pet");
        assert_matches!(model.lookup("Address"), Some(_));
        assert_matches!(model.lookup("Nope"), None);

        let set = ModelSet::new(vec![person(), address()]);
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert_matches!(set.lookup("Pet"), Some(m) if m.name() == "Pet");
        assert_matches!(set.lookup("Address"), Some(m) if m.fields().count() == 1);
    }

    #[test]
    fn test_model_index_prefers_top_level() {
        let shadow = ModelDeclaration::new("Address", Vec::new(), None);
        let models = [person(), shadow];
        let index = model_index(models.iter());
        assert_matches!(index.get("Address"), Some(m) if m.fields().count() == 0);
        assert_matches!(index.get("Pet"), Some(_));
    }

    #[test]
    fn test_from_json_str_function() {
        let set = ModelSet::from_json_str(
            r#"{
                "name": "get_current_weather",
                "description": "Get the current weather in a given location",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "location": {"type": "string", "description": "The city and state"},
                        "unit": {"type": "string", "enum": ["celsius", "fahrenheit"]}
                    },
                    "required": ["location"]
                }
            }"#,
        )
        .unwrap();
        let model = set.models().first().unwrap();
        assert_eq!(model.name(), "get_current_weather");
        assert_matches!(model.field("location"), Some(f) if f.is_required());
        assert_matches!(
            model.field("unit").map(FieldDeclaration::field_type),
            Some(FieldType::Enum { variants }) if variants == &["celsius", "fahrenheit"]
        );
    }

    #[test]
    fn test_from_json_str_reports_location() {
        let err = ModelSet::from_json_str(r#"{"name": 7, "parameters": {}}"#).unwrap_err();
        assert_matches!(
            err,
            DeserializationError::UnexpectedType(found)
                if found.content_type() == ContentType::FunctionDefinition
        );
    }

    #[test]
    fn test_from_json_file_missing() {
        assert_matches!(
            ModelSet::from_json_file("/definitely/not/a/file.json"),
            Err(DeserializationError::ReadError(..))
        );
    }

    #[test]
    fn test_validate_json_str_resolves_definitions() {
        let instance = person()
            .validate_json_str(r#"{"name": "Ada", "pet": {"kind": "cat"}}"#)
            .unwrap();
        assert_eq!(instance.model(), "Person");
        assert_eq!(instance.to_string(), r#"{"name":"Ada","pet":{"kind":"cat"}}"#);
    }
}
