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

//! Plain text documentation of the outputs a generated grammar accepts,
//! meant to be embedded in a system prompt.
//!
//! ```text
//! Output Model: Calculator
//!   Description: Perform a math operation on two numbers.
//!   Output Fields:
//!     number_one (number, required):
//!     operation (enum, required):
//!       Allowed values: "add", "subtract", "multiply", "divide"
//!     number_two (number, required):
//! ```

use itertools::Itertools;
use model_schema_sdk::data::json_string_literal;
use model_schema_sdk::description::{FieldDeclaration, FieldType, ModelDeclaration};

use super::config::GrammarGeneratorConfig;
use super::index::ModelIndex;

const SUPPORTING_MODELS_HEADER: &str = "The following models are used within the fields above:";

pub(super) fn document(config: &GrammarGeneratorConfig, index: &ModelIndex<'_>) -> String {
    let mut blocks = Vec::new();
    if let Some(header) = shape_header(config) {
        blocks.push(header);
    }
    for model in index.top_level() {
        blocks.push(model_block(config, model));
    }
    if !index.supporting().is_empty() {
        blocks.push(SUPPORTING_MODELS_HEADER.to_string());
        for model in index.supporting() {
            blocks.push(model_block(config, model));
        }
    }
    blocks.join("\n\n")
}

/// How outputs are wrapped, if they are
fn shape_header(config: &GrammarGeneratorConfig) -> Option<String> {
    let wrapper = config.outer_object_name.as_ref().map(|outer| {
        format!(
            "with a {} key naming one of the {} entries below and a {} key holding its {}",
            json_string_literal(outer),
            config.model_prefix,
            json_string_literal(&config.outer_object_content),
            config.fields_prefix,
        )
    });
    match (wrapper, config.list_of_outputs) {
        (None, false) => None,
        (Some(wrapper), false) => Some(format!("Output a JSON object {wrapper}.")),
        (None, true) => Some(format!(
            "Output a JSON array of one or more JSON objects, each matching one of the {} entries below.",
            config.model_prefix
        )),
        (Some(wrapper), true) => Some(format!(
            "Output a JSON array of one or more JSON objects, each {wrapper}."
        )),
    }
}

fn model_block(config: &GrammarGeneratorConfig, model: &ModelDeclaration) -> String {
    let mut lines = vec![format!("{}: {}", config.model_prefix, model.name())];
    if let Some(description) = model.description().and_then(flatten_description) {
        lines.push(format!("  Description: {description}"));
    }
    let mut fields = model.fields().peekable();
    if fields.peek().is_none() {
        lines.push(format!("  {}: none", config.fields_prefix));
    } else {
        lines.push(format!("  {}:", config.fields_prefix));
        for field in fields {
            field_lines(config, field, &mut lines);
        }
    }
    lines.join("\n")
}

fn field_lines(config: &GrammarGeneratorConfig, field: &FieldDeclaration, lines: &mut Vec<String>) {
    let presence = if field.is_required() {
        "required"
    } else {
        "optional"
    };
    lines.push(format!(
        "    {} ({}, {presence}):",
        field.name(),
        type_label(field.field_type())
    ));
    if config.field_descriptions {
        if let Some(description) = field.description().and_then(flatten_description) {
            lines.push(format!("      Description: {description}"));
        }
    }
    if let Some(variants) = enum_variants(field.field_type()) {
        lines.push(format!(
            "      Allowed values: {}",
            variants.iter().map(|v| json_string_literal(v)).join(", ")
        ));
    }
}

/// Collapse a possibly multi-line, indented description onto one line
fn flatten_description(description: &str) -> Option<String> {
    let flat = description
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .join(" ");
    (!flat.is_empty()).then_some(flat)
}

fn type_label(field_type: &FieldType) -> String {
    match field_type {
        FieldType::String => "string".to_string(),
        FieldType::Integer => "integer".to_string(),
        FieldType::Number => "number".to_string(),
        FieldType::Boolean => "boolean".to_string(),
        FieldType::Null => "null".to_string(),
        FieldType::Enum { .. } => "enum".to_string(),
        FieldType::Optional(inner) => format!("{} or null", type_label(inner)),
        FieldType::List(element) => format!("list of {}", type_label(element)),
        FieldType::Union(members) => members.iter().map(type_label).join(" or "),
        FieldType::Model(model) => model.name().to_string(),
        FieldType::Ref(name) => name.to_string(),
        FieldType::Unknown => "any".to_string(),
    }
}

/// Enum variants of a field, looking through optionals and lists
fn enum_variants(field_type: &FieldType) -> Option<&[smol_str::SmolStr]> {
    match field_type {
        FieldType::Enum { variants } => Some(variants),
        FieldType::Optional(inner) | FieldType::List(inner) => enum_variants(inner),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use smol_str::SmolStr;

    fn book() -> ModelDeclaration {
        let category = FieldType::enumeration(["Fiction", "Non-Fiction"]);
        ModelDeclaration::new(
            "Book",
            vec![
                FieldDeclaration::new(
                    "title",
                    true,
                    FieldType::String,
                    Some("Title of the book.".into()),
                ),
                FieldDeclaration::new(
                    "published_year",
                    false,
                    FieldType::optional(FieldType::Integer),
                    Some("Year the book was published.".into()),
                ),
                FieldDeclaration::new("keywords", true, FieldType::list(FieldType::String), None),
                FieldDeclaration::new("category", true, category, None),
                FieldDeclaration::new(
                    "author",
                    true,
                    FieldType::model(ModelDeclaration::new(
                        "Author",
                        vec![FieldDeclaration::new("name", true, FieldType::String, None)],
                        Some("\n    The person who wrote\n    the book.\n    ".into()),
                    )),
                    None,
                ),
            ],
            Some("Represents an entry about a book.".into()),
        )
    }

    fn document_models(config: &GrammarGeneratorConfig, models: &[ModelDeclaration]) -> String {
        let index = ModelIndex::new(models).unwrap();
        document(config, &index)
    }

    #[test]
    fn documents_models_and_supporting_models() {
        let docs = document_models(&GrammarGeneratorConfig::default(), &[book()]);
        let expected = r#"Output Model: Book
  Description: Represents an entry about a book.
  Output Fields:
    title (string, required):
      Description: Title of the book.
    published_year (integer or null, optional):
      Description: Year the book was published.
    keywords (list of string, required):
    category (enum, required):
      Allowed values: "Fiction", "Non-Fiction"
    author (Author, required):

The following models are used within the fields above:

Output Model: Author
  Description: The person who wrote the book.
  Output Fields:
    name (string, required):"#;
        assert_eq!(docs, expected);
    }

    #[test]
    fn custom_prefixes_without_field_descriptions() {
        let config = GrammarGeneratorConfig::default()
            .model_prefix("Function")
            .fields_prefix("Parameters")
            .field_descriptions(false);
        let docs = document_models(&config, &[book()]);
        assert!(docs.starts_with("Function: Book\n"));
        assert!(docs.contains("  Parameters:\n    title (string, required):\n    published_year"));
        assert!(!docs.contains("Title of the book."));
        assert!(docs.contains("Represents an entry about a book."));
    }

    #[test]
    fn models_without_fields() {
        let models = [ModelDeclaration::new("get_current_datetime", vec![], None)];
        let docs = document_models(&GrammarGeneratorConfig::default(), &models);
        assert_eq!(docs, "Output Model: get_current_datetime\n  Output Fields: none");
    }

    #[test]
    fn shape_headers() {
        let models = [ModelDeclaration::new("noop", vec![], None)];
        let wrapped = GrammarGeneratorConfig::default().outer_object_name(Some("function".into()));
        assert!(document_models(&wrapped, &models).starts_with(
            "Output a JSON object with a \"function\" key naming one of the Output Model entries below and a \"params\" key holding its Output Fields.\n\n"
        ));
        let listed = GrammarGeneratorConfig::default().list_of_outputs(true);
        let documentation = document_models(&listed, &models);
        assert!(documentation
            .starts_with("Output a JSON array of one or more JSON objects, each matching"));
        let both = wrapped.list_of_outputs(true);
        let documentation = document_models(&both, &models);
        assert!(documentation.starts_with(
            "Output a JSON array of one or more JSON objects, each with a \"function\" key"
        ));
    }

    #[test]
    fn type_labels() {
        assert_eq!(
            type_label(&FieldType::Union(vec![FieldType::Integer, FieldType::Number])),
            "integer or number"
        );
        assert_eq!(
            type_label(&FieldType::optional(FieldType::list(FieldType::reference("Pet")))),
            "list of Pet or null"
        );
        assert_eq!(
            enum_variants(&FieldType::list(FieldType::enumeration(["a"]))),
            Some(&[SmolStr::new("a")][..])
        );
    }
}
