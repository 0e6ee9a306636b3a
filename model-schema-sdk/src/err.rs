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

use super::parser::{json_value::LocatedValue, loc::Loc};
use miette::Diagnostic;
use smol_str::SmolStr;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a JSON document into Model Declarations
#[derive(Error, Debug, Diagnostic)]
pub enum DeserializationError {
    /// The input is not valid JSON
    #[error(transparent)]
    #[diagnostic(transparent)]
    ParseError(#[from] super::parser::err::ParseError),

    /// A JSON value has the wrong JSON type
    #[error("Encountered unexpected JSON type while deserializing {}.", .0.content_type)]
    #[diagnostic(transparent)]
    UnexpectedType(LocationFound),

    /// An object lacks an attribute that must be present
    #[error(transparent)]
    #[diagnostic(transparent)]
    MissingExpectedAttribute(MissingExpectedAttributeError),

    /// A JSON value has the right type but a value that is not allowed
    #[error("Unexpected value while deserializing {}.", .0.content_type)]
    #[diagnostic(transparent)]
    UnexpectedValue(LocationFound),

    /// The input file could not be read
    #[error("Error reading {}: {}", .0.file_name.display(), .0.error)]
    #[diagnostic(code(deserialization::read_error))]
    ReadError(ReadError),

    /// Definitions that only alias one another and never bottom out in a type
    #[error("Non well-founded type definitions: {}", .0.cycle.join(" -> "))]
    #[diagnostic(
        code(deserialization::non_well_founded_type_definitions),
        help("Ensure that every chain of `$ref`s between definitions ends in a concrete type")
    )]
    NonWellFoundedTypeDefinitions(TypeDefinitionCycle),
}

impl DeserializationError {
    pub(crate) fn unexpected_type(
        json_value: &LocatedValue,
        msg: &str,
        content_type: ContentType,
    ) -> Self {
        Self::UnexpectedType(LocationFound {
            src: json_value.as_loc().clone(),
            label: format!("Found {}", json_value.type_name()),
            msg: msg.to_string(),
            code: "deserialization::unexpected_type",
            content_type,
        })
    }

    pub(crate) fn missing_attribute(
        json_value: &LocatedValue,
        expected_key: &str,
        aliases: Vec<String>,
    ) -> Self {
        let existing_keys = json_value.get_object().map_or(Vec::new(), |obj| {
            obj.keys().map(|key| key.as_loc().into()).collect()
        });
        Self::MissingExpectedAttribute(MissingExpectedAttributeError {
            loc: json_value.as_loc().clone(),
            expected_key: expected_key.to_string(),
            aliases,
            existing_keys,
        })
    }

    pub(crate) fn unexpected_value(
        json_value: &LocatedValue,
        msg: &str,
        content_type: ContentType,
    ) -> Self {
        Self::UnexpectedValue(LocationFound {
            src: json_value.as_loc().clone(),
            label: "Found".to_string(),
            msg: msg.to_string(),
            code: "deserialization::unexpected_value",
            content_type,
        })
    }

    pub(crate) fn read_error(file_name: PathBuf, error: String) -> Self {
        Self::ReadError(ReadError { file_name, error })
    }

    pub(crate) fn type_definition_cycle(cycle: Vec<SmolStr>) -> Self {
        Self::NonWellFoundedTypeDefinitions(TypeDefinitionCycle { cycle })
    }
}

/// An object that lacks a required attribute
#[derive(Error, Debug)]
#[error("Missing expected attribute `{expected_key}`.")]
pub struct MissingExpectedAttributeError {
    loc: Loc,
    expected_key: String,
    aliases: Vec<String>,
    existing_keys: Vec<miette::SourceSpan>,
}

impl Diagnostic for MissingExpectedAttributeError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new("deserialization::missing_attribute"))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.loc)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        if self.existing_keys.is_empty() {
            Some(Box::new(std::iter::once(miette::LabeledSpan::new(
                Some("Object without attributes".into()),
                self.loc.start(),
                self.loc.end() - self.loc.start(),
            ))))
        } else {
            Some(Box::new(self.existing_keys.iter().map(|span| {
                miette::LabeledSpan::new(Some("Existing key".into()), span.offset(), span.len())
            })))
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let aliases = if self.aliases.is_empty() {
            String::new()
        } else {
            format!(" (or `{}`)", self.aliases.join("`, `"))
        };
        Some(Box::new(format!(
            "Expected key `{}`{aliases}",
            self.expected_key
        )))
    }
}

/// A problem tied to one JSON value of the input
#[derive(Debug, Error)]
#[error("Problem found.")]
pub struct LocationFound {
    src: Loc,
    label: String,
    msg: String,
    code: &'static str,
    content_type: ContentType,
}

impl LocationFound {
    /// The part of the input the problem was found in
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }
}

impl Diagnostic for LocationFound {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(miette::LabeledSpan::new(
            Some(self.label.clone()),
            self.src.start(),
            self.src.end() - self.src.start(),
        ))))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(&self.msg))
    }
}

/// Which kind of document (or part of one) was being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    ModelSet,
    FunctionDefinition,
    ModelSchema,
    Field,
    FieldType,
    TypeDefinitions,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModelSet => write!(f, "a list of model declarations"),
            Self::FunctionDefinition => write!(f, "a function definition"),
            Self::ModelSchema => write!(f, "a JSON Schema model"),
            Self::Field => write!(f, "a JSON Schema property"),
            Self::FieldType => write!(f, "a JSON Schema property type"),
            Self::TypeDefinitions => write!(f, "JSON Schema `$defs`"),
        }
    }
}

#[derive(Debug)]
pub struct ReadError {
    file_name: PathBuf,
    error: String,
}

#[derive(Debug)]
pub struct TypeDefinitionCycle {
    cycle: Vec<SmolStr>,
}

/// Errors raised while checking a generated output against Model Declarations
#[derive(Error, Debug, Diagnostic)]
pub enum ValidationError {
    /// The output is not valid JSON
    #[error(transparent)]
    #[diagnostic(transparent)]
    ParseError(#[from] super::parser::err::ParseError),

    #[error("No model named `{name}` is declared.")]
    #[diagnostic(
        code(validation::unknown_model),
        help("The selector must name one of the declared models")
    )]
    UnknownModel { name: SmolStr },

    #[error("Output object is missing the `{key}` attribute.")]
    #[diagnostic(
        code(validation::missing_attribute),
        help("Wrapped outputs carry both the model selector and the model content")
    )]
    MissingWrapperAttribute { key: SmolStr },

    #[error("Expected a JSON array of outputs but found {found}.")]
    #[diagnostic(
        code(validation::expected_array),
        help("A list of outputs is a JSON array of one or more outputs")
    )]
    ExpectedArray { found: &'static str },

    #[error("The list of outputs is empty.")]
    #[diagnostic(
        code(validation::empty_output_list),
        help("A list of outputs must contain at least one output")
    )]
    EmptyOutputList,

    #[error("Model `{model}` is missing required field `{field}`.")]
    #[diagnostic(
        code(validation::missing_required_field),
        help("Ensure all required fields are provided")
    )]
    MissingRequiredField { model: SmolStr, field: SmolStr },

    #[error("Unexpected field `{field}` on model `{model}`.")]
    #[diagnostic(
        code(validation::unexpected_field),
        help("Ensure you only include declared fields")
    )]
    UnexpectedField { model: SmolStr, field: SmolStr },

    #[error("Invalid integer literal: {literal}")]
    #[diagnostic(
        code(validation::invalid_integer_literal),
        help("Ensure integer literal is a valid 64-bit integer")
    )]
    InvalidIntegerLiteral { literal: String },

    #[error("Invalid enum variant: {literal}")]
    #[diagnostic(
        code(validation::invalid_enum_variant),
        help("Ensure string value is one of the allowed values")
    )]
    InvalidEnumVariant { literal: String },

    #[error("Could not match value to any member of the union type")]
    #[diagnostic(
        code(validation::invalid_value_for_union_type),
        help("Ensure the value matches one of the types within the union")
    )]
    InvalidValueForUnionType,

    #[error("Expected {expected} but found {found}.")]
    #[diagnostic(
        code(validation::invalid_value_for_type),
        help("Ensure the value matches the declared field type")
    )]
    InvalidValueForType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Field type has no usable type information.")]
    #[diagnostic(
        code(validation::unsupported_type),
        help("Fields of unknown type cannot be produced by a generated grammar")
    )]
    UnsupportedType,

    #[error("The output does not match any declared model: {}", .errors.join("; "))]
    #[diagnostic(code(validation::no_matching_model))]
    NoMatchingModel { errors: Vec<String> },
}

impl ValidationError {
    pub(crate) fn unknown_model(name: &str) -> Self {
        Self::UnknownModel { name: name.into() }
    }

    pub(crate) fn missing_wrapper_attribute(key: &str) -> Self {
        Self::MissingWrapperAttribute { key: key.into() }
    }

    pub(crate) fn expected_array(found: &LocatedValue) -> Self {
        Self::ExpectedArray {
            found: found.type_name(),
        }
    }

    pub(crate) fn missing_required_field(model: &str, field: &str) -> Self {
        Self::MissingRequiredField {
            model: model.into(),
            field: field.into(),
        }
    }

    pub(crate) fn unexpected_field(model: &str, field: &str) -> Self {
        Self::UnexpectedField {
            model: model.into(),
            field: field.into(),
        }
    }

    pub(crate) fn invalid_integer_literal(literal: &str) -> Self {
        Self::InvalidIntegerLiteral {
            literal: literal.to_string(),
        }
    }

    pub(crate) fn invalid_enum_variant(literal: &str) -> Self {
        Self::InvalidEnumVariant {
            literal: literal.to_string(),
        }
    }

    pub(crate) fn invalid_value_for_type(expected: &'static str, found: &LocatedValue) -> Self {
        Self::InvalidValueForType {
            expected,
            found: found.type_name(),
        }
    }

    pub(crate) fn no_matching_model(errors: &[ValidationError]) -> Self {
        Self::NoMatchingModel {
            errors: errors.iter().map(ToString::to_string).collect(),
        }
    }
}
