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

use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

use crate::gbnf::err::RuleSetError;

#[derive(Debug, Error, Diagnostic)]
pub enum GrammarGeneratorError {
    /// The generator was given nothing to generate a grammar for
    #[error("No model declarations provided.")]
    #[diagnostic(
        code(grammar_generator::no_models),
        help("Provide at least one model declaration to generate a grammar from.")
    )]
    NoModels,
    /// A field's type has no grammar production
    #[error("Unsupported type for field `{field}` of model `{model}`: {reason}.")]
    #[diagnostic(
        code(grammar_generator::unsupported_type),
        help("Field types must be strings, numbers, integers, booleans, null, non-empty string enums, lists, optionals, non-empty unions or models.")
    )]
    UnsupportedType {
        model: SmolStr,
        field: SmolStr,
        reason: String,
    },
    /// Two producers want the same rule name
    #[error("Rule name `{name}` is produced by both {first} and {second}.")]
    #[diagnostic(
        code(grammar_generator::name_collision),
        help("Rename one of the declarations so that their rule names differ. Rule names are the lowercase kebab case form of the declared names.")
    )]
    NameCollision {
        name: SmolStr,
        first: String,
        second: String,
    },
    /// A field references a model that was not declared
    #[error("Undefined model `{name}` referenced by model `{referenced_by}`.")]
    #[diagnostic(
        code(grammar_generator::undefined_model),
        help("Ensure that every referenced model is declared at the top level or as a definition of a declared model.")
    )]
    UndefinedModel {
        name: SmolStr,
        referenced_by: SmolStr,
    },
    #[error(transparent)]
    #[diagnostic(transparent)]
    RuleSet(#[from] RuleSetError),
}

impl GrammarGeneratorError {
    pub(crate) fn unsupported_type(model: &str, field: &str, reason: impl Into<String>) -> Self {
        Self::UnsupportedType {
            model: model.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn name_collision(name: SmolStr, first: String, second: String) -> Self {
        Self::NameCollision {
            name,
            first,
            second,
        }
    }

    pub(crate) fn undefined_model(name: SmolStr, referenced_by: &str) -> Self {
        Self::UndefinedModel {
            name,
            referenced_by: referenced_by.into(),
        }
    }
}
