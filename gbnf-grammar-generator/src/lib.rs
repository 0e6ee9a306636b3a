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

//! Compiles structured output model declarations into a GBNF grammar that
//! constrains a language model's decoder to valid JSON outputs of those
//! models, together with documentation of the same outputs to embed in a
//! prompt.
//!
//! ```
//! use gbnf_grammar_generator::{GrammarGenerator, GrammarGeneratorConfig};
//! use gbnf_grammar_generator::description::{FieldDeclaration, FieldType, ModelDeclaration};
//!
//! let calculator = ModelDeclaration::new(
//!     "Calculator",
//!     vec![
//!         FieldDeclaration::new("number_one", true, FieldType::Number, None),
//!         FieldDeclaration::new(
//!             "operation",
//!             true,
//!             FieldType::enumeration(["add", "subtract", "multiply", "divide"]),
//!             None,
//!         ),
//!         FieldDeclaration::new("number_two", true, FieldType::Number, None),
//!     ],
//!     Some("Perform a math operation on two numbers.".to_string()),
//! );
//! let config = GrammarGeneratorConfig::default().outer_object_name(Some("function".into()));
//! let generated = GrammarGenerator::new_with_config(config)
//!     .generate(&[calculator])
//!     .unwrap();
//! assert!(generated.grammar().starts_with("root ::= ws calculator-function ws\n"));
//! assert!(generated.documentation().contains("Output Model: Calculator"));
//! ```

pub mod gbnf;
mod generator;

#[cfg(feature = "cli")]
mod cli;

pub use generator::{
    generate_documentation, generate_grammar_and_documentation, GeneratedGrammar,
    GrammarGenerator, GrammarGeneratorConfig, GrammarGeneratorError,
};
pub use model_schema_sdk::{data, description};

#[cfg(feature = "cli")]
pub use cli::{CliArgs, CliError, ErrorFormat};
