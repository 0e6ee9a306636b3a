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

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

/// Options controlling how each output is wrapped and whether several
/// outputs may be produced at once
#[derive(Args, Clone, Debug, Serialize)]
#[clap(next_help_heading = "Output Shape Options")]
#[serde(rename_all = "kebab-case")]
pub(crate) struct ShapeOptions {
    /// Wrap every output in an object whose KEY names the selected model, e.g., `function` (default: no wrapping).
    #[arg(long, value_name = "KEY")]
    pub(crate) outer_object_name: Option<String>,
    /// Key of the wrapping object that holds the model's fields. Only used with `--outer-object-name`.
    #[arg(long, value_name = "KEY", default_value = "params")]
    pub(crate) outer_object_content: String,
    /// Whether outputs form a JSON array of one or more outputs (default: false).
    #[arg(long, default_value_t = false)]
    pub(crate) list_of_outputs: bool,
}

#[derive(Args, Clone, Debug, Serialize)]
#[clap(next_help_heading = "Documentation Options")]
#[serde(rename_all = "kebab-case")]
pub(crate) struct DocumentationOptions {
    /// Label introducing each model in the documentation.
    #[arg(long, default_value = "Output Model")]
    pub(crate) model_prefix: String,
    /// Label introducing the fields of each model in the documentation.
    #[arg(long, default_value = "Output Fields")]
    pub(crate) fields_prefix: String,
    /// Whether to leave field descriptions out of the documentation (default: false).
    #[arg(long, default_value_t = false)]
    pub(crate) no_field_descriptions: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Serialize)]
pub(crate) enum OutputFormat {
    /// The GBNF grammar followed by the documentation.
    Human,
    /// A JSON object with `grammar` and `documentation` keys.
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, Serialize)]
pub enum ErrorFormat {
    /// Human-readable error messages with terminal graphics and inline code snippets.
    Human,
    /// Plain-text error messages without fancy graphics or colors, suitable for screen readers.
    Plain,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Clone, Debug, Serialize, Subcommand)]
pub(crate) enum Command {
    /// Generate a GBNF grammar and prompt documentation for the model declarations
    /// of a JSON file.
    ///
    /// The file may hold a list of function definitions, an OpenAI style tools list,
    /// an MCP `tools/list` result, or a single JSON schema.
    Generate {
        /// A file containing the model declarations.
        #[clap(required = true)]
        models: PathBuf,
        /// The location to save the grammar (default: stdout).
        #[arg(long, value_name = "GRAMMAR_FILE")]
        grammar_output: Option<PathBuf>,
        /// The location to save the documentation (default: stdout).
        #[arg(long, value_name = "DOCUMENTATION_FILE")]
        documentation_output: Option<PathBuf>,
        #[arg(long, default_value = "human")]
        output_format: OutputFormat,
        #[arg(long, default_value = "human")]
        error_format: ErrorFormat,
        #[clap(flatten)]
        shape: ShapeOptions,
        #[clap(flatten)]
        documentation: DocumentationOptions,
    },
    /// Check whether a GBNF grammar derives the complete contents of a text file.
    /// Prints ACCEPT if it does.
    Check {
        /// A file containing a GBNF grammar with a `root` rule.
        #[clap(required = true)]
        grammar: PathBuf,
        /// A file containing the text to check.
        #[clap(required = true)]
        text: PathBuf,
        #[arg(long, default_value = "human")]
        error_format: ErrorFormat,
    },
    /// Validate a model output against the model declarations of a JSON file and
    /// print each selected model with its fields.
    Decode {
        /// A file containing the model declarations.
        #[clap(required = true)]
        models: PathBuf,
        /// A file containing the model output.
        #[clap(required = true)]
        output: PathBuf,
        #[arg(long, default_value = "human")]
        error_format: ErrorFormat,
        #[clap(flatten)]
        shape: ShapeOptions,
    },
}

/// Command Line Interface for the GBNF Grammar Generator
#[derive(Parser, Debug)]
#[clap(name = "gbnf-grammar-generator", version)]
pub struct CliArgs {
    /// Log what the generator does to stderr. `RUST_LOG` takes precedence.
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[clap(subcommand)]
    pub(crate) command: Command,
}
