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

use crate::cli::{
    CliArgs, CliError, Command, DocumentationOptions, ErrorFormat, OutputFormat, ShapeOptions,
};
use crate::gbnf::parse_gbnf;
use crate::gbnf::recognizer::Recognizer;
use crate::{GrammarGenerator, GrammarGeneratorConfig};

use model_schema_sdk::description::ModelSet;

use serde::Serialize;
use smol_str::SmolStr;
use tracing::debug;

use std::io::Write;
use std::path::{Path, PathBuf};

fn get_shape_config(shape: &ShapeOptions) -> GrammarGeneratorConfig {
    GrammarGeneratorConfig::default()
        .outer_object_name(shape.outer_object_name.as_deref().map(SmolStr::new))
        .outer_object_content(shape.outer_object_content.as_str())
        .list_of_outputs(shape.list_of_outputs)
}

fn get_config(
    shape: &ShapeOptions,
    documentation: &DocumentationOptions,
) -> GrammarGeneratorConfig {
    get_shape_config(shape)
        .model_prefix(documentation.model_prefix.as_str())
        .fields_prefix(documentation.fields_prefix.as_str())
        .field_descriptions(!documentation.no_field_descriptions)
}

fn read_file(file: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(file).map_err(|e| CliError::read_file(file.to_path_buf(), e))
}

/// Write `contents` followed by a newline (unless it already ends with one)
/// to `output_location`, or stdout if none is given
fn write_output(output_location: Option<&Path>, contents: &str) -> Result<(), CliError> {
    let mut writer: Box<dyn std::io::Write> = match output_location {
        None => Box::new(std::io::stdout()),
        Some(file) => match std::fs::File::create(file) {
            Ok(fs) => Box::new(fs),
            Err(e) => return Err(CliError::write_file_open(file.to_path_buf(), e)),
        },
    };
    if contents.ends_with('\n') {
        write!(writer, "{contents}")
    } else {
        writeln!(writer, "{contents}")
    }
    .map_err(|e| {
        CliError::write_file(
            output_location.map_or_else(|| PathBuf::from("stdout"), Path::to_path_buf),
            e,
        )
    })
}

/// JSON form of the `generate` command's output
#[derive(Debug, Serialize)]
struct GeneratedOutput<'a> {
    grammar: &'a str,
    documentation: &'a str,
}

impl CliArgs {
    pub fn exec(&self) -> Result<(), CliError> {
        match &self.command {
            Command::Generate {
                models,
                grammar_output,
                documentation_output,
                output_format,
                shape,
                documentation,
                ..
            } => {
                let config = get_config(shape, documentation);
                let models = ModelSet::from_json_file(models)?;
                debug!(models = models.len(), "Read model declarations");
                let generated =
                    GrammarGenerator::new_with_config(config).generate(models.models())?;
                let grammar = generated.grammar();

                if let Some(file) = grammar_output {
                    write_output(Some(file.as_path()), &grammar)?;
                }
                if let Some(file) = documentation_output {
                    write_output(Some(file.as_path()), generated.documentation())?;
                }
                match output_format {
                    OutputFormat::Human => {
                        let mut parts = Vec::new();
                        if grammar_output.is_none() {
                            parts.push(grammar.trim_end());
                        }
                        if documentation_output.is_none() {
                            parts.push(generated.documentation());
                        }
                        if parts.is_empty() {
                            Ok(())
                        } else {
                            write_output(None, &parts.join("\n\n"))
                        }
                    }
                    OutputFormat::Json => {
                        let output = GeneratedOutput {
                            grammar: &grammar,
                            documentation: generated.documentation(),
                        };
                        write_output(None, &serde_json::to_string(&output)?)
                    }
                }
            }
            Command::Check { grammar, text, .. } => {
                let rules = parse_gbnf(&read_file(grammar)?)?;
                let recognizer = Recognizer::new(&rules)?;
                let input = read_file(text)?;
                debug!(
                    rules = rules.len(),
                    chars = input.chars().count(),
                    "Checking text against grammar"
                );
                if recognizer.accepts(&input) {
                    println!("ACCEPT");
                    Ok(())
                } else {
                    Err(CliError::Rejected(text.clone()))
                }
            }
            Command::Decode {
                models,
                output,
                shape,
                ..
            } => {
                let models = ModelSet::from_json_file(models)?;
                let shape = get_shape_config(shape).output_shape();
                let outputs = models.decode_output(&read_file(output)?, &shape)?;
                debug!(outputs = outputs.len(), "Decoded model output");
                for output in outputs {
                    println!("{}: {}", output.model(), output.instance());
                }
                Ok(())
            }
        }
    }

    pub fn get_error_format(&self) -> ErrorFormat {
        match &self.command {
            Command::Generate { error_format, .. }
            | Command::Check { error_format, .. }
            | Command::Decode { error_format, .. } => *error_format,
        }
    }

    /// Default log filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}
