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
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Could not open file `{}`: {}", .file.display(), .error)]
pub struct FileOpenError {
    file: PathBuf,
    error: std::io::Error,
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Could not read file `{}`: {}", .0.file.display(), .0.error)]
    #[diagnostic(code(cli_error::file_open_error), help("Make sure {} exists and you have permissions to read it.", .0.file.display()))]
    ReadingFile(FileOpenError),
    #[error("Error trying to create file for writing {}: {}", .0.file.display(), .0.error)]
    #[diagnostic(code(cli_error::file_open_error), help("Make sure to write to/create {}.", .0.file.display()))]
    OpeningWriteFile(FileOpenError),
    #[error("Error trying to write to {}: {}", .0.file.display(), .0.error)]
    #[diagnostic(code(cli_error::file_write_error), help("Make sure to write to {}.", .0.file.display()))]
    WritingFile(FileOpenError),
    #[error("Error while deserializing model declarations: {}", .0)]
    #[diagnostic(transparent)]
    ModelDeserialization(#[from] model_schema_sdk::err::DeserializationError),
    #[error("Error while generating grammar: {}", .0)]
    #[diagnostic(transparent)]
    GrammarGenerator(#[from] crate::GrammarGeneratorError),
    #[error("Error while parsing grammar: {}", .0)]
    #[diagnostic(transparent)]
    GrammarSyntax(#[from] crate::gbnf::err::GbnfSyntaxError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    RuleSet(#[from] crate::gbnf::err::RuleSetError),
    #[error("Model output is invalid: {}", .0)]
    #[diagnostic(transparent)]
    Validation(#[from] model_schema_sdk::err::ValidationError),
    #[error("Error while trying to serialize output to JSON: {}", .0)]
    #[diagnostic(
        code(cli_error::serialize_to_json),
        help("Could not serialize the generated grammar to json")
    )]
    JsonSerialize(#[from] serde_json::Error),
    #[error("Grammar does not derive the contents of `{}`", .0.display())]
    #[diagnostic(
        code(cli_error::text_rejected),
        help("The text must match the `root` rule exactly, including any leading or trailing whitespace.")
    )]
    Rejected(PathBuf),
}

impl CliError {
    pub(crate) fn read_file(file: PathBuf, error: std::io::Error) -> Self {
        Self::ReadingFile(FileOpenError { file, error })
    }

    pub(crate) fn write_file_open(file: PathBuf, error: std::io::Error) -> Self {
        Self::OpeningWriteFile(FileOpenError { file, error })
    }

    pub(crate) fn write_file(file: PathBuf, error: std::io::Error) -> Self {
        Self::WritingFile(FileOpenError { file, error })
    }
}
