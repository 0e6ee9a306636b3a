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

use super::loc::Loc;
use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while assembling tokens into a JSON document
#[derive(Error, Debug, Diagnostic)]
pub enum ParseError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    TokenizeError(#[from] TokenizeError),

    #[error("Encountered unexpected token while parsing JSON.")]
    #[diagnostic(transparent)]
    UnexpectedToken(LocationFound),

    #[error("Duplicate key found in JSON object.")]
    #[diagnostic(transparent)]
    DuplicateKey(DuplicateFound),

    #[error("Found trailing input after the JSON document.")]
    #[diagnostic(transparent)]
    TrailingInput(LocationFound),
}

impl ParseError {
    pub(crate) fn unexpected_token(loc: Loc, msg: &str) -> Self {
        Self::UnexpectedToken(LocationFound::new(loc, "Found", msg, "parse::unexpected_token"))
    }

    pub(crate) fn duplicate_key(first: miette::SourceSpan, second: Loc) -> Self {
        let second_span = (&second).into();
        Self::DuplicateKey(DuplicateFound {
            src: second,
            first,
            second: second_span,
        })
    }

    pub(crate) fn trailing_input(loc: Loc) -> Self {
        Self::TrailingInput(LocationFound::new(
            loc,
            "Unexpected input",
            "A JSON document must contain exactly one value.",
            "parse::trailing_input",
        ))
    }
}

/// Errors raised while splitting the input into JSON tokens
#[derive(Error, Debug, Diagnostic)]
pub enum TokenizeError {
    #[error("Encountered end of input while parsing JSON.")]
    #[diagnostic(transparent)]
    UnexpectedEof(LocationFound),

    #[error("Encountered unexpected character while parsing JSON.")]
    #[diagnostic(transparent)]
    UnexpectedToken(LocationFound),

    #[error("Encountered unknown escape sequence in string literal.")]
    #[diagnostic(transparent)]
    UnexpectedEscapeSequence(LocationFound),

    #[error("Encountered invalid number literal.")]
    #[diagnostic(transparent)]
    InvalidNumberLiteral(LocationFound),
}

impl TokenizeError {
    pub(crate) fn unexpected_eof(loc: Loc, msg: &str) -> Self {
        Self::UnexpectedEof(LocationFound::new(loc, "End of input", msg, "parse::unexpected_eof"))
    }

    pub(crate) fn unexpected_token(loc: Loc, msg: &str) -> Self {
        Self::UnexpectedToken(LocationFound::new(loc, "Found", msg, "parse::unexpected_token"))
    }

    pub(crate) fn unknown_escape_sequence(loc: Loc, msg: &str) -> Self {
        Self::UnexpectedEscapeSequence(LocationFound::new(
            loc,
            "Found",
            msg,
            "parse::invalid_string_literal",
        ))
    }

    pub(crate) fn invalid_number(loc: Loc, msg: &str) -> Self {
        Self::InvalidNumberLiteral(LocationFound::new(
            loc,
            "Found",
            msg,
            "parse::invalid_number_literal",
        ))
    }
}

/// A problem tied to a single location in the input
#[derive(Debug, Error)]
#[error("Problem found.")]
pub struct LocationFound {
    src: Loc,
    label: String,
    msg: String,
    code: &'static str,
}

impl LocationFound {
    pub(crate) fn new(src: Loc, label: &str, msg: &str, code: &'static str) -> Self {
        Self {
            src,
            label: label.to_string(),
            msg: msg.to_string(),
            code,
        }
    }

    /// The location the problem was found at
    pub fn loc(&self) -> &Loc {
        &self.src
    }
}

impl Diagnostic for LocationFound {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(&self.msg))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(miette::LabeledSpan::new(
            Some(self.label.clone()),
            self.src.start(),
            self.src.end() - self.src.start(),
        ))))
    }
}

/// Two occurrences of the same key within one JSON object
#[derive(Debug, Error)]
#[error("Duplicates found.")]
pub struct DuplicateFound {
    src: Loc,
    first: miette::SourceSpan,
    second: miette::SourceSpan,
}

impl Diagnostic for DuplicateFound {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new("parse::duplicate_key"))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new("Keys of a JSON object should be unique."))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(
            [
                miette::LabeledSpan::new(
                    Some("First occurrence here".to_string()),
                    self.first.offset(),
                    self.first.len(),
                ),
                miette::LabeledSpan::new(
                    Some("Second occurrence here".to_string()),
                    self.second.offset(),
                    self.second.len(),
                ),
            ]
            .into_iter(),
        ))
    }
}
