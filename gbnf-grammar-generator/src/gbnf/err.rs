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

use miette::{Diagnostic, SourceSpan};
use model_schema_sdk::parser::loc::Loc;
use smol_str::SmolStr;
use thiserror::Error;

/// Structural problems with a [`RuleSet`](super::rules::RuleSet)
#[derive(Debug, Error, Diagnostic)]
pub enum RuleSetError {
    /// Two rules were given the same name
    #[error("Rule `{name}` is defined more than once.")]
    #[diagnostic(
        code(gbnf::duplicate_rule),
        help("Every non-terminal must have exactly one producing rule.")
    )]
    DuplicateRule { name: SmolStr },
    /// A rule references a non-terminal that has no producing rule
    #[error("Rule `{referenced_by}` references undefined rule `{name}`.")]
    #[diagnostic(
        code(gbnf::undefined_rule),
        help("Every non-terminal must have exactly one producing rule.")
    )]
    UndefinedRule {
        name: SmolStr,
        referenced_by: SmolStr,
    },
    #[error("Grammar has no `root` rule.")]
    #[diagnostic(
        code(gbnf::missing_root),
        help("Decoding starts from the `root` rule, so every grammar must define one.")
    )]
    MissingRoot,
}

impl RuleSetError {
    pub(crate) fn duplicate_rule(name: SmolStr) -> Self {
        Self::DuplicateRule { name }
    }

    pub(crate) fn undefined_rule(name: SmolStr, referenced_by: SmolStr) -> Self {
        Self::UndefinedRule {
            name,
            referenced_by,
        }
    }
}

/// Errors raised while reading GBNF text
#[derive(Debug, Error, Diagnostic)]
pub enum GbnfSyntaxError {
    #[error("Encountered unexpected character while parsing GBNF.")]
    #[diagnostic(code(gbnf::unexpected_character), help("{help}"))]
    UnexpectedCharacter {
        #[source_code]
        src: Loc,
        #[label("Found")]
        span: SourceSpan,
        help: String,
    },
    #[error("Encountered end of input while parsing GBNF.")]
    #[diagnostic(code(gbnf::unexpected_eof), help("{help}"))]
    UnexpectedEof {
        #[source_code]
        src: Loc,
        #[label("End of input")]
        span: SourceSpan,
        help: String,
    },
    #[error("Encountered unknown escape sequence.")]
    #[diagnostic(code(gbnf::invalid_escape), help("{help}"))]
    InvalidEscape {
        #[source_code]
        src: Loc,
        #[label("Found")]
        span: SourceSpan,
        help: String,
    },
    #[error("Encountered invalid character range.")]
    #[diagnostic(code(gbnf::invalid_range), help("{help}"))]
    InvalidRange {
        #[source_code]
        src: Loc,
        #[label("Found")]
        span: SourceSpan,
        help: String,
    },
    #[error("Encountered unexpected token while parsing GBNF.")]
    #[diagnostic(code(gbnf::unexpected_token), help("{help}"))]
    UnexpectedToken {
        #[source_code]
        src: Loc,
        #[label("Found")]
        span: SourceSpan,
        help: String,
    },
    #[error("Rule `{name}` is defined more than once.")]
    #[diagnostic(
        code(gbnf::duplicate_rule),
        help("Every non-terminal must have exactly one producing rule.")
    )]
    DuplicateRule {
        name: SmolStr,
        #[source_code]
        src: Loc,
        #[label("First definition here")]
        first: SourceSpan,
        #[label("Redefined here")]
        second: SourceSpan,
    },
    #[error("Reference to undefined rule `{name}`.")]
    #[diagnostic(
        code(gbnf::undefined_rule),
        help("Every non-terminal must have exactly one producing rule.")
    )]
    UndefinedRule {
        name: SmolStr,
        #[source_code]
        src: Loc,
        #[label("Referenced here")]
        span: SourceSpan,
    },
    #[error("Grammar has no `root` rule.")]
    #[diagnostic(
        code(gbnf::missing_root),
        help("Decoding starts from the `root` rule, so every grammar must define one.")
    )]
    MissingRoot,
}

impl GbnfSyntaxError {
    pub(crate) fn unexpected_character(loc: Loc, help: &str) -> Self {
        Self::UnexpectedCharacter {
            span: (&loc).into(),
            src: loc,
            help: help.to_string(),
        }
    }

    pub(crate) fn unexpected_eof(loc: Loc, help: &str) -> Self {
        Self::UnexpectedEof {
            span: (&loc).into(),
            src: loc,
            help: help.to_string(),
        }
    }

    pub(crate) fn invalid_escape(loc: Loc, help: &str) -> Self {
        Self::InvalidEscape {
            span: (&loc).into(),
            src: loc,
            help: help.to_string(),
        }
    }

    pub(crate) fn invalid_range(loc: Loc, help: &str) -> Self {
        Self::InvalidRange {
            span: (&loc).into(),
            src: loc,
            help: help.to_string(),
        }
    }

    pub(crate) fn unexpected_token(loc: Loc, help: &str) -> Self {
        Self::UnexpectedToken {
            span: (&loc).into(),
            src: loc,
            help: help.to_string(),
        }
    }

    pub(crate) fn duplicate_rule(name: SmolStr, first: &Loc, second: Loc) -> Self {
        Self::DuplicateRule {
            name,
            first: first.into(),
            second: (&second).into(),
            src: second,
        }
    }

    pub(crate) fn undefined_rule(name: SmolStr, loc: Loc) -> Self {
        Self::UndefinedRule {
            name,
            span: (&loc).into(),
            src: loc,
        }
    }
}
