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

use std::sync::Arc;

use model_schema_sdk::parser::loc::Loc;
use smol_str::SmolStr;

use super::err::GbnfSyntaxError;
use super::rules::{CharClass, ClassItem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident(SmolStr),
    /// `::=`
    Define,
    /// `|`
    Alt,
    OpenParen,
    CloseParen,
    Star,
    Plus,
    Question,
    /// Decoded contents of a double quoted literal
    Literal(String),
    Class(CharClass),
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) loc: Loc,
}

/// Splits GBNF text into `Token`s, skipping whitespace and `#` comments
#[derive(Debug)]
pub(crate) struct Tokenizer {
    input: Arc<str>,
    pos: usize,
}

impl Tokenizer {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: Arc::from(input),
            pos: 0,
        }
    }

    fn loc(&self, start: usize, len: usize) -> Loc {
        Loc::new((start, len), Arc::clone(&self.input))
    }

    /// Location just past the last character of the input
    pub(crate) fn eof_loc(&self) -> Loc {
        self.loc(self.input.len(), 0)
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' {
                while !matches!(self.bump(), None | Some('\n')) {}
            } else {
                break;
            }
        }
    }

    pub(crate) fn tokenize(mut self) -> Result<Vec<Token>, GbnfSyntaxError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, GbnfSyntaxError> {
        self.skip_trivia();
        let start = self.pos;
        let Some(c) = self.bump() else {
            return Ok(None);
        };
        let kind = match c {
            '|' => TokenKind::Alt,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '*' => TokenKind::Star,
            '+' => TokenKind::Plus,
            '?' => TokenKind::Question,
            ':' => {
                if self.bump() == Some(':') && self.bump() == Some('=') {
                    TokenKind::Define
                } else {
                    return Err(GbnfSyntaxError::unexpected_character(
                        self.loc(start, 1),
                        "Expected `::=` after a rule name.",
                    ));
                }
            }
            '"' => TokenKind::Literal(self.literal(start)?),
            '[' => TokenKind::Class(self.class(start)?),
            c if is_word_char(c) => {
                while self.peek().is_some_and(is_word_char) {
                    self.bump();
                }
                TokenKind::Ident(SmolStr::new(
                    self.input.get(start..self.pos).unwrap_or_default(),
                ))
            }
            c => {
                return Err(GbnfSyntaxError::unexpected_character(
                    self.loc(start, c.len_utf8()),
                    "Expected a rule name, literal, character class, group or operator.",
                ))
            }
        };
        Ok(Some(Token {
            kind,
            loc: self.loc(start, self.pos - start),
        }))
    }

    fn literal(&mut self, start: usize) -> Result<String, GbnfSyntaxError> {
        let mut text = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(GbnfSyntaxError::unexpected_eof(
                        self.loc(start, 1),
                        "Literal opened here was never closed with `\"`.",
                    ))
                }
                Some('"') => return Ok(text),
                Some('\\') => text.push(self.escape()?),
                Some(c) => text.push(c),
            }
        }
    }

    fn class(&mut self, start: usize) -> Result<CharClass, GbnfSyntaxError> {
        let negated = if self.peek() == Some('^') {
            self.bump();
            true
        } else {
            false
        };
        let mut items = Vec::new();
        loop {
            let item_start = self.pos;
            let lo = match self.bump() {
                None => {
                    return Err(GbnfSyntaxError::unexpected_eof(
                        self.loc(start, 1),
                        "Character class opened here was never closed with `]`.",
                    ))
                }
                Some(']') => break,
                Some('\\') => self.escape()?,
                Some(c) => c,
            };
            let is_range = self.peek() == Some('-')
                && self
                    .input
                    .get(self.pos + 1..)
                    .and_then(|rest| rest.chars().next())
                    .is_some_and(|next| next != ']');
            if is_range {
                self.bump();
                let hi = match self.bump() {
                    Some('\\') => self.escape()?,
                    Some(c) => c,
                    None => {
                        return Err(GbnfSyntaxError::unexpected_eof(
                            self.eof_loc(),
                            "Expected the end of a character range.",
                        ))
                    }
                };
                if hi < lo {
                    return Err(GbnfSyntaxError::invalid_range(
                        self.loc(item_start, self.pos - item_start),
                        "The start of a character range must not come after its end.",
                    ));
                }
                items.push(ClassItem::Range(lo, hi));
            } else {
                items.push(ClassItem::Char(lo));
            }
        }
        Ok(if negated {
            CharClass::negated(items)
        } else {
            CharClass::new(items)
        })
    }

    /// Decode the escape sequence following a `\`
    fn escape(&mut self) -> Result<char, GbnfSyntaxError> {
        let start = self.pos.saturating_sub(1);
        let Some(c) = self.bump() else {
            return Err(GbnfSyntaxError::unexpected_eof(
                self.eof_loc(),
                "Expected an escape sequence after `\\`.",
            ));
        };
        match c {
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            '\\' | '"' | '[' | ']' | '-' | '^' => Ok(c),
            'x' => self.hex_escape(start, 2),
            'u' => self.hex_escape(start, 4),
            'U' => self.hex_escape(start, 8),
            _ => Err(GbnfSyntaxError::invalid_escape(
                self.loc(start, self.pos - start),
                "Valid escapes are \\n, \\r, \\t, \\\\, \\\", \\[, \\], \\xHH, \\uHHHH and \\UHHHHHHHH.",
            )),
        }
    }

    fn hex_escape(&mut self, start: usize, digits: usize) -> Result<char, GbnfSyntaxError> {
        let mut value: u32 = 0;
        for _ in 0..digits {
            let digit = self.peek().and_then(|c| c.to_digit(16));
            match digit {
                Some(d) => {
                    self.bump();
                    value = value * 16 + d;
                }
                None => {
                    return Err(GbnfSyntaxError::invalid_escape(
                        self.loc(start, self.pos - start),
                        &format!("Expected {digits} hexadecimal digits."),
                    ))
                }
            }
        }
        char::from_u32(value).ok_or_else(|| {
            GbnfSyntaxError::invalid_escape(
                self.loc(start, self.pos - start),
                "Escape does not name a valid character.",
            )
        })
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
