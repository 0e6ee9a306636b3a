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

use super::{err::TokenizeError, loc::Loc};
use std::sync::Arc;

/// The kind of JSON lexeme a `Token` represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Null,
    Bool(bool),
    /// The literal text can be recovered from the token's `Loc`
    Number,
    /// The literal text (including quotes) can be recovered from the token's `Loc`
    String,
    ArrayStart,
    ArrayEnd,
    ObjectStart,
    ObjectEnd,
    Comma,
    Colon,
}

/// A JSON lexeme together with where it was found
#[derive(Debug, Clone)]
pub(crate) struct Token {
    kind: TokenKind,
    loc: Loc,
}

impl Token {
    pub(crate) fn kind(&self) -> TokenKind {
        self.kind
    }

    pub(crate) fn as_loc(&self) -> &Loc {
        &self.loc
    }

    pub(crate) fn into_loc(self) -> Loc {
        self.loc
    }
}

/// Lazily splits a JSON document into `Token`s
#[derive(Debug, Clone)]
pub(crate) struct Tokenizer {
    input: Arc<str>,
    /// Byte offset of the next unread byte. Only ASCII bytes are ever
    /// inspected individually, so this sits on a character boundary whenever
    /// a token is produced.
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

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eof_error(&self, msg: &str) -> TokenizeError {
        TokenizeError::unexpected_eof(self.loc(self.pos.saturating_sub(1), 0), msg)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.bump();
        }
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.bump();
        }
        self.pos - start
    }

    fn keyword(&mut self, word: &'static str, kind: TokenKind) -> Result<Token, TokenizeError> {
        let start = self.pos;
        let rest = self.input.get(start..).unwrap_or_default();
        if rest.starts_with(word) {
            self.pos += word.len();
            Ok(Token {
                kind,
                loc: self.loc(start, word.len()),
            })
        } else if word.starts_with(rest) {
            Err(TokenizeError::unexpected_eof(
                self.loc(self.input.len().saturating_sub(1), 0),
                &format!("Encountered end of input while reading `{word}`."),
            ))
        } else {
            Err(TokenizeError::unexpected_token(
                self.loc(start, 1),
                &format!("Expected `{word}`."),
            ))
        }
    }

    fn number(&mut self) -> Result<Token, TokenizeError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.bump();
        }
        match self.peek() {
            Some(b'0') => {
                self.bump();
                if matches!(self.peek(), Some(b'0'..=b'9')) {
                    return Err(TokenizeError::invalid_number(
                        self.loc(self.pos - 1, 1),
                        "Number literals cannot have leading zeros.",
                    ));
                }
            }
            Some(b'1'..=b'9') => {
                self.skip_digits();
            }
            Some(_) => {
                return Err(TokenizeError::invalid_number(
                    self.loc(self.pos, 1),
                    "Expected a digit.",
                ))
            }
            None => return Err(self.eof_error("Found end of input while reading a number.")),
        }
        if self.peek() == Some(b'.') {
            self.bump();
            if self.skip_digits() == 0 {
                return Err(TokenizeError::invalid_number(
                    self.loc(self.pos - 1, 1),
                    "Expected at least one digit after the decimal point.",
                ));
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.bump();
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.bump();
            }
            if self.skip_digits() == 0 {
                return Err(TokenizeError::invalid_number(
                    self.loc(self.pos - 1, 1),
                    "Expected at least one digit in the exponent.",
                ));
            }
        }
        Ok(Token {
            kind: TokenKind::Number,
            loc: self.loc(start, self.pos - start),
        })
    }

    fn escape_sequence(&mut self) -> Result<(), TokenizeError> {
        // The backslash has already been consumed
        match self.peek() {
            Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => {
                self.bump();
                Ok(())
            }
            Some(b'u') => {
                self.bump();
                for _ in 0..4 {
                    match self.peek() {
                        Some(c) if c.is_ascii_hexdigit() => self.bump(),
                        Some(_) => {
                            return Err(TokenizeError::unknown_escape_sequence(
                                self.loc(self.pos, 1),
                                "Expected four hex digits after `\\u`.",
                            ))
                        }
                        None => {
                            return Err(
                                self.eof_error("Found end of input inside a unicode escape.")
                            )
                        }
                    }
                }
                Ok(())
            }
            Some(_) => Err(TokenizeError::unknown_escape_sequence(
                self.loc(self.pos - 1, 2),
                "Expected one of `\\\"`, `\\\\`, `\\/`, `\\b`, `\\f`, `\\n`, `\\r`, `\\t` or `\\uXXXX`.",
            )),
            None => Err(self.eof_error("Found end of input inside an escape sequence.")),
        }
    }

    fn string(&mut self) -> Result<Token, TokenizeError> {
        let start = self.pos;
        // opening quote
        self.bump();
        loop {
            match self.peek() {
                Some(b'"') => {
                    self.bump();
                    return Ok(Token {
                        kind: TokenKind::String,
                        loc: self.loc(start, self.pos - start),
                    });
                }
                Some(b'\\') => {
                    self.bump();
                    self.escape_sequence()?;
                }
                Some(c) if c < 0x20 => {
                    return Err(TokenizeError::unexpected_token(
                        self.loc(self.pos, 1),
                        "String literals cannot contain unescaped control characters.",
                    ))
                }
                // May step into the middle of a multi-byte character; the
                // loop only stops on the ASCII `"`, which restores alignment.
                Some(_) => self.bump(),
                None => return Err(self.eof_error("Found end of input inside a string literal.")),
            }
        }
    }

    fn punctuation(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        self.bump();
        Token {
            kind,
            loc: self.loc(start, 1),
        }
    }

    /// Returns the next `Token`, or `None` once only whitespace remains
    pub(crate) fn next_token(&mut self) -> Result<Option<Token>, TokenizeError> {
        self.skip_whitespace();
        let Some(next) = self.peek() else {
            return Ok(None);
        };
        let token = match next {
            b't' => self.keyword("true", TokenKind::Bool(true))?,
            b'f' => self.keyword("false", TokenKind::Bool(false))?,
            b'n' => self.keyword("null", TokenKind::Null)?,
            b'-' | b'0'..=b'9' => self.number()?,
            b'"' => self.string()?,
            b'[' => self.punctuation(TokenKind::ArrayStart),
            b']' => self.punctuation(TokenKind::ArrayEnd),
            b'{' => self.punctuation(TokenKind::ObjectStart),
            b'}' => self.punctuation(TokenKind::ObjectEnd),
            b',' => self.punctuation(TokenKind::Comma),
            b':' => self.punctuation(TokenKind::Colon),
            _ => {
                // Report the whole character rather than a single byte of it
                let len = self
                    .input
                    .get(self.pos..)
                    .and_then(|rest| rest.chars().next())
                    .map_or(1, char::len_utf8);
                return Err(TokenizeError::unexpected_token(
                    self.loc(self.pos, len),
                    "Expected one of `null`, `true`, `false`, `:`, `,`, `[`, `]`, `{`, `}`, or a string or number literal.",
                ));
            }
        };
        Ok(Some(token))
    }

    /// Returns the next `Token`, treating the end of input as an error
    pub(crate) fn expect_token(&mut self, msg: &str) -> Result<Token, TokenizeError> {
        match self.next_token()? {
            Some(token) => Ok(token),
            None => Err(self.eof_error(msg)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use cool_asserts::assert_matches;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut tokenizer = Tokenizer::new(input);
        let mut kinds = Vec::new();
        while let Some(token) = tokenizer.next_token().expect("tokenizes") {
            kinds.push(token.kind());
        }
        kinds
    }

    #[test]
    fn punctuation_and_keywords() {
        assert_eq!(
            kinds(" { \"a\" : [ true , false , null ] } "),
            vec![
                TokenKind::ObjectStart,
                TokenKind::String,
                TokenKind::Colon,
                TokenKind::ArrayStart,
                TokenKind::Bool(true),
                TokenKind::Comma,
                TokenKind::Bool(false),
                TokenKind::Comma,
                TokenKind::Null,
                TokenKind::ArrayEnd,
                TokenKind::ObjectEnd,
            ]
        );
    }

    #[test]
    fn number_literals_keep_their_text() {
        for literal in ["0", "-12", "3.25", "1e9", "-0.5E-3", "42"] {
            let mut tokenizer = Tokenizer::new(literal);
            let token = tokenizer
                .next_token()
                .expect("valid number")
                .expect("one token");
            assert_eq!(token.kind(), TokenKind::Number);
            assert_eq!(token.as_loc().snippet(), Some(literal));
        }
    }

    #[test]
    fn invalid_number_literals() {
        for literal in ["01", "-01", "1.", "1e", "-x"] {
            let mut tokenizer = Tokenizer::new(literal);
            assert_matches!(
                tokenizer.next_token(),
                Err(TokenizeError::InvalidNumberLiteral(..))
            );
        }
    }

    #[test]
    fn string_with_escapes_and_unicode() {
        let mut tokenizer = Tokenizer::new(r#""café \"ok\" ünï""#);
        let token = tokenizer.next_token().expect("valid").expect("one token");
        assert_eq!(token.kind(), TokenKind::String);
        assert_eq!(token.as_loc().snippet(), Some(r#""café \"ok\" ünï""#));
        assert_matches!(tokenizer.next_token(), Ok(None));
    }

    #[test]
    fn bad_escapes() {
        for literal in [r#""\a""#, r#""\u12G4""#] {
            let mut tokenizer = Tokenizer::new(literal);
            assert_matches!(
                tokenizer.next_token(),
                Err(TokenizeError::UnexpectedEscapeSequence(..))
            );
        }
    }

    #[test]
    fn unterminated_input() {
        for input in ["\"abc", "tru", "-", "\"\\u00"] {
            let mut tokenizer = Tokenizer::new(input);
            assert_matches!(tokenizer.next_token(), Err(TokenizeError::UnexpectedEof(..)));
        }
    }

    #[test]
    fn control_characters_rejected_in_strings() {
        let mut tokenizer = Tokenizer::new("\"a\nb\"");
        assert_matches!(
            tokenizer.next_token(),
            Err(TokenizeError::UnexpectedToken(..))
        );
    }

    #[test]
    fn expect_token_at_end_is_eof() {
        let mut tokenizer = Tokenizer::new("   ");
        assert_matches!(
            tokenizer.expect_token("more"),
            Err(TokenizeError::UnexpectedEof(..))
        );
    }
}
