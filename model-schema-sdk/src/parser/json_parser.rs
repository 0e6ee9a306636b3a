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

use super::err::ParseError;
use super::json_value::{LocatedString, LocatedValue};
use super::loc::Loc;
use super::tokenizer::{Token, TokenKind, Tokenizer};
use linked_hash_map::{Entry, LinkedHashMap};

const EXPECTED_VALUE: &str =
    "Expected a value (i.e., null, Bool, Number, String, Array, or Object).";

/// Recursive descent parser producing `LocatedValue`s
#[derive(Debug)]
pub(crate) struct JsonParser {
    tokenizer: Tokenizer,
}

impl JsonParser {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            tokenizer: Tokenizer::new(input),
        }
    }

    /// Parse the whole input as exactly one JSON value
    pub(crate) fn parse_document(input: &str) -> Result<LocatedValue, ParseError> {
        let mut parser = Self::new(input);
        let value = parser.get_value()?;
        match parser.tokenizer.next_token()? {
            None => Ok(value),
            Some(token) => Err(ParseError::trailing_input(token.into_loc())),
        }
    }

    /// Parse the next JSON value from the input
    pub(crate) fn get_value(&mut self) -> Result<LocatedValue, ParseError> {
        let token = self.tokenizer.expect_token(EXPECTED_VALUE)?;
        self.value_starting_with(token)
    }

    fn value_starting_with(&mut self, token: Token) -> Result<LocatedValue, ParseError> {
        match token.kind() {
            TokenKind::Null => Ok(LocatedValue::new_null(token.into_loc())),
            TokenKind::Bool(b) => Ok(LocatedValue::new_bool(b, token.into_loc())),
            TokenKind::Number => Ok(LocatedValue::new_number(token.into_loc())),
            TokenKind::String => Ok(LocatedValue::new_string(token.into_loc())),
            TokenKind::ArrayStart => self.get_array(token.as_loc()),
            TokenKind::ObjectStart => self.get_object(token.as_loc()),
            _ => Err(ParseError::unexpected_token(token.into_loc(), EXPECTED_VALUE)),
        }
    }

    fn get_array(&mut self, open: &Loc) -> Result<LocatedValue, ParseError> {
        let mut items = Vec::new();

        let first = self
            .tokenizer
            .expect_token("Expected `]` or a value.")?;
        if first.kind() == TokenKind::ArrayEnd {
            return Ok(LocatedValue::new_array(items, enclosing(open, &first)));
        }
        items.push(self.value_starting_with(first)?);

        loop {
            let token = self.tokenizer.expect_token("Expected `,` or `]`.")?;
            match token.kind() {
                TokenKind::Comma => items.push(self.get_value()?),
                TokenKind::ArrayEnd => {
                    return Ok(LocatedValue::new_array(items, enclosing(open, &token)))
                }
                _ => {
                    return Err(ParseError::unexpected_token(
                        token.into_loc(),
                        "Expected `,` or `]`.",
                    ))
                }
            }
        }
    }

    fn get_member(
        &mut self,
        key_token: Token,
        items: &mut LinkedHashMap<LocatedString, LocatedValue>,
    ) -> Result<(), ParseError> {
        if key_token.kind() != TokenKind::String {
            return Err(ParseError::unexpected_token(
                key_token.into_loc(),
                "Expected a String key.",
            ));
        }
        let key = LocatedString::from_literal(key_token.into_loc());

        let colon = self.tokenizer.expect_token("Expected `:`.")?;
        if colon.kind() != TokenKind::Colon {
            return Err(ParseError::unexpected_token(colon.into_loc(), "Expected `:`."));
        }
        let value = self.get_value()?;

        let key_loc = key.as_loc().clone();
        match items.entry(key) {
            Entry::Occupied(occ) => Err(ParseError::duplicate_key(
                occ.key().as_loc().into(),
                key_loc,
            )),
            Entry::Vacant(vac) => {
                vac.insert(value);
                Ok(())
            }
        }
    }

    fn get_object(&mut self, open: &Loc) -> Result<LocatedValue, ParseError> {
        let mut items = LinkedHashMap::new();

        let first = self
            .tokenizer
            .expect_token("Expected `}` or a String key.")?;
        if first.kind() == TokenKind::ObjectEnd {
            return Ok(LocatedValue::new_object(items, enclosing(open, &first)));
        }
        self.get_member(first, &mut items)?;

        loop {
            let token = self.tokenizer.expect_token("Expected `,` or `}`.")?;
            match token.kind() {
                TokenKind::Comma => {
                    let key = self.tokenizer.expect_token("Expected a String key.")?;
                    self.get_member(key, &mut items)?;
                }
                TokenKind::ObjectEnd => {
                    return Ok(LocatedValue::new_object(items, enclosing(open, &token)))
                }
                _ => {
                    return Err(ParseError::unexpected_token(
                        token.into_loc(),
                        "Expected `,` or `}`.",
                    ))
                }
            }
        }
    }
}

/// The `Loc` spanning from an opening bracket through its closing `token`
fn enclosing(open: &Loc, close: &Token) -> Loc {
    let start = open.start();
    open.span((start, close.as_loc().end() - start))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::err::TokenizeError;
    use cool_asserts::assert_matches;

    #[test]
    fn nested_document() {
        let input = r#" { "a": [1, {"b": null}], "c": "d" } "#;
        let value = JsonParser::parse_document(input).expect("parses");
        assert_eq!(value.as_loc().snippet(), Some(input.trim()));
        let a = value.get("a").and_then(LocatedValue::get_array).expect("array");
        assert_eq!(a.len(), 2);
        assert_matches!(a.first().and_then(LocatedValue::get_numeric_str), Some("1"));
        assert_matches!(a.get(1).and_then(|v| v.get("b")).map(LocatedValue::is_null), Some(true));
        assert_matches!(value.get("c").and_then(LocatedValue::get_str), Some("d"));
    }

    #[test]
    fn keys_keep_insertion_order() {
        let value = JsonParser::parse_document(r#"{"z": 1, "a": 2, "m": 3}"#).expect("parses");
        let keys: Vec<_> = value
            .get_object()
            .expect("object")
            .keys()
            .map(LocatedString::as_str)
            .collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn empty_containers() {
        let value = JsonParser::parse_document("[{}, []]").expect("parses");
        assert_matches!(value.get_array(), Some([first, second]) => {
            assert_matches!(first.get_object(), Some(obj) if obj.is_empty());
            assert_matches!(second.get_array(), Some([]));
        });
    }

    #[test]
    fn duplicate_keys_rejected() {
        assert_matches!(
            JsonParser::parse_document(r#"{"a": 1, "a": 2}"#),
            Err(ParseError::DuplicateKey(..))
        );
    }

    #[test]
    fn trailing_input_rejected() {
        assert_matches!(
            JsonParser::parse_document("{} {}"),
            Err(ParseError::TrailingInput(..))
        );
    }

    #[test]
    fn trailing_commas_rejected() {
        assert_matches!(
            JsonParser::parse_document("[1,]"),
            Err(ParseError::UnexpectedToken(..))
        );
        assert_matches!(
            JsonParser::parse_document(r#"{"a": 1,}"#),
            Err(ParseError::UnexpectedToken(..))
        );
    }

    #[test]
    fn missing_colon_rejected() {
        assert_matches!(
            JsonParser::parse_document(r#"{"a" 1}"#),
            Err(ParseError::UnexpectedToken(..))
        );
    }

    #[test]
    fn non_string_key_rejected() {
        assert_matches!(
            JsonParser::parse_document("{1: 2}"),
            Err(ParseError::UnexpectedToken(..))
        );
    }

    #[test]
    fn empty_and_truncated_input() {
        assert_matches!(
            JsonParser::parse_document(""),
            Err(ParseError::TokenizeError(TokenizeError::UnexpectedEof(..)))
        );
        assert_matches!(
            JsonParser::parse_document(r#"{"a": [1, 2"#),
            Err(ParseError::TokenizeError(TokenizeError::UnexpectedEof(..)))
        );
    }
}
