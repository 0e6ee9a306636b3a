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

use std::collections::HashMap;
use std::str::FromStr;

use model_schema_sdk::parser::loc::Loc;
use nonempty::NonEmpty;
use smol_str::SmolStr;
use tracing::debug;

use super::err::GbnfSyntaxError;
use super::rules::{Alternatives, Repetition, RuleSet, Sequence, Term, ROOT_RULE};
use super::tokenizer::{Token, TokenKind, Tokenizer};

/// Parse GBNF text into a [`RuleSet`].
///
/// The text must define a `root` rule, may not define a rule twice and may
/// not reference rules it does not define.
pub fn parse_gbnf(input: &str) -> Result<RuleSet, GbnfSyntaxError> {
    let tokenizer = Tokenizer::new(input);
    let eof = tokenizer.eof_loc();
    let tokens = tokenizer.tokenize()?;
    let rules = GbnfParser {
        tokens,
        pos: 0,
        eof,
        references: Vec::new(),
    }
    .parse()?;
    debug!(rules = rules.len(), "Parsed GBNF grammar");
    Ok(rules)
}

impl FromStr for RuleSet {
    type Err = GbnfSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_gbnf(s)
    }
}

#[derive(Debug)]
struct GbnfParser {
    tokens: Vec<Token>,
    pos: usize,
    eof: Loc,
    /// Every rule reference seen so far, checked once all rules are known
    references: Vec<(SmolStr, Loc)>,
}

impl GbnfParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eof_error(&self, msg: &str) -> GbnfSyntaxError {
        GbnfSyntaxError::unexpected_eof(self.eof.clone(), msg)
    }

    /// A rule name directly followed by `::=` starts the next rule
    fn at_rule_start(&self) -> bool {
        matches!(
            (self.tokens.get(self.pos), self.tokens.get(self.pos + 1)),
            (
                Some(Token {
                    kind: TokenKind::Ident(_),
                    ..
                }),
                Some(Token {
                    kind: TokenKind::Define,
                    ..
                })
            )
        )
    }

    fn parse(mut self) -> Result<RuleSet, GbnfSyntaxError> {
        let mut rules = RuleSet::new();
        let mut defined: HashMap<SmolStr, Loc> = HashMap::new();
        while let Some(token) = self.next_token() {
            let TokenKind::Ident(name) = token.kind else {
                return Err(GbnfSyntaxError::unexpected_token(
                    token.loc,
                    "Expected a rule name.",
                ));
            };
            match self.next_token() {
                Some(Token {
                    kind: TokenKind::Define,
                    ..
                }) => {}
                Some(other) => {
                    return Err(GbnfSyntaxError::unexpected_token(
                        other.loc,
                        "Expected `::=` after the rule name.",
                    ))
                }
                None => return Err(self.eof_error("Expected `::=` after the rule name.")),
            }
            let alternatives = self.alternatives()?;
            match rules.insert(name.clone(), alternatives) {
                Ok(()) => {
                    defined.insert(name, token.loc);
                }
                Err(_) => {
                    let first = defined.get(&name).unwrap_or(&token.loc);
                    return Err(GbnfSyntaxError::duplicate_rule(
                        name,
                        first,
                        token.loc.clone(),
                    ));
                }
            }
        }

        if !rules.contains(ROOT_RULE) {
            return Err(GbnfSyntaxError::MissingRoot);
        }
        if let Some((name, loc)) = self
            .references
            .into_iter()
            .find(|(name, _)| !rules.contains(name))
        {
            return Err(GbnfSyntaxError::undefined_rule(name, loc));
        }
        Ok(rules)
    }

    fn alternatives(&mut self) -> Result<Alternatives, GbnfSyntaxError> {
        let mut alternatives = NonEmpty::new(self.sequence()?);
        while matches!(
            self.peek(),
            Some(Token {
                kind: TokenKind::Alt,
                ..
            })
        ) {
            self.pos += 1;
            alternatives.push(self.sequence()?);
        }
        Ok(Alternatives::new(alternatives))
    }

    fn sequence(&mut self) -> Result<Sequence, GbnfSyntaxError> {
        let mut terms = Vec::new();
        loop {
            match self.peek().map(|t| &t.kind) {
                None | Some(TokenKind::Alt | TokenKind::CloseParen) => break,
                Some(TokenKind::Ident(_)) if self.at_rule_start() => break,
                Some(_) => terms.push(self.term()?),
            }
        }
        Ok(Sequence::new(terms))
    }

    fn term(&mut self) -> Result<Term, GbnfSyntaxError> {
        let Some(token) = self.next_token() else {
            return Err(self.eof_error("Expected a term."));
        };
        let mut term = match token.kind {
            TokenKind::Ident(name) => {
                self.references.push((name.clone(), token.loc));
                Term::Rule(name)
            }
            TokenKind::Literal(text) => Term::Literal(text),
            TokenKind::Class(class) => Term::CharClass(class),
            TokenKind::OpenParen => {
                let alternatives = self.alternatives()?;
                match self.next_token() {
                    Some(Token {
                        kind: TokenKind::CloseParen,
                        ..
                    }) => Term::Group(alternatives),
                    Some(other) => {
                        return Err(GbnfSyntaxError::unexpected_token(
                            other.loc,
                            "Expected `)` to close the group.",
                        ))
                    }
                    None => return Err(self.eof_error("Expected `)` to close the group.")),
                }
            }
            _ => {
                return Err(GbnfSyntaxError::unexpected_token(
                    token.loc,
                    "Expected a rule name, literal, character class or group.",
                ))
            }
        };
        while let Some(op) = self.peek().and_then(|t| repetition(&t.kind)) {
            self.pos += 1;
            term = Term::Repeat(Box::new(term), op);
        }
        Ok(term)
    }
}

fn repetition(kind: &TokenKind) -> Option<Repetition> {
    match kind {
        TokenKind::Question => Some(Repetition::Optional),
        TokenKind::Star => Some(Repetition::ZeroOrMore),
        TokenKind::Plus => Some(Repetition::OneOrMore),
        _ => None,
    }
}
