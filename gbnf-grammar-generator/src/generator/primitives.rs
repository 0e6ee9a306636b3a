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

//! Built-in rules for JSON scalars and whitespace.

use crate::gbnf::rules::{Alternatives, CharClass, ClassItem, Sequence, Term};

use super::identifiers::{BOOLEAN, INTEGER, NULL, NUMBER, STRING, WS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Primitive {
    Ws,
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl Primitive {
    /// Every primitive, in the order their rules are emitted
    pub(super) const ALL: [Primitive; 6] = [
        Self::Ws,
        Self::String,
        Self::Number,
        Self::Integer,
        Self::Boolean,
        Self::Null,
    ];

    pub(super) fn name(self) -> &'static str {
        match self {
            Self::Ws => WS,
            Self::String => STRING,
            Self::Number => NUMBER,
            Self::Integer => INTEGER,
            Self::Boolean => BOOLEAN,
            Self::Null => NULL,
        }
    }

    pub(super) fn body(self) -> Alternatives {
        match self {
            // ws ::= [ \t\n]*
            Self::Ws => {
                let space = CharClass::new([' ', '\t', '\n'].map(ClassItem::Char));
                single(vec![Term::CharClass(space).zero_or_more()])
            }
            Self::String => {
                let unescaped = Term::CharClass(CharClass::negated([
                    ClassItem::Char('"'),
                    ClassItem::Char('\\'),
                    ClassItem::Range('\u{0}', '\u{1F}'),
                ]));
                let simple_escape = Term::CharClass(CharClass::new(
                    ['"', '\\', '/', 'b', 'f', 'n', 'r', 't'].map(ClassItem::Char),
                ));
                let mut unicode_escape = vec![Term::literal("u")];
                unicode_escape.extend(std::iter::repeat_n(hex_digit(), 4));
                let escape = vec![
                    Term::literal("\\"),
                    Term::group(alternatives(vec![
                        vec![simple_escape],
                        unicode_escape,
                    ])),
                ];
                single(vec![
                    Term::literal("\""),
                    Term::group(alternatives(vec![vec![unescaped], escape])).zero_or_more(),
                    Term::literal("\""),
                ])
            }
            Self::Number => {
                let mut terms = integer_terms();
                terms.push(
                    Term::group_sequence(vec![Term::literal("."), digit().one_or_more()])
                        .optional(),
                );
                let exponent = Term::CharClass(CharClass::new(['e', 'E'].map(ClassItem::Char)));
                let sign = Term::CharClass(CharClass::new(['-', '+'].map(ClassItem::Char)));
                terms.push(
                    Term::group_sequence(vec![exponent, sign.optional(), digit().one_or_more()])
                        .optional(),
                );
                single(terms)
            }
            Self::Integer => single(integer_terms()),
            Self::Boolean => alternatives(vec![
                vec![Term::literal("true")],
                vec![Term::literal("false")],
            ]),
            Self::Null => single(vec![Term::literal("null")]),
        }
    }
}

/// `"-"? ( "0" | [1-9] [0-9]* )`
fn integer_terms() -> Vec<Term> {
    vec![
        Term::literal("-").optional(),
        Term::group(alternatives(vec![
            vec![Term::literal("0")],
            vec![
                Term::CharClass(CharClass::new([ClassItem::Range('1', '9')])),
                digit().zero_or_more(),
            ],
        ])),
    ]
}

fn digit() -> Term {
    Term::CharClass(CharClass::new([ClassItem::Range('0', '9')]))
}

fn hex_digit() -> Term {
    Term::CharClass(CharClass::new([
        ClassItem::Range('0', '9'),
        ClassItem::Range('a', 'f'),
        ClassItem::Range('A', 'F'),
    ]))
}

fn single(terms: Vec<Term>) -> Alternatives {
    Alternatives::single(Sequence::new(terms))
}

/// Alternatives from sequences known to be non-empty
fn alternatives(sequences: Vec<Vec<Term>>) -> Alternatives {
    let mut sequences = sequences.into_iter().map(Sequence::new);
    let first = sequences.next().unwrap_or_default();
    let mut alternatives = nonempty::NonEmpty::new(first);
    for sequence in sequences {
        alternatives.push(sequence);
    }
    Alternatives::new(alternatives)
}
