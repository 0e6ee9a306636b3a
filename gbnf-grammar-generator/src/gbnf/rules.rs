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

//! In-memory representation of a GBNF grammar.
//!
//! A [`RuleSet`] is an ordered mapping from rule names to [`Alternatives`].
//! Rendering a rule set with `Display` produces GBNF text accepted by
//! llama.cpp style servers, one rule per line with `root` first.

use std::collections::HashSet;
use std::fmt::{self, Display, Write};

use itertools::Itertools;
use linked_hash_map::LinkedHashMap;
use nonempty::NonEmpty;
use smol_str::SmolStr;

use super::err::RuleSetError;

/// Name of the rule a decoder starts from.
pub const ROOT_RULE: &str = "root";

/// Postfix repetition operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetition {
    /// `?`
    Optional,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Display for Repetition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optional => f.write_char('?'),
            Self::ZeroOrMore => f.write_char('*'),
            Self::OneOrMore => f.write_char('+'),
        }
    }
}

/// A single entry of a character class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassItem {
    Char(char),
    /// Inclusive range of characters
    Range(char, char),
}

impl ClassItem {
    fn contains(self, c: char) -> bool {
        match self {
            Self::Char(item) => item == c,
            Self::Range(lo, hi) => lo <= c && c <= hi,
        }
    }
}

/// A bracketed character class such as `[a-z]` or `[^"\\]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharClass {
    negated: bool,
    items: Vec<ClassItem>,
}

impl CharClass {
    pub fn new(items: impl IntoIterator<Item = ClassItem>) -> Self {
        Self {
            negated: false,
            items: items.into_iter().collect(),
        }
    }

    pub fn negated(items: impl IntoIterator<Item = ClassItem>) -> Self {
        Self {
            negated: true,
            items: items.into_iter().collect(),
        }
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn items(&self) -> impl Iterator<Item = &ClassItem> {
        self.items.iter()
    }

    /// Does a single character match this class
    pub fn matches(&self, c: char) -> bool {
        self.items.iter().any(|item| item.contains(c)) != self.negated
    }
}

impl Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('[')?;
        if self.negated {
            f.write_char('^')?;
        }
        for item in &self.items {
            match item {
                ClassItem::Char(c) => write_class_char(f, *c)?,
                ClassItem::Range(lo, hi) => {
                    write_class_char(f, *lo)?;
                    f.write_char('-')?;
                    write_class_char(f, *hi)?;
                }
            }
        }
        f.write_char(']')
    }
}

fn write_class_char(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
    match c {
        '\\' | ']' | '[' | '-' | '^' => write!(f, "\\{c}"),
        _ => write_escaped_char(f, c),
    }
}

fn write_literal_char(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
    match c {
        '\\' | '"' => write!(f, "\\{c}"),
        _ => write_escaped_char(f, c),
    }
}

fn write_escaped_char(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
    match c {
        '\n' => f.write_str("\\n"),
        '\r' => f.write_str("\\r"),
        '\t' => f.write_str("\\t"),
        c if c.is_control() => match u8::try_from(u32::from(c)) {
            Ok(byte) => write!(f, "\\x{byte:02X}"),
            Err(_) => write!(f, "\\u{:04X}", u32::from(c)),
        },
        c => f.write_char(c),
    }
}

/// A term of a GBNF sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Exact text, rendered as a double quoted literal
    Literal(String),
    CharClass(CharClass),
    /// Reference to a non-terminal
    Rule(SmolStr),
    /// Parenthesised alternation
    Group(Alternatives),
    Repeat(Box<Term>, Repetition),
}

impl Term {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    pub fn rule(name: impl Into<SmolStr>) -> Self {
        Self::Rule(name.into())
    }

    pub fn group(alternatives: Alternatives) -> Self {
        Self::Group(alternatives)
    }

    /// Group a sequence of terms into a single term. A single term is
    /// returned unchanged.
    pub fn group_sequence(terms: Vec<Term>) -> Self {
        let mut sequence = Sequence::new(terms);
        if sequence.terms.len() == 1 {
            if let Some(term) = sequence.terms.pop() {
                return term;
            }
        }
        Self::Group(Alternatives::single(sequence))
    }

    pub fn optional(self) -> Self {
        Self::Repeat(Box::new(self), Repetition::Optional)
    }

    pub fn zero_or_more(self) -> Self {
        Self::Repeat(Box::new(self), Repetition::ZeroOrMore)
    }

    pub fn one_or_more(self) -> Self {
        Self::Repeat(Box::new(self), Repetition::OneOrMore)
    }

    fn collect_references<'a>(&'a self, refs: &mut Vec<&'a SmolStr>) {
        match self {
            Self::Literal(_) | Self::CharClass(_) => {}
            Self::Rule(name) => refs.push(name),
            Self::Group(alternatives) => alternatives.collect_references(refs),
            Self::Repeat(term, _) => term.collect_references(refs),
        }
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => {
                f.write_char('"')?;
                for c in text.chars() {
                    write_literal_char(f, c)?;
                }
                f.write_char('"')
            }
            Self::CharClass(class) => class.fmt(f),
            Self::Rule(name) => f.write_str(name),
            Self::Group(alternatives) => write!(f, "( {alternatives} )"),
            // `x??` is not valid GBNF so nested repetitions get their own group
            Self::Repeat(term, op) => match term.as_ref() {
                Self::Repeat(..) => write!(f, "( {term} ){op}"),
                _ => write!(f, "{term}{op}"),
            },
        }
    }
}

/// A sequence of terms matched one after another
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequence {
    terms: Vec<Term>,
}

impl Sequence {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl FromIterator<Term> for Sequence {
    fn from_iter<T: IntoIterator<Item = Term>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            f.write_str("\"\"")
        } else {
            write!(f, "{}", self.terms.iter().join(" "))
        }
    }
}

/// One or more sequences separated by `|`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternatives(NonEmpty<Sequence>);

impl Alternatives {
    pub fn new(alternatives: NonEmpty<Sequence>) -> Self {
        Self(alternatives)
    }

    pub fn single(sequence: Sequence) -> Self {
        Self(NonEmpty::new(sequence))
    }

    /// Returns `None` when `alternatives` is empty
    pub fn from_vec(alternatives: Vec<Sequence>) -> Option<Self> {
        NonEmpty::from_vec(alternatives).map(Self)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
        self.0.iter()
    }

    fn collect_references<'a>(&'a self, refs: &mut Vec<&'a SmolStr>) {
        for sequence in self.0.iter() {
            for term in &sequence.terms {
                term.collect_references(refs);
            }
        }
    }
}

impl Display for Alternatives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" | "))
    }
}

/// An ordered collection of named GBNF rules
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleSet {
    rules: LinkedHashMap<SmolStr, Alternatives>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. Fails if a rule with the same name already exists.
    pub fn insert(
        &mut self,
        name: impl Into<SmolStr>,
        alternatives: Alternatives,
    ) -> Result<(), RuleSetError> {
        let name = name.into();
        if self.rules.contains_key(&name) {
            return Err(RuleSetError::duplicate_rule(name));
        }
        self.rules.insert(name, alternatives);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Alternatives> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn rules(&self) -> impl Iterator<Item = (&SmolStr, &Alternatives)> {
        self.rules.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &SmolStr> {
        self.rules.keys()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Ensure the rule set has a `root` rule and that every referenced
    /// non-terminal has a producing rule.
    pub fn check_references(&self) -> Result<(), RuleSetError> {
        if !self.contains(ROOT_RULE) {
            return Err(RuleSetError::MissingRoot);
        }
        for (name, alternatives) in &self.rules {
            let mut refs = Vec::new();
            alternatives.collect_references(&mut refs);
            if let Some(missing) = refs.into_iter().find(|r| !self.contains(r)) {
                return Err(RuleSetError::undefined_rule(missing.clone(), name.clone()));
            }
        }
        Ok(())
    }

    /// Names of rules not reachable from `root`
    pub fn unreachable_rules(&self) -> Vec<&SmolStr> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut stack = vec![ROOT_RULE];
        while let Some(name) = stack.pop() {
            if !seen.insert(name) {
                continue;
            }
            if let Some(alternatives) = self.rules.get(name) {
                let mut refs = Vec::new();
                alternatives.collect_references(&mut refs);
                stack.extend(refs.into_iter().map(SmolStr::as_str));
            }
        }
        self.rules
            .keys()
            .filter(|name| !seen.contains(name.as_str()))
            .collect()
    }
}

impl Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, alternatives) in &self.rules {
            writeln!(f, "{name} ::= {alternatives}")?;
        }
        Ok(())
    }
}
