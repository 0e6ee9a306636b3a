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

//! Decides whether a grammar derives a given string.
//!
//! The matcher computes, for a term and a start position, the set of
//! positions at which a match of that term can end. Results for rule
//! references are memoised per position. Left recursive grammars are not
//! supported: a rule re-entered at the position it started from matches
//! nothing.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::trace;

use super::err::RuleSetError;
use super::rules::{Alternatives, Repetition, RuleSet, Sequence, Term, ROOT_RULE};

type Positions = BTreeSet<usize>;

/// Checks complete inputs against a [`RuleSet`]
#[derive(Debug, Clone, Copy)]
pub struct Recognizer<'g> {
    rules: &'g RuleSet,
}

impl<'g> Recognizer<'g> {
    /// Fails if `rules` has no `root` rule or references an undefined rule
    pub fn new(rules: &'g RuleSet) -> Result<Self, RuleSetError> {
        rules.check_references()?;
        Ok(Self { rules })
    }

    /// Does the `root` rule derive exactly `input`
    pub fn accepts(&self, input: &str) -> bool {
        self.accepts_rule(ROOT_RULE, input)
    }

    /// Does `rule` derive exactly `input`. Unknown rules derive nothing.
    pub fn accepts_rule(&self, rule: &str, input: &str) -> bool {
        let Some((name, _)) = self.rules.rules().find(|(name, _)| name.as_str() == rule) else {
            return false;
        };
        let mut matcher = Matcher {
            rules: self.rules,
            input: input.chars().collect(),
            memo: HashMap::new(),
            active: HashSet::new(),
        };
        let ends = matcher.rule(name.as_str(), 0);
        let accepted = ends.contains(&matcher.input.len());
        trace!(rule, accepted, memoised = matcher.memo.len(), "Recognized input");
        accepted
    }
}

#[derive(Debug)]
struct Matcher<'g> {
    rules: &'g RuleSet,
    input: Vec<char>,
    memo: HashMap<(&'g str, usize), Positions>,
    /// Rule invocations currently being expanded
    active: HashSet<(&'g str, usize)>,
}

impl<'g> Matcher<'g> {
    fn rule(&mut self, name: &'g str, pos: usize) -> Positions {
        if let Some(found) = self.memo.get(&(name, pos)) {
            return found.clone();
        }
        if !self.active.insert((name, pos)) {
            return Positions::new();
        }
        let ends = match self.rules.get(name) {
            Some(alternatives) => self.alternatives(alternatives, pos),
            None => Positions::new(),
        };
        self.active.remove(&(name, pos));
        self.memo.insert((name, pos), ends.clone());
        ends
    }

    fn alternatives(&mut self, alternatives: &'g Alternatives, pos: usize) -> Positions {
        let mut ends = Positions::new();
        for sequence in alternatives.iter() {
            ends.extend(self.sequence(sequence, pos));
        }
        ends
    }

    fn sequence(&mut self, sequence: &'g Sequence, pos: usize) -> Positions {
        let mut current = Positions::from([pos]);
        for term in sequence.terms() {
            let mut next = Positions::new();
            for start in current {
                next.extend(self.term(term, start));
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }
        current
    }

    fn term(&mut self, term: &'g Term, pos: usize) -> Positions {
        match term {
            Term::Literal(text) => {
                let mut end = pos;
                for c in text.chars() {
                    if self.input.get(end) != Some(&c) {
                        return Positions::new();
                    }
                    end += 1;
                }
                Positions::from([end])
            }
            Term::CharClass(class) => match self.input.get(pos) {
                Some(c) if class.matches(*c) => Positions::from([pos + 1]),
                _ => Positions::new(),
            },
            Term::Rule(name) => self.rule(name.as_str(), pos),
            Term::Group(alternatives) => self.alternatives(alternatives, pos),
            Term::Repeat(inner, Repetition::Optional) => {
                let mut ends = self.term(inner, pos);
                ends.insert(pos);
                ends
            }
            Term::Repeat(inner, Repetition::ZeroOrMore) => {
                self.closure(inner, Positions::from([pos]))
            }
            Term::Repeat(inner, Repetition::OneOrMore) => {
                let first = self.term(inner, pos);
                self.closure(inner, first)
            }
        }
    }

    /// Every position reachable from `start` by zero or more matches of `inner`
    fn closure(&mut self, inner: &'g Term, start: Positions) -> Positions {
        let mut ends = start.clone();
        let mut frontier = start;
        while !frontier.is_empty() {
            let mut next = Positions::new();
            for from in frontier {
                for end in self.term(inner, from) {
                    if ends.insert(end) {
                        next.insert(end);
                    }
                }
            }
            frontier = next;
        }
        ends
    }
}
