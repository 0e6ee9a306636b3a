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

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use model_schema_sdk::description::ModelDeclaration;

use super::err::GrammarGeneratorError;
use super::identifiers::rule_name;

/// Every model a grammar is generated for: the top-level models in the
/// order given, followed by the models they depend on in discovery order
#[derive(Debug)]
pub(super) struct ModelIndex<'a> {
    top_level: Vec<&'a ModelDeclaration>,
    supporting: Vec<&'a ModelDeclaration>,
    by_name: HashMap<&'a str, &'a ModelDeclaration>,
}

impl<'a> ModelIndex<'a> {
    /// Index `models` and every model they carry. Identical declarations of
    /// a supporting model are merged; any other reuse of a name is a
    /// collision.
    pub(super) fn new(models: &'a [ModelDeclaration]) -> Result<Self, GrammarGeneratorError> {
        if models.is_empty() {
            return Err(GrammarGeneratorError::NoModels);
        }
        let mut by_name: HashMap<&'a str, &'a ModelDeclaration> = HashMap::new();
        for model in models {
            if by_name.insert(model.name(), model).is_some() {
                return Err(GrammarGeneratorError::name_collision(
                    rule_name(model.name()),
                    format!("model `{}`", model.name()),
                    format!("another top-level model `{}`", model.name()),
                ));
            }
        }

        let mut supporting = Vec::new();
        for model in models {
            for nested in model.referenced_models() {
                match by_name.entry(nested.name()) {
                    Entry::Occupied(existing) if *existing.get() == nested => {}
                    Entry::Occupied(_) => {
                        return Err(GrammarGeneratorError::name_collision(
                            rule_name(nested.name()),
                            format!("model `{}`", nested.name()),
                            format!(
                                "a different declaration of model `{}` used by model `{}`",
                                nested.name(),
                                model.name()
                            ),
                        ))
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(nested);
                        supporting.push(nested);
                    }
                }
            }
        }

        Ok(Self {
            top_level: models.iter().collect(),
            supporting,
            by_name,
        })
    }

    pub(super) fn top_level(&self) -> &[&'a ModelDeclaration] {
        &self.top_level
    }

    pub(super) fn supporting(&self) -> &[&'a ModelDeclaration] {
        &self.supporting
    }

    /// Top-level models, then supporting models
    pub(super) fn all(&self) -> impl Iterator<Item = &'a ModelDeclaration> + '_ {
        self.top_level
            .iter()
            .chain(self.supporting.iter())
            .copied()
    }

    pub(super) fn get(&self, name: &str) -> Option<&'a ModelDeclaration> {
        self.by_name.get(name).copied()
    }
}
