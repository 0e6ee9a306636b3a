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

mod config;
mod documentation;
mod err;
mod grammar;
mod identifiers;
mod index;
mod primitives;

pub use config::GrammarGeneratorConfig;
pub use err::GrammarGeneratorError;
pub use grammar::{
    generate_documentation, generate_grammar_and_documentation, GeneratedGrammar,
    GrammarGenerator,
};
