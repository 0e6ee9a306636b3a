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

//! This library defines `ModelDeclaration`s: a language-neutral description of a
//! structured output (a named record of typed fields) that a grammar can be
//! generated from. A `ModelSet` is an ordered collection of them, e.g., the
//! functions a language model may choose to call.
//!
//! The library also includes a location-tracking JSON parser used to deserialize
//! function definitions, OpenAI style tools and JSON Schema models into a `ModelSet`,
//! and to validate generated outputs back into typed `Instance`s.

pub mod data;
pub mod description;
mod deserializer;
pub mod err;
pub mod parser;
mod validation;
