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

use linked_hash_map::LinkedHashMap;
use smol_str::SmolStr;
use std::fmt::{self, Display, Write};

/// A JSON number, kept as the literal text it was written with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number(pub(crate) String);

impl Number {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get this `Number` as a 64-bit integer if possible
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// Get this `Number` as a 64-bit float if possible
    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse().ok()
    }
}

/// A value that has been checked against a `FieldType`
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(Number),
    String(String),
    Enum(SmolStr),
    List(Vec<TypedValue>),
    /// The value matched the union member at `index`
    Union {
        index: usize,
        value: Box<TypedValue>,
    },
    Model(Instance),
}

/// A value of a `ModelDeclaration`: the model's name and its field values in
/// declaration order (absent optional fields are left out)
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub(crate) model: SmolStr,
    pub(crate) fields: LinkedHashMap<SmolStr, TypedValue>,
}

impl Instance {
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn get(&self, field: &str) -> Option<&TypedValue> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// One decoded output: which model was selected and the instance it holds
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    pub(crate) model: SmolStr,
    pub(crate) instance: Instance,
}

impl ModelOutput {
    /// Name of the selected model
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn into_instance(self) -> Instance {
        self.instance
    }
}

/// How model outputs are laid out in generated text: optionally wrapped in a
/// selector object and optionally collected into a JSON array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputShape {
    pub(crate) outer_object_name: Option<SmolStr>,
    pub(crate) outer_object_content: SmolStr,
    pub(crate) list_of_outputs: bool,
}

impl Default for OutputShape {
    fn default() -> Self {
        Self {
            outer_object_name: None,
            outer_object_content: "params".into(),
            list_of_outputs: false,
        }
    }
}

impl OutputShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap every output as `{"<name>": "<Model>", "<content>": {...}}`
    pub fn outer_object(mut self, name: impl Into<SmolStr>, content: impl Into<SmolStr>) -> Self {
        self.outer_object_name = Some(name.into());
        self.outer_object_content = content.into();
        self
    }

    /// Expect a JSON array of one or more outputs
    pub fn list_of_outputs(mut self, val: bool) -> Self {
        self.list_of_outputs = val;
        self
    }

    pub fn outer_object_name(&self) -> Option<&str> {
        self.outer_object_name.as_deref()
    }

    pub fn outer_object_content(&self) -> &str {
        &self.outer_object_content
    }

    pub fn is_list_of_outputs(&self) -> bool {
        self.list_of_outputs
    }
}

/// Quote `s` as a JSON string literal.
///
/// Control characters (including DEL) are always escaped, so the result also
/// matches the `string` rule of generated grammars.
pub fn json_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => f.write_str(n.as_str()),
            Self::String(s) => f.write_str(&json_string_literal(s)),
            Self::Enum(s) => f.write_str(&json_string_literal(s)),
            Self::List(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            Self::Union { value, .. } => write!(f, "{value}"),
            Self::Model(instance) => write!(f, "{instance}"),
        }
    }
}

/// Renders as compact JSON
impl Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('{')?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_char(',')?;
            }
            write!(f, "{}:{value}", json_string_literal(name))?;
        }
        f.write_char('}')
    }
}
