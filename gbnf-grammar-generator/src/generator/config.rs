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

use model_schema_sdk::data::OutputShape;
use smol_str::SmolStr;

/// A type reserved to configure the output shape and documentation of the
/// grammar generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarGeneratorConfig {
    pub(crate) outer_object_name: Option<SmolStr>,
    pub(crate) outer_object_content: SmolStr,
    pub(crate) model_prefix: String,
    pub(crate) fields_prefix: String,
    pub(crate) list_of_outputs: bool,
    pub(crate) field_descriptions: bool,
}

impl GrammarGeneratorConfig {
    /// Default configuration of the grammar generator
    pub fn default() -> Self {
        Self {
            outer_object_name: None,
            outer_object_content: SmolStr::new_static("params"),
            model_prefix: "Output Model".to_string(),
            fields_prefix: "Output Fields".to_string(),
            list_of_outputs: false,
            field_descriptions: true,
        }
    }

    /// Updates config to set `outer_object_name` to `val` (default: None)
    /// If set, every output is wrapped in an object whose `val` key holds
    /// the name of the selected model and whose `outer_object_content` key
    /// holds the model's fields.
    pub fn outer_object_name(self, val: Option<SmolStr>) -> Self {
        Self {
            outer_object_name: val,
            ..self
        }
    }

    /// Updates config to set `outer_object_content` to `val` (default: "params")
    /// Only used when `outer_object_name` is set.
    pub fn outer_object_content(self, val: impl Into<SmolStr>) -> Self {
        Self {
            outer_object_content: val.into(),
            ..self
        }
    }

    /// Updates config to set `model_prefix` to `val` (default: "Output Model")
    /// The label introducing each model in the documentation.
    pub fn model_prefix(self, val: impl Into<String>) -> Self {
        Self {
            model_prefix: val.into(),
            ..self
        }
    }

    /// Updates config to set `fields_prefix` to `val` (default: "Output Fields")
    /// The label introducing the field list of each model in the documentation.
    pub fn fields_prefix(self, val: impl Into<String>) -> Self {
        Self {
            fields_prefix: val.into(),
            ..self
        }
    }

    /// Updates config to set `list_of_outputs` to `val` (default: false)
    /// If set to `true` the grammar accepts a JSON array of one or more
    /// outputs rather than a single output.
    pub fn list_of_outputs(self, val: bool) -> Self {
        Self {
            list_of_outputs: val,
            ..self
        }
    }

    /// Updates config to set `field_descriptions` to `val` (default: true)
    /// If set to `false` field descriptions are left out of the documentation.
    pub fn field_descriptions(self, val: bool) -> Self {
        Self {
            field_descriptions: val,
            ..self
        }
    }

    /// The output shape a model output generated under this config has,
    /// for decoding it with [`ModelSet::decode_output`](model_schema_sdk::description::ModelSet::decode_output)
    pub fn output_shape(&self) -> OutputShape {
        let shape = OutputShape::new().list_of_outputs(self.list_of_outputs);
        match &self.outer_object_name {
            Some(name) => shape.outer_object(name.clone(), self.outer_object_content.clone()),
            None => shape,
        }
    }
}
