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

use crate::data::{Instance, ModelOutput, Number, OutputShape, TypedValue};
use crate::description::{model_index, FieldType, ModelDeclaration, ModelSet};
use crate::err::ValidationError;
use crate::parser::json_value::LocatedValue;
use linked_hash_map::LinkedHashMap;
use smol_str::ToSmolStr;
use std::collections::HashMap;
use tracing::{debug, trace};

type ModelIndex<'a> = HashMap<&'a str, &'a ModelDeclaration>;

pub(crate) fn decode_output(
    models: &ModelSet,
    value: &LocatedValue,
    shape: &OutputShape,
) -> Result<Vec<ModelOutput>, ValidationError> {
    let index = model_index(models.into_iter());
    if shape.is_list_of_outputs() {
        let items = value
            .get_array()
            .ok_or_else(|| ValidationError::expected_array(value))?;
        if items.is_empty() {
            return Err(ValidationError::EmptyOutputList);
        }
        debug!(outputs = items.len(), "Decoding list of outputs");
        items
            .iter()
            .map(|item| decode_single_output(models, item, shape, &index))
            .collect()
    } else {
        decode_single_output(models, value, shape, &index).map(|output| vec![output])
    }
}

fn decode_single_output(
    models: &ModelSet,
    value: &LocatedValue,
    shape: &OutputShape,
    index: &ModelIndex<'_>,
) -> Result<ModelOutput, ValidationError> {
    match shape.outer_object_name() {
        Some(selector_key) => {
            let obj = value
                .get_object()
                .ok_or_else(|| ValidationError::invalid_value_for_type("an object", value))?;
            let content_key = shape.outer_object_content();
            let selector = obj
                .get(selector_key)
                .ok_or_else(|| ValidationError::missing_wrapper_attribute(selector_key))?;
            let selector = selector
                .get_str()
                .ok_or_else(|| ValidationError::invalid_value_for_type("a string", selector))?;
            if let Some(unexpected) = obj
                .keys()
                .find(|key| key.as_str() != selector_key && key.as_str() != content_key)
            {
                return Err(ValidationError::unexpected_field(
                    selector_key,
                    unexpected.as_str(),
                ));
            }
            let model = models
                .models()
                .iter()
                .find(|model| model.name() == selector)
                .ok_or_else(|| ValidationError::unknown_model(selector))?;
            let content = obj
                .get(content_key)
                .ok_or_else(|| ValidationError::missing_wrapper_attribute(content_key))?;
            trace!(model = selector, "Decoding wrapped output");
            Ok(ModelOutput {
                model: model.name().to_smolstr(),
                instance: validate_instance(model, content, index)?,
            })
        }
        None => {
            // Without a selector the first model that accepts the value wins
            let mut errors = Vec::new();
            for model in models {
                match validate_instance(model, value, index) {
                    Ok(instance) => {
                        return Ok(ModelOutput {
                            model: model.name().to_smolstr(),
                            instance,
                        })
                    }
                    Err(err) => errors.push(err),
                }
            }
            if errors.len() == 1 {
                if let Some(err) = errors.pop() {
                    return Err(err);
                }
            }
            Err(ValidationError::no_matching_model(&errors))
        }
    }
}

pub(crate) fn validate_instance(
    model: &ModelDeclaration,
    value: &LocatedValue,
    index: &ModelIndex<'_>,
) -> Result<Instance, ValidationError> {
    let obj = value
        .get_object()
        .ok_or_else(|| ValidationError::invalid_value_for_type("an object", value))?;

    if let Some(unexpected) = obj.keys().find(|key| model.field(key.as_str()).is_none()) {
        return Err(ValidationError::unexpected_field(
            model.name(),
            unexpected.as_str(),
        ));
    }

    let mut fields = LinkedHashMap::new();
    for field in model.fields() {
        match obj.get(field.name()) {
            Some(val) => {
                let typed = validate_field_type(field.field_type(), val, index)?;
                fields.insert(field.name().to_smolstr(), typed);
            }
            None if field.is_required() => {
                return Err(ValidationError::missing_required_field(
                    model.name(),
                    field.name(),
                ))
            }
            None => (),
        }
    }
    Ok(Instance {
        model: model.name().to_smolstr(),
        fields,
    })
}

fn validate_field_type(
    ty: &FieldType,
    val: &LocatedValue,
    index: &ModelIndex<'_>,
) -> Result<TypedValue, ValidationError> {
    match ty {
        FieldType::String => val
            .get_str()
            .map(|s| TypedValue::String(s.to_string()))
            .ok_or_else(|| ValidationError::invalid_value_for_type("a string", val)),
        FieldType::Integer => {
            let literal = val
                .get_numeric_str()
                .ok_or_else(|| ValidationError::invalid_value_for_type("an integer", val))?;
            literal
                .parse()
                .map(TypedValue::Integer)
                .map_err(|_| ValidationError::invalid_integer_literal(literal))
        }
        FieldType::Number => val
            .get_numeric_str()
            .map(|s| TypedValue::Number(Number(s.to_string())))
            .ok_or_else(|| ValidationError::invalid_value_for_type("a number", val)),
        FieldType::Boolean => val
            .get_bool()
            .map(TypedValue::Bool)
            .ok_or_else(|| ValidationError::invalid_value_for_type("a boolean", val)),
        FieldType::Null => {
            if val.is_null() {
                Ok(TypedValue::Null)
            } else {
                Err(ValidationError::invalid_value_for_type("null", val))
            }
        }
        FieldType::Enum { variants } => {
            let s = val
                .get_str()
                .ok_or_else(|| ValidationError::invalid_value_for_type("a string", val))?;
            variants
                .iter()
                .find(|variant| variant.as_str() == s)
                .map(|variant| TypedValue::Enum(variant.clone()))
                .ok_or_else(|| ValidationError::invalid_enum_variant(s))
        }
        FieldType::Optional(inner) => {
            if val.is_null() {
                Ok(TypedValue::Null)
            } else {
                validate_field_type(inner, val, index)
            }
        }
        FieldType::List(element) => {
            let items = val
                .get_array()
                .ok_or_else(|| ValidationError::invalid_value_for_type("an array", val))?;
            items
                .iter()
                .map(|item| validate_field_type(element, item, index))
                .collect::<Result<Vec<_>, _>>()
                .map(TypedValue::List)
        }
        FieldType::Union(members) => members
            .iter()
            .enumerate()
            .find_map(|(i, member)| {
                validate_field_type(member, val, index)
                    .ok()
                    .map(|value| TypedValue::Union {
                        index: i,
                        value: Box::new(value),
                    })
            })
            .ok_or(ValidationError::InvalidValueForUnionType),
        FieldType::Model(model) => validate_instance(model, val, index).map(TypedValue::Model),
        FieldType::Ref(name) => {
            let model = index
                .get(name.as_str())
                .ok_or_else(|| ValidationError::unknown_model(name))?;
            validate_instance(model, val, index).map(TypedValue::Model)
        }
        FieldType::Unknown => Err(ValidationError::UnsupportedType),
    }
}
