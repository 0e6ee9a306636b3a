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

use super::description::{FieldDeclaration, FieldType, ModelDeclaration, ModelSet};
use super::err::{ContentType, DeserializationError};
use super::parser::json_value::{LocatedString, LocatedValue};

use linked_hash_map::LinkedHashMap;
use smol_str::{SmolStr, ToSmolStr};
use tracing::debug;

use std::collections::HashSet;

type JsonObject = LinkedHashMap<LocatedString, LocatedValue>;

/// Deserialize a list of model declarations.
/// Accepts a single declaration, a JSON array of them, or an object holding a
/// `tools` array (optionally nested under `result`).
#[expect(clippy::needless_pass_by_value, reason = "Better interface")]
pub(crate) fn model_set_from_json_value(
    json_value: LocatedValue,
) -> Result<ModelSet, DeserializationError> {
    let tools_holder = json_value.get("result").unwrap_or(&json_value);
    let models = if let Some(items) = json_value.get_array() {
        models_from_json_array(items)?
    } else if let Some(tools) = tools_holder.get("tools") {
        let items = tools.get_array().ok_or_else(|| {
            DeserializationError::unexpected_type(
                tools,
                "Expected `tools` attribute to be an array of function definitions.",
                ContentType::ModelSet,
            )
        })?;
        models_from_json_array(items)?
    } else if json_value.get("result").is_some() {
        return Err(DeserializationError::missing_attribute(
            tools_holder,
            "tools",
            Vec::new(),
        ));
    } else if json_value.get_object().is_some() {
        vec![model_from_json_value(&json_value)?]
    } else {
        return Err(DeserializationError::unexpected_type(
            &json_value,
            "Expected a function definition, a JSON Schema model, or a JSON array of them.",
            ContentType::ModelSet,
        ));
    };
    debug!(models = models.len(), "Deserialized model declarations");
    Ok(ModelSet::new(models))
}

fn models_from_json_array(
    items: &[LocatedValue],
) -> Result<Vec<ModelDeclaration>, DeserializationError> {
    items.iter().map(model_from_json_value).collect()
}

fn model_from_json_value(
    json_value: &LocatedValue,
) -> Result<ModelDeclaration, DeserializationError> {
    let obj = json_value.get_object().ok_or_else(|| {
        DeserializationError::unexpected_type(
            json_value,
            "Expected a JSON object containing a function definition or a JSON Schema model.",
            ContentType::ModelSet,
        )
    })?;
    // OpenAI style tool: {"type": "function", "function": {...}}
    if let Some(function) = obj.get("function") {
        if obj.get("type").and_then(LocatedValue::get_str) == Some("function") {
            return function_from_json_value(function);
        }
    }
    if obj.contains_key("name") {
        function_from_json_value(json_value)
    } else if let Some(title) = obj.get("title") {
        let name = title.get_smolstr().ok_or_else(|| {
            DeserializationError::unexpected_type(
                title,
                "Expected `title` attribute of a JSON Schema model to be a string.",
                ContentType::ModelSchema,
            )
        })?;
        let description = description_from_json_value(obj, ContentType::ModelSchema)?;
        model_from_schema(name, description, Some(json_value), ContentType::ModelSchema)
    } else {
        Err(DeserializationError::missing_attribute(
            json_value,
            "name",
            vec!["title".to_string()],
        ))
    }
}

fn function_from_json_value(
    json_value: &LocatedValue,
) -> Result<ModelDeclaration, DeserializationError> {
    let obj = json_value.get_object().ok_or_else(|| {
        DeserializationError::unexpected_type(
            json_value,
            "Expected a JSON object containing a function definition.",
            ContentType::FunctionDefinition,
        )
    })?;
    let name = obj
        .get("name")
        .ok_or_else(|| DeserializationError::missing_attribute(json_value, "name", Vec::new()))?;
    let name = name.get_smolstr().ok_or_else(|| {
        DeserializationError::unexpected_type(
            name,
            "Expected `name` attribute of a function definition to be a string.",
            ContentType::FunctionDefinition,
        )
    })?;
    let description = description_from_json_value(obj, ContentType::FunctionDefinition)?;
    // A function without parameters declares a model without fields
    let parameters = get_value_from_map(obj, &["parameters", "inputSchema"]);
    model_from_schema(name, description, parameters, ContentType::FunctionDefinition)
}

/// Build a top-level model from an object schema, including the models
/// declared in its `$defs`
fn model_from_schema(
    name: SmolStr,
    description: Option<String>,
    schema: Option<&LocatedValue>,
    content_type: ContentType,
) -> Result<ModelDeclaration, DeserializationError> {
    let Some(schema) = schema else {
        return Ok(ModelDeclaration::new(name, Vec::new(), description));
    };
    let schema_obj = schema.get_object().ok_or_else(|| {
        DeserializationError::unexpected_type(
            schema,
            "Expected parameter schema to be a JSON object.",
            content_type,
        )
    })?;
    let defs = get_value_from_map(schema_obj, &["$defs", "definitions"])
        .map(|defs| {
            defs.get_object().ok_or_else(|| {
                DeserializationError::unexpected_type(
                    defs,
                    "Expected `$defs` to be a JSON object mapping type names to JSON Schemas.",
                    ContentType::TypeDefinitions,
                )
            })
        })
        .transpose()?;
    let mut cx = SchemaContext {
        defs,
        expanding: Vec::new(),
    };

    let fields = fields_from_schema(schema_obj, &name, &mut cx, content_type)?;
    let mut definitions = Vec::new();
    if let Some(defs) = defs {
        for (def_name, def_json) in defs {
            if is_object_model(def_json) {
                let def_obj = def_json.get_object().ok_or_else(|| {
                    DeserializationError::unexpected_type(
                        def_json,
                        "Expected a type definition to be a JSON Schema object.",
                        ContentType::TypeDefinitions,
                    )
                })?;
                let content_type = ContentType::TypeDefinitions;
                let description = description_from_json_value(def_obj, content_type)?;
                let fields = fields_from_schema(def_obj, def_name.as_str(), &mut cx, content_type)?;
                definitions.push(ModelDeclaration::new(def_name.to_smolstr(), fields, description));
            } else {
                // Alias definitions are inlined where they are referenced;
                // resolving one here surfaces errors (and cycles) even when unused.
                cx.resolve_alias(def_name.as_str(), def_json)?;
            }
        }
    }
    Ok(ModelDeclaration::new(name, fields, description).with_definitions(definitions))
}

/// State shared while converting the schemas of one top-level model
struct SchemaContext<'a> {
    defs: Option<&'a JsonObject>,
    /// Alias definitions currently being inlined, outermost first
    expanding: Vec<SmolStr>,
}

impl SchemaContext<'_> {
    fn resolve_ref(&mut self, ref_json: &LocatedValue) -> Result<FieldType, DeserializationError> {
        let target = ref_json.get_str().ok_or_else(|| {
            DeserializationError::unexpected_type(
                ref_json,
                "Expected `$ref` attribute to be a string.",
                ContentType::FieldType,
            )
        })?;
        let name = target
            .strip_prefix("#/$defs/")
            .or_else(|| target.strip_prefix("#/definitions/"))
            .ok_or_else(|| {
                DeserializationError::unexpected_value(
                    ref_json,
                    "Expected `$ref` attribute to begin with `#/$defs/`.",
                    ContentType::FieldType,
                )
            })?;
        let def_json = self.defs.and_then(|defs| defs.get(name)).ok_or_else(|| {
            DeserializationError::unexpected_value(
                ref_json,
                "`$ref` does not name an entry of `$defs`.",
                ContentType::FieldType,
            )
        })?;
        if is_object_model(def_json) {
            Ok(FieldType::Ref(name.into()))
        } else {
            self.resolve_alias(name, def_json)
        }
    }

    fn resolve_alias(
        &mut self,
        name: &str,
        def_json: &LocatedValue,
    ) -> Result<FieldType, DeserializationError> {
        if self.expanding.iter().any(|n| n == name) {
            let mut cycle = self.expanding.clone();
            cycle.push(name.into());
            return Err(DeserializationError::type_definition_cycle(cycle));
        }
        self.expanding.push(name.into());
        let resolved = field_type_from_json_value(def_json, name, "", self);
        self.expanding.pop();
        resolved
    }
}

fn is_object_model(json_value: &LocatedValue) -> bool {
    json_value
        .get("properties")
        .is_some_and(|props| props.get_object().is_some())
}

fn fields_from_schema(
    schema_obj: &JsonObject,
    model_name: &str,
    cx: &mut SchemaContext<'_>,
    content_type: ContentType,
) -> Result<Vec<FieldDeclaration>, DeserializationError> {
    let required = required_from_json_value(schema_obj.get("required"), content_type)?;
    let Some(props_json) = schema_obj.get("properties") else {
        return Ok(Vec::new());
    };
    let props = if let Some(props) = props_json.get_object() {
        props
    } else if props_json.get_bool() == Some(false) {
        return Ok(Vec::new());
    } else {
        return Err(DeserializationError::unexpected_type(
            props_json,
            "Expected `properties` attribute to be a JSON object.",
            content_type,
        ));
    };
    props
        .iter()
        .map(|(name, field_json)| {
            let field_type = field_type_from_json_value(field_json, model_name, name.as_str(), cx)?;
            let description = field_json
                .get_object()
                .map(|obj| description_from_json_value(obj, ContentType::Field))
                .transpose()?
                .flatten();
            Ok(FieldDeclaration::new(
                name.to_smolstr(),
                required.contains(name.as_str()),
                field_type,
                description,
            ))
        })
        .collect()
}

fn required_from_json_value(
    json_value: Option<&LocatedValue>,
    content_type: ContentType,
) -> Result<HashSet<SmolStr>, DeserializationError> {
    let Some(json_value) = json_value else {
        return Ok(HashSet::new());
    };
    if let Some(reqs) = json_value.get_array() {
        reqs.iter()
            .map(|req| {
                req.get_smolstr().ok_or_else(|| {
                    DeserializationError::unexpected_type(
                        req,
                        "Expected element of `required` to be a string.",
                        content_type,
                    )
                })
            })
            .collect()
    } else if json_value.get_bool() == Some(false) {
        Ok(HashSet::new())
    } else {
        Err(DeserializationError::unexpected_type(
            json_value,
            "Expected `required` attribute to be a JSON array of strings.",
            content_type,
        ))
    }
}

fn description_from_json_value(
    obj: &JsonObject,
    content_type: ContentType,
) -> Result<Option<String>, DeserializationError> {
    obj.get("description")
        .map(|desc| {
            desc.get_str().map(ToString::to_string).ok_or_else(|| {
                DeserializationError::unexpected_type(
                    desc,
                    "Expected `description` attribute to be a string.",
                    content_type,
                )
            })
        })
        .transpose()
}

/// Convert a property schema into a `FieldType`.
///
/// `owner` and `field` name inline object models that carry no `title`.
fn field_type_from_json_value(
    json_value: &LocatedValue,
    owner: &str,
    field: &str,
    cx: &mut SchemaContext<'_>,
) -> Result<FieldType, DeserializationError> {
    // `true` / `{}` schemas accept anything
    if json_value.get_bool().is_some() {
        return Ok(FieldType::Unknown);
    }
    let obj = json_value.get_object().ok_or_else(|| {
        DeserializationError::unexpected_type(
            json_value,
            "Expected property type schema to be a JSON object.",
            ContentType::Field,
        )
    })?;

    if let Some(ref_json) = obj.get("$ref") {
        cx.resolve_ref(ref_json)
    } else if let Some(enum_json) = obj.get("enum") {
        enum_from_json_value(enum_json)
    } else if let Some(const_json) = obj.get("const") {
        let variant = const_json.get_smolstr().ok_or_else(|| {
            DeserializationError::unexpected_type(
                const_json,
                "Expected `const` attribute to be a string.",
                ContentType::FieldType,
            )
        })?;
        Ok(FieldType::Enum {
            variants: vec![variant],
        })
    } else if let Some(union_json) = get_value_from_map(obj, &["anyOf", "oneOf"]) {
        let members_json = union_json.get_array().ok_or_else(|| {
            DeserializationError::unexpected_type(
                union_json,
                "Expected `anyOf` or `oneOf` attribute to be an array of JSON Schemas.",
                ContentType::FieldType,
            )
        })?;
        let members = members_json
            .iter()
            .enumerate()
            .map(|(i, member)| {
                let member_field = if members_json.len() > 1 {
                    format!("{field}_{}", i + 1)
                } else {
                    field.to_string()
                };
                field_type_from_json_value(member, owner, &member_field, cx)
            })
            .collect::<Result<Vec<_>, _>>()?;
        collapse_union(union_json, members)
    } else if let Some(all_of) = obj.get("allOf") {
        match all_of.get_array() {
            Some([single]) => field_type_from_json_value(single, owner, field, cx),
            _ => Err(DeserializationError::unexpected_value(
                all_of,
                "Only `allOf` with exactly one schema is supported.",
                ContentType::FieldType,
            )),
        }
    } else if let Some(type_json) = obj.get("type") {
        if let Some(type_name) = type_json.get_str() {
            named_type(type_json, type_name, json_value, owner, field, cx)
        } else if let Some(type_names) = type_json.get_array() {
            let members = type_names
                .iter()
                .map(|name_json| {
                    let type_name = name_json.get_str().ok_or_else(|| {
                        DeserializationError::unexpected_type(
                            name_json,
                            "Expected element of `type` to be a string.",
                            ContentType::FieldType,
                        )
                    })?;
                    named_type(name_json, type_name, json_value, owner, field, cx)
                })
                .collect::<Result<Vec<_>, _>>()?;
            collapse_union(type_json, members)
        } else {
            Err(DeserializationError::unexpected_type(
                type_json,
                "Expected `type` attribute to be a string or an array of strings.",
                ContentType::FieldType,
            ))
        }
    } else {
        Ok(FieldType::Unknown)
    }
}

fn named_type(
    type_json: &LocatedValue,
    type_name: &str,
    schema: &LocatedValue,
    owner: &str,
    field: &str,
    cx: &mut SchemaContext<'_>,
) -> Result<FieldType, DeserializationError> {
    match type_name {
        "string" => Ok(FieldType::String),
        "integer" => Ok(FieldType::Integer),
        "number" | "float" => Ok(FieldType::Number),
        "boolean" => Ok(FieldType::Boolean),
        "null" => Ok(FieldType::Null),
        "array" => match schema.get("items") {
            Some(items) if items.get_object().is_some() => Ok(FieldType::list(
                field_type_from_json_value(items, owner, field, cx)?,
            )),
            Some(items) if !(items.get_bool().is_some() || items.is_null()) => {
                Err(DeserializationError::unexpected_type(
                    items,
                    "Expected `items` attribute to be a JSON Schema (object) describing the type of array items.",
                    ContentType::FieldType,
                ))
            }
            _ => Ok(FieldType::list(FieldType::Unknown)),
        },
        "object" => {
            let Some(obj) = schema.get_object().filter(|_| is_object_model(schema)) else {
                return Ok(FieldType::Unknown);
            };
            let name = match obj.get("title").and_then(LocatedValue::get_smolstr) {
                Some(title) => title,
                None => format!("{}{}", pascal_case(owner), pascal_case(field)).into(),
            };
            let description = description_from_json_value(obj, ContentType::Field)?;
            let fields = fields_from_schema(obj, &name, cx, ContentType::Field)?;
            Ok(FieldType::model(ModelDeclaration::new(name, fields, description)))
        }
        _ => Err(DeserializationError::unexpected_value(
            type_json,
            "Expected one of: `boolean`, `integer`, `float`, `number`, `string`, `null`, `array`, `object`.",
            ContentType::FieldType,
        )),
    }
}

fn enum_from_json_value(enum_json: &LocatedValue) -> Result<FieldType, DeserializationError> {
    let items = enum_json.get_array().ok_or_else(|| {
        DeserializationError::unexpected_type(
            enum_json,
            "Expected `enum` attribute to be a JSON array of strings.",
            ContentType::FieldType,
        )
    })?;
    let variants = items
        .iter()
        .map(|variant| {
            variant.get_smolstr().ok_or_else(|| {
                DeserializationError::unexpected_type(
                    variant,
                    "Expected element of `enum` attribute to be a string.",
                    ContentType::FieldType,
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if variants.is_empty() {
        Err(DeserializationError::unexpected_value(
            enum_json,
            "Expected non-empty list of variants for `enum` attribute.",
            ContentType::FieldType,
        ))
    } else {
        Ok(FieldType::Enum { variants })
    }
}

/// A union of one type is that type; a union of one type and `null` is Optional
fn collapse_union(
    union_json: &LocatedValue,
    members: Vec<FieldType>,
) -> Result<FieldType, DeserializationError> {
    if members.len() <= 1 {
        return members.into_iter().next().ok_or_else(|| {
            DeserializationError::unexpected_value(
                union_json,
                "Expected at least one member type.",
                ContentType::FieldType,
            )
        });
    }
    let mut non_null = members.iter().filter(|m| !matches!(m, FieldType::Null));
    let only_non_null = match (non_null.next(), non_null.next()) {
        (Some(inner), None) => Some(inner.clone()),
        _ => None,
    };
    Ok(match only_non_null {
        Some(inner) => FieldType::optional(inner),
        None => FieldType::Union(members),
    })
}

fn pascal_case(s: &str) -> String {
    s.split(['_', '-', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect()
}

fn get_value_from_map<'a, T: AsRef<str>>(
    map: &'a JsonObject,
    key_aliases: &[T],
) -> Option<&'a LocatedValue> {
    key_aliases.iter().find_map(|key| map.get(key.as_ref()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::json_parser::JsonParser;
    use cool_asserts::assert_matches;

    fn parse(json: &str) -> Result<ModelSet, DeserializationError> {
        model_set_from_json_value(JsonParser::parse_document(json).unwrap())
    }

    fn single(json: &str) -> ModelDeclaration {
        let set = parse(json).unwrap();
        assert_eq!(set.len(), 1);
        set.models().first().unwrap().clone()
    }

    fn field_type<'a>(model: &'a ModelDeclaration, name: &str) -> &'a FieldType {
        model.field(name).unwrap().field_type()
    }

    #[test]
    fn test_openai_tool() {
        let model = single(
            r#"{
                "type": "function",
                "function": {
                    "name": "get_current_weather",
                    "description": "Get the current weather in a given location",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "location": {"type": "string", "description": "The city and state, e.g. San Francisco, CA"},
                            "unit": {"type": "string", "enum": ["celsius", "fahrenheit"]}
                        },
                        "required": ["location"]
                    }
                }
            }"#,
        );
        assert_eq!(model.name(), "get_current_weather");
        assert_matches!(
            model.description(),
            Some("Get the current weather in a given location")
        );
        let location = model.field("location").unwrap();
        assert!(location.is_required());
        assert_matches!(
            location.description(),
            Some("The city and state, e.g. San Francisco, CA")
        );
        let unit = model.field("unit").unwrap();
        assert!(!unit.is_required());
        assert_eq!(unit.field_type(), &FieldType::enumeration(["celsius", "fahrenheit"]));
    }

    #[test]
    fn test_function_without_parameters() {
        let model = single(r#"{"name": "ping"}"#);
        assert_eq!(model.fields().count(), 0);
    }

    #[test]
    fn test_mcp_tools_list() {
        let set = parse(
            r#"{"result": {"tools": [
                {"name": "a", "inputSchema": {"type": "object", "properties": {}}},
                {"name": "b", "inputSchema": {"type": "object"}}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(
            set.models().iter().map(ModelDeclaration::name).collect::<Vec<_>>(),
            ["a", "b"]
        );
        assert_matches!(
            parse(r#"{"result": {}}"#),
            Err(DeserializationError::MissingExpectedAttribute(..))
        );
        assert_matches!(
            parse(r#"{"tools": {}}"#),
            Err(DeserializationError::UnexpectedType(..))
        );
    }

    #[test]
    fn test_json_schema_model_with_defs() {
        let model = single(
            r##"{
                "title": "Book",
                "description": "Represents an entry about a book.",
                "type": "object",
                "properties": {
                    "title": {"type": "string", "description": "Title of the book."},
                    "published_year": {"anyOf": [{"type": "integer"}, {"type": "null"}]},
                    "keywords": {"type": "array", "items": {"type": "string"}},
                    "category": {"$ref": "#/$defs/Category"},
                    "publisher": {"$ref": "#/$defs/Publisher"}
                },
                "required": ["title", "published_year", "keywords", "category"],
                "$defs": {
                    "Category": {"enum": ["Fiction", "Non-Fiction"], "type": "string"},
                    "Publisher": {
                        "type": "object",
                        "properties": {"name": {"type": "string"}},
                        "required": ["name"]
                    }
                }
            }"##,
        );
        assert_eq!(model.name(), "Book");
        assert_eq!(
            field_type(&model, "published_year"),
            &FieldType::optional(FieldType::Integer)
        );
        assert_eq!(
            field_type(&model, "keywords"),
            &FieldType::list(FieldType::String)
        );
        assert_eq!(
            field_type(&model, "category"),
            &FieldType::enumeration(["Fiction", "Non-Fiction"])
        );
        assert_eq!(field_type(&model, "publisher"), &FieldType::reference("Publisher"));
        assert_matches!(
            model.definitions().map(ModelDeclaration::name).collect::<Vec<_>>(),
            ["Publisher"]
        );
    }

    #[test]
    fn test_inline_object_naming() {
        let model = single(
            r#"{"name": "create_event", "parameters": {"type": "object", "properties": {
                "when": {"type": "object", "properties": {"day": {"type": "integer"}}},
                "where": {"type": "object", "title": "Venue", "properties": {"city": {"type": "string"}}},
                "extra": {"type": "object"}
            }}}"#,
        );
        assert_matches!(
            field_type(&model, "when"),
            FieldType::Model(m) if m.name() == "CreateEventWhen"
        );
        assert_matches!(field_type(&model, "where"), FieldType::Model(m) if m.name() == "Venue");
        assert_matches!(field_type(&model, "extra"), FieldType::Unknown);
    }

    #[test]
    fn test_type_arrays_and_unions() {
        let model = single(
            r#"{"name": "f", "parameters": {"properties": {
                "a": {"type": ["string", "null"]},
                "b": {"type": ["integer", "number"]},
                "c": {"anyOf": [{"type": "integer"}, {"type": "string"}, {"type": "null"}]},
                "d": {"oneOf": [{"type": "boolean"}]},
                "e": {"const": "fixed"},
                "f": {"type": "float"},
                "g": {"type": "array"}
            }}}"#,
        );
        assert_eq!(field_type(&model, "a"), &FieldType::optional(FieldType::String));
        assert_eq!(
            field_type(&model, "b"),
            &FieldType::Union(vec![FieldType::Integer, FieldType::Number])
        );
        assert_eq!(
            field_type(&model, "c"),
            &FieldType::Union(vec![FieldType::Integer, FieldType::String, FieldType::Null])
        );
        assert_eq!(field_type(&model, "d"), &FieldType::Boolean);
        assert_eq!(field_type(&model, "e"), &FieldType::enumeration(["fixed"]));
        assert_eq!(field_type(&model, "f"), &FieldType::Number);
        assert_eq!(field_type(&model, "g"), &FieldType::list(FieldType::Unknown));
    }

    #[test]
    fn test_alias_cycle_rejected() {
        assert_matches!(
            parse(
                r##"{"name": "f", "parameters": {"properties": {}, "$defs": {
                    "A": {"$ref": "#/$defs/B"},
                    "B": {"$ref": "#/$defs/A"}
                }}}"##
            ),
            Err(DeserializationError::NonWellFoundedTypeDefinitions(..))
        );
    }

    #[test]
    fn test_recursive_model_definitions_allowed() {
        let model = single(
            r##"{"name": "tree", "parameters": {
                "properties": {"root": {"$ref": "#/$defs/Node"}},
                "$defs": {"Node": {"type": "object", "properties": {
                    "children": {"type": "array", "items": {"$ref": "#/$defs/Node"}}
                }}}
            }}"##,
        );
        assert_eq!(field_type(&model, "root"), &FieldType::reference("Node"));
        let node = model.lookup("Node").unwrap();
        assert_eq!(
            field_type(node, "children"),
            &FieldType::list(FieldType::reference("Node"))
        );
    }

    #[test]
    fn test_bad_refs() {
        assert_matches!(
            parse(r#"{"name": "f", "parameters": {"properties": {"a": {"$ref": "Other"}}}}"#),
            Err(DeserializationError::UnexpectedValue(..))
        );
        assert_matches!(
            parse(
                r##"{"name": "f", "parameters": {"properties": {"a": {"$ref": "#/$defs/Missing"}}}}"##
            ),
            Err(DeserializationError::UnexpectedValue(..))
        );
    }

    #[test]
    fn test_bad_enums() {
        assert_matches!(
            parse(r#"{"name": "f", "parameters": {"properties": {"a": {"enum": []}}}}"#),
            Err(DeserializationError::UnexpectedValue(..))
        );
        assert_matches!(
            parse(r#"{"name": "f", "parameters": {"properties": {"a": {"enum": [1, 2]}}}}"#),
            Err(DeserializationError::UnexpectedType(..))
        );
    }

    #[test]
    fn test_bad_shapes() {
        assert_matches!(parse("42"), Err(DeserializationError::UnexpectedType(..)));
        assert_matches!(
            parse(r#"{"description": "no name"}"#),
            Err(DeserializationError::MissingExpectedAttribute(..))
        );
        assert_matches!(
            parse(r#"{"name": "f", "parameters": {"properties": {"a": {"type": "date"}}}}"#),
            Err(DeserializationError::UnexpectedValue(..))
        );
        assert_matches!(
            parse(r#"{"name": "f", "parameters": {"required": [1]}}"#),
            Err(DeserializationError::UnexpectedType(..))
        );
        assert_matches!(
            parse(r#"{"name": "f", "description": 3}"#),
            Err(DeserializationError::UnexpectedType(..))
        );
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("get_current_weather"), "GetCurrentWeather");
        assert_eq!(pascal_case("already-kebab case"), "AlreadyKebabCase");
        assert_eq!(pascal_case(""), "");
    }
}
