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

mod lib {
    use std::io::Write;

    use cool_asserts::assert_matches;
    use miette::Diagnostic;
    use model_schema_sdk::data::{OutputShape, TypedValue};
    use model_schema_sdk::description::{FieldType, ModelSet};
    use model_schema_sdk::err::{DeserializationError, ValidationError};

    const TOOLS: &str = r##"[
        {
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
        },
        {
            "title": "Book",
            "description": "Represents an entry about a book.",
            "type": "object",
            "properties": {
                "title": {"type": "string"},
                "published_year": {"anyOf": [{"type": "integer"}, {"type": "null"}]},
                "category": {"$ref": "#/$defs/Category"}
            },
            "required": ["title", "published_year", "category"],
            "$defs": {"Category": {"type": "string", "enum": ["Fiction", "Non-Fiction"]}}
        }
    ]"##;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(contents.as_bytes())
            .expect("Failed to write temp file");
        file
    }

    #[test]
    fn deserialize_mixed_file() {
        let file = write_temp(TOOLS);
        let models = ModelSet::from_json_file(file.path()).expect("Failed to read models");
        assert_eq!(
            models.models().iter().map(|m| m.name()).collect::<Vec<_>>(),
            ["get_current_weather", "Book"]
        );
        let book = models.lookup("Book").expect("Book is declared");
        assert_eq!(
            book.field("category").map(|f| f.field_type()),
            Some(&FieldType::enumeration(["Fiction", "Non-Fiction"]))
        );
    }

    #[test]
    fn deserialize_error_points_at_source() {
        let err = ModelSet::from_json_str(
            r#"[{"name": "f", "parameters": {"properties": {"a": {"type": "date"}}}}]"#,
        )
        .expect_err("unknown type name");
        assert_eq!(
            err.code().map(|code| code.to_string()).as_deref(),
            Some("deserialization::unexpected_value")
        );
        assert!(err.source_code().is_some());
        assert_eq!(err.labels().map(Iterator::count), Some(1));
        assert_matches!(err, DeserializationError::UnexpectedValue(..));
    }

    #[test]
    fn decode_wrapped_outputs() {
        let models = ModelSet::from_json_str(TOOLS).expect("Failed to parse models");
        let shape = OutputShape::new()
            .outer_object("function", "params")
            .list_of_outputs(true);
        let outputs = models
            .decode_output(
                r#"[
                    {"function": "get_current_weather", "params": {"location": "London", "unit": "celsius"}},
                    {"function": "Book", "params": {"title": "The Feynman Lectures on Physics", "published_year": null, "category": "Non-Fiction"}}
                ]"#,
                &shape,
            )
            .expect("Outputs should validate");
        assert_eq!(outputs.len(), 2);
        let weather = outputs.first().expect("first output");
        assert_eq!(weather.model(), "get_current_weather");
        assert_matches!(
            weather.instance().get("unit"),
            Some(TypedValue::Enum(unit)) if unit == "celsius"
        );
        let book = outputs.get(1).expect("second output");
        assert_eq!(
            book.instance().to_string(),
            r#"{"title":"The Feynman Lectures on Physics","published_year":null,"category":"Non-Fiction"}"#
        );
    }

    #[test]
    fn decode_rejects_bad_variant() {
        let models = ModelSet::from_json_str(TOOLS).expect("Failed to parse models");
        let shape = OutputShape::new().outer_object("function", "params");
        assert_matches!(
            models.decode_output(
                r#"{"function": "get_current_weather", "params": {"location": "Paris", "unit": "kelvin"}}"#,
                &shape,
            ),
            Err(ValidationError::InvalidEnumVariant { .. })
        );
    }
}
