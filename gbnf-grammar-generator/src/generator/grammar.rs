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
use std::collections::{BTreeSet, HashMap};

use model_schema_sdk::data::json_string_literal;
use model_schema_sdk::description::{FieldDeclaration, FieldType, ModelDeclaration};
use nonempty::NonEmpty;
use smol_str::SmolStr;
use tracing::{debug, trace};

use crate::gbnf::rules::{Alternatives, RuleSet, Sequence, Term};

use super::config::GrammarGeneratorConfig;
use super::documentation::document;
use super::err::GrammarGeneratorError;
use super::identifiers::{child_rule_name, rule_name, RESERVED, ROOT};
use super::index::ModelIndex;
use super::primitives::Primitive;

/// A grammar together with the documentation describing the outputs it accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedGrammar {
    rules: RuleSet,
    documentation: String,
}

impl GeneratedGrammar {
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The grammar as GBNF text
    pub fn grammar(&self) -> String {
        self.rules.to_string()
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    /// Split into the GBNF text and the documentation
    pub fn into_parts(self) -> (String, String) {
        (self.rules.to_string(), self.documentation)
    }
}

/// Compiles model declarations into a GBNF grammar constraining a decoder to
/// JSON outputs of those models, and into documentation of the same outputs
/// to embed in a prompt.
///
/// Generation is a pure function of the declarations and the configuration:
/// it either fully succeeds or fails without partial output.
#[derive(Debug, Clone)]
pub struct GrammarGenerator {
    config: GrammarGeneratorConfig,
}

impl Default for GrammarGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarGenerator {
    /// Create a `GrammarGenerator` using default configuration
    pub fn new() -> Self {
        Self::new_with_config(GrammarGeneratorConfig::default())
    }

    /// Create a `GrammarGenerator` using specified configuration
    pub fn new_with_config(config: GrammarGeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GrammarGeneratorConfig {
        &self.config
    }

    /// Generate the grammar and documentation for `models`
    pub fn generate(
        &self,
        models: &[ModelDeclaration],
    ) -> Result<GeneratedGrammar, GrammarGeneratorError> {
        let index = ModelIndex::new(models)?;
        let rules = RuleBuilder::new(&self.config, &index).build()?;
        let documentation = document(&self.config, &index);
        debug!(
            models = models.len(),
            supporting_models = index.supporting().len(),
            rules = rules.len(),
            "Generated grammar"
        );
        Ok(GeneratedGrammar {
            rules,
            documentation,
        })
    }

    /// Generate only the documentation for `models`. Fails under the same
    /// conditions as [`GrammarGenerator::generate`].
    pub fn generate_documentation(
        &self,
        models: &[ModelDeclaration],
    ) -> Result<String, GrammarGeneratorError> {
        self.generate(models).map(|generated| generated.documentation)
    }
}

/// Generate the GBNF grammar text and documentation for `models`
pub fn generate_grammar_and_documentation(
    models: &[ModelDeclaration],
    config: &GrammarGeneratorConfig,
) -> Result<(String, String), GrammarGeneratorError> {
    GrammarGenerator::new_with_config(config.clone())
        .generate(models)
        .map(GeneratedGrammar::into_parts)
}

/// Generate the documentation for `models`
pub fn generate_documentation(
    models: &[ModelDeclaration],
    config: &GrammarGeneratorConfig,
) -> Result<String, GrammarGeneratorError> {
    GrammarGenerator::new_with_config(config.clone()).generate_documentation(models)
}

/// The model and field an auxiliary rule is generated for
#[derive(Debug, Clone, Copy)]
struct FieldContext<'a> {
    model: &'a ModelDeclaration,
    field: &'a FieldDeclaration,
}

impl FieldContext<'_> {
    fn owner(&self) -> String {
        format!("field `{}.{}`", self.model.name(), self.field.name())
    }

    fn unsupported(&self, reason: &str) -> GrammarGeneratorError {
        GrammarGeneratorError::unsupported_type(self.model.name(), self.field.name(), reason)
    }
}

/// A `"key": value` member of an object rule
#[derive(Debug)]
struct Member {
    required: bool,
    terms: Vec<Term>,
}

#[derive(Debug)]
struct RuleBuilder<'a> {
    config: &'a GrammarGeneratorConfig,
    index: &'a ModelIndex<'a>,
    /// Description of whatever produced each claimed rule name
    owners: HashMap<SmolStr, String>,
    /// Model rules, each followed by its auxiliary rules
    model_rules: Vec<(SmolStr, Alternatives)>,
    primitives: BTreeSet<Primitive>,
}

impl<'a> RuleBuilder<'a> {
    fn new(config: &'a GrammarGeneratorConfig, index: &'a ModelIndex<'a>) -> Self {
        let owners = RESERVED
            .iter()
            .map(|name| (SmolStr::new_static(name), format!("the built-in `{name}` rule")))
            .collect();
        Self {
            config,
            index,
            owners,
            model_rules: Vec::new(),
            primitives: BTreeSet::new(),
        }
    }

    fn claim(&mut self, name: &SmolStr, owner: String) -> Result<(), GrammarGeneratorError> {
        match self.owners.entry(name.clone()) {
            Entry::Occupied(existing) => Err(GrammarGeneratorError::name_collision(
                name.clone(),
                existing.get().clone(),
                owner,
            )),
            Entry::Vacant(slot) => {
                slot.insert(owner);
                Ok(())
            }
        }
    }

    fn primitive(&mut self, primitive: Primitive) -> Term {
        self.primitives.insert(primitive);
        Term::rule(primitive.name())
    }

    fn ws(&mut self) -> Term {
        self.primitive(Primitive::Ws)
    }

    fn build(mut self) -> Result<RuleSet, GrammarGeneratorError> {
        // Models claim their names before any wrapper or auxiliary rule, so a
        // clash between two models names both models.
        let index = self.index;
        let config = self.config;
        for model in index.all() {
            self.claim(&rule_name(model.name()), format!("model `{}`", model.name()))?;
        }

        let mut wrappers = Vec::new();
        let mut items = Vec::new();
        for &model in index.top_level() {
            match &config.outer_object_name {
                Some(outer) => {
                    let (name, body) = self.wrapper_rule(model, outer)?;
                    items.push(name.clone());
                    wrappers.push((name, body));
                }
                None => items.push(rule_name(model.name())),
            }
        }

        for model in index.all() {
            self.model_rule(model)?;
        }

        let root = self.root_rule(items)?;

        let mut rules = RuleSet::new();
        rules.insert(ROOT, root)?;
        for (name, body) in wrappers.into_iter().chain(self.model_rules) {
            trace!(rule = %name, "Adding rule");
            rules.insert(name, body)?;
        }
        for primitive in Primitive::ALL {
            if self.primitives.contains(&primitive) {
                rules.insert(primitive.name(), primitive.body())?;
            }
        }
        rules.check_references()?;
        Ok(rules)
    }

    fn root_rule(&mut self, items: Vec<SmolStr>) -> Result<Alternatives, GrammarGeneratorError> {
        let item = match items.as_slice() {
            [single] => Term::rule(single.clone()),
            _ => Term::group(
                Alternatives::from_vec(
                    items
                        .into_iter()
                        .map(|name| Sequence::new(vec![Term::rule(name)]))
                        .collect(),
                )
                .ok_or(GrammarGeneratorError::NoModels)?,
            ),
        };
        let terms = if self.config.list_of_outputs {
            let separator = vec![self.ws(), Term::literal(","), self.ws(), item.clone()];
            vec![
                self.ws(),
                Term::literal("["),
                self.ws(),
                item,
                Term::group_sequence(separator).zero_or_more(),
                self.ws(),
                Term::literal("]"),
                self.ws(),
            ]
        } else {
            vec![self.ws(), item, self.ws()]
        };
        Ok(Alternatives::single(Sequence::new(terms)))
    }

    /// `{"<outer>": "<Model>", "<content>": <model>}`
    fn wrapper_rule(
        &mut self,
        model: &ModelDeclaration,
        outer: &str,
    ) -> Result<(SmolStr, Alternatives), GrammarGeneratorError> {
        let model_rule = rule_name(model.name());
        let name = child_rule_name(&model_rule, outer);
        self.claim(
            &name,
            format!("the `{outer}` wrapper of model `{}`", model.name()),
        )?;
        let content = self.config.outer_object_content.clone();
        let terms = vec![
            Term::literal("{"),
            self.ws(),
            Term::literal(json_string_literal(outer)),
            self.ws(),
            Term::literal(":"),
            self.ws(),
            Term::literal(json_string_literal(model.name())),
            self.ws(),
            Term::literal(","),
            self.ws(),
            Term::literal(json_string_literal(&content)),
            self.ws(),
            Term::literal(":"),
            self.ws(),
            Term::Rule(model_rule),
            self.ws(),
            Term::literal("}"),
        ];
        Ok((name, Alternatives::single(Sequence::new(terms))))
    }

    fn model_rule(&mut self, model: &ModelDeclaration) -> Result<(), GrammarGeneratorError> {
        let name = rule_name(model.name());
        let slot = self.model_rules.len();
        let mut members = Vec::new();
        for field in model.fields() {
            let cx = FieldContext { model, field };
            let path = child_rule_name(&name, field.name());
            let value = self.value_term(cx, field.field_type(), path)?;
            let terms = vec![
                Term::literal(json_string_literal(field.name())),
                self.ws(),
                Term::literal(":"),
                self.ws(),
                value,
            ];
            members.push(Member {
                required: field.is_required(),
                terms,
            });
        }

        let mut terms = vec![Term::literal("{"), self.ws()];
        if !members.is_empty() {
            terms.extend(self.leading(&members));
            terms.push(self.ws());
        }
        terms.push(Term::literal("}"));
        self.model_rules
            .insert(slot, (name, Alternatives::single(Sequence::new(terms))));
        Ok(())
    }

    /// The members of an object in declared order. Optional members may be
    /// left out; the object may only be empty if every member is optional.
    fn leading(&mut self, members: &[Member]) -> Vec<Term> {
        if members.iter().any(|member| member.required) {
            self.leading_non_empty(members)
        } else {
            let terms = self.leading_non_empty(members);
            if terms.is_empty() {
                terms
            } else {
                vec![Term::group_sequence(terms).optional()]
            }
        }
    }

    /// Like `leading`, but at least one member is present
    fn leading_non_empty(&mut self, members: &[Member]) -> Vec<Term> {
        let Some((first, rest)) = members.split_first() else {
            return Vec::new();
        };
        let mut with_first = first.terms.clone();
        with_first.extend(self.trailing(rest));
        if first.required || rest.is_empty() {
            return with_first;
        }
        let without_first = self.leading_non_empty(rest);
        let mut alternatives = NonEmpty::new(Sequence::new(with_first));
        alternatives.push(Sequence::new(without_first));
        vec![Term::group(Alternatives::new(alternatives))]
    }

    /// Members following one that is present, each preceded by a comma
    fn trailing(&mut self, members: &[Member]) -> Vec<Term> {
        let mut terms = Vec::new();
        for member in members {
            let mut member_terms = vec![self.ws(), Term::literal(","), self.ws()];
            member_terms.extend(member.terms.iter().cloned());
            if member.required {
                terms.extend(member_terms);
            } else {
                terms.push(Term::group_sequence(member_terms).optional());
            }
        }
        terms
    }

    /// Add an auxiliary rule named `path`, built after its name is claimed so
    /// that it comes before any rule it depends on
    fn aux_rule(
        &mut self,
        cx: FieldContext<'_>,
        path: SmolStr,
        build: impl FnOnce(&mut Self, &SmolStr) -> Result<Alternatives, GrammarGeneratorError>,
    ) -> Result<Term, GrammarGeneratorError> {
        self.claim(&path, cx.owner())?;
        let slot = self.model_rules.len();
        let body = build(self, &path)?;
        trace!(rule = %path, field = %cx.field.name(), "Generated auxiliary rule");
        self.model_rules.insert(slot, (path.clone(), body));
        Ok(Term::Rule(path))
    }

    /// The production for a value of `field_type`.
    ///
    /// Enum variants match only their `json_string_literal` spelling. An
    /// equivalent escaped spelling such as `"a\/b"` or `"\u00e9"` is rejected.
    fn value_term(
        &mut self,
        cx: FieldContext<'_>,
        field_type: &FieldType,
        path: SmolStr,
    ) -> Result<Term, GrammarGeneratorError> {
        match field_type {
            FieldType::String => Ok(self.primitive(Primitive::String)),
            FieldType::Integer => Ok(self.primitive(Primitive::Integer)),
            FieldType::Number => Ok(self.primitive(Primitive::Number)),
            FieldType::Boolean => Ok(self.primitive(Primitive::Boolean)),
            FieldType::Null => Ok(self.primitive(Primitive::Null)),
            FieldType::Enum { variants } => {
                let literals = variants
                    .iter()
                    .map(|variant| {
                        Sequence::new(vec![Term::literal(json_string_literal(variant))])
                    })
                    .collect();
                let body = Alternatives::from_vec(literals)
                    .ok_or_else(|| cx.unsupported("enum has no variants"))?;
                self.aux_rule(cx, path, |_, _| Ok(body))
            }
            FieldType::Optional(inner) => self.aux_rule(cx, path, |this, path| {
                let value = this.value_term(cx, inner, child_rule_name(path, "value"))?;
                let null = this.primitive(Primitive::Null);
                let mut alternatives = NonEmpty::new(Sequence::new(vec![value]));
                alternatives.push(Sequence::new(vec![null]));
                Ok(Alternatives::new(alternatives))
            }),
            FieldType::List(element) => self.aux_rule(cx, path, |this, path| {
                let item = this.value_term(cx, element, child_rule_name(path, "item"))?;
                let separator = vec![this.ws(), Term::literal(","), this.ws(), item.clone()];
                let items = Term::group_sequence(vec![
                    item,
                    Term::group_sequence(separator).zero_or_more(),
                ])
                .optional();
                Ok(Alternatives::single(Sequence::new(vec![
                    Term::literal("["),
                    this.ws(),
                    items,
                    this.ws(),
                    Term::literal("]"),
                ])))
            }),
            FieldType::Union(members) => {
                if members.is_empty() {
                    return Err(cx.unsupported("union has no members"));
                }
                self.aux_rule(cx, path, |this, path| {
                    let mut options = Vec::with_capacity(members.len());
                    for (i, member) in members.iter().enumerate() {
                        let option_path = child_rule_name(path, &format!("option-{}", i + 1));
                        let value = this.value_term(cx, member, option_path)?;
                        options.push(Sequence::new(vec![value]));
                    }
                    Alternatives::from_vec(options)
                        .ok_or_else(|| cx.unsupported("union has no members"))
                })
            }
            FieldType::Model(model) => Ok(Term::Rule(rule_name(model.name()))),
            FieldType::Ref(name) => match self.index.get(name) {
                Some(model) => Ok(Term::Rule(rule_name(model.name()))),
                None => Err(GrammarGeneratorError::undefined_model(
                    name.clone(),
                    cx.model.name(),
                )),
            },
            FieldType::Unknown => Err(cx.unsupported("type has no grammar production")),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gbnf::parse_gbnf;
    use crate::gbnf::recognizer::Recognizer;
    use cool_asserts::assert_matches;

    fn field(name: &str, required: bool, field_type: FieldType) -> FieldDeclaration {
        FieldDeclaration::new(name, required, field_type, None)
    }

    fn calculator() -> ModelDeclaration {
        ModelDeclaration::new(
            "Calculator",
            vec![
                field("number_one", true, FieldType::Number),
                field(
                    "operation",
                    true,
                    FieldType::enumeration(["add", "subtract", "multiply", "divide"]),
                ),
                field("number_two", true, FieldType::Number),
            ],
            Some("Perform a math operation on two numbers.".into()),
        )
    }

    fn generate(models: &[ModelDeclaration], config: GrammarGeneratorConfig) -> GeneratedGrammar {
        GrammarGenerator::new_with_config(config)
            .generate(models)
            .unwrap()
    }

    fn assert_accepts(generated: &GeneratedGrammar, input: &str) {
        let recognizer = Recognizer::new(generated.rules()).unwrap();
        assert!(
            recognizer.accepts(input),
            "expected grammar to accept {input}\n{}",
            generated.grammar()
        );
    }

    fn assert_rejects(generated: &GeneratedGrammar, input: &str) {
        let recognizer = Recognizer::new(generated.rules()).unwrap();
        assert!(
            !recognizer.accepts(input),
            "expected grammar to reject {input}\n{}",
            generated.grammar()
        );
    }

    #[test]
    fn calculator_grammar() {
        let generated = generate(&[calculator()], GrammarGeneratorConfig::default());
        let grammar = generated.grammar();
        let lines: Vec<_> = grammar.lines().collect();
        assert_eq!(
            lines,
            vec![
                "root ::= ws calculator ws",
                r#"calculator ::= "{" ws "\"number_one\"" ws ":" ws number ws "," ws "\"operation\"" ws ":" ws calculator-operation ws "," ws "\"number_two\"" ws ":" ws number ws "}""#,
                r#"calculator-operation ::= "\"add\"" | "\"subtract\"" | "\"multiply\"" | "\"divide\"""#,
                r"ws ::= [ \t\n]*",
                r#"number ::= "-"? ( "0" | [1-9] [0-9]* ) ( "." [0-9]+ )? ( [eE] [\-+]? [0-9]+ )?"#,
            ]
        );
    }

    #[test]
    fn calculator_outputs() {
        let generated = generate(&[calculator()], GrammarGeneratorConfig::default());
        assert_accepts(
            &generated,
            r#"{"number_one": 42, "operation": "multiply", "number_two": 42}"#,
        );
        assert_accepts(
            &generated,
            "\n{\n  \"number_one\": -1.5e3,\n  \"operation\": \"add\",\n  \"number_two\": 0\n}\n",
        );
        assert_rejects(&generated, r#"{"operation": "multiply"}"#);
        assert_rejects(
            &generated,
            r#"{"number_one": 42, "operation": "modulo", "number_two": 42}"#,
        );
        assert_rejects(
            &generated,
            r#"{"number_two": 42, "operation": "add", "number_one": 42}"#,
        );
    }

    #[test]
    fn enum_is_exactly_its_variants() {
        let generated = generate(&[calculator()], GrammarGeneratorConfig::default());
        let recognizer = Recognizer::new(generated.rules()).unwrap();
        for variant in ["\"add\"", "\"subtract\"", "\"multiply\"", "\"divide\""] {
            assert!(recognizer.accepts_rule("calculator-operation", variant));
        }
        for other in ["\"Add\"", "\"\"", "add", "\"add \""] {
            assert!(!recognizer.accepts_rule("calculator-operation", other));
        }
        assert_matches!(generated.rules().get("calculator-operation"), Some(alts) => {
            assert_eq!(alts.iter().count(), 4);
        });
    }

    #[test]
    fn enum_variants_match_canonical_spelling_only() {
        let model = ModelDeclaration::new(
            "Path",
            vec![field("kind", true, FieldType::enumeration(["a/b", "caf\u{e9}"]))],
            None,
        );
        let generated = generate(&[model], GrammarGeneratorConfig::default());
        let recognizer = Recognizer::new(generated.rules()).unwrap();
        assert!(recognizer.accepts_rule("path-kind", r#""a/b""#));
        assert!(recognizer.accepts_rule("path-kind", "\"caf\u{e9}\""));
        assert!(!recognizer.accepts_rule("path-kind", r#""a\/b""#));
        assert!(!recognizer.accepts_rule("path-kind", r#""caf\u00e9""#));
    }

    #[test]
    fn optional_members() {
        let model = ModelDeclaration::new(
            "Mixed",
            vec![
                field("a", false, FieldType::String),
                field("b", true, FieldType::Integer),
                field("c", false, FieldType::Boolean),
            ],
            None,
        );
        let generated = generate(&[model], GrammarGeneratorConfig::default());
        assert_accepts(&generated, r#"{"b": 1}"#);
        assert_accepts(&generated, r#"{"a": "x", "b": 1}"#);
        assert_accepts(&generated, r#"{"b": 1, "c": true}"#);
        assert_accepts(&generated, r#"{"a": "x", "b": 1, "c": false}"#);
        assert_rejects(&generated, "{}");
        assert_rejects(&generated, r#"{"a": "x"}"#);
        assert_rejects(&generated, r#"{"b": 1, "a": "x"}"#);
        assert_rejects(&generated, r#"{, "b": 1}"#);
        assert_rejects(&generated, r#"{"b": 1,}"#);
    }

    #[test]
    fn all_optional_members() {
        let model = ModelDeclaration::new(
            "Options",
            vec![
                field("a", false, FieldType::String),
                field("b", false, FieldType::Integer),
            ],
            None,
        );
        let generated = generate(&[model], GrammarGeneratorConfig::default());
        assert_accepts(&generated, "{}");
        assert_accepts(&generated, "{ }");
        assert_accepts(&generated, r#"{"a": "x"}"#);
        assert_accepts(&generated, r#"{"b": 2}"#);
        assert_accepts(&generated, r#"{"a": "x", "b": 2}"#);
        assert_rejects(&generated, "{,}");
        assert_rejects(&generated, r#"{"b": 2, "a": "x"}"#);
    }

    #[test]
    fn optional_types_accept_null() {
        let model = ModelDeclaration::new(
            "Book",
            vec![field(
                "published_year",
                true,
                FieldType::optional(FieldType::Integer),
            )],
            None,
        );
        let generated = generate(&[model], GrammarGeneratorConfig::default());
        assert!(generated
            .grammar()
            .contains("book-published-year ::= integer | null\n"));
        assert_accepts(&generated, r#"{"published_year": 1999}"#);
        assert_accepts(&generated, r#"{"published_year": null}"#);
        assert_rejects(&generated, "{}");
    }

    #[test]
    fn composite_types() {
        let pet = ModelDeclaration::new("Pet", vec![field("kind", true, FieldType::String)], None);
        let model = ModelDeclaration::new(
            "Owner",
            vec![
                field(
                    "tags",
                    true,
                    FieldType::list(FieldType::enumeration(["new", "old"])),
                ),
                field(
                    "age",
                    true,
                    FieldType::Union(vec![FieldType::Integer, FieldType::String]),
                ),
                field("pet", true, FieldType::model(pet)),
                field("best_friend", false, FieldType::optional(FieldType::reference("Owner"))),
            ],
            None,
        );
        let generated = generate(&[model], GrammarGeneratorConfig::default());
        let names: Vec<_> = generated.rules().names().map(SmolStr::as_str).collect();
        assert_eq!(
            names,
            vec![
                "root",
                "owner",
                "owner-tags",
                "owner-tags-item",
                "owner-age",
                "owner-best-friend",
                "pet",
                "ws",
                "string",
                "integer",
                "null",
            ]
        );
        assert!(generated
            .grammar()
            .contains("owner-age ::= integer | string\n"));
        assert_accepts(
            &generated,
            r#"{"tags": ["new", "old"], "age": 3, "pet": {"kind": "cat"}}"#,
        );
        assert_accepts(
            &generated,
            r#"{"tags": [], "age": "three", "pet": {"kind": "cat"}, "best_friend": {"tags": [ ], "age": 4, "pet": {"kind": "dog"}, "best_friend": null}}"#,
        );
        assert_rejects(
            &generated,
            r#"{"tags": ["new",], "age": 3, "pet": {"kind": "cat"}}"#,
        );
        assert_rejects(
            &generated,
            r#"{"tags": ["young"], "age": 3, "pet": {"kind": "cat"}}"#,
        );
        assert_rejects(
            &generated,
            r#"{"tags": [], "age": true, "pet": {"kind": "cat"}}"#,
        );
    }

    #[test]
    fn nested_aux_rules_come_before_their_parts() {
        let model = ModelDeclaration::new(
            "Grid",
            vec![field(
                "rows",
                true,
                FieldType::list(FieldType::list(FieldType::Union(vec![
                    FieldType::Integer,
                    FieldType::enumeration(["x"]),
                ]))),
            )],
            None,
        );
        let generated = generate(&[model], GrammarGeneratorConfig::default());
        let names: Vec<_> = generated.rules().names().map(SmolStr::as_str).collect();
        assert_eq!(
            names,
            vec![
                "root",
                "grid",
                "grid-rows",
                "grid-rows-item",
                "grid-rows-item-item",
                "grid-rows-item-item-option-2",
                "ws",
                "integer",
            ]
        );
        assert_accepts(&generated, r#"{"rows": [[1, "x"], [], ["x"]]}"#);
    }

    #[test]
    fn models_without_fields() {
        let generated = generate(
            &[ModelDeclaration::new("get_current_datetime", vec![], None)],
            GrammarGeneratorConfig::default(),
        );
        assert!(generated
            .grammar()
            .contains("get-current-datetime ::= \"{\" ws \"}\"\n"));
        assert_accepts(&generated, "{}");
        assert_rejects(&generated, r#"{"x": 1}"#);
    }

    #[test]
    fn wrapped_outputs() {
        let config = GrammarGeneratorConfig::default()
            .outer_object_name(Some("function".into()))
            .outer_object_content("function_parameters");
        let generated = generate(&[calculator()], config);
        let grammar = generated.grammar();
        assert!(grammar.starts_with("root ::= ws calculator-function ws\n"));
        assert!(grammar.contains(
            r#"calculator-function ::= "{" ws "\"function\"" ws ":" ws "\"Calculator\"" ws "," ws "\"function_parameters\"" ws ":" ws calculator ws "}""#
        ));
        assert_accepts(
            &generated,
            r#"{"function": "Calculator", "function_parameters": {"number_one": 1, "operation": "add", "number_two": 2}}"#,
        );
        assert_rejects(
            &generated,
            r#"{"number_one": 1, "operation": "add", "number_two": 2}"#,
        );
        assert_rejects(
            &generated,
            r#"{"function": "calculator", "function_parameters": {"number_one": 1, "operation": "add", "number_two": 2}}"#,
        );
    }

    #[test]
    fn list_of_outputs() {
        let noop = ModelDeclaration::new("get_current_datetime", vec![], None);
        let config = GrammarGeneratorConfig::default()
            .outer_object_name(Some("function".into()))
            .list_of_outputs(true);
        let generated = generate(&[calculator(), noop], config);
        assert!(generated.grammar().starts_with(
            r#"root ::= ws "[" ws ( calculator-function | get-current-datetime-function ) ( ws "," ws ( calculator-function | get-current-datetime-function ) )* ws "]" ws"#
        ));
        assert_accepts(
            &generated,
            r#"[{"function": "get_current_datetime", "params": {}}]"#,
        );
        assert_accepts(
            &generated,
            r#"[{"function": "Calculator", "params": {"number_one": 1, "operation": "divide", "number_two": 2}}, {"function": "get_current_datetime", "params": {}}]"#,
        );
        assert_rejects(&generated, "[]");
        assert_rejects(&generated, r#"{"function": "get_current_datetime", "params": {}}"#);
        assert_rejects(
            &generated,
            r#"[{"function": "get_current_datetime", "params": {}},]"#,
        );
    }

    #[test]
    fn list_of_unwrapped_outputs() {
        let config = GrammarGeneratorConfig::default().list_of_outputs(true);
        let generated = generate(&[calculator()], config);
        assert_accepts(
            &generated,
            r#"[{"number_one": 1, "operation": "add", "number_two": 2}, {"number_one": 3, "operation": "subtract", "number_two": 4}]"#,
        );
        assert_rejects(&generated, "[]");
    }

    #[test]
    fn rendered_grammar_parses_back() {
        let config = GrammarGeneratorConfig::default()
            .outer_object_name(Some("function".into()))
            .list_of_outputs(true);
        let model = ModelDeclaration::new(
            "Everything",
            vec![
                field("s", false, FieldType::String),
                field("n", false, FieldType::optional(FieldType::Number)),
                field("b", true, FieldType::Boolean),
                field("e", false, FieldType::list(FieldType::enumeration(["a\"b", "c\\d"]))),
            ],
            None,
        );
        let generated = generate(&[model], config);
        assert_eq!(&parse_gbnf(&generated.grammar()).unwrap(), generated.rules());
        assert!(generated.rules().unreachable_rules().is_empty());
        assert_accepts(
            &generated,
            r#"[{"function": "Everything", "params": {"b": true, "e": ["a\"b", "c\\d"]}}]"#,
        );
    }

    #[test]
    fn unsupported_types() {
        for (field_type, reason) in [
            (FieldType::Unknown, "type has no grammar production"),
            (FieldType::enumeration(Vec::<SmolStr>::new()), "enum has no variants"),
            (FieldType::Union(vec![]), "union has no members"),
            (FieldType::list(FieldType::Unknown), "type has no grammar production"),
        ] {
            let model = ModelDeclaration::new("Bad", vec![field("value", true, field_type)], None);
            assert_matches!(
                GrammarGenerator::new().generate(&[model]),
                Err(GrammarGeneratorError::UnsupportedType { model, field, reason: found }) => {
                    assert_eq!(model, "Bad");
                    assert_eq!(field, "value");
                    assert_eq!(found, reason);
                }
            );
        }
    }

    #[test]
    fn undefined_references() {
        let model = ModelDeclaration::new(
            "Owner",
            vec![field("pet", true, FieldType::reference("Pet"))],
            None,
        );
        assert_matches!(
            GrammarGenerator::new().generate(&[model]),
            Err(GrammarGeneratorError::UndefinedModel { name, referenced_by }) => {
                assert_eq!(name, "Pet");
                assert_eq!(referenced_by, "Owner");
            }
        );
    }

    #[test]
    fn references_to_top_level_models() {
        let pet = ModelDeclaration::new("Pet", vec![field("kind", true, FieldType::String)], None);
        let owner = ModelDeclaration::new(
            "Owner",
            vec![field("pet", true, FieldType::reference("Pet"))],
            None,
        );
        let generated = generate(&[owner, pet], GrammarGeneratorConfig::default());
        assert!(generated.grammar().starts_with("root ::= ws ( owner | pet ) ws\n"));
        assert_accepts(&generated, r#"{"pet": {"kind": "cat"}}"#);
        assert_accepts(&generated, r#"{"kind": "cat"}"#);
    }

    #[test]
    fn colliding_model_names() {
        let models = [
            ModelDeclaration::new("SendMessage", vec![], None),
            ModelDeclaration::new("send_message", vec![], None),
        ];
        assert_matches!(
            GrammarGenerator::new().generate(&models),
            Err(GrammarGeneratorError::NameCollision { name, first, second }) => {
                assert_eq!(name, "send-message");
                assert_eq!(first, "model `SendMessage`");
                assert_eq!(second, "model `send_message`");
            }
        );
    }

    #[test]
    fn non_ascii_names_stay_distinct() {
        let models = [
            ModelDeclaration::new(
                "日本",
                vec![
                    field("都市", true, FieldType::enumeration(["東京", "大阪"])),
                    field("人口", true, FieldType::list(FieldType::Integer)),
                ],
                None,
            ),
            ModelDeclaration::new("中国", vec![], None),
        ];
        let generated = generate(&models, GrammarGeneratorConfig::default());
        assert!(generated
            .grammar()
            .starts_with("root ::= ws ( x65e5-x672c | x4e2d-x56fd ) ws\n"));
        assert!(generated.rules().contains("x65e5-x672c-x90fd-x5e02"));
        assert!(generated.rules().contains("x65e5-x672c-x4eba-x53e3"));
        assert_accepts(&generated, r#"{"都市": "東京", "人口": [1, 2]}"#);
        assert_accepts(&generated, "{}");
        assert_eq!(&parse_gbnf(&generated.grammar()).unwrap(), generated.rules());
    }

    #[test]
    fn models_cannot_use_builtin_names() {
        let models = [ModelDeclaration::new("String", vec![], None)];
        assert_matches!(
            GrammarGenerator::new().generate(&models),
            Err(GrammarGeneratorError::NameCollision { name, first, .. }) => {
                assert_eq!(name, "string");
                assert_eq!(first, "the built-in `string` rule");
            }
        );
    }

    #[test]
    fn auxiliary_rules_collide_with_models() {
        let models = [
            ModelDeclaration::new(
                "Book",
                vec![field("keywords", true, FieldType::list(FieldType::String))],
                None,
            ),
            ModelDeclaration::new("BookKeywords", vec![], None),
        ];
        assert_matches!(
            GrammarGenerator::new().generate(&models),
            Err(GrammarGeneratorError::NameCollision { name, first, second }) => {
                assert_eq!(name, "book-keywords");
                assert_eq!(first, "model `BookKeywords`");
                assert_eq!(second, "field `Book.keywords`");
            }
        );
    }

    #[test]
    fn wrappers_collide_with_models() {
        let models = [
            ModelDeclaration::new("Calculator", vec![], None),
            ModelDeclaration::new("CalculatorFunction", vec![], None),
        ];
        let config = GrammarGeneratorConfig::default().outer_object_name(Some("function".into()));
        assert_matches!(
            GrammarGenerator::new_with_config(config).generate(&models),
            Err(GrammarGeneratorError::NameCollision { name, second, .. }) => {
                assert_eq!(name, "calculator-function");
                assert_eq!(second, "the `function` wrapper of model `Calculator`");
            }
        );
    }

    #[test]
    fn no_models() {
        assert_matches!(
            GrammarGenerator::new().generate(&[]),
            Err(GrammarGeneratorError::NoModels)
        );
    }

    #[test]
    fn free_functions_match_generator() {
        let config = GrammarGeneratorConfig::default();
        let (grammar, documentation) =
            generate_grammar_and_documentation(&[calculator()], &config).unwrap();
        let generated = generate(&[calculator()], config.clone());
        assert_eq!(grammar, generated.grammar());
        assert_eq!(documentation, generated.documentation());
        assert_eq!(
            generate_documentation(&[calculator()], &config).unwrap(),
            documentation
        );
        assert!(documentation.starts_with("Output Model: Calculator\n"));
    }
}
