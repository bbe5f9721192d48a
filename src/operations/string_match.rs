/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::Arc;

use crate::condition::Rule;
use crate::config::SearchConfig;
use crate::fragment::{self, BLOCK_END, FILTER_NOT_EXISTS_START, FILTER_OR, STATEMENT_SEPARATOR};

use super::{bind_property, regex_test, SearchOperation, STRING_MATCH_PRIORITY};

const OPERATORS: &[&str] = &[
    "contains",
    "does_not_contain",
    "starts_with",
    "does_not_start_with",
    "ends_with",
    "does_not_end_with",
    "not_equals",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Anchor {
    None,
    Start,
    End,
    Both,
}

impl Anchor {
    fn pattern(self, value: &str) -> String {
        let escaped = fragment::escape_regex(value);
        match self {
            Anchor::None => escaped,
            Anchor::Start => format!("^{}", escaped),
            Anchor::End => format!("{}$", escaped),
            Anchor::Both => format!("^{}$", escaped),
        }
    }
}

/// Appends the property binding and a filter matching any of the values.
pub(crate) fn build_matches(
    builder: &mut String,
    config: &SearchConfig,
    field: &str,
    values: &[&str],
    anchor: Anchor,
) -> bool {
    if values.is_empty() {
        return false;
    }
    let mut fragment = String::new();
    let Some(variable) = bind_property(&mut fragment, config, field) else {
        return false;
    };
    let tests: Vec<String> = values
        .iter()
        .map(|value| regex_test(&variable, &anchor.pattern(value)))
        .collect();
    fragment::emit_filter(&mut fragment, &tests.join(FILTER_OR));
    builder.push_str(&fragment);
    true
}

/// Text matching on literal properties. The negated operators also accept
/// instances that do not have the property.
pub struct StringMatchSearchOperation {
    config: Arc<SearchConfig>,
}

impl StringMatchSearchOperation {
    pub fn new(config: Arc<SearchConfig>) -> Self {
        Self { config }
    }
}

impl SearchOperation for StringMatchSearchOperation {
    fn name(&self) -> &'static str {
        "string_match"
    }

    fn priority(&self) -> i32 {
        STRING_MATCH_PRIORITY
    }

    fn is_applicable(&self, rule: &Rule) -> bool {
        rule.operator_in(OPERATORS) && rule.is_string_type()
    }

    fn build(&self, builder: &mut String, rule: &Rule) {
        let values: Vec<&str> = rule.non_blank_values().collect();
        let (anchor, negated) = if rule.operator_is("starts_with") {
            (Anchor::Start, false)
        } else if rule.operator_is("does_not_start_with") {
            (Anchor::Start, true)
        } else if rule.operator_is("ends_with") {
            (Anchor::End, false)
        } else if rule.operator_is("does_not_end_with") {
            (Anchor::End, true)
        } else if rule.operator_is("not_equals") {
            (Anchor::Both, true)
        } else if rule.operator_is("does_not_contain") {
            (Anchor::None, true)
        } else {
            (Anchor::None, false)
        };

        if !negated {
            build_matches(builder, &self.config, &rule.field, &values, anchor);
            return;
        }

        let mut inner = String::new();
        if build_matches(&mut inner, &self.config, &rule.field, &values, anchor) {
            builder.push_str(FILTER_NOT_EXISTS_START);
            builder.push_str(&inner);
            builder.push_str(BLOCK_END);
            builder.push_str(STATEMENT_SEPARATOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(rule: &Rule) -> String {
        let op = StringMatchSearchOperation::new(Arc::new(SearchConfig::default()));
        assert!(op.is_applicable(rule));
        let mut builder = String::new();
        op.build(&mut builder, rule);
        builder
    }

    #[test]
    fn test_contains_any_value() {
        let fragment = build(&Rule::new("dcterms:title", "contains", "string", ["report", "memo"]));
        assert!(fragment.starts_with("?instance dcterms:title ?title_"));
        assert!(fragment.contains("\"report\", \"i\")"));
        assert!(fragment.contains(" || "));
    }

    #[test]
    fn test_anchors() {
        assert!(build(&Rule::new("dcterms:title", "starts_with", "string", ["ab"])).contains("\"^ab\""));
        assert!(build(&Rule::new("dcterms:title", "ends_with", "string", ["ab"])).contains("\"ab$\""));
    }

    #[test]
    fn test_regex_meta_characters_are_escaped() {
        let fragment = build(&Rule::new("dcterms:title", "contains", "string", ["v1.0 (draft)"]));
        assert!(fragment.contains(r#""v1\\.0 \\(draft\\)""#));
    }

    #[test]
    fn test_negated_operators_use_not_exists() {
        let fragment = build(&Rule::new("dcterms:title", "not_equals", "rdfs:Literal", ["Draft"]));
        assert!(fragment.starts_with(" FILTER NOT EXISTS { ?instance dcterms:title "));
        assert!(fragment.contains("\"^Draft$\""));

        let fragment = build(&Rule::new("dcterms:title", "does_not_contain", "string", ["x"]));
        assert!(fragment.starts_with(" FILTER NOT EXISTS { "));
    }

    #[test]
    fn test_negated_anchors() {
        let fragment = build(&Rule::new("dcterms:title", "does_not_start_with", "string", ["ab"]));
        assert!(fragment.starts_with(" FILTER NOT EXISTS { "));
        assert!(fragment.contains("\"^ab\""));

        let fragment = build(&Rule::new("dcterms:title", "does_not_end_with", "string", ["ab"]));
        assert!(fragment.starts_with(" FILTER NOT EXISTS { "));
        assert!(fragment.contains("\"ab$\""));
    }

    #[test]
    fn test_blank_values_are_a_no_op() {
        assert!(build(&Rule::new("dcterms:title", "does_not_contain", "string", [" "])).is_empty());
    }
}
