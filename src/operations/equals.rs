/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Exact matches. The rule type decides how the value is compared:
//!
//! * dates are matched with a typed literal in a single triple,
//! * strings through an anchored case-insensitive regex,
//! * numbers through `=`,
//! * anything else is treated as a resource. Values that look like IRIs are
//!   matched directly, plain identifiers are matched against the type
//!   identifier property.

use std::sync::Arc;

use log::debug;

use crate::condition::Rule;
use crate::config::SearchConfig;
use crate::fragment::{self, DateBound, BLOCK_END, BLOCK_START, FILTER_OR, UNION};
use crate::namespace::NamespaceResolver;

use super::string_match::{build_matches, Anchor};
use super::{bind_property, SearchOperation, EQUALS_PRIORITY};

pub struct EqualsSearchOperation {
    config: Arc<SearchConfig>,
    resolver: Arc<dyn NamespaceResolver>,
}

impl EqualsSearchOperation {
    pub fn new(config: Arc<SearchConfig>, resolver: Arc<dyn NamespaceResolver>) -> Self {
        Self { config, resolver }
    }

    fn build_date(&self, builder: &mut String, rule: &Rule) {
        let date_only = rule.type_in(&["date", "xsd:date"]);
        let literal = rule.non_blank_values().find_map(|value| {
            if date_only {
                fragment::date_literal(value)
            } else {
                fragment::date_time_literal(value, DateBound::Start)
            }
        });
        let (Some(literal), Some(predicate)) = (literal, fragment::predicate(&rule.field)) else {
            debug!("equals rule '{}' has no usable date", rule.id);
            return;
        };
        fragment::emit_triple(builder, &self.config.instance_var(), &predicate, &literal);
    }

    fn build_string(&self, builder: &mut String, field: &str, values: &[&str]) {
        build_matches(builder, &self.config, field, values, Anchor::Both);
    }

    fn build_numeric(&self, builder: &mut String, rule: &Rule) {
        let numbers: Vec<String> = rule.non_blank_values().filter_map(fragment::numeric_literal).collect();
        if numbers.is_empty() {
            return;
        }
        let mut fragment = String::new();
        let Some(variable) = bind_property(&mut fragment, &self.config, &rule.field) else {
            return;
        };
        let comparisons: Vec<String> = numbers.iter().map(|n| format!("{} = {}", variable, n)).collect();
        fragment::emit_filter(&mut fragment, &comparisons.join(FILTER_OR));
        builder.push_str(&fragment);
    }

    fn build_resource(&self, builder: &mut String, rule: &Rule) {
        // values that look like IRIs but do not render as one are identifiers
        let mut classes = Vec::new();
        let mut plain = Vec::new();
        for value in rule.non_blank_values() {
            match fragment::is_class_like(value)
                .then(|| fragment::render_iri(value, self.resolver.as_ref()))
                .flatten()
            {
                Some(iri) => classes.push(iri),
                None => plain.push(value),
            }
        }

        let mut class_fragment = String::new();
        if let Some(predicate) = fragment::predicate(&rule.field) {
            let instance = self.config.instance_var();
            let blocks: Vec<String> = classes
                .iter()
                .map(|iri| {
                    let mut block = String::new();
                    fragment::emit_triple(&mut block, &instance, &predicate, iri);
                    block
                })
                .collect();
            fragment::emit_union(&mut class_fragment, &blocks);
        }

        let mut plain_fragment = String::new();
        self.build_string(&mut plain_fragment, &self.config.type_identifier_field, &plain);

        match (class_fragment.is_empty(), plain_fragment.is_empty()) {
            (true, true) => {}
            (false, true) => builder.push_str(&class_fragment),
            (true, false) => builder.push_str(&plain_fragment),
            (false, false) => {
                builder.push_str(BLOCK_START);
                builder.push_str(&class_fragment);
                builder.push_str(BLOCK_END);
                builder.push_str(UNION);
                builder.push_str(BLOCK_START);
                builder.push_str(&plain_fragment);
                builder.push_str(BLOCK_END);
            }
        }
    }
}

impl SearchOperation for EqualsSearchOperation {
    fn name(&self) -> &'static str {
        "equals"
    }

    fn priority(&self) -> i32 {
        EQUALS_PRIORITY
    }

    fn is_applicable(&self, rule: &Rule) -> bool {
        rule.operator_is("equals") && !rule.is_empty()
    }

    fn build(&self, builder: &mut String, rule: &Rule) {
        if rule.is_date_type() {
            self.build_date(builder, rule);
        } else if rule.is_string_type() {
            let values: Vec<&str> = rule.non_blank_values().collect();
            self.build_string(builder, &rule.field, &values);
        } else if rule.is_numeric_type() {
            self.build_numeric(builder, rule);
        } else {
            self.build_resource(builder, rule);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::PrefixNamespaceResolver;

    fn build(rule: &Rule) -> String {
        let op = EqualsSearchOperation::new(
            Arc::new(SearchConfig::default()),
            Arc::new(PrefixNamespaceResolver::new()),
        );
        assert!(op.is_applicable(rule));
        let mut builder = String::new();
        op.build(&mut builder, rule);
        builder
    }

    #[test]
    fn test_class_and_identifier_are_united() {
        let fragment = build(&Rule::new("rdf:type", "equals", "object", ["emf:Case", "GEN001"]));
        assert!(fragment.starts_with(" { ?instance rdf:type emf:Case . "));
        assert_eq!(fragment.matches(" UNION ").count(), 1);
        assert!(fragment.contains("?instance emf:type ?type_"));
        assert!(fragment.contains("\"^GEN001$\", \"i\""));
    }

    #[test]
    fn test_classes_only() {
        let fragment = build(&Rule::new("rdf:type", "equals", "object", ["emf:Case", "http://x.org/Doc"]));
        assert_eq!(
            fragment,
            " { ?instance rdf:type emf:Case .  }  UNION  { ?instance rdf:type <http://x.org/Doc> .  } "
        );
    }

    #[test]
    fn test_unrenderable_class_is_an_identifier() {
        let fragment = build(&Rule::new("rdf:type", "equals", "object", ["GEN#1"]));
        assert!(fragment.starts_with("?instance emf:type ?type_"));
        assert!(fragment.contains("\"^GEN"));
        assert!(fragment.contains("#1$\", \"i\""));
        assert!(!fragment.contains("UNION"));
    }

    #[test]
    fn test_dates_are_exact() {
        let fragment = build(&Rule::new("emf:createdOn", "equals", "date", ["2020-01-01"]));
        assert_eq!(fragment, "?instance emf:createdOn \"2020-01-01\"^^xsd:date . ");

        let fragment = build(&Rule::new("emf:createdOn", "equals", "dateTime", ["2020-01-01T10:00:00Z"]));
        assert_eq!(
            fragment,
            "?instance emf:createdOn \"2020-01-01T10:00:00.000Z\"^^xsd:dateTime . "
        );
    }

    #[test]
    fn test_strings_and_numbers() {
        let fragment = build(&Rule::new("dcterms:title", "equals", "string", ["Budget"]));
        assert!(fragment.contains("\"^Budget$\", \"i\""));

        let fragment = build(&Rule::new("emf:size", "equals", "int", ["3", "x", "4"]));
        assert!(fragment.contains(" = 3 || "));
        assert!(fragment.contains(" = 4 )"));
        assert!(!fragment.contains(" = x"));
    }

    #[test]
    fn test_blank_values_not_applicable() {
        let op = EqualsSearchOperation::new(
            Arc::new(SearchConfig::default()),
            Arc::new(PrefixNamespaceResolver::new()),
        );
        assert!(!op.is_applicable(&Rule::new("dcterms:title", "equals", "string", [""])));
    }
}
