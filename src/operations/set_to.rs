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

use log::debug;
use rustc_hash::FxHashSet;

use crate::condition::Rule;
use crate::config::SearchConfig;
use crate::fragment::{self, BLOCK_END, FILTER_NOT_EXISTS_START, STATEMENT_SEPARATOR};
use crate::namespace::NamespaceResolver;

use super::{bind_property, SearchOperation, NOT_SET_TO_PRIORITY, SET_TO_PRIORITY, SET_TO_SOME_BUT_NOT_TO_PRIORITY};

/// One braced triple per distinct value, joined by `UNION`.
fn set_to_fragment(config: &SearchConfig, resolver: &dyn NamespaceResolver, rule: &Rule) -> String {
    let mut fragment = String::new();
    let Some(predicate) = fragment::predicate(&rule.field) else {
        debug!("field '{}' is not a usable predicate", rule.field);
        return fragment;
    };

    let instance = config.instance_var();
    let mut seen = FxHashSet::default();
    let mut blocks = Vec::new();
    for value in rule.non_blank_values() {
        if !seen.insert(value) {
            continue;
        }
        // text such as "10:30" looks like a prefixed name but is a literal
        let object = fragment::is_class_like(value)
            .then(|| fragment::render_iri(value, resolver))
            .flatten()
            .unwrap_or_else(|| fragment::string_literal(value));
        let mut block = String::new();
        fragment::emit_triple(&mut block, &instance, &predicate, &object);
        blocks.push(block);
    }

    fragment::emit_union(&mut fragment, &blocks);
    fragment
}

pub struct SetToSearchOperation {
    config: Arc<SearchConfig>,
    resolver: Arc<dyn NamespaceResolver>,
}

impl SetToSearchOperation {
    pub fn new(config: Arc<SearchConfig>, resolver: Arc<dyn NamespaceResolver>) -> Self {
        Self { config, resolver }
    }
}

impl SearchOperation for SetToSearchOperation {
    fn name(&self) -> &'static str {
        "set_to"
    }

    fn priority(&self) -> i32 {
        SET_TO_PRIORITY
    }

    fn is_applicable(&self, rule: &Rule) -> bool {
        rule.operator_in(&["set_to", "in"]) && !rule.is_empty()
    }

    fn build(&self, builder: &mut String, rule: &Rule) {
        builder.push_str(&set_to_fragment(&self.config, self.resolver.as_ref(), rule));
    }
}

/// Instances whose property holds none of the values, including instances
/// without the property at all.
pub struct NotSetToSearchOperation {
    config: Arc<SearchConfig>,
    resolver: Arc<dyn NamespaceResolver>,
}

impl NotSetToSearchOperation {
    pub fn new(config: Arc<SearchConfig>, resolver: Arc<dyn NamespaceResolver>) -> Self {
        Self { config, resolver }
    }
}

impl SearchOperation for NotSetToSearchOperation {
    fn name(&self) -> &'static str {
        "not_set_to"
    }

    fn priority(&self) -> i32 {
        NOT_SET_TO_PRIORITY
    }

    fn is_applicable(&self, rule: &Rule) -> bool {
        rule.operator_in(&["not_set_to", "not_in"]) && !rule.is_empty()
    }

    fn build(&self, builder: &mut String, rule: &Rule) {
        let inner = set_to_fragment(&self.config, self.resolver.as_ref(), rule);
        if inner.is_empty() {
            return;
        }
        push_not_exists(builder, &inner);
    }
}

fn push_not_exists(builder: &mut String, inner: &str) {
    builder.push_str(FILTER_NOT_EXISTS_START);
    builder.push_str(inner);
    builder.push_str(BLOCK_END);
    builder.push_str(STATEMENT_SEPARATOR);
}

/// Instances that have the property, but never with one of the values.
pub struct SetToSomeButNotToSearchOperation {
    config: Arc<SearchConfig>,
    resolver: Arc<dyn NamespaceResolver>,
}

impl SetToSomeButNotToSearchOperation {
    pub fn new(config: Arc<SearchConfig>, resolver: Arc<dyn NamespaceResolver>) -> Self {
        Self { config, resolver }
    }
}

impl SearchOperation for SetToSomeButNotToSearchOperation {
    fn name(&self) -> &'static str {
        "set_to_some_but_not_to"
    }

    fn priority(&self) -> i32 {
        SET_TO_SOME_BUT_NOT_TO_PRIORITY
    }

    fn is_applicable(&self, rule: &Rule) -> bool {
        rule.operator_is("set_to_some_but_not_to") && !rule.is_empty()
    }

    fn build(&self, builder: &mut String, rule: &Rule) {
        let inner = set_to_fragment(&self.config, self.resolver.as_ref(), rule);
        if inner.is_empty() {
            return;
        }
        let mut fragment = String::new();
        if bind_property(&mut fragment, &self.config, &rule.field).is_none() {
            return;
        }
        push_not_exists(&mut fragment, &inner);
        builder.push_str(&fragment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::PrefixNamespaceResolver;

    fn set_to() -> SetToSearchOperation {
        SetToSearchOperation::new(
            Arc::new(SearchConfig::default()),
            Arc::new(PrefixNamespaceResolver::new()),
        )
    }

    #[test]
    fn test_n_values_give_n_blocks() {
        let rule = Rule::new("emf:status", "set_to", "codelist", ["OPEN", "CLOSED", "emf:Draft"]);
        assert!(set_to().is_applicable(&rule));
        let mut builder = String::new();
        set_to().build(&mut builder, &rule);

        assert_eq!(builder.matches("?instance emf:status").count(), 3);
        assert_eq!(builder.matches("UNION").count(), 2);
        assert!(builder.contains("?instance emf:status \"OPEN\" . "));
        assert!(builder.contains("?instance emf:status emf:Draft . "));
    }

    #[test]
    fn test_duplicates_collapse() {
        let rule = Rule::new("emf:status", "set_to", "codelist", ["OPEN", " OPEN ", "OPEN"]);
        let mut builder = String::new();
        set_to().build(&mut builder, &rule);
        assert_eq!(builder, "?instance emf:status \"OPEN\" . ");
    }

    #[test]
    fn test_text_with_separators_stays_literal() {
        let rule = Rule::new("emf:title", "set_to", "string", ["Note: urgent", "10:30"]);
        let mut builder = String::new();
        set_to().build(&mut builder, &rule);
        assert_eq!(
            builder,
            " { ?instance emf:title \"Note: urgent\" .  }  UNION  { ?instance emf:title \"10:30\" .  } "
        );
    }

    #[test]
    fn test_empty_values_not_applicable() {
        assert!(!set_to().is_applicable(&Rule::new("emf:status", "set_to", "codelist", [" "])));
    }

    #[test]
    fn test_not_set_to_wraps_in_not_exists() {
        let op = NotSetToSearchOperation::new(
            Arc::new(SearchConfig::default()),
            Arc::new(PrefixNamespaceResolver::new()),
        );
        let rule = Rule::new("emf:status", "not_in", "codelist", ["OPEN", "CLOSED"]);
        assert!(op.is_applicable(&rule));
        let mut builder = String::new();
        op.build(&mut builder, &rule);
        assert!(builder.starts_with(" FILTER NOT EXISTS { "));
        assert!(builder.ends_with(" }  . "));
        assert_eq!(builder.matches("UNION").count(), 1);
    }

    #[test]
    fn test_set_to_some_but_not_to() {
        let op = SetToSomeButNotToSearchOperation::new(
            Arc::new(SearchConfig::default()),
            Arc::new(PrefixNamespaceResolver::new()),
        );
        let rule = Rule::new("emf:hasParent", "set_to_some_but_not_to", "object", ["emf:p1"]);
        assert!(op.is_applicable(&rule));
        let mut builder = String::new();
        op.build(&mut builder, &rule);
        assert!(builder.starts_with("?instance emf:hasParent ?hasParent_"));
        assert!(builder.contains(" FILTER NOT EXISTS { ?instance emf:hasParent emf:p1 .  } "));
    }
}
