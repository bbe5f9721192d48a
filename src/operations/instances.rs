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

use crate::condition::Rule;
use crate::config::SearchConfig;
use crate::fragment::{self, FILTER_OR};
use crate::namespace::NamespaceResolver;

use super::{SearchOperation, INSTANCES_PRIORITY};

/// Restricts the instance variable to a list of identifiers:
/// `FILTER ( ?instance = emf:a || ?instance = emf:b ) .`
///
/// Identity is compared directly, no property edge is traversed.
pub struct InstancesSearchOperation {
    config: Arc<SearchConfig>,
    resolver: Arc<dyn NamespaceResolver>,
}

impl InstancesSearchOperation {
    pub fn new(config: Arc<SearchConfig>, resolver: Arc<dyn NamespaceResolver>) -> Self {
        Self { config, resolver }
    }

    fn render_identifier(&self, value: &str) -> Option<String> {
        if fragment::is_class_like(value) {
            return fragment::render_iri(value, self.resolver.as_ref());
        }
        if self.config.default_instance_prefix.is_empty() {
            return None;
        }
        let prefixed = format!("{}:{}", self.config.default_instance_prefix, value);
        fragment::render_iri(&prefixed, self.resolver.as_ref())
    }
}

impl SearchOperation for InstancesSearchOperation {
    fn name(&self) -> &'static str {
        "instances"
    }

    fn priority(&self) -> i32 {
        INSTANCES_PRIORITY
    }

    fn is_applicable(&self, rule: &Rule) -> bool {
        rule.operator_is("in") && rule.field.trim().eq_ignore_ascii_case(&self.config.instance_id_field)
    }

    fn build(&self, builder: &mut String, rule: &Rule) {
        let instance = self.config.instance_var();
        let comparisons: Vec<String> = rule
            .non_blank_values()
            .filter_map(|value| {
                let rendered = self.render_identifier(value);
                if rendered.is_none() {
                    debug!("skipping instance identifier '{}'", value);
                }
                rendered
            })
            .map(|id| format!("{} = {}", instance, id))
            .collect();

        if comparisons.is_empty() {
            return;
        }
        fragment::emit_filter(builder, &comparisons.join(FILTER_OR));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::PrefixNamespaceResolver;

    fn operation() -> InstancesSearchOperation {
        InstancesSearchOperation::new(
            Arc::new(SearchConfig::default()),
            Arc::new(PrefixNamespaceResolver::new()),
        )
    }

    #[test]
    fn test_single_disjunctive_filter() {
        let rule = Rule::new("instanceId", "in", "string", ["a", "b", "c"]);
        let op = operation();
        assert!(op.is_applicable(&rule));

        let mut builder = String::new();
        op.build(&mut builder, &rule);
        assert_eq!(
            builder,
            " FILTER ( ?instance = emf:a || ?instance = emf:b || ?instance = emf:c ) . "
        );
    }

    #[test]
    fn test_only_reserved_field() {
        let op = operation();
        assert!(!op.is_applicable(&Rule::new("emf:hasParent", "in", "object", ["a"])));
        assert!(op.is_applicable(&Rule::new("INSTANCEID", "IN", "object", ["a"])));
    }

    #[test]
    fn test_unusable_identifiers_are_skipped() {
        let op = operation();
        let mut builder = String::new();
        op.build(&mut builder, &Rule::new("instanceId", "in", "string", ["bad id", " "]));
        assert!(builder.is_empty());

        op.build(&mut builder, &Rule::new("instanceId", "in", "string", ["bad id", "http://x.org/1"]));
        assert_eq!(builder, " FILTER ( ?instance = <http://x.org/1> ) . ");
    }
}
