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

use log::trace;

use crate::condition::{Condition, Criterion, Junction, Rule};
use crate::config::SearchConfig;
use crate::fragment::{BLOCK_END, BLOCK_START, UNION};
use crate::free_text::FreeTextPreparer;
use crate::namespace::NamespaceResolver;
use crate::operations::OperationRegistry;

/// Walks a condition tree and concatenates the fragments of its rules.
///
/// `AND` children are emitted one after the other so they share bindings.
/// `OR` children are braced and joined with `UNION`. Children that compile
/// to nothing are left out, so no empty group is ever written.
pub struct SearchCompiler {
    registry: OperationRegistry,
}

impl SearchCompiler {
    pub fn new(registry: OperationRegistry) -> Self {
        SearchCompiler { registry }
    }

    pub fn with_defaults(
        config: SearchConfig,
        resolver: Arc<dyn NamespaceResolver>,
        preparer: Arc<dyn FreeTextPreparer>,
    ) -> Self {
        Self::new(OperationRegistry::with_defaults(Arc::new(config), resolver, preparer))
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn compile(&self, condition: &Condition) -> String {
        let mut builder = String::new();
        self.compile_into(&mut builder, condition);
        builder
    }

    pub fn compile_rule(&self, rule: &Rule) -> String {
        self.registry.compile(rule)
    }

    /// Appends the fragment for the condition. Returns `false` when nothing
    /// was appended.
    pub fn compile_into(&self, builder: &mut String, condition: &Condition) -> bool {
        let fragments: Vec<String> = condition
            .children
            .iter()
            .map(|child| self.compile_child(child))
            .filter(|fragment| !fragment.trim().is_empty())
            .collect();

        trace!(
            "condition '{}' ({:?}): {} of {} children produced a fragment",
            condition.id,
            condition.junction,
            fragments.len(),
            condition.children.len()
        );

        if fragments.is_empty() {
            return false;
        }
        match condition.junction {
            Junction::And => {
                for fragment in &fragments {
                    builder.push_str(fragment);
                }
            }
            Junction::Or => {
                for (i, fragment) in fragments.iter().enumerate() {
                    if i > 0 {
                        builder.push_str(UNION);
                    }
                    builder.push_str(BLOCK_START);
                    builder.push_str(fragment);
                    builder.push_str(BLOCK_END);
                }
            }
        }
        true
    }

    fn compile_child(&self, child: &Criterion) -> String {
        match child {
            Criterion::Rule(rule) => self.compile_rule(rule),
            Criterion::Condition(condition) => self.compile(condition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::free_text::SolrQueryPreparer;
    use crate::namespace::PrefixNamespaceResolver;

    fn compiler() -> SearchCompiler {
        SearchCompiler::with_defaults(
            SearchConfig::default(),
            Arc::new(PrefixNamespaceResolver::with_defaults()),
            Arc::new(SolrQueryPreparer::new()),
        )
    }

    fn status(value: &str) -> Rule {
        Rule::new("emf:status", "set_to", "codelist", [value])
    }

    #[test]
    fn test_and_concatenates() {
        let tree = Condition::and([status("OPEN"), Rule::new("emf:isActive", "is", "boolean", ["true"])]);
        assert_eq!(
            compiler().compile(&tree),
            "?instance emf:status \"OPEN\" . ?instance emf:isActive \"true\"^^xsd:boolean . "
        );
    }

    #[test]
    fn test_or_braces_each_child() {
        let tree = Condition::or([status("OPEN"), status("CLOSED")]);
        assert_eq!(
            compiler().compile(&tree),
            " { ?instance emf:status \"OPEN\" .  }  UNION  { ?instance emf:status \"CLOSED\" .  } "
        );
    }

    #[test]
    fn test_or_skips_empty_children() {
        let empty = Rule::new("emf:createdOn", "between", "dateTime", ["", ""]);
        let tree = Condition::or([status("OPEN"), empty]);
        let fragment = compiler().compile(&tree);
        assert_eq!(fragment, " { ?instance emf:status \"OPEN\" .  } ");
        assert!(!fragment.contains("UNION"));
        assert!(!fragment.contains("{  }"));
    }

    #[test]
    fn test_empty_tree() {
        let mut builder = String::new();
        assert!(!compiler().compile_into(&mut builder, &Condition::and(Vec::<Rule>::new())));
        assert!(builder.is_empty());

        let nested = Condition::or([Condition::and([Rule::new("emf:x", "unknown", "string", ["v"])])]);
        assert!(compiler().compile(&nested).is_empty());
    }

    #[test]
    fn test_nested_or_inside_and() {
        let tree = Condition::and([
            Criterion::from(Rule::new("instanceId", "in", "string", ["a"])),
            Criterion::from(Condition::or([status("OPEN"), status("CLOSED")])),
        ]);
        let fragment = compiler().compile(&tree);
        assert!(fragment.starts_with(" FILTER ( ?instance = "));
        assert_eq!(fragment.matches(" UNION ").count(), 1);
    }
}
