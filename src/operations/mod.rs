/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Search operations turn one [`Rule`] into a SPARQL fragment.
//!
//! The [`OperationRegistry`] keeps the operations ordered by priority and
//! hands a rule to the first operation that accepts it. Two operations that
//! accept the same rule are ordered by their declared priority only, so the
//! priorities below are part of the contract.

pub mod boolean;
pub mod comparison;
pub mod equals;
pub mod free_text;
pub mod instances;
pub mod range;
pub mod set_to;
pub mod string_match;

use std::sync::Arc;

use log::{debug, trace};

use crate::condition::Rule;
use crate::config::SearchConfig;
use crate::fragment;
use crate::free_text::FreeTextPreparer;
use crate::namespace::NamespaceResolver;

pub use boolean::BooleanSearchOperation;
pub use comparison::{DateComparisonSearchOperation, NumericComparisonSearchOperation};
pub use equals::EqualsSearchOperation;
pub use free_text::FreeTextSearchOperation;
pub use instances::InstancesSearchOperation;
pub use range::{DateRangeSearchOperation, NumericRangeSearchOperation};
pub use set_to::{NotSetToSearchOperation, SetToSearchOperation, SetToSomeButNotToSearchOperation};
pub use string_match::StringMatchSearchOperation;

pub const INSTANCES_PRIORITY: i32 = 10;
pub const FREE_TEXT_PRIORITY: i32 = 20;
pub const DATE_RANGE_PRIORITY: i32 = 30;
pub const NUMERIC_RANGE_PRIORITY: i32 = 40;
pub const BOOLEAN_PRIORITY: i32 = 50;
pub const DATE_COMPARISON_PRIORITY: i32 = 60;
pub const NUMERIC_COMPARISON_PRIORITY: i32 = 70;
pub const SET_TO_PRIORITY: i32 = 80;
pub const NOT_SET_TO_PRIORITY: i32 = 85;
pub const SET_TO_SOME_BUT_NOT_TO_PRIORITY: i32 = 87;
pub const STRING_MATCH_PRIORITY: i32 = 90;
pub const EQUALS_PRIORITY: i32 = 100;

/// One operator/type strategy.
///
/// `build` never fails: when the rule does not carry enough information the
/// operation appends nothing.
pub trait SearchOperation: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lower values are consulted first.
    fn priority(&self) -> i32;

    fn is_applicable(&self, rule: &Rule) -> bool;

    fn build(&self, builder: &mut String, rule: &Rule);
}

/// Ordered list of operations with first-match dispatch.
pub struct OperationRegistry {
    operations: Vec<Box<dyn SearchOperation>>,
}

impl OperationRegistry {
    /// Sorts the operations by priority. The sort is stable, so operations
    /// with equal priority keep the order they were given in.
    pub fn new(mut operations: Vec<Box<dyn SearchOperation>>) -> Self {
        operations.sort_by_key(|op| op.priority());
        OperationRegistry { operations }
    }

    /// Registry with every built-in operation.
    pub fn with_defaults(
        config: Arc<SearchConfig>,
        resolver: Arc<dyn NamespaceResolver>,
        preparer: Arc<dyn FreeTextPreparer>,
    ) -> Self {
        Self::new(vec![
            Box::new(InstancesSearchOperation::new(config.clone(), resolver.clone())),
            Box::new(FreeTextSearchOperation::new(config.clone(), preparer)),
            Box::new(DateRangeSearchOperation::new(config.clone())),
            Box::new(NumericRangeSearchOperation::new(config.clone())),
            Box::new(BooleanSearchOperation::new(config.clone())),
            Box::new(DateComparisonSearchOperation::new(config.clone())),
            Box::new(NumericComparisonSearchOperation::new(config.clone())),
            Box::new(SetToSearchOperation::new(config.clone(), resolver.clone())),
            Box::new(NotSetToSearchOperation::new(config.clone(), resolver.clone())),
            Box::new(SetToSomeButNotToSearchOperation::new(config.clone(), resolver.clone())),
            Box::new(StringMatchSearchOperation::new(config.clone())),
            Box::new(EqualsSearchOperation::new(config, resolver)),
        ])
    }

    /// The operation that will build the rule, if any.
    pub fn find(&self, rule: &Rule) -> Option<&dyn SearchOperation> {
        self.operations
            .iter()
            .find(|op| op.is_applicable(rule))
            .map(|op| op.as_ref())
    }

    /// Appends the fragment for the rule. Returns `false` when no operation
    /// accepted the rule; the rule then contributes nothing.
    pub fn build(&self, builder: &mut String, rule: &Rule) -> bool {
        match self.find(rule) {
            Some(operation) => {
                trace!(
                    "rule '{}' ({} {} {}) handled by {}",
                    rule.id,
                    rule.field,
                    rule.operator,
                    rule.rule_type,
                    operation.name()
                );
                operation.build(builder, rule);
                true
            }
            None => {
                debug!(
                    "no search operation for rule '{}' ({} {} {}), skipping it",
                    rule.id, rule.field, rule.operator, rule.rule_type
                );
                false
            }
        }
    }

    pub fn compile(&self, rule: &Rule) -> String {
        let mut builder = String::new();
        self.build(&mut builder, rule);
        builder
    }

    pub fn operations(&self) -> impl Iterator<Item = &dyn SearchOperation> {
        self.operations.iter().map(|op| op.as_ref())
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Binds the rule field on the instance to a fresh variable and returns the
/// variable. `None` when the field cannot be used as a predicate.
pub(crate) fn bind_property(builder: &mut String, config: &SearchConfig, field: &str) -> Option<String> {
    let predicate = match fragment::predicate(field) {
        Some(predicate) => predicate,
        None => {
            debug!("field '{}' is not a usable predicate", field);
            return None;
        }
    };
    let variable = fragment::fresh_variable(field);
    fragment::emit_triple(builder, &config.instance_var(), &predicate, &variable);
    Some(variable)
}

/// Case-insensitive regex test of a bound variable against a pattern that is
/// already escaped for a string literal.
pub(crate) fn regex_test(variable: &str, pattern: &str) -> String {
    format!("regex(str({}), \"{}\", \"i\")", variable, pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        name: &'static str,
        priority: i32,
        calls: Arc<AtomicUsize>,
    }

    impl SearchOperation for Counting {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn is_applicable(&self, rule: &Rule) -> bool {
            rule.operator_is("count")
        }

        fn build(&self, builder: &mut String, _rule: &Rule) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            builder.push_str(self.name);
        }
    }

    fn counting(name: &'static str, priority: i32) -> (Box<dyn SearchOperation>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Counting {
                name,
                priority,
                calls: calls.clone(),
            }),
            calls,
        )
    }

    #[test]
    fn test_lowest_priority_wins_regardless_of_registration_order() {
        let rule = Rule::new("emf:x", "count", "string", ["v"]);

        let (d1, d1_calls) = counting("d1", 10);
        let (d2, d2_calls) = counting("d2", 20);
        let registry = OperationRegistry::new(vec![d2, d1]);
        assert_eq!(registry.compile(&rule), "d1");
        assert_eq!(registry.compile(&rule), "d1");
        assert_eq!(d1_calls.load(Ordering::SeqCst), 2);
        assert_eq!(d2_calls.load(Ordering::SeqCst), 0);

        let (d1, _) = counting("d1", 10);
        let (d2, _) = counting("d2", 20);
        let registry = OperationRegistry::new(vec![d1, d2]);
        assert_eq!(registry.find(&rule).map(|op| op.name()), Some("d1"));
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let rule = Rule::new("emf:x", "count", "string", ["v"]);
        let (first, _) = counting("first", 5);
        let (second, _) = counting("second", 5);
        let registry = OperationRegistry::new(vec![first, second]);
        assert_eq!(registry.compile(&rule), "first");
    }

    #[test]
    fn test_unmatched_rule_is_empty() {
        let (d1, _) = counting("d1", 10);
        let registry = OperationRegistry::new(vec![d1]);
        let mut builder = String::from("keep");
        assert!(!registry.build(&mut builder, &Rule::new("emf:x", "unknown", "string", ["v"])));
        assert_eq!(builder, "keep");
    }

    #[test]
    fn test_default_registry_is_sorted() {
        let registry = OperationRegistry::with_defaults(
            Arc::new(SearchConfig::default()),
            Arc::new(crate::namespace::PrefixNamespaceResolver::with_defaults()),
            Arc::new(crate::free_text::SolrQueryPreparer::new()),
        );
        let priorities: Vec<i32> = registry.operations().map(|op| op.priority()).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
        assert_eq!(registry.len(), 12);
        assert_eq!(registry.operations().next().map(|op| op.name()), Some("instances"));
    }
}
