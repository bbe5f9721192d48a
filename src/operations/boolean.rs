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
use crate::fragment::{self, BLOCK_END, BLOCK_START, FILTER_NOT_EXISTS_START, STATEMENT_SEPARATOR};

use super::{bind_property, SearchOperation, BOOLEAN_PRIORITY};

/// Value standing for "the property is not set".
const UNSET_VALUE: &str = "-1";

pub struct BooleanSearchOperation {
    config: Arc<SearchConfig>,
}

impl BooleanSearchOperation {
    pub fn new(config: Arc<SearchConfig>) -> Self {
        Self { config }
    }

    /// `is` unset matches instances without the property, `is_not` unset
    /// matches instances that have it with any value.
    fn build_presence(&self, builder: &mut String, rule: &Rule) {
        let mut binding = String::new();
        if bind_property(&mut binding, &self.config, &rule.field).is_none() {
            return;
        }
        if rule.operator_is("is_not") {
            builder.push_str(&binding);
        } else {
            builder.push_str(FILTER_NOT_EXISTS_START);
            builder.push_str(&binding);
            builder.push_str(BLOCK_END);
            builder.push_str(STATEMENT_SEPARATOR);
        }
    }
}

impl SearchOperation for BooleanSearchOperation {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn priority(&self) -> i32 {
        BOOLEAN_PRIORITY
    }

    fn is_applicable(&self, rule: &Rule) -> bool {
        rule.operator_in(&["is", "is_not"]) && rule.is_boolean_type() && rule.values.len() == 1
    }

    fn build(&self, builder: &mut String, rule: &Rule) {
        let Some(value) = rule.values.first().map(|v| v.trim().to_ascii_lowercase()) else {
            return;
        };
        if value == UNSET_VALUE {
            self.build_presence(builder, rule);
            return;
        }
        if value != "true" && value != "false" {
            debug!("'{}' is not a boolean value, rule '{}' skipped", value, rule.id);
            return;
        }
        let Some(predicate) = fragment::predicate(&rule.field) else {
            return;
        };

        let literal = fragment::typed_literal(&value, "xsd:boolean");
        if rule.operator_is("is_not") {
            builder.push_str(" MINUS");
            builder.push_str(BLOCK_START);
            fragment::emit_triple(builder, &self.config.instance_var(), &predicate, &literal);
            builder.push_str(BLOCK_END);
        } else {
            fragment::emit_triple(builder, &self.config.instance_var(), &predicate, &literal);
        }
    }
}
