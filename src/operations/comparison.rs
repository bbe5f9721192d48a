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
use crate::fragment::{self, DateBound};

use super::{bind_property, SearchOperation, DATE_COMPARISON_PRIORITY, NUMERIC_COMPARISON_PRIORITY};

fn single_value(rule: &Rule) -> Option<&str> {
    let mut values = rule.non_blank_values();
    let value = values.next()?;
    values.next().is_none().then_some(value)
}

fn build_comparison(builder: &mut String, config: &SearchConfig, field: &str, comparator: &str, operand: &str) {
    let mut fragment = String::new();
    if let Some(variable) = bind_property(&mut fragment, config, field) {
        fragment::emit_filter(&mut fragment, &format!("{} {} {}", variable, comparator, operand));
        builder.push_str(&fragment);
    }
}

/// `after` / `before` a single date. A plain date means the whole day, so
/// `after` compares with the end of the day and `before` with its start.
pub struct DateComparisonSearchOperation {
    config: Arc<SearchConfig>,
}

impl DateComparisonSearchOperation {
    pub fn new(config: Arc<SearchConfig>) -> Self {
        Self { config }
    }
}

impl SearchOperation for DateComparisonSearchOperation {
    fn name(&self) -> &'static str {
        "date_comparison"
    }

    fn priority(&self) -> i32 {
        DATE_COMPARISON_PRIORITY
    }

    fn is_applicable(&self, rule: &Rule) -> bool {
        rule.operator_in(&["after", "before"]) && rule.is_date_type()
    }

    fn build(&self, builder: &mut String, rule: &Rule) {
        let Some(value) = single_value(rule) else {
            return;
        };
        let (comparator, bound) = if rule.operator_is("after") {
            (">", DateBound::End)
        } else {
            ("<", DateBound::Start)
        };
        if let Some(literal) = fragment::date_time_literal(value, bound) {
            build_comparison(builder, &self.config, &rule.field, comparator, &literal);
        }
    }
}

pub struct NumericComparisonSearchOperation {
    config: Arc<SearchConfig>,
}

impl NumericComparisonSearchOperation {
    pub fn new(config: Arc<SearchConfig>) -> Self {
        Self { config }
    }
}

impl SearchOperation for NumericComparisonSearchOperation {
    fn name(&self) -> &'static str {
        "numeric_comparison"
    }

    fn priority(&self) -> i32 {
        NUMERIC_COMPARISON_PRIORITY
    }

    fn is_applicable(&self, rule: &Rule) -> bool {
        rule.operator_in(&["greater_than", "less_than"]) && rule.is_numeric_type()
    }

    fn build(&self, builder: &mut String, rule: &Rule) {
        let Some(value) = single_value(rule) else {
            return;
        };
        let comparator = if rule.operator_is("greater_than") { ">" } else { "<" };
        if let Some(number) = fragment::numeric_literal(value) {
            build_comparison(builder, &self.config, &rule.field, comparator, &number);
        }
    }
}
