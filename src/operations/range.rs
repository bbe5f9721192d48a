/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Closed or half open ranges over dates and numbers.
//!
//! A range rule carries exactly two values, `[start, end]`, and either of
//! them may be blank. The property is bound once and each present bound
//! becomes its own filter.

use std::sync::Arc;

use log::debug;

use crate::condition::Rule;
use crate::config::SearchConfig;
use crate::fragment::{self, DateBound};

use super::{bind_property, SearchOperation, DATE_RANGE_PRIORITY, NUMERIC_RANGE_PRIORITY};

const DATE_RANGE_OPERATORS: &[&str] = &["between", "is", "within"];

fn has_range_values(rule: &Rule) -> bool {
    rule.values.len() == 2 && !rule.is_empty()
}

fn build_range(builder: &mut String, config: &SearchConfig, rule: &Rule, start: Option<String>, end: Option<String>) {
    if start.is_none() && end.is_none() {
        debug!("range rule '{}' on {} has no usable bound", rule.id, rule.field);
        return;
    }
    let mut fragment = String::new();
    let Some(variable) = bind_property(&mut fragment, config, &rule.field) else {
        return;
    };
    if let Some(start) = start {
        fragment::emit_filter(&mut fragment, &format!("{} >= {}", variable, start));
    }
    if let Some(end) = end {
        fragment::emit_filter(&mut fragment, &format!("{} <= {}", variable, end));
    }
    builder.push_str(&fragment);
}

pub struct DateRangeSearchOperation {
    config: Arc<SearchConfig>,
}

impl DateRangeSearchOperation {
    pub fn new(config: Arc<SearchConfig>) -> Self {
        Self { config }
    }
}

impl SearchOperation for DateRangeSearchOperation {
    fn name(&self) -> &'static str {
        "date_range"
    }

    fn priority(&self) -> i32 {
        DATE_RANGE_PRIORITY
    }

    fn is_applicable(&self, rule: &Rule) -> bool {
        rule.operator_in(DATE_RANGE_OPERATORS) && rule.is_date_type() && has_range_values(rule)
    }

    fn build(&self, builder: &mut String, rule: &Rule) {
        // build can be called without is_applicable
        if rule.values.len() != 2 {
            return;
        }
        let start = fragment::date_time_literal(&rule.values[0], DateBound::Start);
        let end = fragment::date_time_literal(&rule.values[1], DateBound::End);
        build_range(builder, &self.config, rule, start, end);
    }
}

pub struct NumericRangeSearchOperation {
    config: Arc<SearchConfig>,
}

impl NumericRangeSearchOperation {
    pub fn new(config: Arc<SearchConfig>) -> Self {
        Self { config }
    }
}

impl SearchOperation for NumericRangeSearchOperation {
    fn name(&self) -> &'static str {
        "numeric_range"
    }

    fn priority(&self) -> i32 {
        NUMERIC_RANGE_PRIORITY
    }

    fn is_applicable(&self, rule: &Rule) -> bool {
        rule.operator_is("between") && rule.is_numeric_type() && has_range_values(rule)
    }

    fn build(&self, builder: &mut String, rule: &Rule) {
        // build can be called without is_applicable
        if rule.values.len() != 2 {
            return;
        }
        let start = fragment::numeric_literal(&rule.values[0]);
        let end = fragment::numeric_literal(&rule.values[1]);
        build_range(builder, &self.config, rule, start, end);
    }
}
