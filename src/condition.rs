/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DATE_TYPES: &[&str] = &["date", "dateTime", "xsd:date", "xsd:dateTime"];
pub const NUMERIC_TYPES: &[&str] = &[
    "numeric",
    "number",
    "int",
    "long",
    "float",
    "double",
    "xsd:int",
    "xsd:integer",
    "xsd:long",
    "xsd:float",
    "xsd:double",
    "xsd:decimal",
];
pub const STRING_TYPES: &[&str] = &["string", "rdfs:Literal", "xsd:string"];
pub const BOOLEAN_TYPES: &[&str] = &["boolean", "xsd:boolean"];
pub const FREE_TEXT_TYPE: &str = "fts";

/// A single search criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub id: String,
    pub field: String,
    pub operator: String,
    #[serde(rename = "type", default)]
    pub rule_type: String,
    #[serde(default)]
    pub values: Vec<String>,
}

impl Rule {
    pub fn new<I, S>(field: &str, operator: &str, rule_type: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule {
            id: String::new(),
            field: field.to_string(),
            operator: operator.to_string(),
            rule_type: rule_type.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn operator_is(&self, operator: &str) -> bool {
        self.operator.trim().eq_ignore_ascii_case(operator)
    }

    pub fn operator_in(&self, operators: &[&str]) -> bool {
        operators.iter().any(|op| self.operator_is(op))
    }

    pub fn type_is(&self, rule_type: &str) -> bool {
        self.rule_type.trim().eq_ignore_ascii_case(rule_type)
    }

    pub fn type_in(&self, types: &[&str]) -> bool {
        types.iter().any(|t| self.type_is(t))
    }

    pub fn is_date_type(&self) -> bool {
        self.type_in(DATE_TYPES)
    }

    pub fn is_numeric_type(&self) -> bool {
        self.type_in(NUMERIC_TYPES)
    }

    pub fn is_string_type(&self) -> bool {
        self.type_in(STRING_TYPES)
    }

    pub fn is_boolean_type(&self) -> bool {
        self.type_in(BOOLEAN_TYPES)
    }

    /// Trimmed values that carry content.
    pub fn non_blank_values(&self) -> impl Iterator<Item = &str> {
        self.values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// A rule without values, or with blank values only, produces no fragment.
    pub fn is_empty(&self) -> bool {
        self.non_blank_values().next().is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Junction {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

// Junction names are matched without regard to case.
impl<'de> Deserialize<'de> for Junction {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        match name.trim() {
            n if n.eq_ignore_ascii_case("and") => Ok(Junction::And),
            n if n.eq_ignore_ascii_case("or") => Ok(Junction::Or),
            other => Err(serde::de::Error::unknown_variant(other, &["AND", "OR"])),
        }
    }
}

/// Boolean junction over rules and nested conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "condition")]
    pub junction: Junction,
    #[serde(default, alias = "rules")]
    pub children: Vec<Criterion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Criterion {
    Condition(Condition),
    Rule(Rule),
}

impl From<Rule> for Criterion {
    fn from(rule: Rule) -> Self {
        Criterion::Rule(rule)
    }
}

impl From<Condition> for Criterion {
    fn from(condition: Condition) -> Self {
        Criterion::Condition(condition)
    }
}

impl Condition {
    pub fn new(junction: Junction, children: Vec<Criterion>) -> Self {
        Condition {
            id: String::new(),
            junction,
            children,
        }
    }

    pub fn and<I, C>(children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Criterion>,
    {
        Self::new(Junction::And, children.into_iter().map(Into::into).collect())
    }

    pub fn or<I, C>(children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Criterion>,
    {
        Self::new(Junction::Or, children.into_iter().map(Into::into).collect())
    }

    pub fn push<C: Into<Criterion>>(&mut self, child: C) {
        self.children.push(child.into());
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of rules in the whole tree.
    pub fn rule_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                Criterion::Rule(_) => 1,
                Criterion::Condition(condition) => condition.rule_count(),
            })
            .sum()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
