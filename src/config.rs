/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{Result, SearchError};

/// Reserved names used while compiling rules.
///
/// Every field has a default, so a partial JSON document only needs to list
/// the values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Name of the variable bound to the searched instances, without `?`.
    pub instance_variable: String,
    /// Rule field that addresses the instance identifiers directly.
    pub instance_id_field: String,
    /// Predicate holding the plain type identifier of an instance.
    pub type_identifier_field: String,
    /// Prefix given to plain instance identifiers.
    pub default_instance_prefix: String,
    /// Class of the free-text search resource.
    pub free_text_connector: String,
    pub free_text_query_predicate: String,
    pub free_text_entities_predicate: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            instance_variable: "instance".to_string(),
            instance_id_field: "instanceId".to_string(),
            type_identifier_field: "emf:type".to_string(),
            default_instance_prefix: "emf".to_string(),
            free_text_connector: "solr:ftsearch".to_string(),
            free_text_query_predicate: "solr:query".to_string(),
            free_text_entities_predicate: "solr:entities".to_string(),
        }
    }
}

fn variable_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid variable pattern"))
}

impl SearchConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SearchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// The instance variable as it appears in a query, e.g. `?instance`.
    pub fn instance_var(&self) -> String {
        format!("?{}", self.instance_variable)
    }

    pub fn validate(&self) -> Result<()> {
        if !variable_name_pattern().is_match(&self.instance_variable) {
            return Err(SearchError::InvalidConfig(format!(
                "'{}' is not a valid SPARQL variable name",
                self.instance_variable
            )));
        }

        let required = [
            ("instance_id_field", &self.instance_id_field),
            ("type_identifier_field", &self.type_identifier_field),
            ("free_text_connector", &self.free_text_connector),
            ("free_text_query_predicate", &self.free_text_query_predicate),
            ("free_text_entities_predicate", &self.free_text_entities_predicate),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SearchError::InvalidConfig(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }
}
