/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use rustc_hash::FxHashMap;

/// Expands prefixed names such as `emf:Case` into full IRIs.
pub trait NamespaceResolver: Send + Sync {
    /// Returns the full IRI for a prefixed name, or `None` when the prefix is
    /// unknown or the value is not a prefixed name.
    fn expand(&self, short_identifier: &str) -> Option<String>;
}

pub const DEFAULT_NAMESPACES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("ptop", "http://www.ontotext.com/proton/protontop#"),
    ("emf", "http://ittruse.ittbg.com/ontology/enterpriseManagementFramework#"),
    ("solr", "http://www.ontotext.com/connectors/solr#"),
];

/// Prefix map backed resolver.
#[derive(Debug, Clone, Default)]
pub struct PrefixNamespaceResolver {
    prefixes: FxHashMap<String, String>,
}

impl PrefixNamespaceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver preloaded with [`DEFAULT_NAMESPACES`].
    pub fn with_defaults() -> Self {
        let mut resolver = Self::new();
        for (prefix, uri) in DEFAULT_NAMESPACES {
            resolver.add_prefix(prefix, uri);
        }
        resolver
    }

    pub fn add_prefix(&mut self, prefix: &str, uri: &str) {
        self.prefixes.insert(prefix.to_string(), uri.to_string());
    }

    pub fn with_prefix(mut self, prefix: &str, uri: &str) -> Self {
        self.add_prefix(prefix, uri);
        self
    }

    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// `PREFIX p: <uri>` lines for every registered prefix, sorted by prefix
    /// so the output is stable.
    pub fn prefix_declarations(&self) -> String {
        let mut entries: Vec<(&String, &String)> = self.prefixes.iter().collect();
        entries.sort();
        entries
            .into_iter()
            .map(|(prefix, uri)| format!("PREFIX {}: <{}>", prefix, uri))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl NamespaceResolver for PrefixNamespaceResolver {
    fn expand(&self, short_identifier: &str) -> Option<String> {
        if short_identifier.starts_with("http://") || short_identifier.starts_with("https://") {
            return None;
        }
        let (prefix, local_name) = short_identifier.split_once(':')?;
        self.prefixes
            .get(prefix)
            .map(|uri| format!("{}{}", uri, local_name))
    }
}
