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

use crate::condition::{Rule, FREE_TEXT_TYPE};
use crate::config::SearchConfig;
use crate::fragment;
use crate::free_text::FreeTextPreparer;

use super::{SearchOperation, FREE_TEXT_PRIORITY};

/// Full text search through the index connector:
///
/// `?search_1 a solr:ftsearch ; solr:query "..." ; solr:entities ?instance .`
pub struct FreeTextSearchOperation {
    config: Arc<SearchConfig>,
    preparer: Arc<dyn FreeTextPreparer>,
}

impl FreeTextSearchOperation {
    pub fn new(config: Arc<SearchConfig>, preparer: Arc<dyn FreeTextPreparer>) -> Self {
        Self { config, preparer }
    }
}

impl SearchOperation for FreeTextSearchOperation {
    fn name(&self) -> &'static str {
        "free_text"
    }

    fn priority(&self) -> i32 {
        FREE_TEXT_PRIORITY
    }

    fn is_applicable(&self, rule: &Rule) -> bool {
        rule.operator_is("contains") && rule.type_is(FREE_TEXT_TYPE)
    }

    fn build(&self, builder: &mut String, rule: &Rule) {
        if rule.values.len() != 1 {
            return;
        }
        let raw = rule.values[0].trim();
        if raw.is_empty() {
            return;
        }
        let prepared = self.preparer.prepare(raw);
        if prepared.trim().is_empty() {
            return;
        }

        let search = fragment::fresh_variable("search");
        builder.push_str(&search);
        builder.push_str(" a ");
        builder.push_str(&self.config.free_text_connector);
        builder.push_str(" ; ");
        builder.push_str(&self.config.free_text_query_predicate);
        builder.push(' ');
        builder.push_str(&fragment::string_literal(&prepared));
        builder.push_str(" ; ");
        builder.push_str(&self.config.free_text_entities_predicate);
        builder.push(' ');
        builder.push_str(&self.config.instance_var());
        builder.push_str(fragment::STATEMENT_SEPARATOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::free_text::SolrQueryPreparer;

    struct Verbatim;

    impl FreeTextPreparer for Verbatim {
        fn prepare(&self, raw_query: &str) -> String {
            raw_query.to_string()
        }
    }

    fn build_with(preparer: Arc<dyn FreeTextPreparer>, values: &[&str]) -> String {
        let op = FreeTextSearchOperation::new(Arc::new(SearchConfig::default()), preparer);
        let rule = Rule::new("freeText", "contains", "fts", values.iter().copied());
        assert!(op.is_applicable(&rule));
        let mut builder = String::new();
        op.build(&mut builder, &rule);
        builder
    }

    #[test]
    fn test_blank_text_is_a_no_op() {
        assert!(build_with(Arc::new(SolrQueryPreparer::new()), &["   "]).is_empty());
        assert!(build_with(Arc::new(SolrQueryPreparer::new()), &[]).is_empty());
    }

    #[test]
    fn test_prepared_text_is_embedded() {
        let fragment = build_with(Arc::new(SolrQueryPreparer::new()), &["cats or dogs"]);
        assert!(fragment.starts_with("?search_"));
        assert!(fragment.contains(" a solr:ftsearch ; solr:query \"cats OR dogs\" ; solr:entities ?instance . "));
    }

    #[test]
    fn test_quotes_never_survive_unescaped() {
        let fragment = build_with(Arc::new(Verbatim), &["say \"hi\" } ; DROP"]);
        let literal_start = fragment.find("solr:query \"").unwrap() + "solr:query \"".len();
        let literal_end = fragment.rfind("\" ; solr:entities").unwrap();
        let literal = &fragment[literal_start..literal_end];
        assert_eq!(literal, "say \\\"hi\\\" } ; DROP");
    }

    #[test]
    fn test_not_applicable_to_other_types() {
        let op = FreeTextSearchOperation::new(
            Arc::new(SearchConfig::default()),
            Arc::new(SolrQueryPreparer::new()),
        );
        assert!(!op.is_applicable(&Rule::new("dcterms:title", "contains", "string", ["x"])));
    }
}
