/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Low level helpers shared by every search operation: escaping, literal and
//! IRI rendering, fresh variables and triple/filter emission. All emitters
//! only append to the caller's buffer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;

use crate::namespace::NamespaceResolver;

pub const UNION: &str = " UNION ";
pub const BLOCK_START: &str = " { ";
pub const BLOCK_END: &str = " } ";
pub const STATEMENT_SEPARATOR: &str = " . ";
pub const FILTER_BLOCK_START: &str = " FILTER ( ";
pub const FILTER_NOT_EXISTS_START: &str = " FILTER NOT EXISTS { ";
pub const CLOSE_BRACKET: &str = " ) ";
pub const FILTER_OR: &str = " || ";
pub const FILTER_AND: &str = " && ";

static VARIABLE_COUNTER: AtomicU64 = AtomicU64::new(0);

fn iri_forbidden() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"[\x00-\x20<>"{}|^`\\]"#).expect("valid IRI pattern"))
}

fn prefixed_name() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9_\-]*:([A-Za-z0-9_]([A-Za-z0-9_\-\.]*[A-Za-z0-9_\-])?)?$")
            .expect("valid prefixed name pattern")
    })
}

fn prefix_part() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_\-]*$").expect("valid prefix pattern"))
}

fn variable_name() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\?[A-Za-z0-9_]+$").expect("valid variable pattern"))
}

fn numeric_literal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?([0-9]+(\.[0-9]+)?|\.[0-9]+)([eE][+-]?[0-9]+)?$")
            .expect("valid numeric pattern")
    })
}

/// Escapes a value so it can be placed between double quotes in a SPARQL
/// string literal.
pub fn escape(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len() + 8);
    for c in literal.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\u{8}' => escaped.push_str("\\b"),
            '\u{c}' => escaped.push_str("\\f"),
            c if c.is_control() => {}
            c => escaped.push(c),
        }
    }
    escaped
}

/// Escapes regex meta characters and then the result for a string literal.
pub fn escape_regex(literal: &str) -> String {
    escape(&regex::escape(literal))
}

pub fn string_literal(value: &str) -> String {
    format!("\"{}\"", escape(value))
}

pub fn typed_literal(value: &str, datatype: &str) -> String {
    format!("\"{}\"^^{}", escape(value), datatype)
}

/// Returns a variable name that is unique for the lifetime of the process.
/// The hint only makes generated queries easier to read.
pub fn fresh_variable(hint: &str) -> String {
    let id = VARIABLE_COUNTER.fetch_add(1, Ordering::Relaxed);
    let local = hint
        .rsplit(|c| c == ':' || c == '#' || c == '/')
        .next()
        .unwrap_or("");
    let sanitized: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if sanitized.is_empty() {
        format!("?v_{}", id)
    } else {
        format!("?{}_{}", sanitized, id)
    }
}

/// A value that should be treated as a resource rather than a literal.
pub fn is_class_like(value: &str) -> bool {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        return true;
    }
    if value.starts_with('<') && value.ends_with('>') {
        return true;
    }
    // an escaped separator marks a literal value
    if value.contains("\\:") {
        return false;
    }
    value.contains(':') || value.contains('#')
}

pub fn is_valid_iri(iri: &str) -> bool {
    !iri.is_empty() && !iri_forbidden().is_match(iri)
}

/// Renders a value as an IRI reference.
///
/// Prefixed names are expanded through the resolver; a prefixed name with an
/// unknown prefix is kept as written when it is syntactically valid.
pub fn render_iri(value: &str, resolver: &dyn NamespaceResolver) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let unwrapped = value
        .strip_prefix('<')
        .and_then(|v| v.strip_suffix('>'))
        .unwrap_or(value);
    if unwrapped.starts_with("http://") || unwrapped.starts_with("https://") {
        return is_valid_iri(unwrapped).then(|| format!("<{}>", unwrapped));
    }

    let (prefix, _) = unwrapped.split_once(':')?;
    if !prefix_part().is_match(prefix) {
        return None;
    }
    if let Some(full) = resolver.expand(unwrapped) {
        return is_valid_iri(&full).then(|| format!("<{}>", full));
    }
    prefixed_name()
        .is_match(unwrapped)
        .then(|| unwrapped.to_string())
}

/// Renders a rule field as a predicate. Fields arrive already qualified, so
/// only full IRIs are wrapped; variables and prefixed names pass through.
pub fn predicate(field: &str) -> Option<String> {
    let field = field.trim();
    if field == "a" {
        return Some(field.to_string());
    }
    if variable_name().is_match(field) {
        return Some(field.to_string());
    }
    let unwrapped = field
        .strip_prefix('<')
        .and_then(|v| v.strip_suffix('>'))
        .unwrap_or(field);
    if unwrapped.starts_with("http://") || unwrapped.starts_with("https://") {
        return is_valid_iri(unwrapped).then(|| format!("<{}>", unwrapped));
    }
    prefixed_name().is_match(field).then(|| field.to_string())
}

/// Validates a numeric value and returns it in SPARQL numeric syntax.
pub fn numeric_literal(value: &str) -> Option<String> {
    let value = value.trim();
    numeric_literal_pattern()
        .is_match(value)
        .then(|| value.trim_start_matches('+').to_string())
}

/// Which end of a day a plain date stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Start,
    End,
}

/// Parses a date or timestamp and returns an `xsd:dateTime` literal in UTC.
/// A plain `YYYY-MM-DD` is widened to the start or the end of that day.
pub fn date_time_literal(value: &str, bound: DateBound) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let timestamp: DateTime<Utc> = if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        parsed.with_timezone(&Utc)
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        naive.and_utc()
    } else if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let naive = match bound {
            DateBound::Start => date.and_hms_milli_opt(0, 0, 0, 0)?,
            DateBound::End => date.and_hms_milli_opt(23, 59, 59, 999)?,
        };
        naive.and_utc()
    } else {
        return None;
    };

    Some(typed_literal(
        &timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        "xsd:dateTime",
    ))
}

/// `xsd:date` literal for a plain date, or `None` when the value is not one.
pub fn date_literal(value: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()?;
    Some(typed_literal(&date.format("%Y-%m-%d").to_string(), "xsd:date"))
}

pub fn emit_triple(builder: &mut String, subject: &str, predicate: &str, object: &str) {
    builder.push_str(subject);
    builder.push(' ');
    builder.push_str(predicate);
    builder.push(' ');
    builder.push_str(object);
    builder.push_str(STATEMENT_SEPARATOR);
}

pub fn emit_filter(builder: &mut String, expression: &str) {
    builder.push_str(FILTER_BLOCK_START);
    builder.push_str(expression);
    builder.push_str(CLOSE_BRACKET);
    builder.push_str(STATEMENT_SEPARATOR);
}

/// Appends the blocks as alternatives: `{ a } UNION { b }`. A single block is
/// appended as is. Empty blocks are skipped; returns how many were written.
pub fn emit_union<S: AsRef<str>>(builder: &mut String, blocks: &[S]) -> usize {
    let blocks: Vec<&str> = blocks
        .iter()
        .map(|b| b.as_ref())
        .filter(|b| !b.trim().is_empty())
        .collect();
    match blocks.len() {
        0 => {}
        1 => builder.push_str(blocks[0]),
        _ => {
            for (i, block) in blocks.iter().enumerate() {
                if i > 0 {
                    builder.push_str(UNION);
                }
                builder.push_str(BLOCK_START);
                builder.push_str(block);
                builder.push_str(BLOCK_END);
            }
        }
    }
    blocks.len()
}
