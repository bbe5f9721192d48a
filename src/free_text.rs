/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use nom::{
    branch::alt,
    bytes::complete::{escaped, is_not, tag, take_while1},
    character::complete::{char, multispace0, none_of, one_of},
    combinator::{all_consuming, map, opt, recognize},
    multi::many0,
    sequence::{delimited, preceded},
    IResult,
};

/// Turns raw user text into a query string for the text index.
pub trait FreeTextPreparer: Send + Sync {
    fn prepare(&self, raw_query: &str) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Phrase(&'a str),
    Operator(&'static str),
    Open,
    Close,
    Term(&'a str),
}

/// Characters with a meaning in the Lucene/Solr query syntax. `*` and `?`
/// are left alone so users keep their wildcards.
const SOLR_SPECIAL_CHARS: &[char] = &[
    '\\', '+', '-', '!', '(', ')', ':', '^', '[', ']', '"', '{', '}', '~', '|', '&', ';', '/',
];

/// Normalizes free text into Solr query syntax: `and`/`or`/`not` in any
/// case become operators, quoted phrases are kept, everything else is
/// escaped term by term.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolrQueryPreparer;

impl SolrQueryPreparer {
    pub fn new() -> Self {
        SolrQueryPreparer
    }
}

fn phrase(input: &str) -> IResult<&str, Token<'_>> {
    map(
        delimited(
            char('"'),
            recognize(opt(escaped(is_not("\"\\"), '\\', one_of("\"\\")))),
            char('"'),
        ),
        Token::Phrase,
    )(input)
}

fn is_term_char(c: char) -> bool {
    !c.is_whitespace() && c != '(' && c != ')' && c != '"'
}

fn word(input: &str) -> IResult<&str, Token<'_>> {
    map(take_while1(is_term_char), |w: &str| {
        if w.eq_ignore_ascii_case("and") || w == "&&" {
            Token::Operator("AND")
        } else if w.eq_ignore_ascii_case("or") || w == "||" {
            Token::Operator("OR")
        } else if w.eq_ignore_ascii_case("not") {
            Token::Operator("NOT")
        } else {
            Token::Term(w)
        }
    })(input)
}

fn grouping(input: &str) -> IResult<&str, Token<'_>> {
    alt((map(tag("("), |_| Token::Open), map(tag(")"), |_| Token::Close)))(input)
}

// An unterminated quote is read as part of a term.
fn stray_quote(input: &str) -> IResult<&str, Token<'_>> {
    map(recognize(preceded(char('"'), many0(none_of(" \t\r\n")))), Token::Term)(input)
}

fn tokens(input: &str) -> IResult<&str, Vec<Token<'_>>> {
    let (input, tokens) = many0(preceded(
        multispace0,
        alt((phrase, grouping, word, stray_quote)),
    ))(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, tokens))
}

fn escape_term(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 4);
    for c in term.chars() {
        if SOLR_SPECIAL_CHARS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Drops operators that have nothing to bind to and parentheses that do not
/// balance, which the index would otherwise reject.
fn normalize(tokens: Vec<Token<'_>>) -> Vec<Token<'_>> {
    let mut balanced = Vec::with_capacity(tokens.len());
    let mut depth = 0usize;
    for token in tokens {
        match token {
            Token::Open => {
                depth += 1;
                balanced.push(token);
            }
            Token::Close if depth == 0 => {}
            Token::Close => {
                depth -= 1;
                balanced.push(token);
            }
            _ => balanced.push(token),
        }
    }
    for _ in 0..depth {
        balanced.push(Token::Close);
    }

    let mut result: Vec<Token<'_>> = Vec::with_capacity(balanced.len());
    for token in balanced {
        let binary = |t: &Token<'_>| matches!(t, Token::Operator("AND") | Token::Operator("OR"));
        if binary(&token) {
            let previous_binds = matches!(
                result.last(),
                Some(Token::Term(_)) | Some(Token::Phrase(_)) | Some(Token::Close)
            );
            if !previous_binds {
                continue;
            }
        }
        if token == Token::Close {
            while result.last().map_or(false, |t| matches!(t, Token::Operator(_))) {
                result.pop();
            }
            if result.last() == Some(&Token::Open) {
                result.pop();
                continue;
            }
        }
        result.push(token);
    }
    while result.last().map_or(false, |t| matches!(t, Token::Operator(_))) {
        result.pop();
    }
    result
}

impl FreeTextPreparer for SolrQueryPreparer {
    fn prepare(&self, raw_query: &str) -> String {
        let parsed = match all_consuming(tokens)(raw_query) {
            Ok((_, tokens)) => tokens,
            Err(err) => {
                log::debug!("free text '{}' could not be tokenized: {:?}", raw_query, err);
                return raw_query
                    .split_whitespace()
                    .map(escape_term)
                    .collect::<Vec<_>>()
                    .join(" ");
            }
        };

        let mut prepared = String::with_capacity(raw_query.len() + 8);
        for token in normalize(parsed) {
            let rendered = match token {
                Token::Phrase(text) => format!("\"{}\"", text),
                Token::Operator(op) => op.to_string(),
                Token::Open => "(".to_string(),
                Token::Close => ")".to_string(),
                Token::Term(text) => escape_term(text),
            };
            if !prepared.is_empty() && !prepared.ends_with('(') && rendered != ")" {
                prepared.push(' ');
            }
            prepared.push_str(&rendered);
        }
        prepared
    }
}
