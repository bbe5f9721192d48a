/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod compiler;
pub mod condition;
pub mod config;
pub mod error;
pub mod fragment;
pub mod free_text;
pub mod namespace;
pub mod operations;

pub use compiler::SearchCompiler;
pub use condition::{Condition, Criterion, Junction, Rule};
pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use free_text::{FreeTextPreparer, SolrQueryPreparer};
pub use namespace::{NamespaceResolver, PrefixNamespaceResolver};
pub use operations::{OperationRegistry, SearchOperation};
