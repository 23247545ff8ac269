// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod config;
pub mod credential;
pub mod error;
pub mod fetch;
pub mod flow;
pub mod format;
pub mod info;
pub mod scope;
pub mod store;
pub mod tokeninfo;

#[cfg(test)]
pub mod test_support;
