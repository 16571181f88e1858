// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! User-facing resolution errors.
//!
//! Slot-level type mismatches never appear here; they are absorbed while
//! probing the next candidate signature. What does surface always names the
//! function and the full list of supplied argument types, so the caller can
//! see why no overload applied.

use std::error::Error;
use std::fmt;

/// A variadic call shape that is wrong in itself: the trailing arguments do
/// not form whole repetitions of the signature's repeating group, or they
/// exceed its occurrence bound.
///
/// Distinct from a type mismatch: no other signature of the same function is
/// tried, because a malformed arity is not repaired by different parameter
/// types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArityError {
    /// Total number of supplied arguments.
    pub supplied: usize,
    /// Number of fixed parameters of the signature.
    pub fixed: usize,
    /// Length of the repeating group.
    pub group_len: usize,
    /// Configured bound on group repetitions, if any.
    pub max_occurrences: Option<usize>,
}

impl fmt::Display for ArityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "expected {} arguments plus whole repetitions of a {}-argument group",
            self.fixed, self.group_len
        )?;
        if let Some(max) = self.max_occurrences {
            write!(f, " (at most {} repetitions)", max)?;
        }
        write!(f, ", got {}", self.supplied)
    }
}

impl Error for ArityError {}

/// An error resolving a function call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FuncError {
    /// No overload set, schema, or matching signature exists for the call.
    UnknownFunction {
        name: String,
        arg_types: Vec<String>,
    },
    /// The call's argument count does not fit the matched signature's
    /// variadic shape.
    WrongArgumentCount {
        name: String,
        arg_types: Vec<String>,
        arity: ArityError,
    },
}

impl FuncError {
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::UnknownFunction { .. } => None,
            Self::WrongArgumentCount { arity, .. } => Some(arity.to_string()),
        }
    }

    pub fn hint(&self) -> Option<String> {
        match self {
            Self::UnknownFunction { .. } => Some(
                "No function matches the given name and argument types. \
                 You might need to add explicit type casts."
                    .into(),
            ),
            Self::WrongArgumentCount { .. } => None,
        }
    }
}

impl fmt::Display for FuncError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnknownFunction { name, arg_types } => {
                write!(f, "function {}({}) does not exist", name, arg_types.join(", "))
            }
            Self::WrongArgumentCount { name, arg_types, .. } => {
                write!(
                    f,
                    "wrong number of arguments in call to function {}({})",
                    name,
                    arg_types.join(", ")
                )
            }
        }
    }
}

impl Error for FuncError {}
