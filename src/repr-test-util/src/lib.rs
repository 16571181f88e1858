// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A miniature concrete type catalog for tests.
//!
//! Production catalogs live in the planner; the resolution crates are generic
//! over [`DataType`]. Tests need *some* catalog, and every test wanting its
//! own invites subtle divergence, so this crate pins one down: a widening-only
//! numeric tower plus a few scalar types and element-typed arrays.
//!
//! Conversion here is strictly widening: integers widen to wider integers
//! and to either float, and `Float32` widens to `Float64`. Nothing narrows.
//! `Undefined` (the type of an untyped literal like `NULL`) converts to
//! anything. `Bool` and `String` convert only to themselves.

use std::fmt;

use tern_repr::{DataType, FuncArg};

/// The types known to the test catalog.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TestType {
    /// The type of an untyped literal. Converts to anything; preceded by
    /// every other type.
    Undefined,
    Bool,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Array(Box<TestType>),
}

/// Structural categories for [`TestType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestCategory {
    Scalar,
    Array,
}

impl TestType {
    /// Preference rank; a higher rank precedes a lower one. Types outside the
    /// numeric tower are incomparable with it (and with each other).
    fn rank(&self) -> Option<u8> {
        match self {
            TestType::Float64 => Some(50),
            TestType::Float32 => Some(40),
            TestType::Int64 => Some(30),
            TestType::Int32 => Some(20),
            TestType::Int16 => Some(10),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.rank().is_some()
    }
}

impl DataType for TestType {
    type Category = TestCategory;

    fn precedes(&self, other: &Self) -> bool {
        use TestType::*;
        match (self, other) {
            (Undefined, _) => false,
            (_, Undefined) => true,
            (Array(a), Array(b)) => a.precedes(b),
            (a, b) => match (a.rank(), b.rank()) {
                (Some(ra), Some(rb)) => ra > rb,
                _ => false,
            },
        }
    }

    fn is_convertible_to(&self, target: &Self) -> bool {
        use TestType::*;
        if self == target {
            return true;
        }
        match (self, target) {
            (Undefined, _) => true,
            (Int16, Int32 | Int64 | Float32 | Float64) => true,
            (Int32, Int64 | Float32 | Float64) => true,
            (Int64, Float32 | Float64) => true,
            (Float32, Float64) => true,
            (Array(a), Array(b)) => a.is_convertible_to(b),
            _ => false,
        }
    }

    fn category(&self) -> TestCategory {
        match self {
            TestType::Array(_) => TestCategory::Array,
            _ => TestCategory::Scalar,
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TestType::Undefined => f.write_str("undefined"),
            TestType::Bool => f.write_str("boolean"),
            TestType::Int16 => f.write_str("smallint"),
            TestType::Int32 => f.write_str("integer"),
            TestType::Int64 => f.write_str("bigint"),
            TestType::Float32 => f.write_str("real"),
            TestType::Float64 => f.write_str("double precision"),
            TestType::String => f.write_str("text"),
            TestType::Array(inner) => write!(f, "{}[]", inner),
        }
    }
}

/// A call-site argument: a type plus whether the argument may be coerced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestArg {
    ty: TestType,
    castable: bool,
}

impl TestArg {
    /// A literal or constant argument; resolution may coerce it.
    pub fn literal(ty: TestType) -> TestArg {
        TestArg { ty, castable: true }
    }

    /// A column-reference argument; its type is fixed by storage.
    pub fn column(ty: TestType) -> TestArg {
        TestArg {
            ty,
            castable: false,
        }
    }
}

impl FuncArg for TestArg {
    type Type = TestType;

    fn value_type(&self) -> &TestType {
        &self.ty
    }

    fn is_castable(&self) -> bool {
        self.castable
    }
}

/// The numeric tower, widest first.
pub fn numeric_types() -> Vec<TestType> {
    vec![
        TestType::Float64,
        TestType::Float32,
        TestType::Int64,
        TestType::Int32,
        TestType::Int16,
    ]
}
