// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Interfaces through which the function-resolution engine observes the
//! surrounding engine's type system.
//!
//! The concrete catalog of data types (which types exist, which conversions
//! are lossless, which type is preferred when several are viable) lives in
//! the planner, not here. Resolution only ever consults the relations exposed
//! by [`DataType`], and only ever inspects call-site arguments through
//! [`FuncArg`]. Both are implemented by the caller; this crate defines the
//! contract.

use std::fmt;

/// A data type as seen by overload resolution.
///
/// Implementations are identity values: equality must mean domain identity,
/// never structural similarity. Cloning is expected to be cheap (types are
/// interned handles or small enums in practice).
///
/// `Ord` is unrelated to [`precedes`](DataType::precedes); it exists so that
/// resolved type lists can serve as lookup keys and carries no semantic
/// weight.
pub trait DataType: Clone + Eq + Ord + fmt::Debug + fmt::Display {
    /// The structural category of a type (scalar, array-like, ...), used by
    /// parameter slots that constrain the shape of a type rather than its
    /// identity.
    type Category: Clone + Eq + fmt::Debug;

    /// Whether `self` is preferred over `other` as the common type when both
    /// are otherwise viable.
    ///
    /// This must be a strict partial order: irreflexive and transitive. Two
    /// types may be incomparable, in which case resolution falls back to the
    /// order in which it encountered them.
    fn precedes(&self, other: &Self) -> bool;

    /// Whether a value of `self` can be coerced to `target` without losing
    /// the intent of the value (widening). Directed; `a.is_convertible_to(b)`
    /// implies nothing about `b.is_convertible_to(a)`.
    fn is_convertible_to(&self, target: &Self) -> bool;

    /// The structural category of this type.
    fn category(&self) -> Self::Category;
}

/// One argument at a function call site.
///
/// Constructed by the expression analyzer once per argument; resolution never
/// inspects the underlying expression.
pub trait FuncArg {
    /// The type system this argument belongs to.
    type Type: DataType;

    /// The value type of the argument. Always present; an argument with no
    /// known type must not reach resolution.
    fn value_type(&self) -> &Self::Type;

    /// Whether the argument may be coerced to another type to satisfy a
    /// parameter slot.
    ///
    /// True for literals and other constant expressions. False for column
    /// references: a column's physical type is fixed by storage and cannot be
    /// cast away. The caller computes this once when building the argument,
    /// rather than resolution re-deriving it from expression structure on
    /// every probe.
    fn is_castable(&self) -> bool;
}

impl<A: FuncArg> FuncArg for &A {
    type Type = A::Type;

    fn value_type(&self) -> &Self::Type {
        (**self).value_type()
    }

    fn is_castable(&self) -> bool {
        (**self).is_castable()
    }
}
