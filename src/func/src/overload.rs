// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Overload sets: all signatures registered under one function name.

use std::collections::BTreeMap;

use itertools::Itertools;
use tern_repr::{DataType, FuncArg};
use tracing::trace;

use crate::error::ArityError;
use crate::signature::Signature;

/// One function implementation: a signature plus the opaque handle the
/// execution layer invokes once the call is resolved.
#[derive(Clone, Debug)]
pub struct FuncImpl<D: DataType, R> {
    signature: Signature<D>,
    op: R,
}

impl<D: DataType, R> FuncImpl<D, R> {
    pub fn new(signature: Signature<D>, op: R) -> FuncImpl<D, R> {
        FuncImpl { signature, op }
    }

    pub fn signature(&self) -> &Signature<D> {
        &self.signature
    }

    pub fn op(&self) -> &R {
        &self.op
    }
}

/// The overload set of a single function name.
///
/// Signatures are probed in registration order and the first match wins, even
/// if a later signature would also match; register overloads from most
/// specific to least specific. The implementation handle lives on the
/// signature that matched, so a successful match always has its
/// implementation. An exact-type index over the canonical (single-type,
/// non-variadic) signatures serves lookups that bypass matching entirely,
/// e.g. for calls restored from a persisted catalog.
#[derive(Clone, Debug)]
pub struct Func<D: DataType, R> {
    impls: Vec<FuncImpl<D, R>>,
    exact: BTreeMap<Vec<D>, usize>,
}

impl<D: DataType, R> Func<D, R> {
    pub fn new(impls: Vec<FuncImpl<D, R>>) -> Func<D, R> {
        let mut exact = BTreeMap::new();
        for (i, fimpl) in impls.iter().enumerate() {
            if let Some(types) = fimpl.signature.canonical_types() {
                // First registration wins, consistent with probe order.
                exact.entry(types).or_insert(i);
            }
        }
        Func { impls, exact }
    }

    /// The registered implementations, in registration order.
    pub fn impls(&self) -> &[FuncImpl<D, R>] {
        &self.impls
    }

    /// Resolves `args` to the first matching signature's handle and the
    /// coerced argument type list, or `None` if no signature matches.
    pub fn resolve<A>(&self, args: &[A]) -> Result<Option<(&R, Vec<D>)>, ArityError>
    where
        A: FuncArg<Type = D>,
    {
        for fimpl in &self.impls {
            if let Some(resolved) = fimpl.signature.matches(args)? {
                return Ok(Some((&fimpl.op, resolved)));
            }
        }
        trace!(
            arg_types = %args.iter().map(|a| a.value_type()).join(", "),
            "no overload matched"
        );
        Ok(None)
    }

    /// Exact-type lookup, bypassing matching and coercion.
    pub fn get(&self, types: &[D]) -> Option<&R> {
        self.exact.get(types).map(|i| &self.impls[*i].op)
    }
}

#[cfg(test)]
mod tests {
    use tern_repr_test_util::{numeric_types, TestArg, TestType};

    use super::*;
    use crate::param::Param;

    use TestType::*;

    fn func() -> Func<TestType, &'static str> {
        Func::new(vec![
            FuncImpl::new(Signature::new(vec![Param::exact(String)]), "string"),
            FuncImpl::new(Signature::new(vec![Param::exact(Int32)]), "int"),
        ])
    }

    #[test]
    fn test_each_overload_resolved_by_its_type() {
        let f = func();
        let (op, resolved) = f.resolve(&[TestArg::literal(String)]).unwrap().unwrap();
        assert_eq!(*op, "string");
        assert_eq!(resolved, vec![String]);

        let (op, resolved) = f.resolve(&[TestArg::literal(Int32)]).unwrap().unwrap();
        assert_eq!(*op, "int");
        assert_eq!(resolved, vec![Int32]);
    }

    #[test]
    fn test_unconvertible_argument_matches_nothing() {
        let f = func();
        assert!(f.resolve(&[TestArg::literal(Bool)]).unwrap().is_none());
    }

    #[test]
    fn test_first_match_wins_in_registration_order() {
        // Both signatures admit a castable Int16; the first registered wins.
        let f = Func::new(vec![
            FuncImpl::new(Signature::new(vec![Param::exact(Int64)]), "first"),
            FuncImpl::new(Signature::new(vec![Param::exact(Int32)]), "second"),
        ]);
        let (op, resolved) = f.resolve(&[TestArg::literal(Int16)]).unwrap().unwrap();
        assert_eq!(*op, "first");
        assert_eq!(resolved, vec![Int64]);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let f = Func::new(vec![
            FuncImpl::new(
                Signature::new(vec![Param::of(numeric_types())])
                    .with_var_args(vec![Param::of(numeric_types())]),
                "variadic",
            ),
            FuncImpl::new(Signature::new(vec![Param::exact(Int64)]), "unary"),
        ]);
        let args = [TestArg::literal(Int64), TestArg::literal(Float32)];
        let (_, first) = f.resolve(&args).unwrap().unwrap();
        for _ in 0..10 {
            let (op, resolved) = f.resolve(&args).unwrap().unwrap();
            assert_eq!(*op, "variadic");
            assert_eq!(resolved, first);
        }
    }

    #[test]
    fn test_exact_lookup_skips_coercion() {
        let f = func();
        assert_eq!(f.get(&[String]), Some(&"string"));
        assert_eq!(f.get(&[Int32]), Some(&"int"));
        // Int16 would coerce under `resolve`, but exact lookup does not.
        assert_eq!(f.get(&[Int16]), None);
        assert_eq!(f.get(&[]), None);
    }

    #[test]
    fn test_arity_error_stops_the_probe() {
        let f = Func::new(vec![
            FuncImpl::new(
                Signature::new(vec![Param::exact(String)])
                    .with_var_args_bounded(1, vec![Param::exact(Int64), Param::exact(Int64)]),
                "variadic",
            ),
            // Would match three strings, but is never reached: the call shape
            // is malformed for the group and that is a caller error.
            FuncImpl::new(
                Signature::new(vec![
                    Param::exact(String),
                    Param::any(),
                    Param::any(),
                    Param::any(),
                ]),
                "fallback",
            ),
        ]);
        let args = [
            TestArg::literal(String),
            TestArg::literal(Int64),
            TestArg::literal(Int64),
            TestArg::literal(Int64),
        ];
        assert!(f.resolve(&args).is_err());
    }
}
