// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Signatures: the parameter shape of one function implementation.
//!
//! A [`Signature`] is an ordered list of fixed parameter slots, optionally
//! followed by a repeating slot group (the variadic tail). Signatures are
//! immutable after registration; matching allocates transient binding state
//! per call, so one signature can be probed concurrently from many planning
//! threads.

use tern_repr::{DataType, FuncArg};
use tracing::trace;

use crate::error::ArityError;
use crate::param::{Binding, Param};

/// The repeating tail of a variadic signature.
#[derive(Clone, Debug, PartialEq, Eq)]
struct VarArgs<D: DataType> {
    /// The slots repeated as a unit. Never empty.
    group: Vec<Param<D>>,
    /// Maximum number of repetitions of the group; `None` is unbounded.
    max_occurrences: Option<usize>,
}

/// The parameter shape of one function implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature<D: DataType> {
    fixed: Vec<Param<D>>,
    var_args: Option<VarArgs<D>>,
}

impl<D: DataType> Signature<D> {
    /// A signature with the given fixed parameters and no variadic tail.
    pub fn new(fixed: Vec<Param<D>>) -> Signature<D> {
        Signature {
            fixed,
            var_args: None,
        }
    }

    /// The signature of a zero-argument function.
    pub fn nullary() -> Signature<D> {
        Signature::new(Vec::new())
    }

    /// Appends an unbounded variadic tail. May be configured at most once.
    ///
    /// # Panics
    ///
    /// Panics if a variadic tail is already configured or `group` is empty.
    pub fn with_var_args(self, group: Vec<Param<D>>) -> Signature<D> {
        self.install_var_args(group, None)
    }

    /// Appends a variadic tail repeated at most `max_occurrences` times.
    ///
    /// # Panics
    ///
    /// Panics if a variadic tail is already configured or `group` is empty.
    pub fn with_var_args_bounded(
        self,
        max_occurrences: usize,
        group: Vec<Param<D>>,
    ) -> Signature<D> {
        self.install_var_args(group, Some(max_occurrences))
    }

    fn install_var_args(
        mut self,
        group: Vec<Param<D>>,
        max_occurrences: Option<usize>,
    ) -> Signature<D> {
        assert!(
            self.var_args.is_none(),
            "a signature's variadic tail may only be configured once"
        );
        assert!(!group.is_empty(), "a variadic group must not be empty");
        self.var_args = Some(VarArgs {
            group,
            max_occurrences,
        });
        self
    }

    /// The number of fixed parameters; a hard lower bound on argument count.
    pub fn fixed_len(&self) -> usize {
        self.fixed.len()
    }

    /// The exact argument type list this signature was registered under, if
    /// it names one: all fixed slots constrained to a single type and no
    /// variadic tail.
    pub(crate) fn canonical_types(&self) -> Option<Vec<D>> {
        if self.var_args.is_some() {
            return None;
        }
        self.fixed
            .iter()
            .map(|param| param.sole_type().cloned())
            .collect()
    }

    /// Matches `args` against this signature.
    ///
    /// Returns the resolved type list on a match and `Ok(None)` when the
    /// signature does not apply to this call, either because an argument type
    /// cannot be admitted or because the argument count belongs to a
    /// different overload. A variadic call shape that is malformed in itself
    /// (a partial trailing group, or more repetitions than the configured
    /// bound) is an [`ArityError`]: no other signature can repair it, so it
    /// surfaces to the caller instead of being treated as a probe miss.
    pub fn matches<A>(&self, args: &[A]) -> Result<Option<Vec<D>>, ArityError>
    where
        A: FuncArg<Type = D>,
    {
        if args.len() < self.fixed.len() {
            return Ok(None);
        }
        let surplus = args.len() - self.fixed.len();
        match &self.var_args {
            None if surplus > 0 => return Ok(None),
            Some(var_args) if surplus > 0 => {
                let group_len = var_args.group.len();
                let malformed = surplus % group_len != 0
                    || var_args
                        .max_occurrences
                        .is_some_and(|max| surplus > group_len * max);
                if malformed {
                    return Err(ArityError {
                        supplied: args.len(),
                        fixed: self.fixed.len(),
                        group_len,
                        max_occurrences: var_args.max_occurrences,
                    });
                }
            }
            _ => {}
        }

        let mut fixed_bindings: Vec<_> = self.fixed.iter().map(Binding::new).collect();
        let mut var_bindings: Vec<_> = match &self.var_args {
            Some(var_args) => var_args.group.iter().map(Binding::new).collect(),
            None => Vec::new(),
        };

        for (i, arg) in args.iter().enumerate() {
            let binding = if i < self.fixed.len() {
                &mut fixed_bindings[i]
            } else {
                let k = i - self.fixed.len();
                let idx = k % var_bindings.len();
                &mut var_bindings[idx]
            };
            if let Err(mismatch) = binding.bind(arg.value_type(), arg.is_castable(), i + 1) {
                trace!(position = mismatch.position, "signature does not match");
                return Ok(None);
            }
        }

        let mut resolved = Vec::with_capacity(args.len());
        for binding in &fixed_bindings {
            resolved.push(binding.bound_type().clone());
        }
        for k in 0..surplus {
            resolved.push(var_bindings[k % var_bindings.len()].bound_type().clone());
        }
        Ok(Some(resolved))
    }
}

#[cfg(test)]
mod tests {
    use tern_repr_test_util::{numeric_types, TestArg, TestType};

    use super::*;

    use TestType::*;

    fn string_param() -> Param<TestType> {
        Param::exact(String)
    }

    #[test]
    fn test_nullary_matches_only_empty_call() {
        let sig = Signature::<TestType>::nullary();
        assert_eq!(sig.matches(&[] as &[TestArg]), Ok(Some(vec![])));
        assert_eq!(sig.matches(&[TestArg::literal(Bool)]), Ok(None));
    }

    #[test]
    fn test_too_few_arguments_is_a_probe_miss() {
        let sig = Signature::new(vec![string_param(), string_param()]);
        assert_eq!(sig.matches(&[TestArg::literal(String)]), Ok(None));
    }

    #[test]
    fn test_surplus_without_tail_is_a_probe_miss() {
        let sig = Signature::new(vec![string_param()]);
        let args = [TestArg::literal(String), TestArg::literal(String)];
        assert_eq!(sig.matches(&args), Ok(None));
    }

    #[test]
    fn test_variadic_tail_unifies_across_occurrences() {
        let sig = Signature::new(vec![
            string_param(),
            string_param(),
            Param::of([Int32, Int64]),
        ])
        .with_var_args(vec![Param::of(numeric_types())]);

        let args = [
            TestArg::literal(String),
            TestArg::literal(String),
            TestArg::literal(Int64),
            TestArg::literal(Int64),
            TestArg::literal(Float64),
            TestArg::literal(Int64),
        ];
        let resolved = sig.matches(&args).unwrap().unwrap();
        assert_eq!(
            resolved,
            vec![String, String, Int64, Float64, Float64, Float64]
        );
    }

    #[test]
    fn test_variadic_resolution_is_deterministic() {
        let sig =
            Signature::new(vec![Param::any()]).with_var_args(vec![Param::of(numeric_types())]);
        let args = [
            TestArg::literal(Bool),
            TestArg::literal(Int32),
            TestArg::literal(Float32),
            TestArg::literal(Int16),
        ];
        let first = sig.matches(&args).unwrap().unwrap();
        for _ in 0..10 {
            assert_eq!(sig.matches(&args).unwrap().unwrap(), first);
        }
        assert_eq!(first, vec![Bool, Float32, Float32, Float32]);
    }

    #[test]
    fn test_arity_boundary_with_bounded_group() {
        let sig = Signature::new(vec![string_param()])
            .with_var_args_bounded(2, vec![Param::exact(Int64), Param::exact(String)]);

        fn mk(tail: &[TestType]) -> Vec<TestArg> {
            let mut args = vec![TestArg::literal(String)];
            args.extend(tail.iter().cloned().map(TestArg::literal));
            args
        }

        // fixed+0, fixed+2, fixed+4 match.
        assert!(sig.matches(&mk(&[])).unwrap().is_some());
        assert!(sig.matches(&mk(&[Int64, String])).unwrap().is_some());
        assert!(sig
            .matches(&mk(&[Int64, String, Int64, String]))
            .unwrap()
            .is_some());
        // fixed+1 and fixed+3: partial trailing group.
        assert!(sig.matches(&mk(&[Int64])).is_err());
        assert!(sig.matches(&mk(&[Int64, String, Int64])).is_err());
        // fixed+6: divisible, but exceeds the occurrence bound.
        let err = sig
            .matches(&mk(&[Int64, String, Int64, String, Int64, String]))
            .unwrap_err();
        assert_eq!(err.supplied, 7);
        assert_eq!(err.max_occurrences, Some(2));
    }

    #[test]
    fn test_failed_probe_leaves_no_residue() {
        let sig = Signature::new(vec![Param::of(numeric_types())]);
        // A failing call...
        assert_eq!(sig.matches(&[TestArg::literal(Bool)]), Ok(None));
        // ...must not affect the next one.
        assert_eq!(
            sig.matches(&[TestArg::literal(Int32)]),
            Ok(Some(vec![Int32]))
        );
    }

    #[test]
    fn test_canonical_types() {
        let sig = Signature::new(vec![string_param(), Param::exact(Int64)]);
        assert_eq!(sig.canonical_types(), Some(vec![String, Int64]));

        let sig = Signature::new(vec![Param::of(numeric_types())]);
        assert_eq!(sig.canonical_types(), None);

        let sig = Signature::new(vec![string_param()]).with_var_args(vec![string_param()]);
        assert_eq!(sig.canonical_types(), None);
    }

    #[test]
    #[should_panic(expected = "configured once")]
    fn test_var_args_are_one_shot() {
        let _ = Signature::<TestType>::nullary()
            .with_var_args(vec![Param::any()])
            .with_var_args(vec![Param::any()]);
    }
}
