// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The two-tier function catalog: process-wide built-ins and per-schema
//! user-defined functions.
//!
//! Built-ins are installed once at startup and never change, so they are read
//! without synchronization. User-defined overload sets change when schemas
//! are created or dropped; each schema's map is installed as a complete
//! [`Arc`]'d snapshot, so concurrent readers see either the old or the new
//! set of a schema, never a mix.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use tern_repr::{DataType, FuncArg};
use tracing::debug;

use crate::error::FuncError;
use crate::overload::{Func, FuncImpl};

type FuncMap<D, R> = BTreeMap<String, Func<D, R>>;

/// The function catalog consulted by the planner for every function call.
///
/// `R` is the opaque implementation handle handed to the execution layer;
/// resolution clones it, so it should be an `Arc` or similarly cheap.
#[derive(Debug)]
pub struct FunctionRegistry<D: DataType, R> {
    builtins: FuncMap<D, R>,
    schemas: RwLock<BTreeMap<String, Arc<FuncMap<D, R>>>>,
}

impl<D: DataType, R: Clone> FunctionRegistry<D, R> {
    /// Builds the registry from the built-in catalog, grouping
    /// implementations into overload sets by name. Within a name,
    /// registration order is preserved and determines probe order.
    pub fn new(builtins: impl IntoIterator<Item = (String, FuncImpl<D, R>)>) -> Self {
        FunctionRegistry {
            builtins: group_by_name(builtins),
            schemas: RwLock::new(BTreeMap::new()),
        }
    }

    /// Resolves a built-in call, coercing argument types as needed.
    ///
    /// Returns `Ok(None)` when the name is not a built-in or no overload
    /// matches; the caller decides whether to fall through to user-defined
    /// functions before reporting an unknown function.
    pub fn resolve_builtin<A>(&self, name: &str, args: &[A]) -> Result<Option<R>, FuncError>
    where
        A: FuncArg<Type = D>,
    {
        let Some(func) = self.builtins.get(name) else {
            return Ok(None);
        };
        match func.resolve(args) {
            Ok(resolved) => Ok(resolved.map(|(op, _)| op.clone())),
            Err(arity) => Err(FuncError::WrongArgumentCount {
                name: name.into(),
                arg_types: humanize_args(args),
                arity,
            }),
        }
    }

    /// Resolves a built-in by its exact argument types, bypassing matching.
    /// Used when the types were already resolved, e.g. restored from a
    /// persisted catalog entry.
    pub fn resolve_builtin_exact(&self, name: &str, types: &[D]) -> Result<R, FuncError> {
        self.builtins
            .get(name)
            .and_then(|func| func.get(types))
            .cloned()
            .ok_or_else(|| unknown_function(name, types))
    }

    /// Resolves a user-defined call under `schema`, coercing argument types
    /// as needed. Unlike [`resolve_builtin`](Self::resolve_builtin), there is
    /// no further tier to fall through to, so every miss (unknown schema,
    /// unknown name, or no matching overload) is an unknown function.
    pub fn resolve_user_defined<A>(
        &self,
        schema: &str,
        name: &str,
        args: &[A],
    ) -> Result<R, FuncError>
    where
        A: FuncArg<Type = D>,
    {
        let unknown = || FuncError::UnknownFunction {
            name: qualified(schema, name),
            arg_types: humanize_args(args),
        };
        let funcs = self.schema_funcs(schema).ok_or_else(unknown)?;
        let func = funcs.get(name).ok_or_else(unknown)?;
        match func.resolve(args) {
            Ok(Some((op, _))) => Ok(op.clone()),
            Ok(None) => Err(unknown()),
            Err(arity) => Err(FuncError::WrongArgumentCount {
                name: qualified(schema, name),
                arg_types: humanize_args(args),
                arity,
            }),
        }
    }

    /// Resolves a user-defined function by its exact argument types.
    pub fn resolve_user_defined_exact(
        &self,
        schema: &str,
        name: &str,
        types: &[D],
    ) -> Result<R, FuncError> {
        self.schema_funcs(schema)
            .and_then(|funcs| funcs.get(name).and_then(|func| func.get(types)).cloned())
            .ok_or_else(|| unknown_function(&qualified(schema, name), types))
    }

    /// Resolves a possibly schema-qualified call by exact argument types.
    ///
    /// Without a qualifier, built-ins are consulted first and shadow any
    /// same-named user-defined function in `fallback_schema` (supplied by the
    /// caller from its session state). With an explicit qualifier, only that
    /// schema's user-defined functions are considered: an explicit qualifier
    /// is the one way to bypass a built-in.
    pub fn resolve_qualified(
        &self,
        schema: Option<&str>,
        fallback_schema: &str,
        name: &str,
        types: &[D],
    ) -> Result<R, FuncError> {
        if schema.is_none() {
            if let Some(op) = self.builtins.get(name).and_then(|func| func.get(types)) {
                return Ok(op.clone());
            }
        }
        self.resolve_user_defined_exact(schema.unwrap_or(fallback_schema), name, types)
    }

    /// Installs `schema`'s user-defined functions, replacing any previous
    /// set for that schema wholesale.
    pub fn register_user_defined(
        &self,
        schema: &str,
        impls: impl IntoIterator<Item = (String, FuncImpl<D, R>)>,
    ) {
        let funcs = Arc::new(group_by_name(impls));
        debug!(schema, functions = funcs.len(), "registering user-defined functions");
        self.schemas
            .write()
            .expect("function registry lock poisoned")
            .insert(schema.into(), funcs);
    }

    /// Drops all user-defined functions of `schema`. Subsequent resolution
    /// under that schema reports unknown functions.
    pub fn deregister_user_defined(&self, schema: &str) {
        debug!(schema, "deregistering user-defined functions");
        self.schemas
            .write()
            .expect("function registry lock poisoned")
            .remove(schema);
    }

    /// Snapshots `schema`'s overload sets. The returned `Arc` stays valid
    /// across concurrent re-registration; resolution works on the snapshot
    /// outside the lock.
    fn schema_funcs(&self, schema: &str) -> Option<Arc<FuncMap<D, R>>> {
        self.schemas
            .read()
            .expect("function registry lock poisoned")
            .get(schema)
            .cloned()
    }
}

fn group_by_name<D: DataType, R>(
    impls: impl IntoIterator<Item = (String, FuncImpl<D, R>)>,
) -> FuncMap<D, R> {
    let mut grouped: BTreeMap<String, Vec<FuncImpl<D, R>>> = BTreeMap::new();
    for (name, fimpl) in impls {
        grouped.entry(name).or_default().push(fimpl);
    }
    grouped
        .into_iter()
        .map(|(name, impls)| (name, Func::new(impls)))
        .collect()
}

fn qualified(schema: &str, name: &str) -> String {
    format!("{}.{}", schema, name)
}

fn humanize_args<A: FuncArg>(args: &[A]) -> Vec<String> {
    args.iter().map(|a| a.value_type().to_string()).collect()
}

fn unknown_function<D: DataType>(name: &str, types: &[D]) -> FuncError {
    FuncError::UnknownFunction {
        name: name.into(),
        arg_types: types.iter().map(|ty| ty.to_string()).collect(),
    }
}
