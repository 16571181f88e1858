// Copyright Materialize, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Parameter slots: the acceptable type(s) for one position of a signature.

use tern_repr::DataType;
use tracing::trace;

/// Describes the types one positional parameter of a [`Signature`] accepts.
///
/// A `Param` is immutable once configured and carries no per-call state;
/// signatures shared between concurrently planning threads bind arguments
/// through transient per-call bindings instead. See the module docs on
/// [`crate::signature`].
///
/// [`Signature`]: crate::signature::Signature
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param<D: DataType> {
    /// Admissible types, most preferred first. Empty means any type is
    /// admissible.
    valid_types: Vec<D>,
    /// An optional structural constraint: a slot with a category admits any
    /// type of that category regardless of `valid_types`.
    category: Option<D::Category>,
}

impl<D: DataType> Param<D> {
    /// A parameter that accepts any type.
    pub fn any() -> Param<D> {
        Param {
            valid_types: Vec::new(),
            category: None,
        }
    }

    /// A parameter that accepts exactly the given types, in precedence order.
    ///
    /// Duplicates are ignored. The ordering of mutually incomparable types
    /// follows their order of appearance.
    pub fn of(types: impl IntoIterator<Item = D>) -> Param<D> {
        let mut valid_types: Vec<D> = Vec::new();
        for ty in types {
            if valid_types.contains(&ty) {
                continue;
            }
            // Keep the list in preference order: each type goes in front of
            // the first member it precedes.
            let pos = valid_types
                .iter()
                .position(|existing| ty.precedes(existing))
                .unwrap_or(valid_types.len());
            valid_types.insert(pos, ty);
        }
        Param {
            valid_types,
            category: None,
        }
    }

    /// A parameter that accepts a single type.
    pub fn exact(ty: D) -> Param<D> {
        Param::of([ty])
    }

    /// Adds a structural category constraint. May be configured at most once.
    ///
    /// # Panics
    ///
    /// Panics if a category constraint is already installed.
    pub fn with_category(mut self, category: D::Category) -> Param<D> {
        assert!(
            self.category.is_none(),
            "a parameter's category constraint may only be configured once"
        );
        self.category = Some(category);
        self
    }

    /// The single admissible type, if this parameter is constrained to
    /// exactly one. Used to derive a signature's canonical type list.
    pub(crate) fn sole_type(&self) -> Option<&D> {
        match (&*self.valid_types, &self.category) {
            ([ty], None) => Some(ty),
            _ => None,
        }
    }

    fn matches_category(&self, ty: &D) -> bool {
        self.category
            .as_ref()
            .is_some_and(|category| ty.category() == *category)
    }

    /// Whether `ty` is admissible without conversion: a member of the valid
    /// set, a member of the constrained category, or anything at all for a
    /// fully unconstrained slot.
    fn admits(&self, ty: &D) -> bool {
        if self.valid_types.contains(ty) || self.matches_category(ty) {
            return true;
        }
        self.valid_types.is_empty() && self.category.is_none()
    }

    /// Finds the common type of `type1` and `type2`, respecting precedence.
    ///
    /// The type with the higher precedence is the conversion target; if the
    /// other type does not convert to it (or the target is not admissible
    /// here), the reverse direction is tried. Incomparable pairs are tried in
    /// the given order. Admissibility of the winner is part of the contract:
    /// a conversion that is valid in the type system but lands outside this
    /// parameter's accepted set does not produce a common type.
    pub(crate) fn unify(&self, type1: &D, type2: &D) -> Option<D> {
        let (target, source) = if type1.precedes(type2) {
            (type1, type2)
        } else {
            (type2, type1)
        };
        if source.is_convertible_to(target) && self.admits(target) {
            Some(target.clone())
        } else if target.is_convertible_to(source) && self.admits(source) {
            Some(source.clone())
        } else {
            None
        }
    }
}

/// A slot-local bind failure. Interpreted by the enclosing signature as "this
/// signature does not match"; never user-visible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TypeMismatch {
    /// 1-based argument position.
    pub position: usize,
}

/// Per-call binding state for one parameter slot.
///
/// A `Binding` lives for a single match attempt; dropping it discards all
/// scratch state, so a failed probe leaves no residue on the signature.
#[derive(Debug)]
pub(crate) struct Binding<'a, D: DataType> {
    param: &'a Param<D>,
    bound: Option<D>,
}

impl<'a, D: DataType> Binding<'a, D> {
    pub(crate) fn new(param: &'a Param<D>) -> Binding<'a, D> {
        Binding { param, bound: None }
    }

    /// Binds the argument at `position` (1-based) to this slot.
    ///
    /// On the first bind, an admissible argument type is adopted as is; an
    /// inadmissible one is converted to the slot's most preferred type if the
    /// argument is castable. When the slot is already bound (the same slot
    /// matched an earlier argument), the types are unified through
    /// [`Param::unify`]. Non-castable arguments are never converted.
    pub(crate) fn bind(
        &mut self,
        arg_type: &D,
        castable: bool,
        position: usize,
    ) -> Result<(), TypeMismatch> {
        match &self.bound {
            Some(bound) => {
                if bound == arg_type || self.param.matches_category(arg_type) {
                    return Ok(());
                }
                let unified = if castable {
                    self.param.unify(arg_type, bound)
                } else {
                    None
                };
                match unified {
                    Some(common) => {
                        self.bound = Some(common);
                        Ok(())
                    }
                    None => {
                        trace!(
                            position,
                            %arg_type,
                            bound = %bound,
                            "no common type for rebound parameter"
                        );
                        Err(TypeMismatch { position })
                    }
                }
            }
            None => {
                if self.param.admits(arg_type) {
                    self.bound = Some(arg_type.clone());
                    return Ok(());
                }
                match self.param.valid_types.first() {
                    Some(preferred) if castable && arg_type.is_convertible_to(preferred) => {
                        self.bound = Some(preferred.clone());
                        Ok(())
                    }
                    _ => {
                        trace!(position, %arg_type, castable, "argument type not admissible");
                        Err(TypeMismatch { position })
                    }
                }
            }
        }
    }

    /// The type this slot resolved to.
    ///
    /// # Panics
    ///
    /// Panics if no bind has succeeded; reading an unbound slot is an
    /// internal invariant violation, not a recoverable condition.
    pub(crate) fn bound_type(&self) -> &D {
        self.bound
            .as_ref()
            .expect("parameter slot is bound after a successful match")
    }
}
