//! Supertype closure computation over the declaration model.
//!
//! The closure of a type is every superclass and super-interface reachable
//! from it, transitively. It is computed breadth-first, so nearer supertypes
//! come first: direct superclass, then direct super-interfaces in
//! declaration order, then their supertypes, and so on.
//!
//! # Cycles and missing types
//!
//! - A type never appears in its own closure, even in a cyclic hierarchy.
//! - Each supertype appears once, at its nearest position.
//! - References that do not resolve to a declaration are skipped; deciding
//!   whether that is acceptable is the graph builder's job.
//!
//! # Memoization
//!
//! [`HierarchyIndex`] caches one closure per type, so repeated role lookups
//! on methods of the same declaring type walk the hierarchy once.

use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use metagraph_core::decl::{DeclarationModel, TypeDeclId};

/// Compute the supertype closure of `id` without caching.
pub fn supertype_closure<M>(model: &M, id: TypeDeclId) -> Vec<TypeDeclId>
where
    M: DeclarationModel + ?Sized,
{
    let mut visited: HashSet<TypeDeclId> = HashSet::new();
    visited.insert(id);

    let mut closure = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(id);

    while let Some(current) = queue.pop_front() {
        for super_ref in model.type_decl(current).supertypes() {
            // Unresolvable references are reported by the graph builder
            let Some(super_id) = model.resolve(super_ref) else {
                continue;
            };
            if visited.insert(super_id) {
                closure.push(super_id);
                queue.push_back(super_id);
            }
        }
    }

    closure
}

/// Memoized supertype closures for one declaration model.
pub struct HierarchyIndex<'m, M: DeclarationModel + ?Sized> {
    model: &'m M,
    closures: HashMap<TypeDeclId, Rc<[TypeDeclId]>>,
}

impl<'m, M: DeclarationModel + ?Sized> HierarchyIndex<'m, M> {
    /// Create an empty index over `model`.
    pub fn new(model: &'m M) -> Self {
        HierarchyIndex {
            model,
            closures: HashMap::new(),
        }
    }

    /// The underlying declaration model.
    pub fn model(&self) -> &'m M {
        self.model
    }

    /// Supertype closure of `id`, nearest first.
    pub fn closure(&mut self, id: TypeDeclId) -> Rc<[TypeDeclId]> {
        let model = self.model;
        self.closures
            .entry(id)
            .or_insert_with(|| supertype_closure(model, id).into())
            .clone()
    }

    /// How derived `id` is: the number of distinct supertypes it has.
    ///
    /// A strict subtype always has a greater depth than any of its
    /// (acyclic) ancestors.
    pub fn depth(&mut self, id: TypeDeclId) -> usize {
        self.closure(id).len()
    }

    /// True if `ancestor` is a strict supertype of `id`.
    pub fn is_strict_subtype(&mut self, id: TypeDeclId, ancestor: TypeDeclId) -> bool {
        id != ancestor && self.closure(id).contains(&ancestor)
    }

    /// Number of cached closures.
    pub fn cached_len(&self) -> usize {
        self.closures.len()
    }
}
