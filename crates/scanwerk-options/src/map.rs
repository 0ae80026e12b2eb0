// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Scanwerk — The recursive option map.
//
// An option map is a flat namespace of options plus any number of named
// submaps contributing their options under a `name/` prefix.  Submap
// handles share storage with their parent: reading or writing
// `parent["sub/key"]` touches the same cell as `sub["key"]`.  Multi-key
// assignment is transactional: the proposed values are validated as a
// whole and either all take effect or none do.
//
// Maps are not thread-safe; callers synchronize externally.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use tracing::{debug, instrument};

use scanwerk_core::error::{Result, ScanwerkError};

use crate::constraint::Constraint;
use crate::descriptor::Descriptor;
use crate::value::{Value, ValueKind};

/// Separator joining the segments of a hierarchical option key.
pub const SEPARATOR: char = '/';

/// A flat mapping from hierarchical keys to values — the snapshot surface
/// for bulk assignment and export.
pub type ValueMap = BTreeMap<String, Value>;

/// A named predicate over a whole proposed value map, used to couple the
/// validity of several options.
struct Restriction {
    name: String,
    predicate: Box<dyn Fn(&ValueMap) -> bool>,
}

/// Shared storage behind one level of the option tree.
///
/// Invariant: `values`, `constraints`, and `descriptors` hold exactly the
/// same key set.
#[derive(Default)]
struct MapNode {
    values: BTreeMap<String, Value>,
    constraints: BTreeMap<String, Option<Rc<dyn Constraint>>>,
    descriptors: BTreeMap<String, Descriptor>,
    submaps: BTreeMap<String, OptionMap>,
    /// Non-owning link to the enclosing map, kept strictly for structural
    /// checks — never for lifetime.
    parent: Option<Weak<RefCell<MapNode>>>,
    restrictions: Vec<Restriction>,
}

/// A namespaced, recursively composable container of options with
/// transactional multi-key assignment.
///
/// Cloning yields another handle onto the same storage.
#[derive(Clone, Default)]
pub struct OptionMap {
    node: Rc<RefCell<MapNode>>,
}

impl std::fmt::Debug for OptionMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.values()).finish()
    }
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Lookup ---------------------------------------------------------------

    /// Resolve a hierarchical key to an option handle.
    ///
    /// Fails with [`ScanwerkError::UnknownKey`] when no such option exists.
    pub fn option(&self, key: &str) -> Result<OptionHandle> {
        if let Some((head, rest)) = key.split_once(SEPARATOR) {
            let sub = self.node.borrow().submaps.get(head).cloned();
            match sub {
                Some(sub) => sub.option(rest),
                None => Err(ScanwerkError::UnknownKey(key.to_owned())),
            }
        } else if self.node.borrow().values.contains_key(key) {
            Ok(OptionHandle {
                node: Rc::clone(&self.node),
                key: key.to_owned(),
            })
        } else {
            Err(ScanwerkError::UnknownKey(key.to_owned()))
        }
    }

    /// Full value snapshot: this map's own options plus, under their
    /// namespace prefix, those of every submap, recursively.
    pub fn values(&self) -> ValueMap {
        let node = self.node.borrow();
        let mut out: ValueMap = node
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (name, sub) in &node.submaps {
            for (key, value) in sub.values() {
                out.insert(format!("{name}{SEPARATOR}{key}"), value);
            }
        }
        out
    }

    /// Number of options reachable from this map, submaps included.
    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -- Builder --------------------------------------------------------------

    /// Start adding options to this map.
    pub fn add_options(&mut self) -> OptionBuilder {
        OptionBuilder { map: self.clone() }
    }

    /// Start attaching submaps to this map.
    pub fn add_option_map(&mut self) -> MapBuilder {
        MapBuilder { map: self.clone() }
    }

    // -- Assignment -----------------------------------------------------------

    /// Atomically assign several values at once.
    ///
    /// The updates are overlaid on a full snapshot, the candidate is
    /// validated as a whole, and only then committed.  On any violation
    /// the map is left untouched.
    #[instrument(skip_all, fields(updates = updates.len()))]
    pub fn assign(&mut self, updates: &ValueMap) -> Result<()> {
        let mut candidate = self.values();
        for (key, value) in updates {
            candidate.insert(key.clone(), value.clone());
        }
        self.validate(&candidate)?;
        self.finalize(&candidate);
        debug!("assignment committed");
        Ok(())
    }

    /// Check a proposed value map without mutating anything.
    ///
    /// Entries without a namespace prefix are checked against this map's
    /// per-key constraints; entries with a prefix are delegated to the
    /// matching submap.  Every imposed restriction then sees the whole
    /// proposed map.
    pub fn validate(&self, proposed: &ValueMap) -> Result<()> {
        let node = self.node.borrow();
        let mut delegated: BTreeMap<String, ValueMap> = BTreeMap::new();

        for (key, value) in proposed {
            if let Some((head, rest)) = key.split_once(SEPARATOR) {
                delegated
                    .entry(head.to_owned())
                    .or_default()
                    .insert(rest.to_owned(), value.clone());
                continue;
            }
            let current = node
                .values
                .get(key)
                .ok_or_else(|| ScanwerkError::UnknownKey(key.clone()))?;
            if value == current {
                continue; // unchanged entries are trivially acceptable
            }
            if node.descriptors.get(key).is_some_and(|d| d.read_only) {
                return Err(ScanwerkError::ConstraintViolation {
                    key: key.clone(),
                    reason: "option is read-only".to_owned(),
                });
            }
            match node.constraints.get(key).and_then(|c| c.as_ref()) {
                Some(constraint) => {
                    if constraint.apply(value) != *value {
                        return Err(ScanwerkError::ConstraintViolation {
                            key: key.clone(),
                            reason: format!("value '{value}' rejected by constraint"),
                        });
                    }
                }
                // No constraint: any value of the bound type is fine.
                None => {
                    if current.kind() != ValueKind::None && value.kind() != current.kind() {
                        return Err(ScanwerkError::ConstraintViolation {
                            key: key.clone(),
                            reason: format!("value '{value}' does not match the option's type"),
                        });
                    }
                }
            }
        }

        for restriction in &node.restrictions {
            if !(restriction.predicate)(proposed) {
                return Err(ScanwerkError::RestrictionViolation(restriction.name.clone()));
            }
        }

        for (name, slice) in &delegated {
            let sub = node
                .submaps
                .get(name)
                .ok_or_else(|| ScanwerkError::UnknownKey(name.clone()))?;
            sub.validate(slice)?;
        }
        Ok(())
    }

    /// Write an already-validated value map into the tree.
    ///
    /// Mirrors the namespace split of [`OptionMap::validate`]; keys this
    /// map does not know are ignored.
    pub fn finalize(&mut self, committed: &ValueMap) {
        let mut delegated: BTreeMap<String, ValueMap> = BTreeMap::new();
        {
            let mut node = self.node.borrow_mut();
            for (key, value) in committed {
                if let Some((head, rest)) = key.split_once(SEPARATOR) {
                    delegated
                        .entry(head.to_owned())
                        .or_default()
                        .insert(rest.to_owned(), value.clone());
                } else if let Some(cell) = node.values.get_mut(key) {
                    *cell = value.clone();
                }
            }
        }
        for (name, slice) in delegated {
            let sub = self.node.borrow().submaps.get(&name).cloned();
            if let Some(mut sub) = sub {
                sub.finalize(&slice);
            }
        }
    }

    // -- Composition ----------------------------------------------------------

    /// Attach `submap` under `name`.
    ///
    /// Rejects direct or indirect self-insertion (which would make the
    /// submap tree cyclic) and name collisions.
    pub fn insert(&mut self, name: &str, submap: &OptionMap) -> Result<()> {
        if self.is_self_or_ancestor(submap) {
            return Err(ScanwerkError::SelfReference);
        }
        let mut node = self.node.borrow_mut();
        if node.submaps.contains_key(name) || node.values.contains_key(name) {
            return Err(ScanwerkError::DuplicateKey(name.to_owned()));
        }
        submap.node.borrow_mut().parent = Some(Rc::downgrade(&self.node));
        node.submaps.insert(name.to_owned(), submap.clone());
        Ok(())
    }

    /// Detach and return the submap registered under `name`.
    pub fn remove(&mut self, name: &str) -> Result<OptionMap> {
        let mut node = self.node.borrow_mut();
        let sub = node
            .submaps
            .remove(name)
            .ok_or_else(|| ScanwerkError::UnknownKey(name.to_owned()))?;
        sub.node.borrow_mut().parent = None;
        Ok(sub)
    }

    /// Replace the submap registered under `name`, returning the detached
    /// previous occupant.
    pub fn relink(&mut self, name: &str, submap: &OptionMap) -> Result<OptionMap> {
        if self.is_self_or_ancestor(submap) {
            return Err(ScanwerkError::SelfReference);
        }
        let old = self.remove(name)?;
        submap.node.borrow_mut().parent = Some(Rc::downgrade(&self.node));
        self.node
            .borrow_mut()
            .submaps
            .insert(name.to_owned(), submap.clone());
        Ok(old)
    }

    /// Register a restriction evaluated on every validation pass at this
    /// map's level.
    pub fn impose(
        &mut self,
        name: impl Into<String>,
        predicate: impl Fn(&ValueMap) -> bool + 'static,
    ) {
        self.node.borrow_mut().restrictions.push(Restriction {
            name: name.into(),
            predicate: Box::new(predicate),
        });
    }

    /// Whether `candidate` is this map or any map above it in the tree.
    fn is_self_or_ancestor(&self, candidate: &OptionMap) -> bool {
        if Rc::ptr_eq(&self.node, &candidate.node) {
            return true;
        }
        let mut cursor = self.node.borrow().parent.clone();
        while let Some(weak) = cursor {
            let Some(node) = weak.upgrade() else { break };
            if Rc::ptr_eq(&node, &candidate.node) {
                return true;
            }
            cursor = node.borrow().parent.clone();
        }
        false
    }

    // -- Snapshot import/export -----------------------------------------------

    /// Export the full value snapshot as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.values())?)
    }

    /// Bulk-assign from a JSON snapshot previously produced by
    /// [`OptionMap::to_json`].
    pub fn assign_json(&mut self, json: &str) -> Result<()> {
        let updates: ValueMap = serde_json::from_str(json)?;
        self.assign(&updates)
    }
}

// -- Builders -----------------------------------------------------------------

/// Chainable builder adding options to a map.
#[derive(Debug)]
pub struct OptionBuilder {
    map: OptionMap,
}

impl OptionBuilder {
    /// Add one option.
    ///
    /// The key must be a single segment (no separator), must be new, and
    /// the initial value must already satisfy the constraint.
    pub fn add(
        self,
        key: &str,
        value: impl Into<Value>,
        constraint: Option<Rc<dyn Constraint>>,
        descriptor: Descriptor,
    ) -> Result<Self> {
        let value = value.into();
        if key.contains(SEPARATOR) {
            return Err(ScanwerkError::ConstraintViolation {
                key: key.to_owned(),
                reason: "option keys may not contain the namespace separator".to_owned(),
            });
        }
        let mut node = self.map.node.borrow_mut();
        if node.values.contains_key(key) || node.submaps.contains_key(key) {
            return Err(ScanwerkError::DuplicateKey(key.to_owned()));
        }
        if let Some(c) = &constraint {
            if c.apply(&value) != value {
                return Err(ScanwerkError::ConstraintViolation {
                    key: key.to_owned(),
                    reason: format!("initial value '{value}' rejected by constraint"),
                });
            }
        }
        node.values.insert(key.to_owned(), value);
        node.constraints.insert(key.to_owned(), constraint);
        node.descriptors.insert(key.to_owned(), descriptor);
        drop(node);
        Ok(self)
    }
}

/// Chainable builder attaching submaps to a map.
#[derive(Debug)]
pub struct MapBuilder {
    map: OptionMap,
}

impl MapBuilder {
    /// Attach one submap under `name`.
    pub fn add(mut self, name: &str, submap: &OptionMap) -> Result<Self> {
        self.map.insert(name, submap)?;
        Ok(self)
    }
}

// -- Option handles -----------------------------------------------------------

/// A handle onto a single option's storage cell.
///
/// The handle stays valid for the lifetime of the map; writes through it
/// go through the same validation as a one-key [`OptionMap::assign`].
#[derive(Clone)]
pub struct OptionHandle {
    node: Rc<RefCell<MapNode>>,
    key: String,
}

impl std::fmt::Debug for OptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionHandle")
            .field("key", &self.key)
            .field("value", &self.value())
            .finish()
    }
}

impl OptionHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The option's current value.
    pub fn value(&self) -> Value {
        self.node
            .borrow()
            .values
            .get(&self.key)
            .cloned()
            .unwrap_or_default()
    }

    /// The option's descriptor.
    pub fn descriptor(&self) -> Descriptor {
        self.node
            .borrow()
            .descriptors
            .get(&self.key)
            .cloned()
            .unwrap_or_default()
    }

    /// The constraint's designated default, when a constraint is bound.
    pub fn constraint_default(&self) -> Option<Value> {
        self.node
            .borrow()
            .constraints
            .get(&self.key)
            .and_then(|c| c.as_ref())
            .map(|c| c.default_value())
    }

    /// Assign through this map level's full validation pass.
    pub fn set(&self, value: impl Into<Value>) -> Result<()> {
        let mut map = OptionMap {
            node: Rc::clone(&self.node),
        };
        let mut updates = ValueMap::new();
        updates.insert(self.key.clone(), value.into());
        map.assign(&updates)
    }
}

// -- Tests --------------------------------------------------------------------
