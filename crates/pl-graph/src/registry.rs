//! Per-kind port registry with index and name lookup.
//!
//! Each port kind keeps an insertion-ordered list (index lookup) and a
//! name -> position map (name lookup). Both are filled together when a port
//! is inserted and never change once the owning node is built.

use std::collections::HashMap;

use pl_core::{PlError, PlResult, PortKind};

use crate::config::DuplicateNamePolicy;
use crate::port::PortKey;

pub struct PortTable<P: ?Sized> {
    kind: PortKind,
    entries: Vec<(String, Box<P>)>,
    names: HashMap<String, usize>,
}

impl<P: ?Sized> PortTable<P> {
    pub fn new(kind: PortKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            names: HashMap::new(),
        }
    }

    pub fn kind(&self) -> PortKind {
        self.kind
    }

    /// Append a port and record it under `name`. Returns its index.
    ///
    /// Under [`DuplicateNamePolicy::Overwrite`] a repeated name is remapped to
    /// the new port; the earlier port stays reachable by index only.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        port: Box<P>,
        policy: DuplicateNamePolicy,
    ) -> PlResult<usize> {
        let name = name.into();
        if policy == DuplicateNamePolicy::Reject && self.names.contains_key(&name) {
            return Err(PlError::DuplicatePortName {
                kind: self.kind,
                name,
            });
        }

        let index = self.entries.len();
        self.names.insert(name.clone(), index);
        self.entries.push((name, port));
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a key to a registration index.
    pub fn position(&self, key: &PortKey) -> PlResult<usize> {
        match key {
            PortKey::Index(index) => {
                if *index < self.entries.len() {
                    Ok(*index)
                } else {
                    Err(PlError::out_of_range(self.kind, self.entries.len(), *index))
                }
            }
            PortKey::Name(name) => self
                .names
                .get(name)
                .copied()
                .ok_or_else(|| PlError::missing(self.kind, name.as_str())),
        }
    }

    pub fn get(&self, key: &PortKey) -> PlResult<&P> {
        let index = self.position(key)?;
        Ok(self.entries[index].1.as_ref())
    }

    pub fn get_mut(&mut self, key: &PortKey) -> PlResult<&mut P> {
        let index = self.position(key)?;
        Ok(self.entries[index].1.as_mut())
    }

    /// Name the port at `index` was registered under.
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(name, _)| name.as_str())
    }

    /// Registration names in index order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// `(name, port)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &P)> {
        self.entries
            .iter()
            .map(|(name, port)| (name.as_str(), port.as_ref()))
    }
}

impl<P: ?Sized> std::fmt::Debug for PortTable<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortTable")
            .field("kind", &self.kind)
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn index_and_name_agree(names in prop::collection::vec("[a-d]{1,2}", 0..12)) {
            let mut t = PortTable::new(PortKind::Input);
            for (i, name) in names.iter().enumerate() {
                let index = t.insert(name.as_str(), Box::new(i), DuplicateNamePolicy::Overwrite).unwrap();
                prop_assert_eq!(index, i);
            }

            prop_assert_eq!(t.len(), names.len());
            for (i, name) in names.iter().enumerate() {
                prop_assert_eq!(*t.get(&PortKey::Index(i)).unwrap(), i);
                let last = names.iter().rposition(|n| n == name).unwrap();
                prop_assert_eq!(t.position(&name.into()).unwrap(), last);
            }

            let past_end = t.get(&PortKey::Index(names.len())).unwrap_err();
            prop_assert_eq!(
                past_end,
                PlError::NotEnoughInputs { count: names.len(), index: names.len() }
            );
        }
    }
}
