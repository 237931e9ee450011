use rdeep_common::{ObjectId, ObjectRef};
use std::collections::HashMap;

/// Per-call table keyed by object identity.
///
/// Both the source handle and the associated handle are retained so that
/// identities stay valid for the whole traversal.
pub(crate) struct IdentityMap {
    entries: HashMap<ObjectId, (ObjectRef, ObjectRef)>,
}

impl IdentityMap {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub(crate) fn get(&self, source: &ObjectRef) -> Option<&ObjectRef> {
        self.entries.get(&source.id()).map(|(_, associated)| associated)
    }

    /// Record the first association for `source`; later calls keep the
    /// original entry.
    pub(crate) fn record(&mut self, source: &ObjectRef, associated: &ObjectRef) {
        self.entries
            .entry(source.id())
            .or_insert_with(|| (source.clone(), associated.clone()));
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Associated handles, in no particular order
    pub(crate) fn into_associated(self) -> Vec<ObjectRef> {
        self.entries.into_values().map(|(_, associated)| associated).collect()
    }
}
