//! Records and the handles that address them

use crate::backing::{Backing, BackingKind};
use crate::container::SourceId;
use crate::name::LumpName;
use crate::namespace::Namespace;
use std::fmt;

/// Stable handle to one record
///
/// Carries the record's source id so a handle outliving a reset that dropped
/// its record is detected rather than silently aliasing a newer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordHandle {
    pub(crate) index: u32,
    pub(crate) source: SourceId,
}

impl RecordHandle {
    /// Position in the master record list
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Container the record came from
    pub const fn source(self) -> SourceId {
        self.source
    }
}

impl fmt::Display for RecordHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.index, self.source)
    }
}

/// One named binary blob
///
/// Immutable once merged. Shadowing happens in the directory indices; the
/// record itself never changes.
#[derive(Debug, Clone)]
pub struct Record {
    pub(crate) name: LumpName,
    pub(crate) path: Option<String>,
    pub(crate) size: usize,
    pub(crate) namespace: Namespace,
    pub(crate) source: SourceId,
    pub(crate) backing: Backing,
}

impl Record {
    /// Short name; empty for hidden records
    pub const fn name(&self) -> LumpName {
        self.name
    }

    /// Full path for zip and loose-directory records
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Logical size in bytes
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Classified namespace
    pub const fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Container the record came from
    pub const fn source(&self) -> SourceId {
        self.source
    }

    /// Backing description
    pub const fn backing(&self) -> &Backing {
        &self.backing
    }

    /// Backing discriminant
    pub const fn backing_kind(&self) -> BackingKind {
        self.backing.kind()
    }

    /// Name for messages: the path when there is one, else the short name
    pub fn display_name(&self) -> String {
        self.path
            .clone()
            .unwrap_or_else(|| self.name.as_str())
    }
}
