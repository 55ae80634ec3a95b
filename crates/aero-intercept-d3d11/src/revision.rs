//! Interface revisions of the device context and the upgrade decision table.

use std::fmt;

use crate::guid::{iid, Guid};

/// Negotiated revision of the wrapped device context. Each revision is a strict superset of the
/// previous one.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContextRevision {
    Base = 0,
    Rev1 = 1,
    Rev2 = 2,
    Rev3 = 3,
    Rev4 = 4,
}

impl ContextRevision {
    pub const ALL: [ContextRevision; 5] = [
        ContextRevision::Base,
        ContextRevision::Rev1,
        ContextRevision::Rev2,
        ContextRevision::Rev3,
        ContextRevision::Rev4,
    ];

    pub const fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Interface identifier of this revision.
    pub const fn iid(self) -> Guid {
        match self {
            ContextRevision::Base => iid::ID3D11_DEVICE_CONTEXT,
            ContextRevision::Rev1 => iid::ID3D11_DEVICE_CONTEXT1,
            ContextRevision::Rev2 => iid::ID3D11_DEVICE_CONTEXT2,
            ContextRevision::Rev3 => iid::ID3D11_DEVICE_CONTEXT3,
            ContextRevision::Rev4 => iid::ID3D11_DEVICE_CONTEXT4,
        }
    }

    pub fn from_iid(id: &Guid) -> Option<Self> {
        Self::ALL.into_iter().find(|rev| rev.iid() == *id)
    }
}

impl fmt::Display for ContextRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextRevision::Base => f.write_str("ID3D11DeviceContext"),
            other => write!(f, "ID3D11DeviceContext{}", other.index()),
        }
    }
}

/// What answering a query for some interface requires of a proxy at a given revision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The proxy identity or one of the base interfaces every context supports.
    Identity,
    /// A context revision at or below the current one.
    Satisfied(ContextRevision),
    /// A newer context revision; the native object must be queried for it.
    Upgrade(ContextRevision),
    /// Not a context interface. The query goes to the native object unchanged.
    Foreign,
}

pub fn resolve(requested: &Guid, current: ContextRevision) -> Resolution {
    if *requested == iid::AERO_CONTEXT_PROXY
        || *requested == iid::IUNKNOWN
        || *requested == iid::ID3D11_DEVICE_CHILD
    {
        return Resolution::Identity;
    }

    match ContextRevision::from_iid(requested) {
        Some(rev) if rev <= current => Resolution::Satisfied(rev),
        Some(rev) => Resolution::Upgrade(rev),
        None => Resolution::Foreign,
    }
}
