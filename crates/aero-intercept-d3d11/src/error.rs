use thiserror::Error;

use crate::guid::Guid;
use crate::hresult::HResult;
use crate::revision::ContextRevision;

/// Failure of the proxy itself while answering an interface query.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeError {
    #[error("interface {0:?} is not a device context revision")]
    NotAContextInterface(Guid),
    #[error("native device context refused {requested} ({hr})")]
    Refused {
        requested: ContextRevision,
        hr: HResult,
    },
    #[error("native device context answered {requested} with a different object kind")]
    UnexpectedInterface { requested: ContextRevision },
}

impl From<UpgradeError> for HResult {
    fn from(_: UpgradeError) -> Self {
        HResult::E_NOINTERFACE
    }
}
