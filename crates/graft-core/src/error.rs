use crate::store::StoreError;
use thiserror::Error as ThisError;

///
/// ImportError
///
/// Failures that abort an import session. Everything in the skip-and-continue
/// taxonomy (unresolvable relation destinations, absent values, degraded bulk
/// fetches) is logged instead and never surfaces here.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ImportError {
    #[error("root entity '{0}' is not registered in the schema")]
    UnknownEntity(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
