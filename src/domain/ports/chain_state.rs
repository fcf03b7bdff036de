use crate::domain::error::DomainError;

/// Snapshot identifier handed back by [`ChainState::snapshot`].
pub type SnapshotId = u64;

/// Transactional view of the underlying ledger.
///
/// A recipe runs between `snapshot` and `commit`/`revert`: either every
/// action's effect lands or none does. `commit` may itself be refused by the
/// ledger (e.g. a flash-loan lender with outstanding principal); a refused
/// commit reverts to the snapshot before returning the error.
///
/// Brackets must not interleave: snapshots nest, and releasing an outer one
/// also releases everything inside it. The recipe engine serializes runs so
/// exactly one bracket is open at a time.
pub trait ChainState: Send + Sync {
    fn snapshot(&self) -> Result<SnapshotId, DomainError>;

    fn commit(&self, snapshot: SnapshotId) -> Result<(), DomainError>;

    fn revert(&self, snapshot: SnapshotId) -> Result<(), DomainError>;
}
