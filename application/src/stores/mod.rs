//! Process-wide tables.
//!
//! Two explicit store objects, each table behind its own reader/writer lock:
//!
//! - [`ApprovalTicketStore`]: approval tickets
//! - [`ExecutionRecordStore`]: execution records and command history
//!
//! Both are constructed once at startup and shared via `Arc`.

mod approval_store;
mod execution_store;

pub use approval_store::ApprovalTicketStore;
pub use execution_store::ExecutionRecordStore;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

// A poisoned table is still structurally valid: every mutation is a single insert.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
