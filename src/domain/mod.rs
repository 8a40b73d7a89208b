//! Chain-agnostic domain types: pool entries, the read-model book,
//! session identity, and unit conversions.

mod pool;
mod session;
mod store;
pub mod units;

pub use pool::{BalanceSnapshot, PoolAction, PoolEntry};
pub use session::{Session, SessionEvent};
pub use store::PoolBook;
