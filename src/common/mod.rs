//! Shared error and identity types.

pub mod error;
pub mod types;

pub use error::{FileLinkError, RelayError, RelayResult, SendError, StoreError, StoreResult};
pub use types::{Direction, SenderIdentity};
