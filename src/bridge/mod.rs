//! Bridge configuration model and per-chat lookup.

pub mod registry;

pub use registry::{
    relaying_commands, relaying_join_notices, relaying_leave_notices, without_direction, Bridge,
    BridgeRegistry,
};
