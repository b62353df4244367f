pub mod calc;
pub mod error;
pub mod hydrate;
pub mod ipc;
pub mod local;
pub mod migrate;
pub mod model;
pub mod remarks;
pub mod remote;
pub mod sync;
