pub mod core;
pub mod remarks;
pub mod session;
pub mod settings;
pub mod students;
pub mod sync;
