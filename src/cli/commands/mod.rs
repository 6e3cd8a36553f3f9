//! CLI command implementations.

mod doctor;
mod list;
mod serve;

pub use doctor::run_doctor;
pub use list::run_list;
pub use serve::run_serve;
