pub mod errors;
pub mod format;
pub mod panel;
pub mod ratelimit;
pub mod table;

pub use panel::Panel;
pub use table::Table;
