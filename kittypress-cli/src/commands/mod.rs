//! Command implementations for the KittyPress CLI.

pub mod create;
pub mod detect;
pub mod extract;
pub mod list;
pub mod test;

pub use create::{CompressionLevel, cmd_create};
pub use detect::cmd_detect;
pub use extract::cmd_extract;
pub use list::cmd_list;
pub use test::cmd_test;
