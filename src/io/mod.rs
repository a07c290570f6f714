pub mod config_io;
pub mod naming;
pub mod store_io;
