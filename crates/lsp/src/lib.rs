pub mod config;
mod from_proto;
mod handlers;
pub mod server;
mod to_proto;
pub mod vfs;
