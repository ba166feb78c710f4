pub mod analysis;
pub mod cascade;
pub mod color;
pub mod dom;
pub mod file_system;
pub mod handlers;
pub mod index;
pub mod line_index;
pub mod variable;
