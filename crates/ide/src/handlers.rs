pub mod completion;
pub mod diagnostics;
pub mod document_color;
pub mod goto_definition;
pub mod hover;
pub mod references;
