pub mod css;
pub mod error;
pub mod html;
pub mod selector;
pub mod specificity;

pub use text_size::{TextRange, TextSize};

pub use crate::error::SyntaxError;

pub(crate) fn to_text_size(offset: usize) -> TextSize {
    TextSize::new(u32::try_from(offset).unwrap_or(u32::MAX))
}
