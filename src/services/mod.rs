pub mod evaluation;
pub mod pdf_extractor;
pub mod pdf_renderer;
pub mod prompt_builder;

pub use evaluation::interpret;
pub use pdf_extractor::{extract_text, extract_text_blocking, NO_READABLE_TEXT};
pub use pdf_renderer::{render, RenderedDocument};
