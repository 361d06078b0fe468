//! EPUB codec

mod parser;
mod reader;
mod writer;
mod xml;

pub use reader::EpubReader;
pub use writer::EpubWriter;
