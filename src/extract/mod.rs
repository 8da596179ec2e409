//! Extraction sources: implementations of [`crate::document::DocumentSource`].
//!
//! A source reduces an input file to an ordered [`crate::document::Document`].
//! The crate ships [`PdfiumSource`], which pulls page text and embedded
//! images out of a PDF via pdfium. Sources that recover table structure
//! (layout models, structure-aware converters) plug in through the same
//! trait; the rest of the pipeline never knows which backend produced the
//! document.

mod pdfium;

pub use pdfium::PdfiumSource;
