//! Timeline construction for a single tracked file.
//!
//! - `assembler`: the pipeline driver and its worker pool
//! - `composer`: turns one revision's blame into a `Snapshot`
//! - `highlight`: the highlighting seam, syntect and plain HTML highlighters

pub mod assembler;
pub mod composer;
pub mod highlight;

pub use assembler::{TimelineAssembler, TimelineOptions};
pub use highlight::{HtmlHighlighter, SyntectHighlighter};
