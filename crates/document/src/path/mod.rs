//! Relative path expressions for attribute carriers.
//!
//! The language is the element-path subset common to XML tree libraries:
//! `.`, `..`, `*`, element names, `/` and `//` separators, and the
//! predicates `[@a]`, `[@a='v']`, `[@a!='v']`, `[tag]`, `[tag='text']`,
//! `[n]`, `[last()]` and `[last()-n]`. Paths are always evaluated relative to
//! a context element and never climb above it.

pub mod ast;
pub mod engine;
pub mod parser;

pub use ast::{NodeTest, Predicate, RelativePath, Step, StepKind};
pub use engine::select;
pub use parser::parse_path;
