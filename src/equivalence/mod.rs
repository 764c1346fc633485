//! Equivalence engine: pure normalizers and predicates shared by the differ
//! and external callers. Each function has a `_with` variant taking an
//! explicit [`Lexicon`](crate::lexicon::Lexicon); the plain variant uses the
//! built-in one.

pub mod drug;
pub mod frequency;
pub mod text;
pub mod timing;

pub use drug::*;
pub use frequency::*;
pub use text::*;
pub use timing::*;
