//! Foundation types shared by every pipeline stage: source spans, the typed
//! arena (`IndexVec`), a small string interner for the grammar's closed
//! vocabulary, and the diagnostic/error infrastructure the error-handling
//! design is built on.

pub mod diag;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use diag::{
    CalcError, CalculationError, ConversionError, Diagnostic, SyntaxError, TimeoutError,
    ValueError,
};
pub use index_vec::{Idx, IndexVec};
pub use span::Span;
pub use symbol::{Symbol, RESERVED_PREFIX};
