//! The evaluator crate (§3-§4.5): exact-value reduction over the AST the
//! parser builds, with the arithmetic kernel, the small symbolic-value
//! algebra, and the step recorder each split into their own module.

pub mod evaluator;
pub mod kernel;
pub mod rational;
pub mod steps;
pub mod trig;
pub mod value;

pub use evaluator::{evaluate, EvalOutcome};
pub use kernel::KernelError;
pub use steps::{Step, StepManager};
pub use value::{Atom, BinOp, Expr, UnOp};
