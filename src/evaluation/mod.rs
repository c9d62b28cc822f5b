//! Independent checking of constructed solutions.

mod evaluator;

pub use evaluator::{SolutionEvaluator, Violation, ViolationType};
