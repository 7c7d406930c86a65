//! Training operators: [ConcatTraining] and its gradient, [SplitTraining].

mod concat;
mod split;

pub use concat::{ConcatBase, ConcatTraining};
pub use split::SplitTraining;
