#![deny(missing_docs)]
//! Elite selection for Chrysalis Forge module archives (§4.5): map a
//! `Priority` onto a point in phenotype space, then dispatch to the nearest
//! elite via the symbolic bin-shortcut or normalized k-NN.

mod keywords;
mod knn;
mod select;
mod types;

pub use keywords::keyword_target;
pub use knn::nearest;
pub use select::select;
pub use types::{PriorityClassifier, PriorityJudgment, TargetPhenotype};
