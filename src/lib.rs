//! rankbench: Feature Ranking and Top-k Evaluation Library
//!
//! Ranks the features of a labelled tabular dataset with a selection method
//! and measures how a batch of classifiers performs, under stratified
//! cross-validation, on the top-k ranked features for growing k.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
