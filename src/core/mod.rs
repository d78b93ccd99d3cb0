//! Core data types shared by the parser, classifier, and engines.

pub mod descriptor;
pub mod image;
pub mod match_result;
pub mod stage;
