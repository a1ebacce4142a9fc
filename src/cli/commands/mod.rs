//! Command handlers

pub mod batch;
pub mod build;
pub mod condense;
pub mod evaluate;
pub mod load;
pub mod query;
