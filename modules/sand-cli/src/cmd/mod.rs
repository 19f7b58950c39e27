pub mod check;
pub mod collect;
pub mod merge;
pub mod query;

const RULE: &str = "==================================================";
