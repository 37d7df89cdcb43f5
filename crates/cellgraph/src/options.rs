//! Model configuration

/// Options for a [`Model`](crate::Model)
#[derive(Debug, Clone)]
pub struct ModelOptions {
    /// Prefix of generated cell names (`cell1`, `cell2`, ...)
    pub name_prefix: String,
    /// Formula given to cells created without one
    pub default_formula: String,
    /// Evaluator tag written to and expected from model files
    pub evaluator: String,
}

/// Tag of the tree evaluator, the only evaluator cellgraph has
pub const TREE_EVALUATOR: &str = "tree";

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            name_prefix: "cell".to_string(),
            default_formula: "0".to_string(),
            evaluator: TREE_EVALUATOR.to_string(),
        }
    }
}
