//! Graph-specific error types.

pub type GraphResult<T> = Result<T, GraphError>;

/// Errors from graph analysis and ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// No ordering phase could place these models.
    OrderingIncomplete { unresolved: Vec<String> },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::OrderingIncomplete { unresolved } => {
                write!(
                    f,
                    "Calculation ordering did not place all models; unresolved: {}",
                    unresolved.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for GraphError {}
