use std::fmt;

use crate::graph::Vertex;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    GraphLoadFailed,
    UndirectedGraph,
    EdgeOutOfRange,
    VertexOutOfRange,
    NonFiniteWeight,
    InvalidPartition,
    CycleDetected,
    DatasetGenerateFailed,
    ReportWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::GraphLoadFailed => "E1002",
            Self::UndirectedGraph => "E2001",
            Self::EdgeOutOfRange => "E2002",
            Self::VertexOutOfRange => "E2003",
            Self::NonFiniteWeight => "E2004",
            Self::InvalidPartition => "E3001",
            Self::CycleDetected => "E3002",
            Self::DatasetGenerateFailed => "E4001",
            Self::ReportWriteFailed => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::GraphLoadFailed => "Graph file could not be loaded",
            Self::UndirectedGraph => "Graph is not directed",
            Self::EdgeOutOfRange => "Edge endpoint out of range",
            Self::VertexOutOfRange => "Vertex out of range",
            Self::NonFiniteWeight => "Edge weight is not finite",
            Self::InvalidPartition => "Components do not partition the vertices",
            Self::CycleDetected => "Graph contains a cycle",
            Self::DatasetGenerateFailed => "Dataset generation failed",
            Self::ReportWriteFailed => "Report write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in dagpath.toml and retry."),
            Self::GraphLoadFailed => {
                Some("Check the file exists and follows the {directed, n, edges, source} layout.")
            }
            Self::UndirectedGraph => Some("Set \"directed\": true; only directed graphs are analyzed."),
            Self::EdgeOutOfRange | Self::VertexOutOfRange => {
                Some("Every vertex index must be in 0..n; fix the edge list or raise n.")
            }
            Self::NonFiniteWeight => Some("Replace NaN or infinite weights with finite values."),
            Self::InvalidPartition => {
                Some("Pass the components produced by find_sccs for the same graph.")
            }
            Self::CycleDetected => {
                Some("Order the condensation graph instead of the original graph.")
            }
            Self::DatasetGenerateFailed => {
                Some("Check the data directory is writable; custom datasets are never generated.")
            }
            Self::ReportWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Why a vertex broke the component partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionProblem {
    /// The vertex does not appear in any component.
    Missing,
    /// The vertex appears in more than one component (or twice in one).
    Duplicated,
    /// The component lists a vertex outside `0..n`.
    OutOfRange,
    /// A component has no members; `vertex` holds the component index.
    EmptyComponent,
}

impl fmt::Display for PartitionProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Missing => "is missing from every component",
            Self::Duplicated => "appears in more than one component",
            Self::OutOfRange => "is outside the vertex range",
            Self::EmptyComponent => "(component index) is empty",
        };
        f.write_str(text)
    }
}

/// Errors raised by the analysis core.
///
/// Every variant is a rejected input; the core never returns partial
/// results alongside an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// An edge references a vertex outside `0..n`.
    #[error("edge {u} -> {v} references a vertex outside 0..{n}")]
    EdgeOutOfRange { u: Vertex, v: Vertex, n: usize },

    /// A source, target, or order entry is outside `0..n`.
    #[error("vertex {vertex} is outside 0..{n}")]
    VertexOutOfRange { vertex: Vertex, n: usize },

    /// An edge weight is NaN or infinite.
    #[error("edge {u} -> {v} has non-finite weight {w}")]
    NonFiniteWeight { u: Vertex, v: Vertex, w: f64 },

    /// The graph input declared itself undirected.
    #[error("graph input is undirected; only directed graphs are supported")]
    Undirected,

    /// The component list does not partition the vertex set.
    #[error("invalid component partition: vertex {vertex} {problem}")]
    InvalidPartition {
        vertex: Vertex,
        problem: PartitionProblem,
    },

    /// Kahn's algorithm could not order every vertex.
    #[error("cycle detected: {} vertices could not be ordered", remaining.len())]
    CycleDetected {
        /// Unprocessed vertices, ascending.
        remaining: Vec<Vertex>,
    },
}

impl GraphError {
    /// Map this error onto its stable [`ErrorCode`].
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EdgeOutOfRange { .. } => ErrorCode::EdgeOutOfRange,
            Self::VertexOutOfRange { .. } => ErrorCode::VertexOutOfRange,
            Self::NonFiniteWeight { .. } => ErrorCode::NonFiniteWeight,
            Self::Undirected => ErrorCode::UndirectedGraph,
            Self::InvalidPartition { .. } => ErrorCode::InvalidPartition,
            Self::CycleDetected { .. } => ErrorCode::CycleDetected,
        }
    }

    /// Return `true` for the recoverable cycle failure of topological sorting.
    #[must_use]
    pub const fn is_cycle(&self) -> bool {
        matches!(self, Self::CycleDetected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, GraphError, PartitionProblem};
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::ConfigParseError,
            ErrorCode::GraphLoadFailed,
            ErrorCode::UndirectedGraph,
            ErrorCode::EdgeOutOfRange,
            ErrorCode::VertexOutOfRange,
            ErrorCode::NonFiniteWeight,
            ErrorCode::InvalidPartition,
            ErrorCode::CycleDetected,
            ErrorCode::DatasetGenerateFailed,
            ErrorCode::ReportWriteFailed,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::InvalidPartition.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn graph_errors_map_to_codes() {
        let err = GraphError::CycleDetected {
            remaining: vec![1, 2],
        };
        assert_eq!(err.code(), ErrorCode::CycleDetected);
        assert!(err.is_cycle());
        assert_eq!(err.to_string(), "cycle detected: 2 vertices could not be ordered");

        let err = GraphError::InvalidPartition {
            vertex: 3,
            problem: PartitionProblem::Missing,
        };
        assert_eq!(err.code(), ErrorCode::InvalidPartition);
        assert!(!err.is_cycle());
        assert!(err.to_string().contains("vertex 3 is missing"));
    }
}
