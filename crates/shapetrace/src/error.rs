//! Error types for region construction and descriptor evaluation.

/// Errors that can occur while building or measuring a pixel region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    /// Construction was attempted with zero pixel coordinates.
    EmptyInput,
    /// The input pixels do not form a single 8-connected region.
    DisconnectedInput {
        /// Number of 8-connected components found.
        components: usize,
    },
    /// A ratio descriptor has a zero denominator for this region.
    UndefinedRatio {
        /// Name of the descriptor that is undefined.
        descriptor: &'static str,
    },
}

impl std::fmt::Display for RegionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "region input contains no pixels"),
            Self::DisconnectedInput { components } => {
                write!(f, "input pixels form {} 8-connected components, expected 1", components)
            }
            Self::UndefinedRatio { descriptor } => {
                write!(f, "{} is undefined for this region: zero denominator", descriptor)
            }
        }
    }
}

impl std::error::Error for RegionError {}
