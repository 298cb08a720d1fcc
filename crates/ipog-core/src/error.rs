//! Error type shared by the whole engine.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IpogError>;

/// Broad class of an [`IpogError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A caller passed an invalid argument.
    Argument,
    /// The requested run cannot be carried out within representable bounds.
    Feasibility,
    /// The run configuration names something the engine does not support.
    Configuration,
    /// An operation was invoked on an object in the wrong state.
    State,
}

/// Everything that can go wrong while configuring or running the engine.
///
/// All of these are preconditions: they are reported before any output is
/// produced and nothing is retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IpogError {
    #[error("strength must be positive")]
    StrengthTooSmall,

    #[error("strength {strength} exceeds the number of parameters ({parameters})")]
    StrengthTooBig { strength: usize, parameters: usize },

    #[error("parameter `{0}` has an empty domain")]
    EmptyDomain(String),

    #[error("binomial coefficient C({n}, {k}) does not fit in a machine word")]
    BinomialOverflow { n: usize, k: usize },

    #[error("the combination of strength {strength} and {parameters} parameters is too large")]
    TooManyCombinations { strength: usize, parameters: usize },

    #[error("coverage map for column {column} would need more than {limit} bytes")]
    CoverageTooLarge { column: usize, limit: usize },

    #[error("unsupported base algorithm `{0}`")]
    UnsupportedAlgorithm(String),

    #[error("combination has length {actual}, expected {expected}")]
    WrongLength { expected: usize, actual: usize },

    #[error("value {value} is outside the domain [0, {size})")]
    ValueOutOfRange { value: usize, size: usize },

    #[error("invalid element {element} in a {k}-subset of {n} elements")]
    InvalidSubsetElement { element: usize, k: usize, n: usize },

    #[error("the coverage map does not count occurrences")]
    OccurrencesNotCounted,

    #[error("the set of expected tuples is empty")]
    EmptyExpectation,
}

impl IpogError {
    /// The error class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            IpogError::StrengthTooSmall
            | IpogError::StrengthTooBig { .. }
            | IpogError::EmptyDomain(_)
            | IpogError::WrongLength { .. }
            | IpogError::ValueOutOfRange { .. }
            | IpogError::InvalidSubsetElement { .. }
            | IpogError::EmptyExpectation => ErrorKind::Argument,
            IpogError::BinomialOverflow { .. }
            | IpogError::TooManyCombinations { .. }
            | IpogError::CoverageTooLarge { .. } => ErrorKind::Feasibility,
            IpogError::UnsupportedAlgorithm(_) => ErrorKind::Configuration,
            IpogError::OccurrencesNotCounted => ErrorKind::State,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(IpogError::StrengthTooSmall.kind(), ErrorKind::Argument);
        assert_eq!(
            IpogError::TooManyCombinations { strength: 9, parameters: 900 }.kind(),
            ErrorKind::Feasibility
        );
        assert_eq!(
            IpogError::UnsupportedAlgorithm("aetg".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(IpogError::OccurrencesNotCounted.kind(), ErrorKind::State);
    }

    #[test]
    fn test_messages() {
        let err = IpogError::StrengthTooBig { strength: 5, parameters: 3 };
        assert_eq!(err.to_string(), "strength 5 exceeds the number of parameters (3)");
        let err = IpogError::ValueOutOfRange { value: 2, size: 2 };
        assert_eq!(err.to_string(), "value 2 is outside the domain [0, 2)");
    }
}
