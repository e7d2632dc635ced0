/// Crate-wide result alias for the Newton-Raphson routines.
pub type NewtonResult<T> = Result<T, NewtonError>;

#[derive(Debug, Clone, PartialEq)]
pub enum NewtonError {
    // ---- Dimensions ----
    /// A document vector length differs from the rest of the collection.
    RaggedGamma {
        document: usize,
        expected: usize,
        found: usize,
    },

    /// The gamma collection width differs from the alpha dimension.
    GammaDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient and Hessian diagonal lengths differ in the structured solve.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    // ---- Inputs ----
    /// Alpha must contain at least one topic.
    NoTopics,

    /// The gamma collection must contain at least one document.
    NoDocuments,

    /// Alpha entries must be positive and finite (digamma/trigamma domain).
    NonPositiveAlpha {
        index: usize,
        value: f64,
    },

    /// Gamma entries must be positive and finite (digamma domain).
    NonPositiveGamma {
        document: usize,
        index: usize,
        value: f64,
    },

    // ---- Structured solve ----
    /// A Hessian diagonal entry is zero; the structured inverse divides by it.
    DegenerateDiagonal {
        index: usize,
    },

    /// The rank-one coefficient is zero; the structured inverse divides by it.
    DegenerateConstant,

    /// The rank-one denominator 1/z + sum(1/h_j) is zero.
    DegenerateDenominator,

    /// The computed update contains a non-finite entry.
    NonFiniteStep {
        index: usize,
        value: f64,
    },
}

impl NewtonError {
    /// True for errors caused by mismatched vector dimensions.
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(
            self,
            NewtonError::RaggedGamma { .. }
                | NewtonError::GammaDimMismatch { .. }
                | NewtonError::GradientDimMismatch { .. }
        )
    }

    /// True for errors caused by inputs or intermediates outside the numeric domain.
    pub fn is_numeric_degeneracy(&self) -> bool {
        matches!(
            self,
            NewtonError::NoTopics
                | NewtonError::NoDocuments
                | NewtonError::NonPositiveAlpha { .. }
                | NewtonError::NonPositiveGamma { .. }
                | NewtonError::DegenerateDiagonal { .. }
                | NewtonError::DegenerateConstant
                | NewtonError::DegenerateDenominator
                | NewtonError::NonFiniteStep { .. }
        )
    }
}

impl std::error::Error for NewtonError {}

impl std::fmt::Display for NewtonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NewtonError::RaggedGamma {
                document,
                expected,
                found,
            } => {
                write!(
                    f,
                    "Gamma vector for document {document} has length {found}, expected {expected}"
                )
            }
            NewtonError::GammaDimMismatch { expected, found } => {
                write!(
                    f,
                    "Gamma collection width {found} does not match alpha dimension {expected}"
                )
            }
            NewtonError::GradientDimMismatch { expected, found } => {
                write!(
                    f,
                    "Gradient length {found} does not match Hessian diagonal length {expected}"
                )
            }
            NewtonError::NoTopics => {
                write!(f, "Alpha must contain at least one topic")
            }
            NewtonError::NoDocuments => {
                write!(f, "The gamma collection must contain at least one document")
            }
            NewtonError::NonPositiveAlpha { index, value } => {
                write!(
                    f,
                    "Alpha entry {index} is {value}, must be positive and finite"
                )
            }
            NewtonError::NonPositiveGamma {
                document,
                index,
                value,
            } => {
                write!(
                    f,
                    "Gamma entry {index} of document {document} is {value}, must be positive and finite"
                )
            }
            NewtonError::DegenerateDiagonal { index } => {
                write!(f, "Hessian diagonal entry {index} is zero")
            }
            NewtonError::DegenerateConstant => {
                write!(f, "Hessian rank-one coefficient is zero")
            }
            NewtonError::DegenerateDenominator => {
                write!(f, "Rank-one denominator of the structured inverse is zero")
            }
            NewtonError::NonFiniteStep { index, value } => {
                write!(f, "Update entry {index} is non-finite ({value})")
            }
        }
    }
}
