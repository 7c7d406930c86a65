use thiserror::Error;

/// Errors from building or running operator kernels.
///
/// Failures of the tensor layer (shape validation, allocation, device
/// launches) are wrapped in [Error::Tensor], so callers can still tell them
/// apart with [Error::is_shape_error], [Error::is_alloc_error] and
/// [Error::is_launch_error].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Tensor(#[from] trainops_core::tensor::Error),

    #[error("required attribute `{0}` is missing")]
    MissingAttribute(String),

    #[error("attribute `{name}` is invalid: {reason}")]
    InvalidAttribute { name: String, reason: String },

    #[error("no kernel registered for op `{op_type}` in domain `{domain}`")]
    KernelNotFound { domain: String, op_type: String },

    #[error("a kernel for op `{op_type}` in domain `{domain}` is already registered")]
    DuplicateKernel { domain: String, op_type: String },

    #[error("input {0} is missing")]
    MissingInput(usize),

    #[error("input {index} should be a {expected} tensor")]
    InvalidInput { index: usize, expected: &'static str },

    #[error("output {index} is out of range, the node has {num_outputs} outputs")]
    MissingOutput { index: usize, num_outputs: usize },

    #[error("invalid node definition: {0}")]
    InvalidNodeDef(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if the inputs or attributes were rejected before any
    /// device work was issued.
    pub fn is_shape_error(&self) -> bool {
        match self {
            Self::Tensor(e) => e.is_shape_error(),
            _ => false,
        }
    }

    pub fn is_alloc_error(&self) -> bool {
        match self {
            Self::Tensor(e) => e.is_alloc_error(),
            _ => false,
        }
    }

    pub fn is_launch_error(&self) -> bool {
        match self {
            Self::Tensor(e) => e.is_launch_error(),
            _ => false,
        }
    }
}
