use thiserror::Error;

/// Represents a number of different errors that can occur from creating tensors
/// or launching tensor operations. This encompasses both Cpu and CUDA errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// Device is out of memory
    #[error("out of memory")]
    OutOfMemory,

    /// Not enough elements were provided when creating a tensor
    #[error("expected {expected} elements, got {found}")]
    WrongNumElements { expected: usize, found: usize },

    #[error("must have 1 or more inputs")]
    NoInputs,

    #[error("cannot concatenate scalars")]
    CannotConcatScalars,

    #[error("axis {axis} is not in valid range [-{rank}, {rank})")]
    InvalidAxis { axis: isize, rank: usize },

    #[error("ranks of input data are different, cannot concatenate them: expected rank {expected}, got rank {found} for input {input}")]
    RankMismatch {
        input: usize,
        expected: usize,
        found: usize,
    },

    #[error("non concat axis dimensions must match: input {input} has {found} on axis {axis}, expected {expected}")]
    DimMismatch {
        input: usize,
        axis: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid split: {0}")]
    InvalidSplit(String),

    #[cfg(feature = "cuda")]
    #[error("cuda driver error: {0:?}")]
    CudaDriverError(cudarc::driver::DriverError),

    #[cfg(feature = "cuda")]
    #[error("cuda allocation failed: {0:?}")]
    DeviceAllocFailed(cudarc::driver::DriverError),

    #[cfg(feature = "cuda")]
    #[error("cuda kernel launch failed: {0:?}")]
    LaunchFailed(cudarc::driver::DriverError),

    #[cfg(feature = "cuda")]
    #[error("nvrtc compilation failed: {0}")]
    CudaCompileError(String),
}

impl Error {
    /// Returns `true` for errors detected from tensor shapes alone, before
    /// any device work is issued.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            Self::NoInputs
                | Self::CannotConcatScalars
                | Self::InvalidAxis { .. }
                | Self::RankMismatch { .. }
                | Self::DimMismatch { .. }
                | Self::InvalidSplit(_)
                | Self::WrongNumElements { .. }
        )
    }

    /// Returns `true` for allocation failures.
    pub fn is_alloc_error(&self) -> bool {
        match self {
            Self::OutOfMemory => true,
            #[cfg(feature = "cuda")]
            Self::DeviceAllocFailed(_) => true,
            _ => false,
        }
    }

    /// Returns `true` for failures to schedule work on the device.
    pub fn is_launch_error(&self) -> bool {
        match self {
            #[cfg(feature = "cuda")]
            Self::LaunchFailed(_) | Self::CudaCompileError(_) | Self::CudaDriverError(_) => true,
            _ => false,
        }
    }
}
