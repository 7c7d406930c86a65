//! The [Tensor] struct, [Cpu] & [Cuda] devices, and
//! traits like [ZerosTensor], [TensorFromVec].
//!
//! At a high level a tensor is made up of:
//! 1. The [crate::shapes::Shape] it has, known at run time
//! 2. The strides used to index into its data
//! 3. The device its data is stored on (e.g. [Cpu] or [Cuda])
//!
//! # Creating tensors
//!
//! Devices are used to allocate tensors. Tensors are always created with
//! row major (contiguous) strides:
//!
//! ```rust
//! # use trainops_core::prelude::*;
//! let dev: Cpu = Default::default();
//! let a: Tensor<f32, _> = dev.zeros([2, 3]);
//! let b: Tensor<f32, _> = dev.tensor_from_vec(vec![1.0, 2.0, 3.0], [3]);
//! assert!(a.is_contiguous());
//! ```
//!
//! # Views
//!
//! [Tensor::try_permute] reorders dimensions without moving data, so the
//! result generally has non-contiguous strides. Every kernel in this crate
//! honors strides.
//!
//! ```rust
//! # use trainops_core::prelude::*;
//! # let dev: Cpu = Default::default();
//! let a: Tensor<f32, _> = dev.tensor_from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], [2, 3]);
//! let t = a.permute(&[1, 0]);
//! assert_eq!(t.shape(), &Shape::from([3, 2]));
//! assert_eq!(t.as_vec(), [1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
//! ```

pub(crate) mod cpu;
#[cfg(feature = "cuda")]
pub(crate) mod cuda;
mod error;
mod ghost;
pub(crate) mod storage_traits;
mod unique_id;

pub use cpu::Cpu;
#[cfg(feature = "cuda")]
pub use cuda::{Cuda, CudaAtomicAdd};
pub use error::Error;
pub use ghost::GhostTensor;
pub use storage_traits::{SampleTensor, Storage, Synchronize, TensorFromVec, ZerosTensor};
pub use unique_id::UniqueId;
pub(crate) use unique_id::unique_id;

use crate::shapes::{HasShape, Shape};
use std::sync::Arc;

/// An nd array stored on device `D`, with element type `E` and a shape
/// only known at run time.
pub struct Tensor<E, D: Storage<E>> {
    pub(crate) id: UniqueId,
    pub(crate) data: Arc<D::Vec>,
    pub(crate) shape: Shape,
    pub(crate) strides: Vec<usize>,
    pub(crate) device: D,
}

impl<E, D: Storage<E>> Tensor<E, D> {
    /// Wraps device storage that is already laid out in row major order.
    pub(crate) fn from_contiguous(device: &D, shape: Shape, data: D::Vec) -> Self {
        Self {
            id: unique_id(),
            data: Arc::new(data),
            strides: shape.strides(),
            shape,
            device: device.clone(),
        }
    }

    pub fn id(&self) -> UniqueId {
        self.id
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    /// Whether the strides are the row major strides of the shape.
    pub fn is_contiguous(&self) -> bool {
        self.strides == self.shape.strides()
    }

    /// Copies the logical contents to host memory, in row major order.
    pub fn as_vec(&self) -> Vec<E> {
        self.device.tensor_to_vec(self)
    }

    /// Reorders the dimensions of this tensor without copying any data.
    ///
    /// **Panics** if `axes` is not a permutation of `0..rank`.
    pub fn permute(&self, axes: &[usize]) -> Self {
        self.try_permute(axes).unwrap()
    }

    /// Fallible version of [Tensor::permute].
    pub fn try_permute(&self, axes: &[usize]) -> Result<Self, Error> {
        let rank = self.rank();
        if axes.len() != rank {
            return Err(Error::WrongNumElements {
                expected: rank,
                found: axes.len(),
            });
        }
        let mut seen = vec![false; rank];
        for &ax in axes {
            if ax >= rank || seen[ax] {
                return Err(Error::InvalidAxis {
                    axis: ax as isize,
                    rank,
                });
            }
            seen[ax] = true;
        }
        let dims: Vec<usize> = axes.iter().map(|&ax| self.shape[ax]).collect();
        let strides = axes.iter().map(|&ax| self.strides[ax]).collect();
        Ok(Self {
            id: unique_id(),
            data: self.data.clone(),
            shape: Shape::from(dims),
            strides,
            device: self.device.clone(),
        })
    }
}

impl<E, D: Storage<E>> HasShape for Tensor<E, D> {
    fn shape(&self) -> &Shape {
        &self.shape
    }
}

impl<E, D: Storage<E>> Clone for Tensor<E, D> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            data: self.data.clone(),
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            device: self.device.clone(),
        }
    }
}

impl<E, D: Storage<E>> std::fmt::Debug for Tensor<E, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("device", &self.device)
            .finish()
    }
}
