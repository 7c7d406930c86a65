//! Tensors with run time shapes, the [tensor::Cpu] & [tensor::Cuda] devices,
//! and the device kernels behind concatenation in training graphs.
//!
//! An execution engine hands an operator an ordered list of tensors whose
//! rank is only known when the graph runs. This crate provides:
//!
//! 1. [shapes::Shape], a run time shape, and [shapes::normalize_axis]
//! 2. [tensor::Tensor] and the devices that allocate them
//! 3. [tensor_ops::try_concat_shape_along], which validates inputs to a
//!    concatenation and computes the output layout
//! 4. [tensor_ops::ConcatAlongKernel] & [tensor_ops::SplitAlongKernel], the
//!    device kernels that move the data
//!
//! ```rust
//! # use trainops_core::prelude::*;
//! let dev: Cpu = Default::default();
//! let a: Tensor<f32, _> = dev.tensor_from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], [2, 3]);
//! let b: Tensor<f32, _> = dev.tensor_from_vec(vec![7.0, 8.0, 9.0], [1, 3]);
//! let c = [a, b].concat_tensor_along(0);
//! assert_eq!(c.shape(), &Shape::from([3, 3]));
//! assert_eq!(c.as_vec(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
//!
//! let parts = c.split_tensor_along(0, &[2, 1]);
//! assert_eq!(parts[1].as_vec(), [7.0, 8.0, 9.0]);
//! ```
//!
//! # Features
//!
//! - `cuda`: enables [tensor::Cuda], backed by `cudarc`. Kernels are compiled
//!   with nvrtc the first time they are used.
//! - `f16`: enables the `half::f16` dtype.
//! - `test-f64`: runs the test suite with `f64` instead of `f32`.

pub mod dtypes;
pub mod shapes;
pub mod tensor;
pub mod tensor_ops;

/// Contains subset of all public exports.
pub mod prelude {
    pub use crate::dtypes::{Dtype, Unit};
    pub use crate::shapes::*;
    pub use crate::tensor::*;
    pub use crate::tensor_ops::*;
}
