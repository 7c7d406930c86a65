//! # trainops
//!
//! Kernels for the tensor operators of training graphs, and the surface an
//! execution engine uses to build and run them.
//!
//! See [feature_flags] for more information on features.
//!
//! # Tensors & devices
//!
//! *See [tensor] and [tensor_ops] for more information.*
//!
//! Tensors have shapes only known at run time, and live on a device: [tensor::Cpu], or
//! [tensor::Cuda] with the `cuda` feature. Concatenation itself is a tensor op:
//!
//! ```rust
//! # use trainops::prelude::*;
//! let dev: Cpu = Default::default();
//! let a: Tensor<f32, _> = dev.sample_normal([2, 3]);
//! let b: Tensor<f32, _> = dev.sample_normal([4, 3]);
//! let c = [a, b].concat_tensor_along(0);
//! assert_eq!(c.shape(), &Shape::from([6, 3]));
//! ```
//!
//! # Kernels
//!
//! A graph node is described by a [kernel_info::NodeDef]: an operator name, its domain and
//! its attributes. Node definitions deserialize from JSON. The
//! [registry::KernelRegistry] turns a node and a device into a boxed [kernel::OpKernel],
//! which is then invoked with a fresh [context::OpKernelContext] every time the node runs.
//!
//! ```rust
//! # use trainops::prelude::*;
//! let dev: Cpu = Default::default();
//! let registry = KernelRegistry::<f32, Cpu>::with_training_kernels();
//!
//! let node = NodeDef::from_json(
//!     r#"{"op_type": "ConcatTraining", "domain": "com.microsoft", "attributes": {"axis": -1}}"#,
//! )
//! .unwrap();
//! let concat = registry.create_kernel(&OpKernelInfo::new(node, dev.clone())).unwrap();
//!
//! let a: Tensor<f32, _> = dev.tensor_from_vec(vec![1.0, 2.0], [2, 1]);
//! let b: Tensor<f32, _> = dev.tensor_from_vec(vec![3.0, 4.0, 5.0, 6.0], [2, 2]);
//! let mut ctx = OpKernelContext::from_tensors(&dev, vec![a, b], 2);
//! concat.compute(&mut ctx).unwrap();
//!
//! let out = ctx.output(0).unwrap().as_device().unwrap();
//! assert_eq!(out.as_vec(), [1.0, 3.0, 4.0, 2.0, 5.0, 6.0]);
//! let lens = ctx.output(1).unwrap().as_host_i64().unwrap();
//! assert_eq!(lens.as_vec(), [1, 2]);
//! ```
//!
//! # Gradients
//!
//! `SplitTraining` is the gradient of `ConcatTraining`: fed the output gradient and the
//! per input lengths, it produces the gradient of every input.
//!
//! ```rust
//! # use trainops::prelude::*;
//! let dev: Cpu = Default::default();
//! let registry = KernelRegistry::<f32, Cpu>::with_training_kernels();
//! let node = NodeDef::new(TRAINING_DOMAIN, "SplitTraining").with_attribute("axis", 1);
//! let split = registry.create_kernel(&OpKernelInfo::new(node, dev.clone())).unwrap();
//!
//! let grad: Tensor<f32, _> = dev.tensor_from_vec(vec![1.0, 3.0, 4.0, 2.0, 5.0, 6.0], [2, 3]);
//! let lens = dev.tensor_from_vec(vec![1i64, 2], [2]);
//! let mut ctx = OpKernelContext::new(&dev, vec![Some(grad.into()), Some(OpValue::HostI64(lens))], 2);
//! split.compute(&mut ctx).unwrap();
//! assert_eq!(ctx.output(0).unwrap().as_device().unwrap().as_vec(), [1.0, 2.0]);
//! assert_eq!(ctx.output(1).unwrap().as_device().unwrap().as_vec(), [3.0, 4.0, 5.0, 6.0]);
//! ```
//!
//! # Logging
//!
//! Kernels emit [tracing] events: `debug` when they are built and run, `trace` for every
//! device launch. Install a subscriber to see them.

pub mod attributes;
pub mod context;
mod error;
pub mod feature_flags;
pub mod kernel;
pub mod kernel_info;
pub mod ops;
pub mod registry;

pub use error::Error;
pub use trainops_core::*;

pub mod prelude {
    pub use crate::attributes::*;
    pub use crate::context::*;
    pub use crate::kernel::*;
    pub use crate::kernel_info::*;
    pub use crate::ops::*;
    pub use crate::registry::*;
    pub use crate::Error;
    pub use trainops_core::prelude::*;
}

#[cfg(test)]
pub(crate) mod tests {
    #[cfg(not(feature = "cuda"))]
    pub type TestDevice = super::tensor::Cpu;

    #[cfg(feature = "cuda")]
    pub type TestDevice = super::tensor::Cuda;

    #[cfg(not(feature = "test-f64"))]
    pub type TestDtype = f32;

    #[cfg(feature = "test-f64")]
    pub type TestDtype = f64;
}
