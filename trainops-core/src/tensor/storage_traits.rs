use rand_distr::{Distribution, StandardNormal};
use std::vec::Vec;

use crate::shapes::Shape;

use super::{Error, Tensor};

/// Something that can store nd arrays for a given element type.
pub trait Storage<E>: 'static + std::fmt::Debug + Default + Clone + Send + Sync {
    /// Generic Storage type
    type Vec: 'static + std::fmt::Debug + Clone + Send + Sync;

    /// Allocates a gradient for the given nd array
    fn try_alloc_grad(&self, storage: &Self::Vec) -> Result<Self::Vec, Error> {
        self.try_alloc_len(self.len(storage))
    }

    /// Allocates `len` zeroed elements.
    fn try_alloc_len(&self, len: usize) -> Result<Self::Vec, Error>;

    /// Copies the *logical* contents of `tensor` (row major, strides applied)
    /// into host memory.
    fn tensor_to_vec(&self, tensor: &Tensor<E, Self>) -> Vec<E>;

    fn len(&self, v: &Self::Vec) -> usize;
}

pub trait Synchronize {
    /// Blocks until all work on device to complete. Useful for benchmarking.
    fn synchronize(&self) {
        self.try_synchronize().unwrap()
    }

    /// Blocks until all work on device to complete. Useful for benchmarking.
    fn try_synchronize(&self) -> Result<(), Error>;
}

/// Construct tensors filled with zeros.
pub trait ZerosTensor<E>: Storage<E> {
    /// Creates a tensor filled with zeros.
    /// ```rust
    /// # use trainops_core::prelude::*;
    /// # let dev: Cpu = Default::default();
    /// let a: Tensor<f32, _> = dev.zeros([2, 3]);
    /// assert_eq!(a.as_vec(), [0.0; 6]);
    /// ```
    fn zeros(&self, shape: impl Into<Shape>) -> Tensor<E, Self> {
        self.try_zeros(shape).unwrap()
    }

    /// Fallible version of [ZerosTensor::zeros]
    fn try_zeros(&self, shape: impl Into<Shape>) -> Result<Tensor<E, Self>, Error>;
}

/// Construct tensors from host data.
pub trait TensorFromVec<E>: Storage<E> {
    /// Creates a contiguous tensor with the given shape from row major data.
    /// ```rust
    /// # use trainops_core::prelude::*;
    /// # let dev: Cpu = Default::default();
    /// let a: Tensor<f32, _> = dev.tensor_from_vec(vec![1.0, 2.0, 3.0, 4.0], [2, 2]);
    /// assert_eq!(a.shape(), &Shape::from([2, 2]));
    /// ```
    fn tensor_from_vec(&self, src: Vec<E>, shape: impl Into<Shape>) -> Tensor<E, Self> {
        self.try_tensor_from_vec(src, shape).unwrap()
    }

    /// Fallible version of [TensorFromVec::tensor_from_vec]. Fails with
    /// [Error::WrongNumElements] when `src` doesn't match the shape.
    fn try_tensor_from_vec(
        &self,
        src: Vec<E>,
        shape: impl Into<Shape>,
    ) -> Result<Tensor<E, Self>, Error>;
}

/// Constructs tensors filled with random values from a given distribution.
pub trait SampleTensor<E>: Storage<E> {
    /// Samples a tensor with a given shape from a normal distribution
    fn sample_normal(&self, shape: impl Into<Shape>) -> Tensor<E, Self>
    where
        StandardNormal: Distribution<E>,
    {
        self.try_sample_like(shape, StandardNormal).unwrap()
    }

    /// Samples a tensor with a given shape from a given distribution.
    fn try_sample_like<D: Distribution<E>>(
        &self,
        shape: impl Into<Shape>,
        distr: D,
    ) -> Result<Tensor<E, Self>, Error>;
}
