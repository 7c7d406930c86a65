use trainops_core::{dtypes::Dtype, tensor::*, tensor_ops::*};

use crate::{context::OpKernelContext, Error};

use std::marker::PhantomData;

/// A computation registered for a graph node.
///
/// Kernels hold only the configuration captured when they were built, so
/// one instance can be invoked concurrently with different contexts.
pub trait OpKernel<E: Dtype, D: Storage<E>>: Send + Sync {
    /// Reads the context's inputs and fills its outputs. Device work may
    /// still be in flight when this returns.
    fn compute(&self, ctx: &mut OpKernelContext<E, D>) -> Result<(), Error>;
}

/// Dispatches a kernel's copies to the device kernels of `D`.
///
/// It holds no device of its own. Operators pass the device of the
/// execution context, the same one the outputs were allocated on.
pub struct DeviceKernel<D> {
    marker: PhantomData<fn() -> D>,
}

impl<D> Default for DeviceKernel<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for DeviceKernel<D> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<D> std::fmt::Debug for DeviceKernel<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceKernel").finish()
    }
}

impl<D> DeviceKernel<D> {
    pub fn new() -> Self {
        Self {
            marker: PhantomData,
        }
    }

    /// Concatenates `inputs` along `ax` into `out` on `device`. Nothing is
    /// launched when `out` has no elements.
    pub fn try_concat_into<E: Dtype>(
        &self,
        device: &D,
        ax: usize,
        inputs: &[&Tensor<E, D>],
        out: &mut Tensor<E, D>,
    ) -> Result<(), Error>
    where
        D: Device<E>,
    {
        if out.num_elements() > 0 {
            tracing::trace!(axis = ax, num_inputs = inputs.len(), "concat");
            ConcatAlongKernel::forward(device, ax, inputs, out)?;
        }
        Ok(())
    }

    /// Splits `input` along `ax` into `outputs` on `device`.
    pub fn try_split_into<E: Dtype>(
        &self,
        device: &D,
        ax: usize,
        input: &Tensor<E, D>,
        outputs: &mut [&mut Tensor<E, D>],
    ) -> Result<(), Error>
    where
        D: Device<E>,
    {
        if input.num_elements() > 0 {
            tracing::trace!(axis = ax, num_outputs = outputs.len(), "split");
            SplitAlongKernel::forward(device, ax, input, outputs)?;
        }
        Ok(())
    }
}
