use super::{ConcatAlongKernel, SplitAlongKernel};
use crate::{dtypes::Dtype, tensor::*};

/// A [Storage] that implements every kernel a training graph needs to
/// concatenate tensors and route their gradients back.
pub trait Device<E: Dtype>:
    Storage<E>
    + Synchronize

    // allocation
    + ZerosTensor<E>
    + TensorFromVec<E>
    + SampleTensor<E>

    // concatenation & its gradient
    + ConcatAlongKernel<E>
    + SplitAlongKernel<E>
{
}

impl<E: Dtype> Device<E> for Cpu {}

/// Only dtypes with a CUDA `atomicAdd` overload, see
/// [crate::tensor::CudaAtomicAdd].
#[cfg(feature = "cuda")]
impl<E: crate::tensor::CudaAtomicAdd> Device<E> for Cuda {}
