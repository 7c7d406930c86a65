mod allocate;
mod device;

pub use device::Cuda;

use crate::dtypes::Dtype;
use cudarc::types::CudaTypeName;

/// Element types CUDA has an `atomicAdd` overload for. Gradient kernels
/// accumulate with it, so only these dtypes get a [Cuda] device.
pub trait CudaAtomicAdd: Dtype + CudaTypeName {}

impl CudaAtomicAdd for f32 {}
impl CudaAtomicAdd for f64 {}
impl CudaAtomicAdd for i32 {}
impl CudaAtomicAdd for u32 {}
#[cfg(feature = "f16")]
impl CudaAtomicAdd for crate::dtypes::f16 {}

pub(crate) fn launch_cfg<const NUM_THREADS: u32>(n: u32) -> cudarc::driver::LaunchConfig {
    let num_blocks = (n + NUM_THREADS - 1) / NUM_THREADS;
    cudarc::driver::LaunchConfig {
        grid_dim: (num_blocks.max(1), 1, 1),
        block_dim: (NUM_THREADS, 1, 1),
        shared_mem_bytes: 0,
    }
}

/// The CUDA C type used by copy-only kernels for elements of `E`. Copies
/// only care about the width of an element, so every dtype of the same size
/// shares one compiled kernel.
pub(crate) fn copy_type_name<E>() -> Option<&'static str> {
    match std::mem::size_of::<E>() {
        1 => Some("unsigned char"),
        2 => Some("unsigned short"),
        4 => Some("unsigned int"),
        8 => Some("unsigned long long"),
        _ => None,
    }
}
