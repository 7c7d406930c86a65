use crate::dtypes::Unit;
use crate::tensor::cpu::{Cpu, NdIndex};
use crate::tensor::{storage_traits::*, Error, Tensor};

use cudarc::driver::{CudaDevice, CudaFunction, CudaSlice, DriverError};
use cudarc::nvrtc::{compile_ptx_with_opts, CompileOptions};

use std::{sync::Arc, vec::Vec};

/// A Cuda device that enables constructing tensors on GPUs
/// & running GPU kernels.
///
/// All kernels are launched on the device's default stream and
/// return without waiting for them to finish. Use
/// [Synchronize::try_synchronize] to wait.
#[derive(Clone, Debug)]
pub struct Cuda {
    pub(crate) cpu: Cpu,
    pub(crate) dev: Arc<CudaDevice>,
}

impl From<DriverError> for Error {
    fn from(value: DriverError) -> Self {
        Self::CudaDriverError(value)
    }
}

impl Default for Cuda {
    fn default() -> Self {
        Self::seed_from_u64(0)
    }
}

impl Cuda {
    /// Constructs rng with the given seed.
    pub fn seed_from_u64(seed: u64) -> Self {
        Self::try_seed_from_u64(seed).unwrap()
    }

    /// Constructs rng with the given seed.
    pub fn try_seed_from_u64(seed: u64) -> Result<Self, Error> {
        Self::try_build(0, seed)
    }

    /// Constructs with the given seed & device ordinal
    pub fn try_build(ordinal: usize, seed: u64) -> Result<Self, Error> {
        let cpu = Cpu::seed_from_u64(seed);
        let dev = CudaDevice::new(ordinal)?;
        tracing::debug!(ordinal, "opened cuda device");
        Ok(Self { cpu, dev })
    }
}

impl Cuda {
    /// Compiles `src` with nvrtc and loads it as `module_name`, unless a
    /// module with that name was already loaded.
    pub(crate) fn try_load_module(
        &self,
        module_name: &str,
        src: &str,
        func_names: &[&'static str],
    ) -> Result<(), Error> {
        if func_names
            .iter()
            .all(|name| self.dev.has_func(module_name, name))
        {
            return Ok(());
        }
        tracing::debug!(module_name, "compiling cuda module");
        let mut opts = CompileOptions::default();
        if let Ok(dir) = std::env::var("CUDA_INCLUDE_DIR") {
            opts.include_paths.push(dir);
        }
        let ptx = compile_ptx_with_opts(src, opts)
            .map_err(|e| Error::CudaCompileError(format!("{module_name}: {e:?}")))?;
        self.dev.load_ptx(ptx, module_name, func_names)?;
        Ok(())
    }

    pub(crate) fn try_get_func(&self, module_name: &str, name: &str) -> Result<CudaFunction, Error> {
        self.dev.get_func(module_name, name).ok_or_else(|| {
            Error::CudaCompileError(format!("{module_name}::{name} was not loaded"))
        })
    }

    /// Copies `buf` to a new device allocation.
    pub(crate) fn try_upload<T: Unit>(&self, buf: Vec<T>) -> Result<CudaSlice<T>, Error> {
        self.dev.htod_copy(buf).map_err(Error::DeviceAllocFailed)
    }
}

impl Synchronize for Cuda {
    fn try_synchronize(&self) -> Result<(), Error> {
        self.dev.synchronize().map_err(Error::from)
    }
}

impl<E: Unit> Storage<E> for Cuda {
    type Vec = CudaSlice<E>;

    fn try_alloc_len(&self, len: usize) -> Result<Self::Vec, Error> {
        self.dev
            .alloc_zeros::<E>(len)
            .map_err(Error::DeviceAllocFailed)
    }

    fn len(&self, v: &Self::Vec) -> usize {
        v.len()
    }

    fn tensor_to_vec(&self, tensor: &Tensor<E, Self>) -> Vec<E> {
        let buf = self.dev.dtoh_sync_copy(tensor.data.as_ref()).unwrap();
        NdIndex::new(&tensor.shape, &tensor.strides)
            .map(|i| buf[i])
            .collect()
    }
}
