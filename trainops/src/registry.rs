use std::collections::HashMap;

use trainops_core::{dtypes::Dtype, tensor::Storage, tensor_ops::Device};

use crate::{
    kernel::OpKernel,
    kernel_info::OpKernelInfo,
    ops::{ConcatTraining, SplitTraining},
    Error,
};

/// The domain training operators are registered under.
pub const TRAINING_DOMAIN: &str = "com.microsoft";

/// Builds a kernel for a node.
pub type KernelFactory<E, D> = fn(&OpKernelInfo<D>) -> Result<Box<dyn OpKernel<E, D>>, Error>;

/// Maps `(domain, op_type)` to the factory that builds its kernel.
///
/// ```rust
/// # use trainops::prelude::*;
/// let dev: Cpu = Default::default();
/// let registry = KernelRegistry::<f32, Cpu>::with_training_kernels();
/// let node = NodeDef::new(TRAINING_DOMAIN, "ConcatTraining").with_attribute("axis", 1);
/// let kernel = registry.create_kernel(&OpKernelInfo::new(node, dev.clone())).unwrap();
///
/// let a: Tensor<f32, _> = dev.zeros([2, 3]);
/// let mut ctx = OpKernelContext::from_tensors(&dev, vec![a.clone(), a], 1);
/// kernel.compute(&mut ctx).unwrap();
/// assert_eq!(ctx.output(0).unwrap().as_device().unwrap().shape(), &Shape::from([2, 6]));
/// ```
pub struct KernelRegistry<E, D: Storage<E>> {
    factories: HashMap<(String, String), KernelFactory<E, D>>,
}

impl<E, D: Storage<E>> Default for KernelRegistry<E, D> {
    fn default() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }
}

impl<E, D: Storage<E>> std::fmt::Debug for KernelRegistry<E, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.factories.keys().collect();
        keys.sort();
        f.debug_struct("KernelRegistry")
            .field("kernels", &keys)
            .finish()
    }
}

impl<E, D: Storage<E>> KernelRegistry<E, D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` for `op_type` in `domain`. Fails with
    /// [Error::DuplicateKernel] if one is already registered.
    pub fn try_register(
        &mut self,
        domain: &str,
        op_type: &str,
        factory: KernelFactory<E, D>,
    ) -> Result<(), Error> {
        let key = (domain.to_string(), op_type.to_string());
        if self.factories.contains_key(&key) {
            return Err(Error::DuplicateKernel {
                domain: key.0,
                op_type: key.1,
            });
        }
        tracing::debug!(domain, op_type, "registered kernel");
        self.factories.insert(key, factory);
        Ok(())
    }

    pub fn contains(&self, domain: &str, op_type: &str) -> bool {
        self.factories
            .contains_key(&(domain.to_string(), op_type.to_string()))
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Builds the kernel for the node described by `info`.
    pub fn create_kernel(&self, info: &OpKernelInfo<D>) -> Result<Box<dyn OpKernel<E, D>>, Error> {
        let key = (info.domain().to_string(), info.op_type().to_string());
        let factory = self
            .factories
            .get(&key)
            .ok_or_else(|| Error::KernelNotFound {
                domain: key.0.clone(),
                op_type: key.1.clone(),
            })?;
        tracing::debug!(domain = info.domain(), op_type = info.op_type(), node = info.name(), "creating kernel");
        factory(info)
    }
}

impl<E: Dtype, D: Device<E>> KernelRegistry<E, D> {
    /// A registry with every training kernel registered.
    pub fn with_training_kernels() -> Self {
        let mut registry = Self::new();
        // the registry is empty, so no registration can collide
        register_training_kernels(&mut registry).unwrap();
        registry
    }
}

/// Registers `ConcatTraining` and `SplitTraining` under [TRAINING_DOMAIN].
pub fn register_training_kernels<E: Dtype, D: Device<E>>(
    registry: &mut KernelRegistry<E, D>,
) -> Result<(), Error> {
    registry.try_register(TRAINING_DOMAIN, "ConcatTraining", create_concat_training::<E, D>)?;
    registry.try_register(TRAINING_DOMAIN, "SplitTraining", create_split_training::<E, D>)?;
    Ok(())
}

fn create_concat_training<E: Dtype, D: Device<E>>(
    info: &OpKernelInfo<D>,
) -> Result<Box<dyn OpKernel<E, D>>, Error> {
    Ok(Box::new(ConcatTraining::try_new(info)?))
}

fn create_split_training<E: Dtype, D: Device<E>>(
    info: &OpKernelInfo<D>,
) -> Result<Box<dyn OpKernel<E, D>>, Error> {
    Ok(Box::new(SplitTraining::try_new(info)?))
}
