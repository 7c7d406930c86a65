use crate::dtypes::Unit;
use crate::tensor::{storage_traits::*, Error, Tensor};

use super::NdIndex;

use rand::{rngs::StdRng, SeedableRng};
use std::{
    sync::{Arc, Mutex},
    vec::Vec,
};

/// A device that stores data on the heap.
///
/// The [Default] impl seeds the underlying rng with seed of 0.
///
/// Use [Cpu::seed_from_u64] to control what seed is used.
#[derive(Clone, Debug)]
pub struct Cpu {
    /// A thread safe random number generator.
    pub(crate) rng: Arc<Mutex<StdRng>>,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::seed_from_u64(0)
    }
}

impl Cpu {
    /// Constructs rng with the given seed.
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }
}

impl<E: Unit> Storage<E> for Cpu {
    type Vec = Vec<E>;

    fn try_alloc_len(&self, len: usize) -> Result<Self::Vec, Error> {
        self.try_alloc_zeros(len)
    }

    fn tensor_to_vec(&self, tensor: &Tensor<E, Self>) -> Vec<E> {
        let mut buf = Vec::with_capacity(tensor.num_elements());
        let index = NdIndex::new(&tensor.shape, &tensor.strides);
        buf.extend(index.map(|i| tensor.data[i]));
        buf
    }

    fn len(&self, v: &Self::Vec) -> usize {
        v.len()
    }
}

impl Synchronize for Cpu {
    fn try_synchronize(&self) -> Result<(), Error> {
        Ok(())
    }
}
