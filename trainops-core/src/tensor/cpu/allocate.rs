use crate::{
    dtypes::Unit,
    shapes::Shape,
    tensor::{storage_traits::*, Error, Tensor},
};

use super::Cpu;

use rand::Rng;
use rand_distr::Distribution;
use std::vec::Vec;

impl Cpu {
    #[inline]
    pub(crate) fn try_alloc_zeros<E: Unit>(&self, numel: usize) -> Result<Vec<E>, Error> {
        self.try_alloc_elem::<E>(numel, Default::default())
    }

    #[inline]
    pub(crate) fn try_alloc_elem<E: Unit>(&self, numel: usize, elem: E) -> Result<Vec<E>, Error> {
        let mut data: Vec<E> = Vec::new();
        data.try_reserve(numel).map_err(|_| Error::OutOfMemory)?;
        data.resize(numel, elem);
        Ok(data)
    }
}

impl<E: Unit> ZerosTensor<E> for Cpu {
    fn try_zeros(&self, shape: impl Into<Shape>) -> Result<Tensor<E, Self>, Error> {
        let shape = shape.into();
        let data = self.try_alloc_zeros::<E>(shape.num_elements())?;
        Ok(Tensor::from_contiguous(self, shape, data))
    }
}

impl<E: Unit> TensorFromVec<E> for Cpu {
    fn try_tensor_from_vec(
        &self,
        src: Vec<E>,
        shape: impl Into<Shape>,
    ) -> Result<Tensor<E, Self>, Error> {
        let shape = shape.into();
        let expected = shape.num_elements();
        if src.len() != expected {
            return Err(Error::WrongNumElements {
                expected,
                found: src.len(),
            });
        }
        Ok(Tensor::from_contiguous(self, shape, src))
    }
}

impl<E: Unit> SampleTensor<E> for Cpu {
    fn try_sample_like<D: Distribution<E>>(
        &self,
        shape: impl Into<Shape>,
        distr: D,
    ) -> Result<Tensor<E, Self>, Error> {
        let shape = shape.into();
        let mut data = self.try_alloc_zeros::<E>(shape.num_elements())?;
        {
            let mut rng = self.rng.lock().unwrap();
            data.iter_mut().for_each(|x| *x = rng.sample(&distr));
        }
        Ok(Tensor::from_contiguous(self, shape, data))
    }
}
