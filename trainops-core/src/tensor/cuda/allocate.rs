use crate::{
    dtypes::Unit,
    shapes::Shape,
    tensor::{storage_traits::*, Error, Tensor},
};

use super::Cuda;

use rand::Rng;
use rand_distr::Distribution;
use std::vec::Vec;

impl<E: Unit> ZerosTensor<E> for Cuda {
    fn try_zeros(&self, shape: impl Into<Shape>) -> Result<Tensor<E, Self>, Error> {
        let shape = shape.into();
        let data = self.try_alloc_len(shape.num_elements())?;
        Ok(Tensor::from_contiguous(self, shape, data))
    }
}

impl<E: Unit> TensorFromVec<E> for Cuda {
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
        let data = self.try_upload(src)?;
        Ok(Tensor::from_contiguous(self, shape, data))
    }
}

impl<E: Unit> SampleTensor<E> for Cuda {
    fn try_sample_like<D: Distribution<E>>(
        &self,
        shape: impl Into<Shape>,
        distr: D,
    ) -> Result<Tensor<E, Self>, Error> {
        let shape = shape.into();
        let mut buf = Vec::with_capacity(shape.num_elements());
        {
            let mut rng = self.cpu.rng.lock().unwrap();
            buf.resize_with(shape.num_elements(), || rng.sample(&distr));
        }
        self.try_tensor_from_vec(buf, shape)
    }
}
