use crate::shapes::{HasShape, Shape};

use super::{unique_id::UniqueId, Error, Storage, Tensor};

/// Holds all the information a [Tensor] does, except without
/// holding a reference to the data storage.
///
/// Gradient kernels only need the layout of the forward inputs, so
/// they take ghosts and the forward buffers can be freed early.
pub struct GhostTensor<E, D: Storage<E>> {
    pub(crate) id: UniqueId,
    pub(crate) len: usize,
    pub(crate) shape: Shape,
    pub(crate) strides: Vec<usize>,
    pub(crate) dev: D,
    marker: std::marker::PhantomData<E>,
}

impl<E, D: Storage<E>> Tensor<E, D> {
    /// Creates a ghost tensor that doesn't hold a reference
    /// to the tensor's data.
    pub fn ghost(&self) -> GhostTensor<E, D> {
        GhostTensor {
            id: self.id,
            len: self.device.len(&self.data),
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            dev: self.device.clone(),
            marker: std::marker::PhantomData,
        }
    }
}

impl<E, D: Storage<E>> GhostTensor<E, D> {
    pub fn id(&self) -> UniqueId {
        self.id
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Allocates a zeroed buffer matching the storage of the
    /// tensor this ghost was made from.
    pub fn try_alloc_grad(&self) -> Result<D::Vec, Error> {
        self.dev.try_alloc_len(self.len)
    }
}

impl<E, D: Storage<E>> Clone for GhostTensor<E, D> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            len: self.len,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            dev: self.dev.clone(),
            marker: self.marker,
        }
    }
}

impl<E, D: Storage<E>> HasShape for GhostTensor<E, D> {
    fn shape(&self) -> &Shape {
        &self.shape
    }
}
