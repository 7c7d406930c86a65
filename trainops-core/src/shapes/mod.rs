//! Runtime shapes of tensors.
//!
//! A [Shape] is an ordered list of extents, one per dimension. The rank is
//! only known at run time, which is what an execution engine sees when it
//! hands a kernel the tensors of a graph node.
//!
//! ```rust
//! # use trainops_core::prelude::*;
//! let s = Shape::from([2, 3, 4]);
//! assert_eq!(s.rank(), 3);
//! assert_eq!(s.num_elements(), 24);
//! assert_eq!(s.strides(), [12, 4, 1]);
//! ```

use crate::tensor::Error;

/// The extents of a tensor, outermost dimension first.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: impl Into<Vec<usize>>) -> Self {
        Self { dims: dims.into() }
    }

    /// The shape of a rank 0 tensor.
    pub fn scalar() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    #[inline(always)]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// The number of elements in this shape; the product of all dimensions.
    #[inline(always)]
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// The strides of how this shape is layed out in memory.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![0; self.rank()];
        if let Some(last) = strides.last_mut() {
            *last = 1;
        }
        for i in (0..self.rank().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    /// Product of the dimensions before `axis`.
    pub fn size_to_dim(&self, axis: usize) -> usize {
        self.dims[..axis].iter().product()
    }

    /// Product of the dimensions from `axis` onwards.
    pub fn size_from_dim(&self, axis: usize) -> usize {
        self.dims[axis..].iter().product()
    }

    /// Returns a copy of this shape with dimension `axis` replaced by `size`.
    pub fn with_dim(&self, axis: usize, size: usize) -> Self {
        let mut dims = self.dims.clone();
        dims[axis] = size;
        Self { dims }
    }

    /// Whether this is the `[0]` shape that older graphs use as a placeholder
    /// for "no tensor".
    pub fn is_legacy_empty(&self) -> bool {
        self.dims == [0]
    }
}

impl std::ops::Index<usize> for Shape {
    type Output = usize;
    fn index(&self, index: usize) -> &Self::Output {
        &self.dims[index]
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self { dims }
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self {
            dims: dims.to_vec(),
        }
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self {
            dims: dims.to_vec(),
        }
    }
}

impl From<&Shape> for Shape {
    fn from(shape: &Shape) -> Self {
        shape.clone()
    }
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.dims)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.dims)
    }
}

/// Represents something that has a [Shape].
pub trait HasShape {
    fn shape(&self) -> &Shape;
}

impl HasShape for Shape {
    fn shape(&self) -> &Shape {
        self
    }
}

impl<S: HasShape + ?Sized> HasShape for &S {
    fn shape(&self) -> &Shape {
        (**self).shape()
    }
}

/// Resolves a possibly negative `axis` against `rank`.
///
/// Valid axes are in `[-rank, rank - 1]`; negative values count from the end.
///
/// ```rust
/// # use trainops_core::shapes::normalize_axis;
/// assert_eq!(normalize_axis(-1, 3).unwrap(), 2);
/// assert_eq!(normalize_axis(-3, 3).unwrap(), 0);
/// assert!(normalize_axis(3, 3).is_err());
/// ```
pub fn normalize_axis(axis: isize, rank: usize) -> Result<usize, Error> {
    let r = rank as isize;
    if axis < -r || axis >= r {
        return Err(Error::InvalidAxis { axis, rank });
    }
    let axis = if axis < 0 { axis + r } else { axis };
    Ok(axis as usize)
}
