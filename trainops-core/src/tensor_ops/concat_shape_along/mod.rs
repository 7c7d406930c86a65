use crate::{shapes::*, tensor::*};

/// The result of validating the inputs of a concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatLayout {
    axis: usize,
    shape: Shape,
    per_input_length: Vec<usize>,
    inputs: Vec<usize>,
}

impl ConcatLayout {
    /// The concatenation axis, with negative values resolved.
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Shape of the concatenated output.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Extent of every input along the axis, in submission order. Skipped
    /// inputs report 0.
    pub fn per_input_length(&self) -> &[usize] {
        &self.per_input_length
    }

    /// Indices of the inputs that contribute data to the output.
    pub fn inputs(&self) -> &[usize] {
        &self.inputs
    }
}

/// Validates `shapes` for concatenation along `axis` and computes the
/// resulting layout.
///
/// Inputs with shape `[0]` are placeholders for missing tensors and are
/// skipped, unless every input is one. Negative axes count from the end.
///
/// ```rust
/// # use trainops_core::prelude::*;
/// let layout = try_concat_shape_along(&[Shape::from([2, 3]), Shape::from([3, 3])], -2).unwrap();
/// assert_eq!(layout.axis(), 0);
/// assert_eq!(layout.shape(), &Shape::from([5, 3]));
/// assert_eq!(layout.per_input_length(), [2, 3]);
/// ```
pub fn try_concat_shape_along<S: HasShape>(
    shapes: &[S],
    axis: isize,
) -> Result<ConcatLayout, Error> {
    if shapes.is_empty() {
        return Err(Error::NoInputs);
    }

    let reference = shapes
        .iter()
        .position(|s| !s.shape().is_legacy_empty())
        .unwrap_or(0);
    let ref_shape = shapes[reference].shape();
    let rank = ref_shape.rank();
    if rank == 0 {
        return Err(Error::CannotConcatScalars);
    }
    let axis = normalize_axis(axis, rank)?;

    let mut per_input_length = vec![0; shapes.len()];
    let mut inputs = Vec::with_capacity(shapes.len());
    let mut axis_len = 0;
    for (i, s) in shapes.iter().enumerate() {
        let shape = s.shape();
        if i != reference && shape.is_legacy_empty() {
            continue;
        }
        if shape.rank() != rank {
            return Err(Error::RankMismatch {
                input: i,
                expected: rank,
                found: shape.rank(),
            });
        }
        for d in 0..rank {
            if d != axis && shape[d] != ref_shape[d] {
                return Err(Error::DimMismatch {
                    input: i,
                    axis: d,
                    expected: ref_shape[d],
                    found: shape[d],
                });
            }
        }
        per_input_length[i] = shape[axis];
        axis_len += shape[axis];
        inputs.push(i);
    }

    Ok(ConcatLayout {
        axis,
        shape: ref_shape.with_dim(axis, axis_len),
        per_input_length,
        inputs,
    })
}

/// Concatenate a list of shapes along a given axis.
///
/// ```rust
/// # use trainops_core::prelude::*;
/// let a = Shape::from([2, 3]);
/// let b = Shape::from([2, 4]);
/// assert_eq!([a, b].concat_shape_along(1), Shape::from([2, 7]));
/// ```
pub trait TryConcatShapeAlong {
    /// Concatenates self along the given axis.
    fn concat_shape_along(&self, axis: isize) -> Shape {
        self.try_concat_shape_along(axis).unwrap()
    }
    /// Fallibly concatenates self along the given axis.
    fn try_concat_shape_along(&self, axis: isize) -> Result<Shape, Error>;
}

impl<S: HasShape> TryConcatShapeAlong for [S] {
    fn try_concat_shape_along(&self, axis: isize) -> Result<Shape, Error> {
        try_concat_shape_along(self, axis).map(|layout| layout.shape)
    }
}

impl<S: HasShape, const N: usize> TryConcatShapeAlong for [S; N] {
    fn try_concat_shape_along(&self, axis: isize) -> Result<Shape, Error> {
        self.as_slice().try_concat_shape_along(axis)
    }
}
