use super::concat_shape_along::{try_concat_shape_along, ConcatLayout};
use crate::{dtypes::*, shapes::*, tensor::*};

pub(crate) mod cpu_kernel;
#[cfg(feature = "cuda")]
pub(crate) mod cuda_kernel;

/// Concatenate a list of tensors along a given axis.
///
/// All tensors must have the same rank and the same extents on every axis
/// except `axis`. Tensors with shape `[0]` are skipped. Inputs may have any
/// strides; the output is always contiguous.
///
/// Along axis 0:
/// ```rust
/// # use trainops_core::prelude::*;
/// # let dev: Cpu = Default::default();
/// let a: Tensor<f32, _> = dev.zeros([2, 3]);
/// let b: Tensor<f32, _> = dev.zeros([3, 3]);
/// let c = [a, b].concat_tensor_along(0);
/// assert_eq!(c.shape(), &Shape::from([5, 3]));
/// ```
///
/// Along the last axis, with a negative index:
/// ```rust
/// # use trainops_core::prelude::*;
/// # let dev: Cpu = Default::default();
/// let a: Tensor<f32, _> = dev.zeros([2, 3]);
/// let b: Tensor<f32, _> = dev.zeros([2, 1]);
/// let c = [a, b].concat_tensor_along(-1);
/// assert_eq!(c.shape(), &Shape::from([2, 4]));
/// ```
pub trait TryConcatTensorAlong<E, D: Storage<E>> {
    /// Concatenates self along the given axis.
    fn concat_tensor_along(&self, axis: isize) -> Tensor<E, D> {
        self.try_concat_tensor_along(axis).unwrap()
    }
    /// Fallibly concatenates self along the given axis.
    fn try_concat_tensor_along(&self, axis: isize) -> Result<Tensor<E, D>, Error>;
}

/// Device side of concatenation. Both methods expect inputs that already
/// passed [try_concat_shape_along], with skipped inputs removed; use
/// [try_concat_tensor_by_layout] and [try_concat_tensor_backward] rather
/// than calling them directly.
pub trait ConcatAlongKernel<E: Dtype>: Storage<E> {
    /// Writes the concatenation of `inputs` along `ax` into `out`, which
    /// must be contiguous and already have the concatenated shape.
    fn forward(
        &self,
        ax: usize,
        inputs: &[&Tensor<E, Self>],
        out: &mut Tensor<E, Self>,
    ) -> Result<(), Error>;

    /// Adds the slice of `grad_out` that each input produced into that
    /// input's gradient. `grads[i]` has the storage layout of `inputs[i]`.
    fn backward(
        &self,
        ax: usize,
        inputs: &[GhostTensor<E, Self>],
        grads: &mut [Self::Vec],
        grad_out: &Self::Vec,
    ) -> Result<(), Error>;
}

/// Allocates the output described by `layout` and fills it from the
/// participating `inputs`. `inputs` is the full list `layout` was computed
/// from, skipped inputs included.
///
/// No kernel is launched when the output has no elements.
pub fn try_concat_tensor_by_layout<E: Dtype, D>(
    inputs: &[&Tensor<E, D>],
    layout: &ConcatLayout,
) -> Result<Tensor<E, D>, Error>
where
    D: ConcatAlongKernel<E> + ZerosTensor<E>,
{
    let parts: Vec<&Tensor<E, D>> = layout.inputs().iter().map(|&i| inputs[i]).collect();
    let device = parts.first().ok_or(Error::NoInputs)?.device.clone();
    let mut out = device.try_zeros(layout.shape())?;
    if out.num_elements() > 0 {
        device.forward(layout.axis(), &parts, &mut out)?;
    }
    Ok(out)
}

/// Computes the gradient of every input of a concatenation along `ax`,
/// given the gradient of its output. Returns one zero-initialized then
/// accumulated buffer per ghost.
///
/// The ghosts are validated the same way the forward inputs are. Inputs
/// with shape `[0]` did not contribute and keep a zero gradient.
/// `grad_out` must hold at least as many elements as the concatenation.
pub fn try_concat_tensor_backward<E: Dtype, D: ConcatAlongKernel<E>>(
    ax: usize,
    inputs: &[GhostTensor<E, D>],
    grad_out: &D::Vec,
) -> Result<Vec<D::Vec>, Error> {
    let layout = try_concat_shape_along(inputs, ax as isize)?;
    let dev = &inputs[layout.inputs()[0]].dev;
    let expected = layout.shape().num_elements();
    let found = Storage::<E>::len(dev, grad_out);
    if found < expected {
        return Err(Error::WrongNumElements { expected, found });
    }

    let mut grads = inputs
        .iter()
        .map(|t| t.try_alloc_grad().map(Some))
        .collect::<Result<Vec<_>, _>>()?;
    if expected == 0 {
        return Ok(grads.into_iter().flatten().collect());
    }

    let parts: Vec<GhostTensor<E, D>> =
        layout.inputs().iter().map(|&i| inputs[i].clone()).collect();
    let mut part_grads: Vec<D::Vec> = layout
        .inputs()
        .iter()
        .filter_map(|&i| grads[i].take())
        .collect();
    dev.backward(layout.axis(), &parts, &mut part_grads, grad_out)?;
    for (&i, g) in layout.inputs().iter().zip(part_grads) {
        grads[i] = Some(g);
    }
    Ok(grads.into_iter().flatten().collect())
}

impl<E: Dtype, D> TryConcatTensorAlong<E, D> for [Tensor<E, D>]
where
    D: ConcatAlongKernel<E> + ZerosTensor<E>,
{
    fn try_concat_tensor_along(&self, axis: isize) -> Result<Tensor<E, D>, Error> {
        let layout = try_concat_shape_along(self, axis)?;
        let inputs: Vec<&Tensor<E, D>> = self.iter().collect();
        try_concat_tensor_by_layout(&inputs, &layout)
    }
}

impl<E: Dtype, D, const N: usize> TryConcatTensorAlong<E, D> for [Tensor<E, D>; N]
where
    D: ConcatAlongKernel<E> + ZerosTensor<E>,
{
    fn try_concat_tensor_along(&self, axis: isize) -> Result<Tensor<E, D>, Error> {
        self.as_slice().try_concat_tensor_along(axis)
    }
}

impl<E: Dtype, D> TryConcatTensorAlong<E, D> for Vec<Tensor<E, D>>
where
    D: ConcatAlongKernel<E> + ZerosTensor<E>,
{
    fn try_concat_tensor_along(&self, axis: isize) -> Result<Tensor<E, D>, Error> {
        self.as_slice().try_concat_tensor_along(axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;
    use proptest::prelude::*;

    fn arange(
        dev: &TestDevice,
        shape: impl Into<Shape>,
        start: usize,
    ) -> Tensor<TestDtype, TestDevice> {
        let shape = shape.into();
        let data = (start..start + shape.num_elements())
            .map(|x| x as TestDtype)
            .collect();
        dev.tensor_from_vec(data, shape)
    }

    #[test]
    fn test_concat_rows() {
        let dev: TestDevice = Default::default();
        let a = arange(&dev, [2, 3], 0);
        let b = arange(&dev, [3, 3], 6);
        let c = [a.clone(), b.clone()].concat_tensor_along(0);
        assert_eq!(c.shape(), &Shape::from([5, 3]));
        let c = c.as_vec();
        assert_eq!(&c[..6], a.as_vec().as_slice());
        assert_eq!(&c[6..], b.as_vec().as_slice());
    }

    #[test]
    fn test_concat_ax_1() {
        let dev: TestDevice = Default::default();
        let a = arange(&dev, [2, 2], 0);
        let b = arange(&dev, [2, 1], 10);
        let c = arange(&dev, [2, 3], 20);
        let out = [a, b, c].concat_tensor_along(1);
        assert_eq!(out.shape(), &Shape::from([2, 6]));
        let expected: Vec<TestDtype> = [0, 1, 10, 20, 21, 22, 2, 3, 11, 23, 24, 25]
            .iter()
            .map(|&x| x as TestDtype)
            .collect();
        assert_eq!(out.as_vec(), expected);
    }

    #[test]
    fn test_concat_ax_2_of_3d() {
        let dev: TestDevice = Default::default();
        let a: Tensor<TestDtype, _> = dev.sample_normal([2, 3, 4]);
        let b: Tensor<TestDtype, _> = dev.sample_normal([2, 3, 5]);
        let c = [a.clone(), b.clone()].concat_tensor_along(2);
        assert_eq!(c.shape(), &Shape::from([2, 3, 9]));
        let (a, b, c) = (a.as_vec(), b.as_vec(), c.as_vec());
        for row in 0..6 {
            assert_eq!(&c[row * 9..row * 9 + 4], &a[row * 4..row * 4 + 4]);
            assert_eq!(&c[row * 9 + 4..row * 9 + 9], &b[row * 5..row * 5 + 5]);
        }
    }

    #[test]
    fn test_single_input_is_identity() {
        let dev: TestDevice = Default::default();
        let a: Tensor<TestDtype, _> = dev.sample_normal([3, 2, 2]);
        for axis in -3..3 {
            let b = [a.clone()].concat_tensor_along(axis);
            assert_eq!(b.shape(), a.shape());
            assert_eq!(b.as_vec(), a.as_vec());
        }
    }

    #[test]
    fn test_negative_rank_axis_is_axis_0() {
        let dev: TestDevice = Default::default();
        let a: Tensor<TestDtype, _> = dev.sample_normal([2, 3]);
        let b: Tensor<TestDtype, _> = dev.sample_normal([1, 3]);
        let x = [a.clone(), b.clone()].concat_tensor_along(-2);
        let y = [a, b].concat_tensor_along(0);
        assert_eq!(x.shape(), y.shape());
        assert_eq!(x.as_vec(), y.as_vec());
    }

    #[test]
    fn test_strided_inputs() {
        let dev: TestDevice = Default::default();
        // a is a [3, 2] view of a [2, 3] buffer
        let a = arange(&dev, [2, 3], 0).permute(&[1, 0]);
        let b = arange(&dev, [3, 1], 100);
        let c = [a.clone(), b].concat_tensor_along(1);
        assert_eq!(c.shape(), &Shape::from([3, 3]));
        let expected: Vec<TestDtype> = [0, 3, 100, 1, 4, 101, 2, 5, 102]
            .iter()
            .map(|&x| x as TestDtype)
            .collect();
        assert_eq!(c.as_vec(), expected);

        let d = [a.clone(), a].concat_tensor_along(0);
        let expected: Vec<TestDtype> = [0, 3, 1, 4, 2, 5, 0, 3, 1, 4, 2, 5]
            .iter()
            .map(|&x| x as TestDtype)
            .collect();
        assert_eq!(d.as_vec(), expected);
    }

    #[test]
    fn test_legacy_empty_inputs() {
        let dev: TestDevice = Default::default();
        let empty: Tensor<TestDtype, _> = dev.zeros([0]);
        let a = arange(&dev, [2, 2], 0);
        let b = arange(&dev, [2, 1], 4);
        let c = [empty.clone(), a, empty, b].concat_tensor_along(1);
        assert_eq!(c.shape(), &Shape::from([2, 3]));
        let expected: Vec<TestDtype> = [0, 1, 4, 2, 3, 5]
            .iter()
            .map(|&x| x as TestDtype)
            .collect();
        assert_eq!(c.as_vec(), expected);
    }

    #[test]
    fn test_zero_element_output() {
        let dev: TestDevice = Default::default();
        let a: Tensor<TestDtype, _> = dev.zeros([0, 3]);
        let b: Tensor<TestDtype, _> = dev.zeros([0, 4]);
        let c = [a, b].concat_tensor_along(1);
        assert_eq!(c.shape(), &Shape::from([0, 7]));
        assert!(c.as_vec().is_empty());
    }

    #[test]
    fn test_mismatch_is_shape_error() {
        let dev: TestDevice = Default::default();
        let a: Tensor<TestDtype, _> = dev.zeros([2, 3]);
        let b: Tensor<TestDtype, _> = dev.zeros([2, 4]);
        let err = [a, b].try_concat_tensor_along(0).unwrap_err();
        assert!(err.is_shape_error());
        assert!(matches!(err, Error::DimMismatch { input: 1, axis: 1, .. }));
    }

    #[test]
    fn test_backward_routes_grads() {
        let dev: TestDevice = Default::default();
        let a = arange(&dev, [2, 2], 0);
        let b = arange(&dev, [2, 1], 0);
        let out = [a.clone(), b.clone()].concat_tensor_along(1);
        let grad_out = arange(&dev, out.shape(), 1);
        let grads =
            try_concat_tensor_backward(1, &[a.ghost(), b.ghost()], grad_out.data.as_ref())
                .unwrap();
        assert_eq!(grads.len(), 2);
        assert_close!(grads_to_vec(&dev, &grads[0], 4), vec![1.0, 2.0, 4.0, 5.0]);
        assert_close!(grads_to_vec(&dev, &grads[1], 2), vec![3.0, 6.0]);
    }

    #[test]
    fn test_backward_accumulates_into_strided_grads() {
        let dev: TestDevice = Default::default();
        let a = arange(&dev, [2, 3], 0).permute(&[1, 0]);
        let b = arange(&dev, [1, 2], 0);
        let grad_out = arange(&dev, [4, 2], 1);
        let grads =
            try_concat_tensor_backward(0, &[a.ghost(), b.ghost()], grad_out.data.as_ref())
                .unwrap();
        // grad of a is stored with a's [2, 3] layout
        assert_close!(
            grads_to_vec(&dev, &grads[0], 6),
            vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0]
        );
        assert_close!(grads_to_vec(&dev, &grads[1], 2), vec![7.0, 8.0]);
    }

    #[test]
    fn test_backward_skips_legacy_empty() {
        let dev: TestDevice = Default::default();
        let a = arange(&dev, [2, 2], 0);
        let empty: Tensor<TestDtype, _> = dev.zeros([0]);
        let b = arange(&dev, [2, 1], 0);
        let grad_out = arange(&dev, [2, 3], 1);
        let grads = try_concat_tensor_backward(
            1,
            &[a.ghost(), empty.ghost(), b.ghost()],
            grad_out.data.as_ref(),
        )
        .unwrap();
        assert_eq!(grads.len(), 3);
        assert_close!(grads_to_vec(&dev, &grads[0], 4), vec![1.0, 2.0, 4.0, 5.0]);
        assert!(grads_to_vec(&dev, &grads[1], 0).is_empty());
        assert_close!(grads_to_vec(&dev, &grads[2], 2), vec![3.0, 6.0]);

        let grads =
            try_concat_tensor_backward(1, &[a.ghost(), empty.ghost()], grad_out.data.as_ref())
                .unwrap();
        assert_close!(grads_to_vec(&dev, &grads[0], 4), vec![1.0, 2.0, 4.0, 5.0]);
    }

    #[test]
    fn test_backward_rejects_mismatched_ghosts() {
        let dev: TestDevice = Default::default();
        let a: Tensor<TestDtype, _> = dev.zeros([2, 2]);
        let b: Tensor<TestDtype, _> = dev.zeros([4]);
        let grad_out: Tensor<TestDtype, _> = dev.zeros([8]);
        let err = try_concat_tensor_backward(1, &[a.ghost(), b.ghost()], grad_out.data.as_ref())
            .unwrap_err();
        assert!(matches!(err, Error::RankMismatch { input: 1, .. }));

        let c: Tensor<TestDtype, _> = dev.zeros([3, 2]);
        let err = try_concat_tensor_backward(1, &[a.ghost(), c.ghost()], grad_out.data.as_ref())
            .unwrap_err();
        assert!(matches!(err, Error::DimMismatch { input: 1, axis: 0, .. }));

        let err = try_concat_tensor_backward(2, &[a.ghost()], grad_out.data.as_ref()).unwrap_err();
        assert!(err.is_shape_error());

        let none: [GhostTensor<TestDtype, TestDevice>; 0] = [];
        let err = try_concat_tensor_backward(0, &none, grad_out.data.as_ref()).unwrap_err();
        assert!(matches!(err, Error::NoInputs));
    }

    #[test]
    fn test_backward_rejects_short_grad_out() {
        let dev: TestDevice = Default::default();
        let a: Tensor<TestDtype, _> = dev.zeros([2, 2]);
        let grad_out: Tensor<TestDtype, _> = dev.zeros([2]);
        let err =
            try_concat_tensor_backward(0, &[a.ghost()], grad_out.data.as_ref()).unwrap_err();
        assert!(matches!(
            err,
            Error::WrongNumElements {
                expected: 4,
                found: 2
            }
        ));
    }

    fn grads_to_vec(
        dev: &TestDevice,
        grad: &<TestDevice as Storage<TestDtype>>::Vec,
        len: usize,
    ) -> Vec<TestDtype> {
        Tensor::<TestDtype, TestDevice>::from_contiguous(dev, Shape::from([len]), grad.clone())
            .as_vec()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_concat_preserves_order(
            dims in proptest::collection::vec(1usize..4, 1..4),
            lens in proptest::collection::vec(0usize..4, 1..4),
            ax_seed in 0usize..8,
        ) {
            let dev: TestDevice = Default::default();
            let axis = ax_seed % dims.len();
            let base = Shape::from(dims);
            let mut start = 0;
            let inputs: Vec<Tensor<TestDtype, TestDevice>> = lens
                .iter()
                .map(|&l| {
                    let t = arange(&dev, base.with_dim(axis, l), start);
                    start += t.num_elements();
                    t
                })
                .collect();
            let out = inputs.concat_tensor_along(axis as isize);
            prop_assert_eq!(out.shape()[axis], lens.iter().sum::<usize>());

            // walk the output in blocks: for every outer index, each input
            // contributes its own contiguous block in order
            let outer = base.size_to_dim(axis);
            let inner = base.size_from_dim(axis + 1);
            let out = out.as_vec();
            let mut i = 0;
            for o in 0..outer {
                for t in inputs.iter() {
                    let n = t.shape()[axis] * inner;
                    let src = t.as_vec();
                    prop_assert_eq!(&out[i..i + n], &src[o * n..o * n + n]);
                    i += n;
                }
            }
            prop_assert_eq!(i, out.len());
        }
    }
}
