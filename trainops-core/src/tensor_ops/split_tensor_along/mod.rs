use crate::{dtypes::*, shapes::*, tensor::*};

pub(crate) mod cpu_kernel;
#[cfg(feature = "cuda")]
pub(crate) mod cuda_kernel;

/// Split a tensor into consecutive pieces along a given axis.
///
/// This is the reverse of [super::TryConcatTensorAlong::concat_tensor_along].
///
/// ```rust
/// # use trainops_core::prelude::*;
/// # let dev: Cpu = Default::default();
/// let ab: Tensor<f32, _> = dev.zeros([5, 4]);
/// let parts = ab.split_tensor_along(0, &[2, 3]);
/// assert_eq!(parts[0].shape(), &Shape::from([2, 4]));
/// assert_eq!(parts[1].shape(), &Shape::from([3, 4]));
/// ```
pub trait TrySplitTensorAlong<E, D: Storage<E>> {
    /// Splits self along the given axis.
    fn split_tensor_along(&self, axis: isize, lengths: &[usize]) -> Vec<Tensor<E, D>> {
        self.try_split_tensor_along(axis, lengths).unwrap()
    }
    /// Fallibly splits self along the given axis. Fails with
    /// [Error::InvalidSplit] if `lengths` doesn't add up to the extent of
    /// `axis`.
    fn try_split_tensor_along(
        &self,
        axis: isize,
        lengths: &[usize],
    ) -> Result<Vec<Tensor<E, D>>, Error>;
}

pub trait SplitAlongKernel<E: Dtype>: Storage<E> {
    /// Copies consecutive slices of `input` along `ax` into `outputs`, which
    /// must be contiguous and already have their final shapes.
    fn forward(
        &self,
        ax: usize,
        input: &Tensor<E, Self>,
        outputs: &mut [&mut Tensor<E, Self>],
    ) -> Result<(), Error>;
}

/// Resolves how an axis of extent `extent` is divided among `num_outputs`
/// outputs.
///
/// With no explicit `split` the axis is divided evenly.
///
/// ```rust
/// # use trainops_core::prelude::*;
/// assert_eq!(try_split_lengths(6, 3, None).unwrap(), [2, 2, 2]);
/// assert_eq!(try_split_lengths(6, 2, Some(&[1, 5])).unwrap(), [1, 5]);
/// assert!(try_split_lengths(7, 2, None).is_err());
/// ```
pub fn try_split_lengths(
    extent: usize,
    num_outputs: usize,
    split: Option<&[i64]>,
) -> Result<Vec<usize>, Error> {
    if num_outputs == 0 {
        return Err(Error::InvalidSplit("at least one output is required".into()));
    }
    let split = match split {
        Some(split) if !split.is_empty() => split,
        _ => {
            if extent % num_outputs != 0 {
                return Err(Error::InvalidSplit(format!(
                    "axis extent {extent} is not divisible by {num_outputs} outputs"
                )));
            }
            return Ok(vec![extent / num_outputs; num_outputs]);
        }
    };
    if split.len() != num_outputs {
        return Err(Error::InvalidSplit(format!(
            "{} split lengths given for {num_outputs} outputs",
            split.len()
        )));
    }
    let lengths = split
        .iter()
        .map(|&l| {
            usize::try_from(l)
                .map_err(|_| Error::InvalidSplit(format!("negative split length {l}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let total: usize = lengths.iter().sum();
    if total != extent {
        return Err(Error::InvalidSplit(format!(
            "split lengths sum to {total}, but the axis has extent {extent}"
        )));
    }
    Ok(lengths)
}

impl<E: Dtype, D> TrySplitTensorAlong<E, D> for Tensor<E, D>
where
    D: SplitAlongKernel<E> + ZerosTensor<E>,
{
    fn try_split_tensor_along(
        &self,
        axis: isize,
        lengths: &[usize],
    ) -> Result<Vec<Tensor<E, D>>, Error> {
        let ax = normalize_axis(axis, self.rank())?;
        let total: usize = lengths.iter().sum();
        if lengths.is_empty() || total != self.shape[ax] {
            return Err(Error::InvalidSplit(format!(
                "lengths {lengths:?} don't partition axis {ax} of {}",
                self.shape
            )));
        }

        let mut outputs = lengths
            .iter()
            .map(|&l| self.device.try_zeros(self.shape.with_dim(ax, l)))
            .collect::<Result<Vec<_>, _>>()?;
        if self.num_elements() > 0 {
            let mut refs: Vec<&mut Tensor<E, D>> = outputs.iter_mut().collect();
            self.device.forward(ax, self, &mut refs)?;
        }
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{tensor_ops::*, tests::*};

    fn arange(dev: &TestDevice, shape: impl Into<Shape>) -> Tensor<TestDtype, TestDevice> {
        let shape = shape.into();
        let data = (0..shape.num_elements()).map(|x| x as TestDtype).collect();
        dev.tensor_from_vec(data, shape)
    }

    #[test]
    fn test_split_ax_0() {
        let dev: TestDevice = Default::default();
        let ab: Tensor<TestDtype, _> = dev.sample_normal([5, 3, 4]);
        let parts = ab.split_tensor_along(0, &[2, 3]);
        assert_eq!(parts[0].shape(), &Shape::from([2, 3, 4]));
        assert_eq!(parts[1].shape(), &Shape::from([3, 3, 4]));
        let v = ab.as_vec();
        assert_eq!(parts[0].as_vec(), &v[..24]);
        assert_eq!(parts[1].as_vec(), &v[24..]);

        let ab_concat = parts.concat_tensor_along(0);
        assert_eq!(ab_concat.as_vec(), v);
    }

    #[test]
    fn test_split_ax_1() {
        let dev: TestDevice = Default::default();
        let ab = arange(&dev, [2, 5]);
        let parts = ab.split_tensor_along(-1, &[2, 0, 3]);
        assert_eq!(parts.len(), 3);
        assert_close!(parts[0].as_vec(), vec![0.0, 1.0, 5.0, 6.0]);
        assert!(parts[1].as_vec().is_empty());
        assert_eq!(parts[1].shape(), &Shape::from([2, 0]));
        assert_close!(parts[2].as_vec(), vec![2.0, 3.0, 4.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_split_ax_2_is_inverse_of_concat() {
        let dev: TestDevice = Default::default();
        let a: Tensor<TestDtype, _> = dev.sample_normal([2, 3, 2]);
        let b: Tensor<TestDtype, _> = dev.sample_normal([2, 3, 3]);
        let ab = [a.clone(), b.clone()].concat_tensor_along(2);
        let parts = ab.split_tensor_along(2, &[2, 3]);
        assert_eq!(parts[0].as_vec(), a.as_vec());
        assert_eq!(parts[1].as_vec(), b.as_vec());
    }

    #[test]
    fn test_split_strided_input() {
        let dev: TestDevice = Default::default();
        // [[0, 3], [1, 4], [2, 5]]
        let ab = arange(&dev, [2, 3]).permute(&[1, 0]);
        let parts = ab.split_tensor_along(0, &[1, 2]);
        assert_close!(parts[0].as_vec(), vec![0.0, 3.0]);
        assert_close!(parts[1].as_vec(), vec![1.0, 4.0, 2.0, 5.0]);
        let parts = ab.split_tensor_along(1, &[1, 1]);
        assert_close!(parts[0].as_vec(), vec![0.0, 1.0, 2.0]);
        assert_close!(parts[1].as_vec(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_split_bad_lengths() {
        let dev: TestDevice = Default::default();
        let ab: Tensor<TestDtype, _> = dev.zeros([4, 2]);
        assert!(matches!(
            ab.try_split_tensor_along(0, &[1, 2]),
            Err(Error::InvalidSplit(_))
        ));
        assert!(matches!(
            ab.try_split_tensor_along(0, &[]),
            Err(Error::InvalidSplit(_))
        ));
        assert!(matches!(
            ab.try_split_tensor_along(2, &[4]),
            Err(Error::InvalidAxis { axis: 2, rank: 2 })
        ));
    }

    #[test]
    fn test_split_lengths() {
        assert_eq!(try_split_lengths(6, 2, None).unwrap(), [3, 3]);
        assert_eq!(try_split_lengths(6, 2, Some(&[])).unwrap(), [3, 3]);
        assert_eq!(try_split_lengths(0, 2, None).unwrap(), [0, 0]);
        assert_eq!(try_split_lengths(5, 3, Some(&[0, 4, 1])).unwrap(), [0, 4, 1]);
        assert!(try_split_lengths(5, 0, None).is_err());
        assert!(try_split_lengths(5, 2, None).is_err());
        assert!(try_split_lengths(5, 2, Some(&[1, 2, 2])).is_err());
        assert!(try_split_lengths(5, 2, Some(&[-1, 6])).is_err());
        assert!(try_split_lengths(5, 2, Some(&[1, 2])).is_err());
        assert!(try_split_lengths(5, 2, Some(&[1, 2]))
            .unwrap_err()
            .is_shape_error());
    }
}
