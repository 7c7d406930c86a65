use trainops_core::{dtypes::Dtype, shapes::*, tensor::*, tensor_ops::*};

use crate::{
    context::OpKernelContext,
    kernel::{DeviceKernel, OpKernel},
    kernel_info::OpKernelInfo,
    Error,
};

/// Splits its input into consecutive pieces along `axis`. This is the
/// gradient of [super::ConcatTraining].
///
/// The length of each piece comes from, in order of preference:
/// 1. the optional host `i64` input 1, typically the `per_input_length`
///    output of the concatenation
/// 2. the `split` attribute
/// 3. an even split into as many pieces as the node has outputs
#[derive(Debug, Clone)]
pub struct SplitTraining<D> {
    axis: isize,
    split: Option<Vec<i64>>,
    kernel: DeviceKernel<D>,
}

impl<D> SplitTraining<D> {
    pub fn try_new(info: &OpKernelInfo<D>) -> Result<Self, Error> {
        let attrs = info.attributes();
        let axis = attrs.get_int_or("axis", 0)?;
        let axis = isize::try_from(axis).map_err(|_| Error::InvalidAttribute {
            name: "axis".into(),
            reason: format!("{axis} does not fit in isize"),
        })?;
        let split = attrs.get_ints("split")?.map(<[i64]>::to_vec);
        tracing::debug!(node = info.name(), axis, ?split, "created SplitTraining");
        Ok(Self {
            axis,
            split,
            kernel: DeviceKernel::new(),
        })
    }
}

impl<E: Dtype, D: Device<E>> OpKernel<E, D> for SplitTraining<D> {
    fn compute(&self, ctx: &mut OpKernelContext<E, D>) -> Result<(), Error> {
        let input = ctx.try_input(0)?.clone();
        let ax = normalize_axis(self.axis, input.rank())?;

        let split_input = ctx.try_host_input_i64(1)?.map(|t| t.as_vec());
        let split = split_input.as_deref().or(self.split.as_deref());
        let lengths = try_split_lengths(input.shape()[ax], ctx.output_count(), split)?;
        tracing::debug!(axis = ax, ?lengths, shape = %input.shape(), "SplitTraining");

        let shapes: Vec<Shape> = lengths
            .iter()
            .map(|&l| input.shape().with_dim(ax, l))
            .collect();
        let device = ctx.device().clone();
        let mut outputs = ctx.try_outputs(&shapes)?;
        self.kernel.try_split_into(&device, ax, &input, &mut outputs)
    }
}
