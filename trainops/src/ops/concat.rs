use trainops_core::{dtypes::Dtype, shapes::*, tensor::*, tensor_ops::*};

use crate::{
    context::{OpKernelContext, OpValue},
    kernel::{DeviceKernel, OpKernel},
    kernel_info::OpKernelInfo,
    Error,
};

/// Axis handling and shape validation shared by concatenation kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcatBase {
    axis: isize,
}

impl ConcatBase {
    /// Reads the required `axis` attribute.
    pub fn try_new<D>(info: &OpKernelInfo<D>) -> Result<Self, Error> {
        let axis = info.attributes().get_int("axis")?;
        let axis = isize::try_from(axis).map_err(|_| Error::InvalidAttribute {
            name: "axis".into(),
            reason: format!("{axis} does not fit in isize"),
        })?;
        Ok(Self { axis })
    }

    /// The axis as declared, possibly negative.
    pub fn axis(&self) -> isize {
        self.axis
    }

    /// Validates the input shapes and computes where everything goes.
    pub fn try_prepare<S: HasShape>(&self, inputs: &[S]) -> Result<ConcatLayout, Error> {
        Ok(try_concat_shape_along(inputs, self.axis)?)
    }
}

/// Concatenates its inputs along `axis`, for use in training graphs.
///
/// Output 0 is the concatenation. When the node has a second output, it is
/// set to a host `i64` tensor with every input's extent along the axis,
/// which [super::SplitTraining] uses to route gradients back.
///
/// ```rust
/// # use trainops::prelude::*;
/// let dev: Cpu = Default::default();
/// let node = NodeDef::new(TRAINING_DOMAIN, "ConcatTraining").with_attribute("axis", 0);
/// let kernel = ConcatTraining::try_new(&OpKernelInfo::new(node, dev.clone())).unwrap();
///
/// let a: Tensor<f32, _> = dev.zeros([2, 3]);
/// let b: Tensor<f32, _> = dev.zeros([3, 3]);
/// let mut ctx = OpKernelContext::from_tensors(&dev, vec![a, b], 2);
/// kernel.compute(&mut ctx).unwrap();
///
/// let out = ctx.output(0).unwrap().as_device().unwrap();
/// assert_eq!(out.shape(), &Shape::from([5, 3]));
/// let lens = ctx.output(1).unwrap().as_host_i64().unwrap();
/// assert_eq!(lens.as_vec(), [2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct ConcatTraining<D> {
    base: ConcatBase,
    kernel: DeviceKernel<D>,
}

impl<D> ConcatTraining<D> {
    pub fn try_new(info: &OpKernelInfo<D>) -> Result<Self, Error> {
        let base = ConcatBase::try_new(info)?;
        tracing::debug!(node = info.name(), axis = base.axis(), "created ConcatTraining");
        Ok(Self {
            base,
            kernel: DeviceKernel::new(),
        })
    }

    pub fn base(&self) -> &ConcatBase {
        &self.base
    }
}

impl<E: Dtype, D: Device<E>> OpKernel<E, D> for ConcatTraining<D> {
    fn compute(&self, ctx: &mut OpKernelContext<E, D>) -> Result<(), Error> {
        let inputs: Vec<Tensor<E, D>> = ctx.try_inputs()?.into_iter().cloned().collect();
        let layout = self.base.try_prepare(&inputs)?;
        tracing::debug!(
            axis = layout.axis(),
            num_inputs = inputs.len(),
            shape = %layout.shape(),
            "ConcatTraining"
        );

        let parts: Vec<&Tensor<E, D>> = layout.inputs().iter().map(|&i| &inputs[i]).collect();
        let device = ctx.device().clone();
        let out = ctx.try_output(0, layout.shape())?;
        self.kernel
            .try_concat_into(&device, layout.axis(), &parts, out)?;

        if ctx.output_count() > 1 {
            let lens: Vec<i64> = layout
                .per_input_length()
                .iter()
                .map(|&l| l as i64)
                .collect();
            let n = lens.len();
            let lens = ctx.host().try_tensor_from_vec(lens, [n])?;
            ctx.try_set_output(1, OpValue::HostI64(lens))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{kernel_info::NodeDef, registry::TRAINING_DOMAIN, tests::*};

    fn build(axis: i64) -> ConcatTraining<TestDevice> {
        let dev: TestDevice = Default::default();
        let node = NodeDef::new(TRAINING_DOMAIN, "ConcatTraining").with_attribute("axis", axis);
        ConcatTraining::try_new(&OpKernelInfo::new(node, dev)).unwrap()
    }

    fn run(
        kernel: &ConcatTraining<TestDevice>,
        inputs: Vec<Tensor<TestDtype, TestDevice>>,
        num_outputs: usize,
    ) -> Result<OpKernelContext<TestDtype, TestDevice>, Error> {
        let dev: TestDevice = Default::default();
        let mut ctx = OpKernelContext::from_tensors(&dev, inputs, num_outputs);
        kernel.compute(&mut ctx)?;
        Ok(ctx)
    }

    #[test]
    fn test_axis_is_required() {
        let node = NodeDef::new(TRAINING_DOMAIN, "ConcatTraining");
        let r = ConcatTraining::try_new(&OpKernelInfo::new(node, TestDevice::default()));
        assert!(matches!(r, Err(Error::MissingAttribute(a)) if a == "axis"));
    }

    #[test]
    fn test_axis_must_be_int() {
        let node = NodeDef::new(TRAINING_DOMAIN, "ConcatTraining").with_attribute("axis", vec![0]);
        let r = ConcatTraining::try_new(&OpKernelInfo::new(node, TestDevice::default()));
        assert!(matches!(r, Err(Error::InvalidAttribute { .. })));
    }

    #[test]
    fn test_rows() {
        let dev: TestDevice = Default::default();
        let a: Tensor<TestDtype, _> = dev.sample_normal([2, 3]);
        let b: Tensor<TestDtype, _> = dev.sample_normal([3, 3]);
        let ctx = run(&build(0), vec![a.clone(), b.clone()], 1).unwrap();
        let out = ctx.output(0).unwrap().as_device().unwrap();
        assert_eq!(out.shape(), &Shape::from([5, 3]));
        let mut expected = a.as_vec();
        expected.extend(b.as_vec());
        assert_eq!(out.as_vec(), expected);
    }

    #[test]
    fn test_per_input_length() {
        let dev: TestDevice = Default::default();
        let a: Tensor<TestDtype, _> = dev.zeros([2, 1, 4]);
        let empty: Tensor<TestDtype, _> = dev.zeros([0]);
        let b: Tensor<TestDtype, _> = dev.zeros([2, 3, 4]);
        let ctx = run(&build(-2), vec![a, empty, b], 2).unwrap();
        let out = ctx.output(0).unwrap().as_device().unwrap();
        assert_eq!(out.shape(), &Shape::from([2, 4, 4]));
        let lens = ctx.output(1).unwrap().as_host_i64().unwrap();
        assert_eq!(lens.shape(), &Shape::from([3]));
        assert_eq!(lens.as_vec(), [1, 0, 3]);
    }

    #[test]
    fn test_shape_errors_allocate_nothing() {
        let dev: TestDevice = Default::default();
        let a: Tensor<TestDtype, _> = dev.zeros([2, 3]);
        let b: Tensor<TestDtype, _> = dev.zeros([2, 3, 1]);
        let mut ctx = OpKernelContext::from_tensors(&dev, vec![a, b], 2);
        let err = build(0).compute(&mut ctx).unwrap_err();
        assert!(err.is_shape_error());
        assert!(matches!(
            err,
            Error::Tensor(trainops_core::tensor::Error::RankMismatch { input: 1, .. })
        ));
        assert!(ctx.output(0).is_none());
        assert!(ctx.output(1).is_none());
    }

    #[test]
    fn test_axis_out_of_range() {
        let dev: TestDevice = Default::default();
        let a: Tensor<TestDtype, _> = dev.zeros([2, 3]);
        let err = run(&build(2), vec![a.clone()], 1).unwrap_err();
        assert!(err.is_shape_error());
        assert!(run(&build(-3), vec![a.clone()], 1).is_err());
        assert!(run(&build(-2), vec![a], 1).is_ok());
    }

    #[test]
    fn test_missing_input() {
        let dev: TestDevice = Default::default();
        let a: Tensor<TestDtype, _> = dev.zeros([2, 3]);
        let mut ctx: OpKernelContext<TestDtype, TestDevice> =
            OpKernelContext::new(&dev, vec![Some(a.into()), None], 1);
        let err = build(0).compute(&mut ctx).unwrap_err();
        assert!(matches!(err, Error::MissingInput(1)));
        assert!(!err.is_shape_error());
    }

    #[test]
    fn test_zero_element_output_is_allocated() {
        let dev: TestDevice = Default::default();
        let a: Tensor<TestDtype, _> = dev.zeros([0, 2]);
        let b: Tensor<TestDtype, _> = dev.zeros([0, 5]);
        let ctx = run(&build(1), vec![a, b], 1).unwrap();
        let out = ctx.output(0).unwrap().as_device().unwrap();
        assert_eq!(out.shape(), &Shape::from([0, 7]));
        assert_eq!(out.num_elements(), 0);
    }

    #[test]
    fn test_runs_on_context_device() {
        let build_dev = TestDevice::seed_from_u64(0);
        let node = NodeDef::new(TRAINING_DOMAIN, "ConcatTraining").with_attribute("axis", 0);
        let kernel = ConcatTraining::try_new(&OpKernelInfo::new(node, build_dev)).unwrap();

        let ctx_dev = TestDevice::seed_from_u64(9);
        let a: Tensor<TestDtype, _> = ctx_dev.tensor_from_vec(vec![1.0, 2.0], [1, 2]);
        let b: Tensor<TestDtype, _> = ctx_dev.tensor_from_vec(vec![3.0, 4.0], [1, 2]);
        let mut ctx = OpKernelContext::from_tensors(&ctx_dev, vec![a, b], 1);
        kernel.compute(&mut ctx).unwrap();

        let out = ctx.output(0).unwrap().as_device().unwrap();
        assert_eq!(out.as_vec(), [1.0, 2.0, 3.0, 4.0]);
        // the output shares the context device's rng
        let x: Tensor<TestDtype, _> = out.device().sample_normal([4]);
        let y: Tensor<TestDtype, _> = TestDevice::seed_from_u64(9).sample_normal([4]);
        assert_eq!(x.as_vec(), y.as_vec());
    }

    #[test]
    fn test_kernel_is_reusable() {
        let dev: TestDevice = Default::default();
        let kernel = build(1);
        for n in 1..4 {
            let inputs: Vec<Tensor<TestDtype, _>> =
                (0..n).map(|_| dev.sample_normal([2, 2])).collect();
            let ctx = run(&kernel, inputs, 1).unwrap();
            let out = ctx.output(0).unwrap().as_device().unwrap();
            assert_eq!(out.shape(), &Shape::from([2, 2 * n]));
        }
    }
}
