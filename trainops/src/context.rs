use trainops_core::{
    shapes::Shape,
    tensor::{Cpu, Storage, Tensor, ZerosTensor},
};

use crate::Error;

/// A value flowing along a graph edge.
///
/// Most values live on the device kernels run on. Small integer metadata,
/// like the per input lengths of a concatenation, lives in host memory.
#[derive(Debug, Clone)]
pub enum OpValue<E, D: Storage<E>> {
    Device(Tensor<E, D>),
    HostI64(Tensor<i64, Cpu>),
}

impl<E, D: Storage<E>> OpValue<E, D> {
    pub fn as_device(&self) -> Option<&Tensor<E, D>> {
        match self {
            Self::Device(t) => Some(t),
            Self::HostI64(_) => None,
        }
    }

    pub fn as_device_mut(&mut self) -> Option<&mut Tensor<E, D>> {
        match self {
            Self::Device(t) => Some(t),
            Self::HostI64(_) => None,
        }
    }

    pub fn as_host_i64(&self) -> Option<&Tensor<i64, Cpu>> {
        match self {
            Self::HostI64(t) => Some(t),
            Self::Device(_) => None,
        }
    }
}

impl<E, D: Storage<E>> From<Tensor<E, D>> for OpValue<E, D> {
    fn from(value: Tensor<E, D>) -> Self {
        Self::Device(value)
    }
}

/// The per invocation state of a kernel: its inputs, and slots for the
/// outputs it produces.
///
/// Optional inputs that were not provided are `None`. Outputs are allocated
/// on request with [OpKernelContext::try_output], using the context's
/// device.
#[derive(Debug)]
pub struct OpKernelContext<E, D: Storage<E>> {
    device: D,
    host: Cpu,
    inputs: Vec<Option<OpValue<E, D>>>,
    outputs: Vec<Option<OpValue<E, D>>>,
}

impl<E, D: Storage<E>> OpKernelContext<E, D> {
    pub fn new(device: &D, inputs: Vec<Option<OpValue<E, D>>>, num_outputs: usize) -> Self {
        Self {
            device: device.clone(),
            host: Default::default(),
            inputs,
            outputs: (0..num_outputs).map(|_| None).collect(),
        }
    }

    /// A context whose inputs are all device tensors.
    pub fn from_tensors(device: &D, inputs: Vec<Tensor<E, D>>, num_outputs: usize) -> Self {
        let inputs = inputs.into_iter().map(|t| Some(t.into())).collect();
        Self::new(device, inputs, num_outputs)
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// The device that host resident values are allocated on.
    pub fn host(&self) -> &Cpu {
        &self.host
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// The device tensor at input `index`, which must be present.
    pub fn try_input(&self, index: usize) -> Result<&Tensor<E, D>, Error> {
        match self.inputs.get(index) {
            Some(Some(OpValue::Device(t))) => Ok(t),
            Some(Some(OpValue::HostI64(_))) => Err(Error::InvalidInput {
                index,
                expected: "device",
            }),
            _ => Err(Error::MissingInput(index)),
        }
    }

    /// Every input as a device tensor, in order.
    pub fn try_inputs(&self) -> Result<Vec<&Tensor<E, D>>, Error> {
        (0..self.input_count()).map(|i| self.try_input(i)).collect()
    }

    /// The host `i64` tensor at input `index`, or `None` if the optional
    /// input was not provided.
    pub fn try_host_input_i64(&self, index: usize) -> Result<Option<&Tensor<i64, Cpu>>, Error> {
        match self.inputs.get(index) {
            None | Some(None) => Ok(None),
            Some(Some(OpValue::HostI64(t))) => Ok(Some(t)),
            Some(Some(OpValue::Device(_))) => Err(Error::InvalidInput {
                index,
                expected: "host i64",
            }),
        }
    }

    fn check_output(&self, index: usize) -> Result<(), Error> {
        if index >= self.outputs.len() {
            return Err(Error::MissingOutput {
                index,
                num_outputs: self.outputs.len(),
            });
        }
        Ok(())
    }

    /// Stores `value` as output `index`.
    pub fn try_set_output(
        &mut self,
        index: usize,
        value: impl Into<OpValue<E, D>>,
    ) -> Result<(), Error> {
        self.check_output(index)?;
        self.outputs[index] = Some(value.into());
        Ok(())
    }

    pub fn output(&self, index: usize) -> Option<&OpValue<E, D>> {
        self.outputs.get(index).and_then(Option::as_ref)
    }

    pub fn take_output(&mut self, index: usize) -> Option<OpValue<E, D>> {
        self.outputs.get_mut(index).and_then(Option::take)
    }

    pub fn into_outputs(self) -> Vec<Option<OpValue<E, D>>> {
        self.outputs
    }
}

impl<E, D: ZerosTensor<E>> OpKernelContext<E, D> {
    /// Allocates output `index` with `shape` on the context's device.
    pub fn try_output(
        &mut self,
        index: usize,
        shape: impl Into<Shape>,
    ) -> Result<&mut Tensor<E, D>, Error> {
        self.check_output(index)?;
        let num_outputs = self.outputs.len();
        let t = self.device.try_zeros(shape)?;
        self.outputs[index]
            .insert(OpValue::Device(t))
            .as_device_mut()
            .ok_or(Error::MissingOutput { index, num_outputs })
    }

    /// Allocates the first `shapes.len()` outputs, one per shape.
    pub fn try_outputs(&mut self, shapes: &[Shape]) -> Result<Vec<&mut Tensor<E, D>>, Error> {
        if shapes.len() > self.outputs.len() {
            return Err(Error::MissingOutput {
                index: shapes.len() - 1,
                num_outputs: self.outputs.len(),
            });
        }
        for (slot, shape) in self.outputs.iter_mut().zip(shapes) {
            *slot = Some(OpValue::Device(self.device.try_zeros(shape)?));
        }
        Ok(self
            .outputs
            .iter_mut()
            .take(shapes.len())
            .filter_map(|slot| slot.as_mut().and_then(OpValue::as_device_mut))
            .collect())
    }
}
