use crate::{
    dtypes::Dtype,
    tensor::{
        cuda::{copy_type_name, launch_cfg},
        Cuda, Error, Tensor,
    },
};
use cudarc::driver::{DevicePtr, LaunchAsync};

use std::sync::Arc;

impl<E: Dtype> super::SplitAlongKernel<E> for Cuda {
    fn forward(
        &self,
        ax: usize,
        input: &Tensor<E, Self>,
        outputs: &mut [&mut Tensor<E, Self>],
    ) -> Result<(), Error> {
        let size = std::mem::size_of::<E>();
        let ty = copy_type_name::<E>().ok_or_else(|| {
            Error::CudaCompileError(format!("no copy kernel for {size} byte elements"))
        })?;
        let module_name = std::format!("split_copy_{size}");
        self.try_load_module(&module_name, &KERNEL.replace("$T", ty), &["fwd"])?;
        let fwd = self.try_get_func(&module_name, "fwd")?;

        let numel = input.num_elements();
        let rank = input.rank();
        let mut info: Vec<u64> = Vec::with_capacity(4 + 2 * rank + outputs.len());
        info.extend([numel, rank, ax, outputs.len()].map(|x| x as u64));
        info.extend(input.shape.dims().iter().map(|&d| d as u64));
        info.extend(input.strides.iter().map(|&s| s as u64));
        info.extend(outputs.iter().map(|t| t.shape[ax] as u64));
        let info = self.try_upload(info)?;

        let ptrs: Vec<u64> = outputs
            .iter_mut()
            .map(|t| *Arc::make_mut(&mut t.data).device_ptr())
            .collect();
        let ptrs = self.try_upload(ptrs)?;

        let cfg = launch_cfg::<128>(numel as u32);
        tracing::trace!(numel, axis = ax, num_outputs = outputs.len(), "launching split fwd");
        unsafe { fwd.launch(cfg, (&info, input.data.as_ref(), &ptrs)) }.map_err(Error::LaunchFailed)
    }
}

const KERNEL: &str = "
typedef unsigned long long idx_t;

extern \"C\" __global__ void fwd(
    const idx_t *info, // numel, rank, axis, num_outputs, in_dims, in_strides, out_lens
    const $T *inp,
    const idx_t *outputs
) {
    const idx_t numel = info[0];
    const idx_t rank = info[1];
    const idx_t axis = info[2];
    const idx_t *in_dims = info + 4;
    const idx_t *in_strides = info + 4 + rank;
    const idx_t *out_lens = info + 4 + 2 * rank;

    idx_t inner = 1;
    for (idx_t d = axis + 1; d < rank; d++) {
        inner *= in_dims[d];
    }

    for (idx_t i = (idx_t)blockIdx.x * blockDim.x + threadIdx.x; i < numel; i += (idx_t)blockDim.x * gridDim.x) {
        idx_t i_tmp = i;
        idx_t src_i = 0;
        for (idx_t d = rank; d-- > 0;) {
            src_i += (i_tmp % in_dims[d]) * in_strides[d];
            i_tmp /= in_dims[d];
        }

        // find the output that owns this position along the axis
        idx_t outer = i / (inner * in_dims[axis]);
        idx_t along = (i / inner) % in_dims[axis];
        idx_t k = 0;
        while (along >= out_lens[k]) {
            along -= out_lens[k];
            k++;
        }

        $T *dst = ($T *)outputs[k];
        dst[(outer * out_lens[k] + along) * inner + i % inner] = inp[src_i];
    }
}
";
