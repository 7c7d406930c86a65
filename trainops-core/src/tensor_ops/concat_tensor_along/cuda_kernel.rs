use crate::tensor::{
    cuda::{copy_type_name, launch_cfg, CudaAtomicAdd},
    Cuda, Error, GhostTensor, Tensor,
};
use cudarc::driver::{DevicePtr, LaunchAsync};

use std::sync::Arc;

impl<E: CudaAtomicAdd> super::ConcatAlongKernel<E> for Cuda {
    fn forward(
        &self,
        ax: usize,
        inputs: &[&Tensor<E, Self>],
        out: &mut Tensor<E, Self>,
    ) -> Result<(), Error> {
        let size = std::mem::size_of::<E>();
        let ty = copy_type_name::<E>()
            .ok_or_else(|| Error::CudaCompileError(format!("no copy kernel for {size} byte elements")))?;
        let module_name = std::format!("concat_copy_{size}");
        self.try_load_module(&module_name, &FWD_KERNEL.replace("$T", ty), &["fwd"])?;
        let fwd = self.try_get_func(&module_name, "fwd")?;

        let numel = out.num_elements();
        let info = info_buffer(
            numel,
            ax,
            out.shape.dims(),
            inputs.iter().map(|t| (t.shape[ax], t.strides.as_slice())),
        );
        let info = self.try_upload(info)?;
        let ptrs: Vec<u64> = inputs.iter().map(|t| *t.data.device_ptr()).collect();
        let ptrs = self.try_upload(ptrs)?;

        let cfg = launch_cfg::<128>(numel as u32);
        tracing::trace!(numel, axis = ax, num_inputs = inputs.len(), "launching concat fwd");
        unsafe { fwd.launch(cfg, (&info, &ptrs, Arc::make_mut(&mut out.data))) }
            .map_err(Error::LaunchFailed)
    }

    fn backward(
        &self,
        ax: usize,
        inputs: &[GhostTensor<E, Self>],
        grads: &mut [Self::Vec],
        grad_out: &Self::Vec,
    ) -> Result<(), Error> {
        let Some(first) = inputs.first() else {
            return Ok(());
        };
        let module_name = std::format!("concat_bwd_{}", E::NAME);
        let mut src = BWD_KERNEL.replace("$Ty", E::NAME);
        if E::NAME == "__half" {
            src.insert_str(0, "#include \"cuda_fp16.h\"\n");
        }
        self.try_load_module(&module_name, &src, &["bwd"])?;
        let bwd = self.try_get_func(&module_name, "bwd")?;

        let axis_len: usize = inputs.iter().map(|t| t.shape[ax]).sum();
        let out_shape = first.shape.with_dim(ax, axis_len);
        let numel = out_shape.num_elements();
        let info = info_buffer(
            numel,
            ax,
            out_shape.dims(),
            inputs.iter().map(|t| (t.shape[ax], t.strides.as_slice())),
        );
        let info = self.try_upload(info)?;
        let ptrs: Vec<u64> = grads.iter().map(|g| *g.device_ptr()).collect();
        let ptrs = self.try_upload(ptrs)?;

        let cfg = launch_cfg::<128>(numel as u32);
        tracing::trace!(numel, axis = ax, num_inputs = inputs.len(), "launching concat bwd");
        unsafe { bwd.launch(cfg, (&info, &ptrs, grad_out)) }.map_err(Error::LaunchFailed)
    }
}

/// numel, rank, axis, num_inputs, out_dims, per input extent along axis,
/// per input strides
fn info_buffer<'a>(
    numel: usize,
    ax: usize,
    out_dims: &[usize],
    inputs: impl ExactSizeIterator<Item = (usize, &'a [usize])> + Clone,
) -> Vec<u64> {
    let rank = out_dims.len();
    let mut info = Vec::with_capacity(4 + rank + inputs.len() * (1 + rank));
    info.extend([numel, rank, ax, inputs.len()].map(|x| x as u64));
    info.extend(out_dims.iter().map(|&d| d as u64));
    info.extend(inputs.clone().map(|(len, _)| len as u64));
    for (_, strides) in inputs {
        info.extend(strides.iter().map(|&s| s as u64));
    }
    info
}

const FWD_KERNEL: &str = "
typedef unsigned long long idx_t;

extern \"C\" __global__ void fwd(
    const idx_t *info, // numel, rank, axis, num_inputs, out_dims, in_lens, in_strides
    const idx_t *inputs,
    $T *out
) {
    const idx_t numel = info[0];
    const idx_t rank = info[1];
    const idx_t axis = info[2];
    const idx_t num_inputs = info[3];
    const idx_t *out_dims = info + 4;
    const idx_t *in_lens = info + 4 + rank;
    const idx_t *in_strides = info + 4 + rank + num_inputs;

    idx_t inner = 1;
    for (idx_t d = axis + 1; d < rank; d++) {
        inner *= out_dims[d];
    }

    for (idx_t i = (idx_t)blockIdx.x * blockDim.x + threadIdx.x; i < numel; i += (idx_t)blockDim.x * gridDim.x) {
        // find the input that owns this position along the axis
        idx_t along = (i / inner) % out_dims[axis];
        idx_t k = 0;
        while (along >= in_lens[k]) {
            along -= in_lens[k];
            k++;
        }
        const idx_t *strides = in_strides + k * rank;

        idx_t i_tmp = i;
        idx_t src_i = 0;
        for (idx_t d = rank; d-- > 0;) {
            idx_t dim_i = i_tmp % out_dims[d];
            i_tmp /= out_dims[d];
            src_i += (d == axis ? along : dim_i) * strides[d];
        }

        const $T *src = (const $T *)inputs[k];
        out[i] = src[src_i];
    }
}
";

const BWD_KERNEL: &str = "
typedef unsigned long long idx_t;

extern \"C\" __global__ void bwd(
    const idx_t *info, // numel, rank, axis, num_inputs, out_dims, in_lens, in_strides
    const idx_t *grads,
    const $Ty *grad_out
) {
    const idx_t numel = info[0];
    const idx_t rank = info[1];
    const idx_t axis = info[2];
    const idx_t num_inputs = info[3];
    const idx_t *out_dims = info + 4;
    const idx_t *in_lens = info + 4 + rank;
    const idx_t *in_strides = info + 4 + rank + num_inputs;

    idx_t inner = 1;
    for (idx_t d = axis + 1; d < rank; d++) {
        inner *= out_dims[d];
    }

    for (idx_t i = (idx_t)blockIdx.x * blockDim.x + threadIdx.x; i < numel; i += (idx_t)blockDim.x * gridDim.x) {
        idx_t along = (i / inner) % out_dims[axis];
        idx_t k = 0;
        while (along >= in_lens[k]) {
            along -= in_lens[k];
            k++;
        }
        const idx_t *strides = in_strides + k * rank;

        idx_t i_tmp = i;
        idx_t dst_i = 0;
        for (idx_t d = rank; d-- > 0;) {
            idx_t dim_i = i_tmp % out_dims[d];
            i_tmp /= out_dims[d];
            dst_i += (d == axis ? along : dim_i) * strides[d];
        }

        $Ty *grad = ($Ty *)grads[k];
        atomicAdd(grad + dst_i, grad_out[i]);
    }
}
";
