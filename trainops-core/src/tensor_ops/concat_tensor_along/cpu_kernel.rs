use crate::{
    dtypes::Dtype,
    tensor::{cpu::NdIndex, *},
};

use std::sync::Arc;

impl<E: Dtype> super::ConcatAlongKernel<E> for Cpu {
    fn forward(
        &self,
        ax: usize,
        inputs: &[&Tensor<E, Self>],
        out: &mut Tensor<E, Self>,
    ) -> Result<(), Error> {
        let outer = out.shape.size_to_dim(ax);
        let inner = out.shape.size_from_dim(ax + 1);

        // each input contributes one block of `shape[ax] * inner` elements
        // per outer index
        let blocks: Vec<usize> = inputs.iter().map(|t| t.shape[ax] * inner).collect();
        let mut idx: Vec<Option<NdIndex>> = inputs
            .iter()
            .map(|t| (!t.is_contiguous()).then(|| NdIndex::new(&t.shape, &t.strides)))
            .collect();

        let buf = Arc::make_mut(&mut out.data);
        let mut i = 0;
        for o in 0..outer {
            for (k, t) in inputs.iter().enumerate() {
                let n = blocks[k];
                let dst = &mut buf[i..i + n];
                match idx[k].as_mut() {
                    None => dst.copy_from_slice(&t.data[o * n..(o + 1) * n]),
                    Some(src) => {
                        for (x, j) in dst.iter_mut().zip(src) {
                            *x = t.data[j];
                        }
                    }
                }
                i += n;
            }
        }
        Ok(())
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
        let outer = first.shape.size_to_dim(ax);
        let inner = first.shape.size_from_dim(ax + 1);

        let blocks: Vec<usize> = inputs.iter().map(|t| t.shape[ax] * inner).collect();
        let mut idx: Vec<NdIndex> = inputs
            .iter()
            .map(|t| NdIndex::new(&t.shape, &t.strides))
            .collect();

        let mut i = 0;
        for _ in 0..outer {
            for k in 0..inputs.len() {
                let n = blocks[k];
                for (g, j) in grad_out[i..i + n].iter().zip(&mut idx[k]) {
                    grads[k][j] += *g;
                }
                i += n;
            }
        }
        Ok(())
    }
}
