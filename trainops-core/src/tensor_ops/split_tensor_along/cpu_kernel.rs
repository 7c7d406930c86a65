use crate::{
    dtypes::Dtype,
    tensor::{cpu::NdIndex, *},
};

use std::sync::Arc;

impl<E: Dtype> super::SplitAlongKernel<E> for Cpu {
    fn forward(
        &self,
        ax: usize,
        input: &Tensor<E, Self>,
        outputs: &mut [&mut Tensor<E, Self>],
    ) -> Result<(), Error> {
        let outer = input.shape.size_to_dim(ax);
        let inner = input.shape.size_from_dim(ax + 1);

        let blocks: Vec<usize> = outputs.iter().map(|t| t.shape[ax] * inner).collect();
        let mut bufs: Vec<&mut Vec<E>> = outputs
            .iter_mut()
            .map(|t| Arc::make_mut(&mut t.data))
            .collect();

        let mut idx = (!input.is_contiguous()).then(|| NdIndex::new(&input.shape, &input.strides));
        let mut i = 0;
        for o in 0..outer {
            for (buf, &n) in bufs.iter_mut().zip(blocks.iter()) {
                let dst = &mut buf[o * n..(o + 1) * n];
                match idx.as_mut() {
                    None => dst.copy_from_slice(&input.data[i..i + n]),
                    Some(src) => {
                        for (x, j) in dst.iter_mut().zip(src) {
                            *x = input.data[j];
                        }
                    }
                }
                i += n;
            }
        }
        Ok(())
    }
}
