use crate::shapes::Shape;

/// Walks the physical indices of a strided nd array in row major
/// (logical) order.
#[derive(Debug, Eq, PartialEq)]
pub(crate) struct NdIndex {
    pub(crate) indices: Vec<usize>,
    pub(crate) shape: Vec<usize>,
    pub(crate) strides: Vec<usize>,
    pub(crate) next: Option<usize>,
    pub(crate) contiguous: Option<usize>,
}

impl NdIndex {
    #[inline]
    pub(crate) fn new(shape: &Shape, strides: &[usize]) -> Self {
        let numel = shape.num_elements();
        Self {
            indices: vec![0; shape.rank()],
            shape: shape.dims().to_vec(),
            strides: strides.to_vec(),
            next: (numel > 0).then_some(0),
            contiguous: (strides == shape.strides()).then_some(numel),
        }
    }
}

impl Iterator for NdIndex {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<usize> {
        let i = self.next?;
        match self.contiguous {
            Some(numel) => {
                self.next = (i + 1 < numel).then_some(i + 1);
            }
            None if self.shape.is_empty() => {
                self.next = None;
            }
            None => {
                let mut cur = i;
                let mut dim = self.shape.len() - 1;
                loop {
                    self.indices[dim] += 1;
                    cur += self.strides[dim];

                    if self.indices[dim] < self.shape[dim] {
                        self.next = Some(cur);
                        break;
                    }

                    cur -= self.shape[dim] * self.strides[dim];
                    self.indices[dim] = 0;

                    if dim == 0 {
                        self.next = None;
                        break;
                    }

                    dim -= 1;
                }
            }
        }
        Some(i)
    }
}
