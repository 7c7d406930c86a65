//! Operations on tensors like [TryConcatTensorAlong] and [TrySplitTensorAlong].
//!
//! Every operation comes in two flavors, following the same convention:
//! a fallible `try_*` method returning `Result<_, Error>`, and a method
//! without the prefix that panics on error.
//!
//! # Concatenation
//!
//! [try_concat_shape_along] validates a list of shapes and produces a
//! [ConcatLayout]: the resolved axis, the output shape, and each input's
//! extent along the axis. Execution engines call it before allocating
//! anything, so every shape error is reported before device work starts.
//!
//! [ConcatAlongKernel] is implemented by each device. Its forward pass
//! writes all inputs into the output in one call; its backward pass adds
//! slices of the output gradient into each input's gradient.
//!
//! # Splitting
//!
//! [SplitAlongKernel] is the reverse of concatenation, and is how gradients
//! of a concatenation are routed back to its inputs.

mod concat_shape_along;
mod concat_tensor_along;
mod device;
mod split_tensor_along;

pub use concat_shape_along::{try_concat_shape_along, ConcatLayout, TryConcatShapeAlong};
pub use concat_tensor_along::{
    try_concat_tensor_backward, try_concat_tensor_by_layout, ConcatAlongKernel,
    TryConcatTensorAlong,
};
pub use device::Device;
pub use split_tensor_along::{try_split_lengths, SplitAlongKernel, TrySplitTensorAlong};
