//! Information about the available feature flags
//!
//! # "cuda"
//!
//! Enables the [crate::tensor::Cuda] device, backed by `cudarc`. Kernels are
//! compiled with nvrtc the first time they run on a device, and cached for
//! the lifetime of that device.
//!
//! Set `CUDA_INCLUDE_DIR` at run time if nvrtc can't find `cuda_fp16.h`
//! (only needed for gradients of `f16` tensors).
//!
//! Example:
//! ```toml
//! trainops = { version = "...", features = ["cuda"] }
//! ```
//!
//! # "f16"
//!
//! Enables `half::f16` as a [crate::dtypes::Dtype].
//!
//! Example:
//! ```toml
//! trainops = { version = "...", features = ["f16"] }
//! ```
//!
//! # "test-f64"
//!
//! Runs the test suite with `f64` instead of `f32`.
//!
//! ```bash
//! cargo test --features test-f64
//! ```

#[cfg(not(feature = "cuda"))]
/// The device kernels run on by default. Configure with crate features.
pub const DEFAULT_DEVICE: &str = "cpu";

#[cfg(feature = "cuda")]
/// The device kernels run on by default. Configure with crate features.
pub const DEFAULT_DEVICE: &str = "cuda";
