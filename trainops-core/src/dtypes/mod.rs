//! Element types a tensor can hold.
//!
//! [Unit] is anything that can be stored and moved by the copy kernels.
//! [Dtype] additionally supports the accumulation gradient kernels do.
//!
//! When the `f16` feature is enabled, this exports the [f16] type.

#[cfg(feature = "f16")]
pub use half::f16;

/// A type whose all zero bit pattern is a valid value, so buffers of it can
/// be zero initialized on any device.
#[cfg(not(feature = "cuda"))]
pub trait SafeZeros {}

/// A type whose all zero bit pattern is a valid value, so buffers of it can
/// be zero initialized on any device.
#[cfg(feature = "cuda")]
pub trait SafeZeros: cudarc::driver::ValidAsZeroBits + cudarc::driver::DeviceRepr {}

/// An element that can be stored in a tensor and copied between tensors.
pub trait Unit:
    'static + Copy + Default + std::fmt::Debug + PartialEq + Send + Sync + SafeZeros
{
}

macro_rules! unit {
    ($($type:ty),*) => {
        $(
            impl SafeZeros for $type {}
            impl Unit for $type {}
        )*
    };
}

unit!(f32, f64, usize, u8, u32, u64, i32, i64, bool);
#[cfg(feature = "f16")]
unit!(f16);

/// An element gradients can be accumulated into. [`bool`] is a [Unit] but
/// not a [Dtype].
pub trait Dtype: Unit + std::ops::Add<Self, Output = Self> + std::ops::AddAssign {}

macro_rules! dtype {
    ($($type:ty),*) => {
        $(impl Dtype for $type {})*
    };
}

dtype!(f32, f64, usize, u8, u32, u64, i32, i64);
#[cfg(feature = "f16")]
dtype!(f16);
