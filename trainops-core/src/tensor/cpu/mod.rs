mod allocate;
mod device;
mod iterate;

pub(crate) use iterate::NdIndex;

pub use device::Cpu;
