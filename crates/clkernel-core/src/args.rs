//! Kernel argument values and their native encoding.
//!
//! Object arguments bind the *handle* (`cl_mem` / `cl_sampler`), not the
//! payload behind it. Scalars bind by value in native byte order.

use std::any::Any;

use crate::error::{ClError, Result};
use crate::handle::{Buffer, Image, Sampler};

/// A value accepted at a kernel argument binding site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelArg<'a> {
    /// Buffer object handle.
    Buffer(&'a Buffer),
    /// Image object handle.
    Image(&'a Image),
    /// Sampler object handle.
    Sampler(&'a Sampler),
    /// `int` scalar.
    Int(i32),
    /// `float` scalar.
    Float(f32),
}

impl<'a> KernelArg<'a> {
    /// Resolve a dynamically typed value.
    ///
    /// Accepts `Buffer`, `Image`, `Sampler`, `i32` and `f32`; anything else
    /// fails with `CL_INVALID_VALUE`.
    pub fn from_any(value: &'a dyn Any) -> Result<Self> {
        if let Some(buffer) = value.downcast_ref::<Buffer>() {
            Ok(Self::Buffer(buffer))
        } else if let Some(image) = value.downcast_ref::<Image>() {
            Ok(Self::Image(image))
        } else if let Some(sampler) = value.downcast_ref::<Sampler>() {
            Ok(Self::Sampler(sampler))
        } else if let Some(v) = value.downcast_ref::<i32>() {
            Ok(Self::Int(*v))
        } else if let Some(v) = value.downcast_ref::<f32>() {
            Ok(Self::Float(*v))
        } else {
            Err(ClError::INVALID_VALUE)
        }
    }

    /// Short tag used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Buffer(_) => "buffer",
            Self::Image(_) => "image",
            Self::Sampler(_) => "sampler",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
        }
    }

    /// Native `(size, bytes)` payload for `clSetKernelArg`.
    pub(crate) fn encode(&self) -> ArgBytes {
        match self {
            Self::Buffer(b) => ArgBytes::handle(b.raw().addr()),
            Self::Image(i) => ArgBytes::handle(i.raw().addr()),
            Self::Sampler(s) => ArgBytes::handle(s.raw().addr()),
            Self::Int(v) => ArgBytes::Word(bytemuck::cast(*v)),
            Self::Float(v) => ArgBytes::Word(bytemuck::cast(*v)),
        }
    }
}

/// Encoded argument payload, kept on the stack.
pub(crate) enum ArgBytes {
    /// 4-byte scalar.
    Word([u8; 4]),
    /// Pointer-sized handle.
    Handle([u8; std::mem::size_of::<usize>()]),
}

impl ArgBytes {
    fn handle(addr: usize) -> Self {
        Self::Handle(addr.to_ne_bytes())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Word(bytes) => bytes,
            Self::Handle(bytes) => bytes,
        }
    }
}

impl<'a> From<&'a Buffer> for KernelArg<'a> {
    fn from(value: &'a Buffer) -> Self {
        Self::Buffer(value)
    }
}

impl<'a> From<&'a Image> for KernelArg<'a> {
    fn from(value: &'a Image) -> Self {
        Self::Image(value)
    }
}

impl<'a> From<&'a Sampler> for KernelArg<'a> {
    fn from(value: &'a Sampler) -> Self {
        Self::Sampler(value)
    }
}

impl From<i32> for KernelArg<'_> {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for KernelArg<'_> {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::RawMem;
    use std::ffi::c_void;

    #[test]
    fn test_int_encoding() {
        let arg = KernelArg::from(-2i32);
        assert_eq!(arg.encode().as_bytes(), &(-2i32).to_ne_bytes());
    }

    #[test]
    fn test_float_encoding() {
        let arg = KernelArg::from(1.5f32);
        assert_eq!(arg.encode().as_bytes(), &1.5f32.to_bits().to_ne_bytes());
    }

    #[test]
    fn test_buffer_binds_handle() {
        let buffer = Buffer::from_raw(RawMem::from_ptr(0x1000 as *mut c_void));
        let arg = KernelArg::from(&buffer);
        assert_eq!(arg.kind(), "buffer");
        assert_eq!(arg.encode().as_bytes(), &0x1000usize.to_ne_bytes());
    }

    #[test]
    fn test_from_any() {
        let buffer = Buffer::from_raw(RawMem::null());
        assert_eq!(
            KernelArg::from_any(&buffer).unwrap(),
            KernelArg::Buffer(&buffer)
        );
        assert_eq!(KernelArg::from_any(&7i32).unwrap(), KernelArg::Int(7));
        assert_eq!(KernelArg::from_any(&0.5f32).unwrap(), KernelArg::Float(0.5));
        assert_eq!(KernelArg::from_any(&7i64), Err(ClError::INVALID_VALUE));
        assert_eq!(
            KernelArg::from_any(&"buffer"),
            Err(ClError::INVALID_VALUE)
        );
    }
}
