//! Kernel-level property registry.
//!
//! Every queryable `cl_kernel_info` code is listed once in a constant table
//! together with the shape of its native query. [`Kernel::property`] dispatches
//! on that shape.
//!
//! [`Kernel::property`]: crate::Kernel::property

use std::ffi::c_void;
use std::mem::size_of;

use crate::handle::{RawContext, RawProgram};

/// How a property's value is read back from the native query API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryShape {
    /// Two-phase query: length first, then a NUL-terminated byte string.
    String,
    /// Single `cl_uint`.
    Uint,
    /// Single opaque object handle.
    Handle,
    /// Single `size_t`.
    Size,
    /// Single `cl_ulong`.
    Ulong,
    /// Fixed `size_t[3]`.
    SizeArray3,
}

impl QueryShape {
    /// Destination size in bytes for fixed-size shapes, `None` for strings.
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            Self::String => None,
            Self::Uint => Some(size_of::<u32>()),
            Self::Handle => Some(size_of::<*mut c_void>()),
            Self::Size => Some(size_of::<usize>()),
            Self::Ulong => Some(size_of::<u64>()),
            Self::SizeArray3 => Some(3 * size_of::<usize>()),
        }
    }
}

/// Queryable kernel attributes (`cl_kernel_info`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum KernelInfo {
    /// `CL_KERNEL_FUNCTION_NAME`
    FunctionName = 0x1190,
    /// `CL_KERNEL_NUM_ARGS`
    NumArgs = 0x1191,
    /// `CL_KERNEL_REFERENCE_COUNT`
    ReferenceCount = 0x1192,
    /// `CL_KERNEL_CONTEXT`
    Context = 0x1193,
    /// `CL_KERNEL_PROGRAM`
    Program = 0x1194,
    /// `CL_KERNEL_ATTRIBUTES` (OpenCL 1.2)
    Attributes = 0x1195,
}

struct InfoEntry {
    info: KernelInfo,
    name: &'static str,
    shape: QueryShape,
}

// Ordered by code; `KernelInfo::entry` indexes by offset from the first code.
static KERNEL_INFO_TABLE: [InfoEntry; 6] = [
    InfoEntry {
        info: KernelInfo::FunctionName,
        name: "CL_KERNEL_FUNCTION_NAME",
        shape: QueryShape::String,
    },
    InfoEntry {
        info: KernelInfo::NumArgs,
        name: "CL_KERNEL_NUM_ARGS",
        shape: QueryShape::Uint,
    },
    InfoEntry {
        info: KernelInfo::ReferenceCount,
        name: "CL_KERNEL_REFERENCE_COUNT",
        shape: QueryShape::Uint,
    },
    InfoEntry {
        info: KernelInfo::Context,
        name: "CL_KERNEL_CONTEXT",
        shape: QueryShape::Handle,
    },
    InfoEntry {
        info: KernelInfo::Program,
        name: "CL_KERNEL_PROGRAM",
        shape: QueryShape::Handle,
    },
    InfoEntry {
        info: KernelInfo::Attributes,
        name: "CL_KERNEL_ATTRIBUTES",
        shape: QueryShape::String,
    },
];

impl KernelInfo {
    /// Every known kernel property, in code order.
    pub const ALL: [KernelInfo; 6] = [
        Self::FunctionName,
        Self::NumArgs,
        Self::ReferenceCount,
        Self::Context,
        Self::Program,
        Self::Attributes,
    ];

    fn entry(self) -> &'static InfoEntry {
        &KERNEL_INFO_TABLE[(self as u32 - KernelInfo::FunctionName as u32) as usize]
    }

    /// Native `cl_kernel_info` code.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Native constant name.
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    /// Query shape used to read this property.
    pub fn shape(self) -> QueryShape {
        self.entry().shape
    }

    /// Resolve a raw `cl_kernel_info` code.
    pub fn from_code(code: u32) -> Option<Self> {
        KERNEL_INFO_TABLE
            .iter()
            .map(|entry| entry.info)
            .find(|info| info.code() == code)
    }

    /// Decode the bytes of a fixed-size query for this property.
    ///
    /// Returns `None` for string-shaped properties or a short buffer.
    pub(crate) fn decode_fixed(self, bytes: &[u8]) -> Option<KernelInfoValue> {
        let width = self.shape().fixed_size()?;
        let bytes = bytes.get(..width)?;
        let value = match self {
            Self::NumArgs | Self::ReferenceCount => {
                KernelInfoValue::Uint(bytemuck::pod_read_unaligned::<u32>(bytes))
            }
            Self::Context => KernelInfoValue::Context(RawContext::from_addr(
                bytemuck::pod_read_unaligned::<usize>(bytes),
            )),
            Self::Program => KernelInfoValue::Program(RawProgram::from_addr(
                bytemuck::pod_read_unaligned::<usize>(bytes),
            )),
            Self::FunctionName | Self::Attributes => return None,
        };
        Some(value)
    }
}

/// A resolved kernel property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelInfoValue {
    /// String-shaped property, terminator stripped.
    Str(String),
    /// `cl_uint` property.
    Uint(u32),
    /// Owning context.
    Context(RawContext),
    /// Owning program.
    Program(RawProgram),
}

impl KernelInfoValue {
    /// The string payload, if this is a string property.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The integer payload, if this is a `cl_uint` property.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// The context handle, if this is `CL_KERNEL_CONTEXT`.
    pub fn as_context(&self) -> Option<RawContext> {
        match self {
            Self::Context(c) => Some(*c),
            _ => None,
        }
    }

    /// The program handle, if this is `CL_KERNEL_PROGRAM`.
    pub fn as_program(&self) -> Option<RawProgram> {
        match self {
            Self::Program(p) => Some(*p),
            _ => None,
        }
    }
}
