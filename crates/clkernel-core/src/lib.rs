//! # clkernel core
//!
//! Host-side wrapper around an OpenCL kernel object.
//!
//! This crate gives callers a safe handle over a compiled `cl_kernel`:
//!
//! - [`Kernel::property`] / [`Kernel::work_group_property`] - memoized
//!   introspection driven by constant registries ([`KernelInfo`],
//!   [`WorkGroupInfo`]) that map each property to its native query shape
//! - [`Kernel::set_arg`] / [`Kernel::set_args`] - positional argument binding
//!   over the closed [`KernelArg`] set (buffer, image, sampler, `i32`, `f32`)
//! - [`Kernel::release`] - deterministic, idempotent release
//!
//! The native API sits behind the [`KernelApi`] trait. `clkernel-opencl`
//! provides the ICD-loader implementation; [`mock::MockApi`] records calls
//! for tests.
//!
//! ## Example
//!
//! ```ignore
//! use clkernel_core::prelude::*;
//!
//! let mut kernel = unsafe { Kernel::from_raw(api, raw_kernel) };
//! let name = kernel.function_name()?;
//! let wg = kernel.work_group_size(&device)?;
//! kernel.set_args(0, &[KernelArg::from(&input), KernelArg::from(&output), 1024i32.into()])?;
//! kernel.release()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod api;
pub mod args;
pub mod config;
pub mod error;
pub mod handle;
pub mod info;
pub mod kernel;
pub mod mock;
pub mod work_group;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::api::KernelApi;
    pub use crate::args::KernelArg;
    pub use crate::config::{KernelConfig, KernelConfigBuilder};
    pub use crate::error::*;
    pub use crate::handle::*;
    pub use crate::info::{KernelInfo, KernelInfoValue, QueryShape};
    pub use crate::kernel::{Kernel, QueryResult};
    pub use crate::work_group::{WorkGroupInfo, WorkGroupInfoValue};
}

// Re-exports for convenience
pub use api::KernelApi;
pub use args::KernelArg;
pub use config::{KernelConfig, KernelConfigBuilder};
pub use error::{ClError, QueryError, Result, Status};
pub use handle::{Buffer, Device, Image, Sampler};
pub use info::{KernelInfo, KernelInfoValue, QueryShape};
pub use kernel::{Kernel, QueryResult};
pub use work_group::{WorkGroupInfo, WorkGroupInfoValue};
