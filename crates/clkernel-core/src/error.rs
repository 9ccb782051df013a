//! Error types for kernel queries and argument binding.
//!
//! [`ClError`] is the only way a native status code crosses into caller-visible
//! errors. Property queries wrap it in [`QueryError`] so callers can tell an
//! unsupported identifier apart from a native failure.

use std::fmt;

/// Native OpenCL status code (`cl_int`).
pub type Status = i32;

/// Result type for binding and lifetime operations.
pub type Result<T> = std::result::Result<T, ClError>;

/// Symbolic names for OpenCL status codes.
const STATUS_NAMES: &[(Status, &str)] = &[
    (0, "CL_SUCCESS"),
    (-1, "CL_DEVICE_NOT_FOUND"),
    (-2, "CL_DEVICE_NOT_AVAILABLE"),
    (-3, "CL_COMPILER_NOT_AVAILABLE"),
    (-4, "CL_MEM_OBJECT_ALLOCATION_FAILURE"),
    (-5, "CL_OUT_OF_RESOURCES"),
    (-6, "CL_OUT_OF_HOST_MEMORY"),
    (-7, "CL_PROFILING_INFO_NOT_AVAILABLE"),
    (-8, "CL_MEM_COPY_OVERLAP"),
    (-9, "CL_IMAGE_FORMAT_MISMATCH"),
    (-10, "CL_IMAGE_FORMAT_NOT_SUPPORTED"),
    (-11, "CL_BUILD_PROGRAM_FAILURE"),
    (-12, "CL_MAP_FAILURE"),
    (-13, "CL_MISALIGNED_SUB_BUFFER_OFFSET"),
    (-14, "CL_EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST"),
    (-15, "CL_COMPILE_PROGRAM_FAILURE"),
    (-16, "CL_LINKER_NOT_AVAILABLE"),
    (-17, "CL_LINK_PROGRAM_FAILURE"),
    (-18, "CL_DEVICE_PARTITION_FAILED"),
    (-19, "CL_KERNEL_ARG_INFO_NOT_AVAILABLE"),
    (-30, "CL_INVALID_VALUE"),
    (-31, "CL_INVALID_DEVICE_TYPE"),
    (-32, "CL_INVALID_PLATFORM"),
    (-33, "CL_INVALID_DEVICE"),
    (-34, "CL_INVALID_CONTEXT"),
    (-35, "CL_INVALID_QUEUE_PROPERTIES"),
    (-36, "CL_INVALID_COMMAND_QUEUE"),
    (-37, "CL_INVALID_HOST_PTR"),
    (-38, "CL_INVALID_MEM_OBJECT"),
    (-39, "CL_INVALID_IMAGE_FORMAT_DESCRIPTOR"),
    (-40, "CL_INVALID_IMAGE_SIZE"),
    (-41, "CL_INVALID_SAMPLER"),
    (-42, "CL_INVALID_BINARY"),
    (-43, "CL_INVALID_BUILD_OPTIONS"),
    (-44, "CL_INVALID_PROGRAM"),
    (-45, "CL_INVALID_PROGRAM_EXECUTABLE"),
    (-46, "CL_INVALID_KERNEL_NAME"),
    (-47, "CL_INVALID_KERNEL_DEFINITION"),
    (-48, "CL_INVALID_KERNEL"),
    (-49, "CL_INVALID_ARG_INDEX"),
    (-50, "CL_INVALID_ARG_VALUE"),
    (-51, "CL_INVALID_ARG_SIZE"),
    (-52, "CL_INVALID_KERNEL_ARGS"),
    (-53, "CL_INVALID_WORK_DIMENSION"),
    (-54, "CL_INVALID_WORK_GROUP_SIZE"),
    (-55, "CL_INVALID_WORK_ITEM_SIZE"),
    (-56, "CL_INVALID_GLOBAL_OFFSET"),
    (-57, "CL_INVALID_EVENT_WAIT_LIST"),
    (-58, "CL_INVALID_EVENT"),
    (-59, "CL_INVALID_OPERATION"),
    (-60, "CL_INVALID_GL_OBJECT"),
    (-61, "CL_INVALID_BUFFER_SIZE"),
    (-62, "CL_INVALID_MIP_LEVEL"),
    (-63, "CL_INVALID_GLOBAL_WORK_SIZE"),
    (-64, "CL_INVALID_PROPERTY"),
    (-65, "CL_INVALID_IMAGE_DESCRIPTOR"),
    (-66, "CL_INVALID_COMPILER_OPTIONS"),
    (-67, "CL_INVALID_LINKER_OPTIONS"),
    (-68, "CL_INVALID_DEVICE_PARTITION_COUNT"),
    (-1001, "CL_PLATFORM_NOT_FOUND_KHR"),
];

/// Native success status.
pub const CL_SUCCESS: Status = 0;

/// Look up the symbolic name of a status code.
pub fn status_name(code: Status) -> Option<&'static str> {
    STATUS_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// A non-success status returned by the native compute API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("{}", describe(.code))]
pub struct ClError {
    code: Status,
}

impl ClError {
    /// `CL_INVALID_VALUE`: an argument of an unsupported shape.
    pub const INVALID_VALUE: Self = Self { code: -30 };
    /// `CL_INVALID_KERNEL`: the handle has been released.
    pub const INVALID_KERNEL: Self = Self { code: -48 };
    /// `CL_INVALID_ARG_INDEX`: binding index out of range.
    pub const INVALID_ARG_INDEX: Self = Self { code: -49 };
    /// `CL_PLATFORM_NOT_FOUND_KHR`: no ICD loader or platform present.
    pub const PLATFORM_NOT_FOUND_KHR: Self = Self { code: -1001 };

    /// Wrap a raw status code.
    ///
    /// `CL_SUCCESS` is not an error; use [`ClError::check`] when the status
    /// may be a success.
    pub const fn new(code: Status) -> Self {
        Self { code }
    }

    /// Convert a native status into `Ok(())` or the matching error.
    pub fn check(status: Status) -> Result<()> {
        if status == CL_SUCCESS {
            Ok(())
        } else {
            Err(Self::new(status))
        }
    }

    /// The raw status code.
    pub const fn code(&self) -> Status {
        self.code
    }

    /// Symbolic name, if the code is a known OpenCL status.
    pub fn name(&self) -> Option<&'static str> {
        status_name(self.code)
    }
}

/// Why a property query produced no value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The identifier is not in the known registry. No native call was made.
    #[error("unsupported property code {0:#06x}")]
    Unsupported(u32),

    /// The native query failed for a known identifier.
    #[error("native query failed: {0}")]
    Native(#[from] ClError),

    /// The identifier is recognized but its query shape is not implemented.
    #[error("property {0} is not implemented")]
    NotImplemented(&'static str),
}

impl QueryError {
    /// True for identifiers outside the known registry.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// The native status code, when the failure came from the native API.
    pub fn native_code(&self) -> Option<Status> {
        match self {
            Self::Native(err) => Some(err.code()),
            _ => None,
        }
    }
}

/// Formats a status as `NAME (code)`.
pub(crate) struct DisplayStatus(pub Status);

fn describe(code: &Status) -> DisplayStatus {
    DisplayStatus(*code)
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match status_name(self.0) {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "CL_UNKNOWN_ERROR ({})", self.0),
        }
    }
}
