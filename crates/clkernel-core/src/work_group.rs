//! Per-device work-group property registry (`cl_kernel_work_group_info`).

use crate::info::QueryShape;

/// Queryable per-(kernel, device) work-group characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum WorkGroupInfo {
    /// `CL_KERNEL_WORK_GROUP_SIZE`
    WorkGroupSize = 0x11B0,
    /// `CL_KERNEL_COMPILE_WORK_GROUP_SIZE`
    CompileWorkGroupSize = 0x11B1,
    /// `CL_KERNEL_LOCAL_MEM_SIZE`
    LocalMemSize = 0x11B2,
    /// `CL_KERNEL_PREFERRED_WORK_GROUP_SIZE_MULTIPLE`
    PreferredWorkGroupSizeMultiple = 0x11B3,
    /// `CL_KERNEL_PRIVATE_MEM_SIZE`
    PrivateMemSize = 0x11B4,
}

static WORK_GROUP_INFO_TABLE: [(WorkGroupInfo, &str, QueryShape); 5] = [
    (
        WorkGroupInfo::WorkGroupSize,
        "CL_KERNEL_WORK_GROUP_SIZE",
        QueryShape::Size,
    ),
    (
        WorkGroupInfo::CompileWorkGroupSize,
        "CL_KERNEL_COMPILE_WORK_GROUP_SIZE",
        QueryShape::SizeArray3,
    ),
    (
        WorkGroupInfo::LocalMemSize,
        "CL_KERNEL_LOCAL_MEM_SIZE",
        QueryShape::Ulong,
    ),
    (
        WorkGroupInfo::PreferredWorkGroupSizeMultiple,
        "CL_KERNEL_PREFERRED_WORK_GROUP_SIZE_MULTIPLE",
        QueryShape::Size,
    ),
    (
        WorkGroupInfo::PrivateMemSize,
        "CL_KERNEL_PRIVATE_MEM_SIZE",
        QueryShape::Ulong,
    ),
];

impl WorkGroupInfo {
    /// Every known work-group property, in code order.
    pub const ALL: [WorkGroupInfo; 5] = [
        Self::WorkGroupSize,
        Self::CompileWorkGroupSize,
        Self::LocalMemSize,
        Self::PreferredWorkGroupSizeMultiple,
        Self::PrivateMemSize,
    ];

    fn entry(self) -> &'static (WorkGroupInfo, &'static str, QueryShape) {
        &WORK_GROUP_INFO_TABLE[(self as u32 - WorkGroupInfo::WorkGroupSize as u32) as usize]
    }

    /// Native `cl_kernel_work_group_info` code.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Native constant name.
    pub fn name(self) -> &'static str {
        self.entry().1
    }

    /// Query shape used to read this property.
    pub fn shape(self) -> QueryShape {
        self.entry().2
    }

    /// Resolve a raw `cl_kernel_work_group_info` code.
    pub fn from_code(code: u32) -> Option<Self> {
        WORK_GROUP_INFO_TABLE
            .iter()
            .map(|(info, _, _)| *info)
            .find(|info| info.code() == code)
    }

    /// Decode the bytes of a fixed-size query.
    pub(crate) fn decode(self, bytes: &[u8]) -> Option<WorkGroupInfoValue> {
        let width = self.shape().fixed_size()?;
        let bytes = bytes.get(..width)?;
        match self.shape() {
            QueryShape::Size => Some(WorkGroupInfoValue::Size(
                bytemuck::pod_read_unaligned::<usize>(bytes),
            )),
            QueryShape::Ulong => Some(WorkGroupInfoValue::Ulong(
                bytemuck::pod_read_unaligned::<u64>(bytes),
            )),
            _ => None,
        }
    }
}

/// A resolved work-group property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkGroupInfoValue {
    /// `size_t` property.
    Size(usize),
    /// `cl_ulong` property.
    Ulong(u64),
}

impl WorkGroupInfoValue {
    /// The `size_t` payload.
    pub fn as_usize(self) -> Option<usize> {
        match self {
            Self::Size(v) => Some(v),
            Self::Ulong(_) => None,
        }
    }

    /// The `cl_ulong` payload.
    pub fn as_u64(self) -> Option<u64> {
        match self {
            Self::Ulong(v) => Some(v),
            Self::Size(_) => None,
        }
    }
}
