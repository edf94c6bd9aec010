//! Device kinds, their priority order, and numeric precision per device.

use std::fmt;

use candle_core::DType;
use serde::Serialize;

/// Hardware a generator can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Dedicated NVIDIA GPU.
    Cuda,
    /// Apple integrated GPU.
    Metal,
    /// General-purpose processor.
    Cpu,
}

/// Start-up binding order, best first.
pub const DEVICE_PRIORITY: [DeviceKind; 3] = [DeviceKind::Cuda, DeviceKind::Metal, DeviceKind::Cpu];

impl DeviceKind {
    pub fn is_accelerator(self) -> bool {
        !matches!(self, DeviceKind::Cpu)
    }

    /// Reduced precision on accelerators, full precision on the CPU.
    pub fn dtype(self) -> DType {
        if self.is_accelerator() {
            DType::F16
        } else {
            DType::F32
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceKind::Cuda => "cuda",
            DeviceKind::Metal => "metal",
            DeviceKind::Cpu => "cpu",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Devices to try at start-up, in order.
pub fn initialization_order(force_cpu: bool) -> Vec<DeviceKind> {
    if force_cpu {
        vec![DeviceKind::Cpu]
    } else {
        DEVICE_PRIORITY.to_vec()
    }
}

/// The ordered attempt list for a single request on an engine bound to
/// `primary`: the bound device, then the CPU once if the bound device is an
/// accelerator.
pub fn request_plan(primary: DeviceKind) -> Vec<DeviceKind> {
    if primary.is_accelerator() {
        vec![primary, DeviceKind::Cpu]
    } else {
        vec![DeviceKind::Cpu]
    }
}
