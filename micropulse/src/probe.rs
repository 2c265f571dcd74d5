use std::sync::atomic::{AtomicU64, Ordering};
use sysinfo::System;

/// Process memory in bytes. `peak` is the highest usage this probe has
/// observed over the process lifetime.
#[derive(Debug, Clone, Copy)]
pub struct MemoryStats {
    pub usage: u64,
    pub peak: u64,
}

/// OS identity fields for the info document.
#[derive(Debug, Clone)]
pub struct OsIdentity {
    pub os: String,
    pub release: String,
    pub version: String,
    pub machine: String,
}

/// Point-in-time system/process introspection for the health and info
/// endpoints. Readings are gathered fresh on every call; at the request
/// rates this service sees, that overhead is acceptable.
#[derive(Debug, Default)]
pub struct SystemProbe {
    peak_memory: AtomicU64,
}

impl SystemProbe {
    pub fn memory(&self) -> MemoryStats {
        let usage = current_process_memory();
        let previous_peak = self.peak_memory.fetch_max(usage, Ordering::Relaxed);
        MemoryStats {
            usage,
            peak: previous_peak.max(usage),
        }
    }

    /// 1/5/15-minute load averages. Zeroes on platforms without loadavg.
    pub fn load_average(&self) -> [f64; 3] {
        let load = System::load_average();
        [load.one, load.five, load.fifteen]
    }

    pub fn os_identity(&self) -> OsIdentity {
        OsIdentity {
            os: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            release: System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
            version: System::os_version().unwrap_or_else(|| "unknown".to_string()),
            machine: std::env::consts::ARCH.to_string(),
        }
    }

    pub fn processor(&self) -> String {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty())
            .unwrap_or_else(|| std::env::consts::ARCH.to_string())
    }
}

fn current_process_memory() -> u64 {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return 0;
    };
    let mut sys = System::new();
    sys.refresh_process(pid);
    sys.process(pid).map(|process| process.memory()).unwrap_or(0)
}
