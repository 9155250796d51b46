//! Device tier classification from viewport size and hardware hints.

const MOBILE_MAX_WIDTH: f64 = 768.0;
const LOW_END_MAX_WIDTH: f64 = 480.0;
const LOW_END_MAX_CORES: u32 = 2;
const LOW_END_MAX_MEMORY_GIB: f64 = 2.0;

const MOBILE_AGENTS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Snapshot of the ambient signals the page reads from `window` and
/// `navigator`.
///
/// Hardware hints are optional: browsers are free to omit them, and a
/// missing hint never counts against the device.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
    pub user_agent: String,
    pub hardware_concurrency: Option<u32>,
    pub device_memory_gib: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceTier {
    pub mobile: bool,
    pub low_end: bool,
}

pub fn is_mobile_agent(user_agent: &str) -> bool {
    let agent = user_agent.to_ascii_lowercase();
    MOBILE_AGENTS.iter().any(|pattern| agent.contains(pattern))
}

impl Environment {
    pub fn is_mobile(&self) -> bool {
        self.width <= MOBILE_MAX_WIDTH || is_mobile_agent(&self.user_agent)
    }

    pub fn is_low_end(&self) -> bool {
        let few_cores = self
            .hardware_concurrency
            .is_some_and(|cores| cores > 0 && cores <= LOW_END_MAX_CORES);
        let low_memory = self
            .device_memory_gib
            .is_some_and(|gib| gib <= LOW_END_MAX_MEMORY_GIB);
        few_cores || low_memory || self.width <= LOW_END_MAX_WIDTH
    }

    pub fn tier(&self) -> DeviceTier {
        DeviceTier {
            mobile: self.is_mobile(),
            low_end: self.is_low_end(),
        }
    }

    /// Canvas backing-store ratio: capped, and pinned to 1 on weak devices.
    pub fn render_pixel_ratio(&self, max: f64) -> f64 {
        if self.is_low_end() {
            return 1.0;
        }
        if self.pixel_ratio > 0.0 {
            self.pixel_ratio.min(max)
        } else {
            1.0
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            (self.width / self.height) as f32
        } else {
            1.0
        }
    }
}
