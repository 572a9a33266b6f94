//! The 1–10 "flirt level" slider and its tone descriptors.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const DEFAULT_LEVEL: u8 = 5;

/// Levels at or above this pick the intense fallback pool.
pub const INTENSE_THRESHOLD: f64 = 7.0;

/// Tone descriptor per level, index 0 is level 1.
const DESCRIPTORS: [&str; 10] = [
    "非常含蓄，点到为止",
    "含蓄委婉，温柔体贴",
    "温和亲切，略带暧昧",
    "轻松愉快，有些暧昧",
    "中等暧昧，适度调情",
    "比较暧昧，明显调情",
    "相当暧昧，大胆调情",
    "非常暧昧，热情如火",
    "极度暧昧，激情四射",
    "超级暧昧，火辣撩人",
];

/// Requested intensity as sent by the client.
///
/// The raw number is kept rather than clamped: out-of-table values still get a
/// descriptor (the level-5 one) and are still compared against the intense
/// threshold as-is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intensity(f64);

impl Intensity {
    pub fn new(level: f64) -> Self {
        // Zero and NaN count as "not provided".
        if level == 0.0 || level.is_nan() {
            Self::default()
        } else {
            Self(level)
        }
    }

    /// Interprets an arbitrary JSON value the way the client-facing API does.
    /// Numbers and numeric strings (`"8"`) are taken as-is; anything else, or
    /// zero, falls back to the default level.
    pub fn from_json(value: Option<&Value>) -> Self {
        let level = match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        level.map(Self::new).unwrap_or_default()
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// The table level, if the value is a whole number between 1 and 10.
    pub fn level(self) -> Option<u8> {
        let v = self.0;
        if v.fract() == 0.0 && (1.0..=10.0).contains(&v) {
            Some(v as u8)
        } else {
            None
        }
    }

    pub fn descriptor(self) -> &'static str {
        let level = self.level().unwrap_or(DEFAULT_LEVEL);
        DESCRIPTORS[usize::from(level - 1)]
    }

    pub fn is_intense(self) -> bool {
        self.0 >= INTENSE_THRESHOLD
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Self(f64::from(DEFAULT_LEVEL))
    }
}

impl From<u8> for Intensity {
    fn from(level: u8) -> Self {
        Self::new(f64::from(level))
    }
}

/// `deserialize_with` helper that never rejects a request over its intensity.
pub fn lenient<'de, D>(deserializer: D) -> Result<Intensity, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(Intensity::from_json(value.as_ref()))
}
