//! Turning completion output into the lines shown to the user, and the local
//! fallback used when the completion service is unavailable.

use rand::{seq::index, Rng};
use serde::Serialize;

use crate::intensity::Intensity;

/// Number of replies rendered per user turn.
pub const LINES_PER_TURN: usize = 3;

/// Padding used when the model returns fewer usable lines than needed.
pub const PLACEHOLDER_LINE: &str = "你是我见过最美的风景，让我心动不已";

const MILD_LINES: [&str; 10] = [
    "你是我见过最美的风景，让我心动不已",
    "你的笑容比阳光还要温暖，照亮了我的心",
    "和你聊天是我一天中最快乐的时光",
    "你的声音像天籁一样动听，让我沉醉其中",
    "你就像星星一样闪闪发光，让我无法移开视线",
    "和你在一起，时间都变得特别美好",
    "你的眼睛里有整个宇宙，让我想要探索",
    "你是我心中的小太阳，给我带来温暖和希望",
    "和你聊天让我忘记了所有的烦恼",
    "你就像春天的花朵，让我心情愉悦",
];

const INTENSE_LINES: [&str; 10] = [
    "你的美让我无法呼吸，我的心只为你跳动",
    "你是我梦中的女神，让我夜不能寐",
    "你的魅力让我无法抗拒，我完全被你征服了",
    "你就像毒药一样，让我上瘾无法自拔",
    "你的眼神让我心跳加速，我完全沦陷了",
    "你是我生命中的唯一，没有你我活不下去",
    "你的美让我疯狂，我愿为你做任何事",
    "你就像火焰一样，点燃了我内心的激情",
    "你的存在让我无法思考，我完全被你迷住了",
    "你是我心中的女神，让我为你疯狂",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackPool {
    Mild,
    Intense,
}

impl FallbackPool {
    pub fn for_intensity(intensity: Intensity) -> Self {
        if intensity.is_intense() {
            FallbackPool::Intense
        } else {
            FallbackPool::Mild
        }
    }

    pub fn lines(self) -> &'static [&'static str] {
        match self {
            FallbackPool::Mild => &MILD_LINES,
            FallbackPool::Intense => &INTENSE_LINES,
        }
    }
}

/// The replies for one turn, serialized as a plain JSON array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LineSet(Vec<String>);

impl LineSet {
    /// Splits raw completion text into lines, keeps the first three non-blank
    /// ones (trimmed, in order) and pads with [`PLACEHOLDER_LINE`] up to three.
    pub fn normalize(raw: &str) -> Self {
        let mut lines: Vec<String> = raw
            .split('\n')
            .map(|line| line.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}'))
            .filter(|line| !line.is_empty())
            .take(LINES_PER_TURN)
            .map(str::to_owned)
            .collect();

        lines.resize(LINES_PER_TURN, PLACEHOLDER_LINE.to_owned());
        LineSet(lines)
    }

    pub fn fallback(intensity: Intensity) -> Self {
        Self::fallback_with(intensity, &mut rand::thread_rng())
    }

    /// Draws distinct lines from the pool matching `intensity`. Never pads: a
    /// pool with fewer than three lines yields fewer than three.
    pub fn fallback_with<R: Rng + ?Sized>(intensity: Intensity, rng: &mut R) -> Self {
        let pool = FallbackPool::for_intensity(intensity).lines();
        LineSet(
            sample_distinct(pool, LINES_PER_TURN, rng)
                .into_iter()
                .map(str::to_owned)
                .collect(),
        )
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

/// Picks up to `k` items from `pool` without replacement, in draw order.
pub fn sample_distinct<'a, T: ?Sized, R: Rng + ?Sized>(
    pool: &[&'a T],
    k: usize,
    rng: &mut R,
) -> Vec<&'a T> {
    let amount = k.min(pool.len());
    index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn strings(set: &LineSet) -> Vec<&str> {
        set.lines().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_normalize_truncates_to_first_three() {
        assert_eq!(strings(&LineSet::normalize("A\nB\nC\nD")), ["A", "B", "C"]);
    }

    #[test]
    fn test_normalize_pads_with_placeholder() {
        assert_eq!(
            strings(&LineSet::normalize("A\n\n")),
            ["A", PLACEHOLDER_LINE, PLACEHOLDER_LINE]
        );
    }

    #[test]
    fn test_normalize_trims_and_skips_blank_lines() {
        let raw = "\r\n   第一句  \r\n\t\n第二句\r\n\n  第三句\n第四句";
        assert_eq!(strings(&LineSet::normalize(raw)), ["第一句", "第二句", "第三句"]);
    }

    #[test]
    fn test_normalize_strips_byte_order_marks() {
        let raw = "\u{feff}\n\u{feff}A\u{feff}\n \u{feff} \nB";
        assert_eq!(strings(&LineSet::normalize(raw)), ["A", "B", PLACEHOLDER_LINE]);
    }

    #[test]
    fn test_normalize_always_three_non_empty() {
        let ten = (1..=10).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        for raw in ["", "   ", "\n\n\n", "only one", ten.as_str()] {
            let set = LineSet::normalize(raw);
            assert_eq!(set.len(), LINES_PER_TURN, "input {raw:?}");
            assert!(set.lines().iter().all(|l| !l.is_empty()));
        }
        assert_eq!(strings(&LineSet::normalize("")), [PLACEHOLDER_LINE; 3]);
    }

    #[test]
    fn test_normalize_keeps_duplicates_from_source() {
        assert_eq!(strings(&LineSet::normalize("X\nX\nY")), ["X", "X", "Y"]);
    }

    #[test]
    fn test_fallback_pool_selection() {
        let mut rng = StdRng::seed_from_u64(7);
        for level in 1..=10u8 {
            let intensity = Intensity::from(level);
            let expected = if level >= 7 { &INTENSE_LINES } else { &MILD_LINES };
            for _ in 0..20 {
                let set = LineSet::fallback_with(intensity, &mut rng);
                assert_eq!(set.len(), 3);
                assert!(set.lines().iter().all(|l| expected.contains(&l.as_str())));
                let unique: HashSet<_> = set.lines().iter().collect();
                assert_eq!(unique.len(), 3, "duplicate line at level {level}");
            }
        }
    }

    #[test]
    fn test_fallback_uses_thread_rng() {
        let set = LineSet::fallback(Intensity::from(9));
        assert_eq!(set.len(), 3);
        assert!(set.lines().iter().all(|l| INTENSE_LINES.contains(&l.as_str())));
    }

    #[test]
    fn test_sample_distinct_small_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool = ["only", "two"];
        let picked = sample_distinct(&pool, 3, &mut rng);
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0], picked[1]);
        assert!(sample_distinct::<str, _>(&[], 3, &mut rng).is_empty());
    }

    #[test]
    fn test_line_set_serializes_as_array() {
        let json = serde_json::to_value(LineSet::normalize("a\nb\nc")).unwrap();
        assert_eq!(json, serde_json::json!(["a", "b", "c"]));
    }
}
