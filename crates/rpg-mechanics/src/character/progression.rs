//! Level-derived numbers: proficiency bonus and experience thresholds.

/// Highest attainable level.
pub const MAX_LEVEL: u8 = 20;

/// Total XP needed to have reached each level; index 0 is level 1.
pub const LEVEL_XP: [u32; 20] = [
    0, 300, 900, 2_700, 6_500, 14_000, 23_000, 34_000, 48_000, 64_000, 85_000, 100_000, 120_000,
    140_000, 165_000, 195_000, 225_000, 265_000, 305_000, 355_000,
];

/// Proficiency bonus for a level: +2 at 1-4, rising by one every four levels.
///
/// Levels outside 1..=20 are clamped into range.
pub fn proficiency_bonus(level: u8) -> i32 {
    let level = level.clamp(1, MAX_LEVEL) as i32;
    2 + (level - 1) / 4
}

/// XP required to advance past `level`, or `None` at the level cap.
pub fn xp_for_next_level(level: u8) -> Option<u32> {
    if level >= MAX_LEVEL {
        return None;
    }
    LEVEL_XP.get(level.max(1) as usize).copied()
}
