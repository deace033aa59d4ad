//! Rating to skill-level mapping
//!
//! Stockfish-style engines expose a `Skill Level` option in `0..=20`. Ratings
//! are mapped linearly: every 120 points above 800 adds one level.

/// Lowest rating accepted from configuration
pub const MIN_ELO: i32 = 0;
/// Highest rating accepted from configuration
pub const MAX_ELO: i32 = 3200;
/// Highest `Skill Level` value
pub const MAX_SKILL_LEVEL: i32 = 20;

/// Clamp a configured rating into the supported range
pub fn clamp_elo(elo: i32) -> i32 {
    elo.clamp(MIN_ELO, MAX_ELO)
}

/// Convert a target rating to an engine skill level
///
/// `floor((elo - 800) / 120)` clamped to `0..=20`.
pub fn skill_level_for_elo(elo: i32) -> i32 {
    (elo - 800).div_euclid(120).clamp(0, MAX_SKILL_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_level_boundaries() {
        //! Checks the documented anchor points of the mapping
        assert_eq!(skill_level_for_elo(800), 0);
        assert_eq!(skill_level_for_elo(2000), 10);
        assert_eq!(skill_level_for_elo(3200), 20);
    }

    #[test]
    fn test_skill_level_clamps_out_of_range() {
        //! Ratings below 800 floor at 0, and oversized ratings are clamped
        //! to 3200 before mapping
        assert_eq!(skill_level_for_elo(0), 0);
        assert_eq!(skill_level_for_elo(799), 0);
        assert_eq!(skill_level_for_elo(clamp_elo(5000)), 20);
        assert_eq!(skill_level_for_elo(5000), 20);
    }

    #[test]
    fn test_skill_level_floors_partial_steps() {
        assert_eq!(skill_level_for_elo(919), 0);
        assert_eq!(skill_level_for_elo(920), 1);
        assert_eq!(skill_level_for_elo(1500), 5);
    }
}
