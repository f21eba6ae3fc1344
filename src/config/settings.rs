#[derive(Clone)]
pub struct DrawSettings {
    pub default_games_to_win: i32,
    pub group_swap_max_passes: usize,
    pub small_bracket_seeds: usize,
    pub medium_bracket_seeds: usize,
    pub large_bracket_seeds: usize,
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            default_games_to_win: 1,
            group_swap_max_passes: 8,
            small_bracket_seeds: 4,   // N <= 8
            medium_bracket_seeds: 8,  // N <= 16
            large_bracket_seeds: 16,
        }
    }
}

impl DrawSettings {
    /// Advisory seed count for a bracket of `n` slots; never enforced.
    pub fn recommended_seeds(&self, n: usize) -> usize {
        if n <= 8 {
            self.small_bracket_seeds
        } else if n <= 16 {
            self.medium_bracket_seeds
        } else {
            self.large_bracket_seeds
        }
    }
}

#[derive(Clone)]
pub struct ScoringSettings {
    /// Reject point submissions that omit the expected version.
    pub require_expected_version: bool,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            require_expected_version: false,
        }
    }
}

#[derive(Clone, Default)]
pub struct AppConfig {
    pub draw: DrawSettings,
    pub scoring: ScoringSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            draw: DrawSettings::default(),
            scoring: ScoringSettings::default(),
        }
    }
}
