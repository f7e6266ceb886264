/// Business thresholds for the disambiguation decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisambigConfig {
    /// Logo/OCR confidence above which evidence counts as strong
    pub strong_threshold: f64,
    /// Logo/OCR confidence below which evidence counts as weak
    pub weak_threshold: f64,
    /// Minimum top-two score gap before asking the user
    pub min_gap: f64,
}

pub const STRONG_THRESHOLD_ENV: &str = "DISAMBIG_STRONG_THRESHOLD";
pub const WEAK_THRESHOLD_ENV: &str = "DISAMBIG_WEAK_THRESHOLD";
pub const MIN_GAP_ENV: &str = "DISAMBIG_MIN_GAP";

impl Default for DisambigConfig {
    fn default() -> Self {
        Self {
            strong_threshold: 0.80,
            weak_threshold: 0.60,
            min_gap: 0.12,
        }
    }
}

impl DisambigConfig {
    /// Defaults overridden by `DISAMBIG_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// Values must parse as a number in `[0, 1]`; anything else is logged
    /// and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            strong_threshold: threshold(&lookup, STRONG_THRESHOLD_ENV, defaults.strong_threshold),
            weak_threshold: threshold(&lookup, WEAK_THRESHOLD_ENV, defaults.weak_threshold),
            min_gap: threshold(&lookup, MIN_GAP_ENV, defaults.min_gap),
        }
    }

    pub fn with_strong_threshold(mut self, value: f64) -> Self {
        self.strong_threshold = value;
        self
    }

    pub fn with_weak_threshold(mut self, value: f64) -> Self {
        self.weak_threshold = value;
        self
    }

    pub fn with_min_gap(mut self, value: f64) -> Self {
        self.min_gap = value;
        self
    }
}

fn threshold<F>(lookup: &F, name: &str, default: f64) -> f64
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return default;
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if (0.0..=1.0).contains(&value) => value,
        _ => {
            tracing::warn!(var = name, value = %raw, default, "ignoring invalid threshold");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DisambigConfig::default();
        assert_eq!(config.strong_threshold, 0.80);
        assert_eq!(config.weak_threshold, 0.60);
        assert_eq!(config.min_gap, 0.12);
    }

    #[test]
    fn test_lookup_overrides() {
        let config = DisambigConfig::from_lookup(|name| match name {
            MIN_GAP_ENV => Some("0.2".to_string()),
            STRONG_THRESHOLD_ENV => Some(" 0.9 ".to_string()),
            _ => None,
        });
        assert_eq!(config.min_gap, 0.2);
        assert_eq!(config.strong_threshold, 0.9);
        assert_eq!(config.weak_threshold, 0.60);
    }

    #[test]
    fn test_invalid_values_keep_default() {
        let config = DisambigConfig::from_lookup(|name| match name {
            MIN_GAP_ENV => Some("wide".to_string()),
            WEAK_THRESHOLD_ENV => Some("60".to_string()),
            _ => None,
        });
        assert_eq!(config, DisambigConfig::default());
    }
}
