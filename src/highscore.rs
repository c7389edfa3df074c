//! The single persisted high score
//!
//! Exactly one LocalStorage key holding one numeric value - no schema, no
//! versioning. Read on mount, written only when a finished run beats it.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScore {
    pub best: u64,
}

impl HighScore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "geo_tank_high_score";

    pub fn new() -> Self {
        Self { best: 0 }
    }

    /// Record a finished run. Persists and returns true only on improvement.
    pub fn record(&mut self, score: u64) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        self.save();
        true
    }

    /// Load the stored value (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|s| s.get_item(Self::STORAGE_KEY).ok())
            .flatten()
            .and_then(|v| v.parse::<u64>().ok());

        match stored {
            Some(best) => {
                log::info!("Loaded high score: {best}");
                Self { best }
            }
            None => {
                log::info!("No stored high score, starting fresh");
                Self::new()
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn save(&self) {
        if let Some(storage) = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
        {
            let _ = storage.set_item(Self::STORAGE_KEY, &self.best.to_string());
            log::info!("High score saved: {}", self.best);
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_only_improves() {
        let mut hs = HighScore::new();
        assert!(hs.record(100));
        assert_eq!(hs.best, 100);

        assert!(!hs.record(100));
        assert!(!hs.record(50));
        assert_eq!(hs.best, 100);

        assert!(hs.record(101));
        assert_eq!(hs.best, 101);
    }

    #[test]
    fn zero_score_never_records() {
        let mut hs = HighScore::new();
        assert!(!hs.record(0));
        assert_eq!(hs.best, 0);
    }
}
