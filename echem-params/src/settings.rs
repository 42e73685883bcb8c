use tracing_subscriber::filter::LevelFilter;

/// Settings that control diagnostic output while processing parameters.
///
/// The library itself only emits [`tracing`] events; these settings are used by the application
/// to decide which of those events are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    /// Whether to show debug output, such as the parameter tables being loaded and the models
    /// being processed.
    ///
    /// Default: `false`
    pub debug_mode: bool,
}

impl Settings {
    /// Set whether to show debug output. Returns an updated [`Settings`] for chaining.
    pub fn debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    /// Returns the most verbose level of events that should be shown.
    pub fn level_filter(&self) -> LevelFilter {
        if self.debug_mode {
            LevelFilter::DEBUG
        } else {
            LevelFilter::WARN
        }
    }

    /// Installs a global subscriber printing events to standard error, up to
    /// [`Settings::level_filter`].
    ///
    /// Returns false if a global subscriber was already installed, in which case nothing changes.
    pub fn init_tracing(&self) -> bool {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(self.level_filter())
            .try_init()
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn default_is_quiet() {
        assert_eq!(Settings::default().level_filter(), LevelFilter::WARN);
    }

    #[test]
    fn debug_mode() {
        let settings = Settings::default().debug_mode(true);
        assert!(settings.debug_mode);
        assert_eq!(settings.level_filter(), LevelFilter::DEBUG);
    }

    #[test]
    fn init_once() {
        let settings = Settings::default().debug_mode(true);
        settings.init_tracing();
        assert!(!settings.init_tracing());
    }
}
