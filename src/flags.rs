//! Feature-toggle reconciliation.
//!
//! Stealth mode forces off everything that phones home (version check,
//! analytics, marketplace index refresh) regardless of what was requested;
//! the purely local toggles pass through untouched.

/// Feature toggles as resolved from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureToggles {
    /// Check for a newer release at startup.
    pub check: bool,
    /// Send the anonymous usage ping at startup.
    pub analytics: bool,
    /// Refresh the remote module index at startup.
    pub marketplace: bool,
    /// Use screen-reader friendly output (plain banner, plain tables).
    pub accessible: bool,
    /// Colorize terminal output.
    pub colors: bool,
    /// Raise log verbosity to debug.
    pub debug: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            check: true,
            analytics: true,
            marketplace: true,
            accessible: false,
            colors: true,
            debug: false,
        }
    }
}

/// The reconciled configuration handed to console construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciledFlags {
    pub check: bool,
    pub analytics: bool,
    pub marketplace: bool,
    pub accessible: bool,
    pub colors: bool,
    pub debug: bool,
}

/// Merge feature toggles with the stealth override.
pub fn reconcile(toggles: FeatureToggles, stealth: bool) -> ReconciledFlags {
    ReconciledFlags {
        check: toggles.check && !stealth,
        analytics: toggles.analytics && !stealth,
        marketplace: toggles.marketplace && !stealth,
        accessible: toggles.accessible,
        colors: toggles.colors,
        debug: toggles.debug,
    }
}
