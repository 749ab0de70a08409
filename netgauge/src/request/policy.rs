//! Completion policy for terminal request handles.

use std::str::FromStr;

/// What the tracker does with a handle once it has been consumed or has
/// failed.
///
/// The host network API keeps finished requests around until it decides to
/// discard them; a tracker therefore has two defensible behaviors, and the
/// choice is explicit rather than implied:
///
/// - [`CompletionPolicy::RemoveOnTerminal`] drops a handle as soon as its
///   payload is consumed or its failure is observed. This is the default.
/// - [`CompletionPolicy::RetainUntilInvalidated`] keeps consumed and failed
///   handles tracked until the backend reports them `Invalidated`, matching
///   hosts that expect the plugin to mirror their slot lifetime. A consumed
///   handle is never fetched a second time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompletionPolicy {
    /// Remove handles immediately after consumption or failure.
    #[default]
    RemoveOnTerminal,

    /// Keep terminal handles tracked until the backend invalidates them.
    RetainUntilInvalidated,
}

impl CompletionPolicy {
    /// Returns the configuration string for this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RemoveOnTerminal => "remove-on-terminal",
            Self::RetainUntilInvalidated => "retain-until-invalidated",
        }
    }
}

impl std::fmt::Display for CompletionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CompletionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remove-on-terminal" => Ok(Self::RemoveOnTerminal),
            "retain-until-invalidated" => Ok(Self::RetainUntilInvalidated),
            other => Err(format!(
                "unknown completion policy '{}' (expected 'remove-on-terminal' or 'retain-until-invalidated')",
                other
            )),
        }
    }
}
