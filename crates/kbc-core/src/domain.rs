use std::fmt;

/// Network transport the client uses to talk to the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NetworkMode {
    /// Persistent connection (the default transport).
    Default,
    /// Platform pushes events to a local HTTP endpoint.
    Webhook,
}

impl NetworkMode {
    /// Resolve the configured `mode` value.
    ///
    /// `webhook` (any case) selects the webhook transport, any other non-empty value the
    /// default one. Absent or blank values have no mode at all.
    pub fn from_config_value(value: Option<&str>) -> Option<Self> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        if value.eq_ignore_ascii_case("webhook") {
            Some(Self::Webhook)
        } else {
            Some(Self::Default)
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Webhook => "webhook",
        }
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process exit status produced by the bootstrap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}
