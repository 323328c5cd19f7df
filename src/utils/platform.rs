//! Platform detection utilities.

/// Platforms with a sandbox backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Linux,
}

impl Platform {
    /// Detect the current platform.
    pub fn current() -> Option<Self> {
        #[cfg(target_os = "macos")]
        {
            Some(Platform::MacOS)
        }
        #[cfg(target_os = "linux")]
        {
            Some(Platform::Linux)
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }

    /// Get the platform name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::MacOS => "macOS",
            Platform::Linux => "Linux",
        }
    }

    /// The enforcement technology used on this platform.
    pub fn technology(&self) -> &'static str {
        match self {
            Platform::MacOS => "Seatbelt (sandbox-exec)",
            Platform::Linux => "Landlock LSM",
        }
    }
}

/// Name of the OS we are running on, for error messages.
pub fn os_name() -> &'static str {
    std::env::consts::OS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_current() {
        let platform = Platform::current();
        #[cfg(target_os = "macos")]
        assert_eq!(platform, Some(Platform::MacOS));
        #[cfg(target_os = "linux")]
        assert_eq!(platform, Some(Platform::Linux));
        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        assert_eq!(platform, None);
    }

    #[test]
    fn test_platform_names() {
        assert_eq!(Platform::MacOS.name(), "macOS");
        assert_eq!(Platform::Linux.technology(), "Landlock LSM");
    }
}
