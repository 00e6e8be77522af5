//! Host platform detection behind the `Platform` port.

use crate::application::ports::Platform;

/// The platform this binary was built for.
pub struct HostPlatform;

impl Platform for HostPlatform {
    fn is_windows(&self) -> bool {
        cfg!(windows)
    }
}
