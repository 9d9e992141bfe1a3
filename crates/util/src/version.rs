//! Defines constants related to the app's name and version.

use std::fmt::{self, Display, Formatter};

/// The name of the app.
pub const APP_NAME: &str = "Cam display";

/// The version of the app.
pub const APP_VERSION: Version = Version {
    major: 0,
    minor: 0,
    patch: 1,
    pre: Some("b0"),
};

/// A version number. Pre-release tags are appended directly to the patch
/// number when displayed (e.g. `0.0.1b0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub pre: Option<&'static str>,
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = self.pre {
            write!(f, "{pre}")?;
        }
        Ok(())
    }
}

/// The title shown on the app's window (e.g. `Cam display 0.0.1b0`).
pub fn window_title() -> String {
    format!("{APP_NAME} {APP_VERSION}")
}
