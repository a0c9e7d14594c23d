//! Slash-separated category paths.

use std::fmt;

/// A category path such as `Textures/UI Textures`.
///
/// Empty segments are dropped, so `"/Textures//UI Textures/"` and
/// `"Textures/UI Textures"` are the same path. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CategoryPath {
    segments: Vec<String>,
}

impl CategoryPath {
    /// Parse a slash-separated path.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether this is the root path.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path segments as borrowed strings.
    pub fn segments(&self) -> Vec<&str> {
        self.segments.iter().map(String::as_str).collect()
    }
}

/// Whether `name` can be used as a single file or directory name below an
/// output root: non-empty, not `.` or `..`, and free of separators and NUL.
pub fn is_path_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

impl fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl std::str::FromStr for CategoryPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
