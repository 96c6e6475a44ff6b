use std::fmt;
use std::path::Path;

/* 📖 # Why a string-backed path type instead of std::path::PathBuf?

FsPath stores one normalized string with a single canonical separator,
independent of the platform the string came from. This gives us:

1. **Deterministic equality**: two paths are equal iff their normalized
   strings are equal, on every platform
2. **Cheap derivation**: join/parent/extension surgery are plain string
   operations with well-defined results
3. **Portable values**: a path read from a config file or a mock
   filesystem compares the same everywhere

PathBuf's platform-dependent comparison and OsString representation would
leak the host platform into values we want to treat as plain data.
*/

/// The canonical path-segment separator used by every normalized path.
///
/// Input may use `/` or `\`; output always uses this character.
pub const SEPARATOR: char = '/';

/// Normalized, string-backed path value.
///
/// Normalization happens on construction and is idempotent: `.` segments
/// and empty segments are removed, `..` pops the previous segment unless
/// there is none (or the previous segment is itself `..`), in which case
/// the `..` is kept. Absolute paths keep their leading separator; the
/// filesystem root normalizes to `"/"`, and a relative path whose segments
/// all cancel normalizes to the empty current-directory sentinel `""`.
///
/// # Examples
///
/// ```
/// use fskit_core::FsPath;
///
/// let path = FsPath::new("/a/b/../c/./d.txt");
/// assert_eq!(path.as_str(), "/a/c/d.txt");
/// assert_eq!(path.extension(), Some("txt"));
/// assert_eq!(path.parent().as_str(), "/a/c");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FsPath(String);

impl FsPath {
    /// Creates a path from a raw string, normalizing immediately.
    /// There is no error path: unparseable input degrades to the
    /// root-or-empty sentinel deterministically.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize(raw.as_ref()))
    }

    /// Returns the normalized string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Views the path as a `std::path::Path` for use with OS calls.
    pub fn as_std_path(&self) -> &Path {
        Path::new(self.0.as_str())
    }

    /// True for the root sentinel `"/"`.
    pub fn is_root(&self) -> bool {
        self.0.len() == 1 && self.0.starts_with(SEPARATOR)
    }

    /// True for the empty current-directory sentinel.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Joins a sub-path, inserting exactly one separator, and re-normalizes.
    ///
    /// Joining with an empty side returns the non-empty side unchanged:
    /// `p.join("") == p` and `FsPath::new("").join(s) == FsPath::new(s)`.
    pub fn join(&self, sub: impl AsRef<str>) -> Self {
        let sub = sub.as_ref();
        if sub.is_empty() {
            return self.clone();
        }
        if self.0.is_empty() {
            return Self::new(sub);
        }
        Self::new(format!("{}{}{}", self.0, SEPARATOR, sub))
    }

    /// Returns the path up to the last separator.
    /// Without a separator (or with the separator at position 0) this is
    /// the root sentinel.
    pub fn parent(&self) -> Self {
        match self.0.rfind(SEPARATOR) {
            None | Some(0) => Self(SEPARATOR.to_string()),
            Some(pos) => Self(self.0[..pos].to_string()),
        }
    }

    /// Returns the component after the last separator, or the whole path
    /// if there is none.
    pub fn file_name(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(pos) => &self.0[pos + 1..],
            None => &self.0,
        }
    }

    /// Returns the file name with everything from the last `.` stripped.
    pub fn base_name(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(pos) => &name[..pos],
            None => name,
        }
    }

    /// True when a `.` occurs after the last separator.
    pub fn has_extension(&self) -> bool {
        self.file_name().contains('.')
    }

    /// Returns the extension without the leading `.`, i.e. `txt` or `jpeg`.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        name.rfind('.').map(|pos| &name[pos + 1..])
    }

    /// Replaces the extension, or appends one if the path has none.
    pub fn replace_extension(&self, ext: impl AsRef<str>) -> Self {
        let ext = ext.as_ref();
        if self.has_extension() {
            // Position of the last '.' in the full string; it is in the
            // file-name portion because has_extension checked that.
            let pos = self.0.rfind('.').unwrap_or(self.0.len());
            Self::new(format!("{}.{}", &self.0[..pos], ext))
        } else {
            Self::new(format!("{}.{}", self.0, ext))
        }
    }

    /// Strips a matching `base` prefix on a separator boundary.
    ///
    /// Returns `self` unchanged when it does not start with `base`
    /// (callers who need to distinguish "already relative" from "not under
    /// base" must check separately). An exact match yields the empty
    /// current-directory sentinel.
    pub fn relative_to(&self, base: &FsPath) -> Self {
        if self == base {
            return Self::default();
        }
        let rest = if base.is_root() {
            self.0.strip_prefix(SEPARATOR)
        } else if base.0.is_empty() {
            None
        } else {
            self.0
                .strip_prefix(&base.0)
                .and_then(|rest| rest.strip_prefix(SEPARATOR))
        };
        match rest {
            Some(rest) => Self::new(rest),
            None => self.clone(),
        }
    }
}

/// Normalizes a raw path string into the canonical representation.
fn normalize(raw: &str) -> String {
    let absolute = raw.starts_with(['/', '\\']);
    let mut parts: Vec<&str> = Vec::new();
    for part in raw.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                // A leading ".." (or one stacked on another) has nothing
                // to cancel and is kept.
                if parts.last().is_none_or(|last| *last == "..") {
                    parts.push("..");
                } else {
                    parts.pop();
                }
            }
            other => parts.push(other),
        }
    }
    if absolute {
        if parts.is_empty() {
            return SEPARATOR.to_string();
        }
        let mut result = String::new();
        for part in &parts {
            result.push(SEPARATOR);
            result.push_str(part);
        }
        result
    } else {
        parts.join("/")
    }
}

impl From<&str> for FsPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FsPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&Path> for FsPath {
    fn from(p: &Path) -> Self {
        Self::new(p.to_string_lossy().as_ref())
    }
}

impl fmt::Display for FsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<Path> for FsPath {
    fn as_ref(&self) -> &Path {
        self.as_std_path()
    }
}
