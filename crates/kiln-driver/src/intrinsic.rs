//! Package classification

/// The two packages the compiler provides itself.
///
/// They are compiled like any other package but never scanned for imports,
/// and they always come first in the build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    Unsafe,
    Runtime,
}

impl Intrinsic {
    /// Build order of the intrinsic packages
    pub const ALL: [Intrinsic; 2] = [Intrinsic::Unsafe, Intrinsic::Runtime];

    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "unsafe" => Some(Intrinsic::Unsafe),
            "runtime" => Some(Intrinsic::Runtime),
            _ => None,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Intrinsic::Unsafe => "unsafe",
            Intrinsic::Runtime => "runtime",
        }
    }
}

/// Where a package path comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    Intrinsic(Intrinsic),
    /// Standard library: the first path segment has no dot
    Std,
    /// Everything else (`example.com/user/pkg`)
    External,
}

impl PackageKind {
    pub fn classify(path: &str) -> Self {
        if let Some(intrinsic) = Intrinsic::from_path(path) {
            return PackageKind::Intrinsic(intrinsic);
        }
        if is_std(path) {
            PackageKind::Std
        } else {
            PackageKind::External
        }
    }
}

/// Whether `path` names a standard library (or intrinsic) package.
pub fn is_std(path: &str) -> bool {
    let first = path.split('/').next().unwrap_or(path);
    !first.contains('.')
}
