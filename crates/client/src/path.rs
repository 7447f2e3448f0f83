//! Path virtualization under an optional chroot.
//!
//! Callers address nodes relative to the chroot; the server only ever sees
//!  fully-qualified paths. Both directions are pure string transforms.

/// A configured root prefix, or none at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chroot(Option<String>);

impl Chroot {
    /// An empty or `/` prefix is the same as no chroot.
    pub fn new(chroot: Option<&str>) -> Self {
        let chroot = chroot
            .map(|root| join_segments(root.split('/')))
            .filter(|root| root != "/");
        Self(chroot)
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Caller-visible path to server path: prefix the chroot, drop empty
    ///  segments and rejoin with a single leading slash.
    pub fn normalize(&self, path: &str) -> String {
        match &self.0 {
            Some(root) => join_segments(root.split('/').chain(path.split('/'))),
            None => join_segments(path.split('/')),
        }
    }

    /// Server path to caller-visible path.
    ///
    /// Strips the chroot when the path sits under it, otherwise hands the
    ///  path back untouched. The chroot node itself maps to `/`.
    pub fn denormalize(&self, path: &str) -> String {
        let Some(root) = &self.0 else {
            return path.to_string();
        };

        match path.strip_prefix(root.as_str()) {
            Some("") => "/".to_string(),
            Some(rest) if rest.starts_with('/') => rest.to_string(),
            _ => path.to_string(),
        }
    }
}

fn join_segments<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    let joined = segments
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{}", joined)
}
