use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Resource lookup failure.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("resource '{name}' could not be found")]
    NotFound { name: String },

    #[error("resource name '{name}' is not a relative path")]
    InvalidName { name: String },

    #[error("resource '{name}' could not be read")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Source of named text resources.
pub trait ResourceLoader {
    fn load_text(&self, name: &str) -> Result<String, ResourceError>;
}

impl<T: ResourceLoader + ?Sized> ResourceLoader for Box<T> {
    fn load_text(&self, name: &str) -> Result<String, ResourceError> {
        (**self).load_text(name)
    }
}

/// In-memory resources, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedResources {
    entries: HashMap<String, &'static str>,
}

impl EmbeddedResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resources compiled into the engine: the shaders used by the built-in scenes.
    pub fn builtin() -> Self {
        Self::new()
            .with("shaders/quad.vert.wgsl", include_str!("../../assets/shaders/quad.vert.wgsl"))
            .with("shaders/quad.frag.wgsl", include_str!("../../assets/shaders/quad.frag.wgsl"))
            .with("shaders/invert.frag.wgsl", include_str!("../../assets/shaders/invert.frag.wgsl"))
    }

    pub fn with(mut self, name: impl Into<String>, text: &'static str) -> Self {
        self.entries.insert(name.into(), text);
        self
    }
}

impl ResourceLoader for EmbeddedResources {
    fn load_text(&self, name: &str) -> Result<String, ResourceError> {
        self.entries
            .get(name)
            .map(|s| s.to_string())
            .ok_or_else(|| ResourceError::NotFound { name: name.to_string() })
    }
}

/// Resources read from files below a root directory.
#[derive(Debug, Clone)]
pub struct DirResources {
    root: PathBuf,
}

impl DirResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, ResourceError> {
        let rel = Path::new(name);
        let plain = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if name.is_empty() || !plain {
            return Err(ResourceError::InvalidName { name: name.to_string() });
        }
        Ok(self.root.join(rel))
    }
}

impl ResourceLoader for DirResources {
    fn load_text(&self, name: &str) -> Result<String, ResourceError> {
        let path = self.resolve(name)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ResourceError::NotFound { name: name.to_string() })
            }
            Err(source) => Err(ResourceError::Io { name: name.to_string(), source }),
        }
    }
}

/// Tries `primary` first and falls back to `fallback` when the name is missing.
///
/// Other errors from `primary` (unreadable file, bad name) are returned as-is.
#[derive(Debug, Clone)]
pub struct Layered<A, B> {
    primary: A,
    fallback: B,
}

impl<A, B> Layered<A, B> {
    pub fn new(primary: A, fallback: B) -> Self {
        Self { primary, fallback }
    }
}

impl<A: ResourceLoader, B: ResourceLoader> ResourceLoader for Layered<A, B> {
    fn load_text(&self, name: &str) -> Result<String, ResourceError> {
        match self.primary.load_text(name) {
            Err(ResourceError::NotFound { .. }) => self.fallback.load_text(name),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lumen-resources-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("shaders")).unwrap();
        dir
    }

    #[test]
    fn builtin_has_quad_shaders() {
        let res = EmbeddedResources::builtin();
        let vs = res.load_text("shaders/quad.vert.wgsl").unwrap();
        assert!(vs.contains("@vertex"));
        let fs = res.load_text("shaders/quad.frag.wgsl").unwrap();
        assert!(fs.contains("@fragment"));
    }

    #[test]
    fn embedded_missing_is_not_found() {
        let err = EmbeddedResources::new().load_text("nope.wgsl").unwrap_err();
        assert!(matches!(err, ResourceError::NotFound { ref name } if name == "nope.wgsl"));
    }

    #[test]
    fn dir_reads_files() {
        let dir = scratch_dir("read");
        std::fs::write(dir.join("shaders/a.wgsl"), "// a").unwrap();

        let res = DirResources::new(&dir);
        assert_eq!(res.root(), dir.as_path());
        assert_eq!(res.load_text("shaders/a.wgsl").unwrap(), "// a");
        assert!(matches!(
            res.load_text("shaders/missing.wgsl"),
            Err(ResourceError::NotFound { .. })
        ));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn dir_rejects_escaping_names() {
        let res = DirResources::new("/tmp");
        assert!(matches!(res.load_text("../etc/passwd"), Err(ResourceError::InvalidName { .. })));
        assert!(matches!(res.load_text("/etc/passwd"), Err(ResourceError::InvalidName { .. })));
        assert!(matches!(res.load_text(""), Err(ResourceError::InvalidName { .. })));
    }

    #[test]
    fn layered_prefers_primary() {
        let dir = scratch_dir("layered");
        std::fs::write(dir.join("shaders/quad.frag.wgsl"), "// override").unwrap();

        let res = Layered::new(DirResources::new(&dir), EmbeddedResources::builtin());
        assert_eq!(res.load_text("shaders/quad.frag.wgsl").unwrap(), "// override");
        assert!(res.load_text("shaders/quad.vert.wgsl").unwrap().contains("@vertex"));

        let _ = std::fs::remove_dir_all(dir);
    }
}
