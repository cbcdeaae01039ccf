use std::io;
use std::path::Path;

/// File system queries the caches and factories need.
///
/// Kept narrow so tests can answer from memory.
pub trait FileSystem {
    fn exists(&self, path: &str) -> bool;

    fn read(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Extension including the leading dot (`".png"`), or `None`.
    fn extension(&self, path: &str) -> Option<String> {
        Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
    }
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Default, Copy, Clone)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_includes_dot() {
        let fs = StdFileSystem;
        assert_eq!(fs.extension("C:/sounds/test-sound.ogg").as_deref(), Some(".ogg"));
        assert_eq!(fs.extension("images/Logo.PNG").as_deref(), Some(".PNG"));
        assert_eq!(fs.extension("no-extension"), None);
    }

    #[test]
    fn missing_file_does_not_exist() {
        assert!(!StdFileSystem.exists("/definitely/not/here/velum.png"));
    }
}
