use thiserror::Error;

/// Errors raised by the content caches and their factories.
///
/// `kind` is the lowercase resource name (`"sound"`, `"texture"`, `"font"`).
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("The string parameter must not be null or empty. (Parameter '{kind}FilePath')")]
    EmptyPath { kind: &'static str },

    #[error("The '{extension}' {kind} file does not exist.")]
    FileNotFound {
        kind: &'static str,
        path: String,
        extension: String,
    },

    #[error(
        "{} file type '{extension}' is not supported.\nSupported file types are {supported}.",
        capitalized(.kind)
    )]
    UnsupportedFileType {
        kind: &'static str,
        extension: String,
        supported: String,
    },

    /// The resource is owned by another resource (e.g. a font atlas).
    #[error("The {kind} '{path}' is pooled and cannot be disposed on its own.")]
    PooledDisposal { kind: &'static str, path: String },

    /// The cache has been shut down.
    #[error("The {kind} cache has been disposed.")]
    Disposed { kind: &'static str },

    #[error("Failed to load {kind} '{path}': {source}")]
    Load {
        kind: &'static str,
        path: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ContentError {
    pub(crate) fn load(kind: &'static str, path: &str, source: impl Into<anyhow::Error>) -> Self {
        Self::Load {
            kind,
            path: path.to_owned(),
            source: source.into(),
        }
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Formats an extension allow-list for error messages.
///
/// `[".png"]` → `'.png'`, `[".ogg", ".mp3"]` → `'.ogg' and '.mp3'`,
/// longer lists → `'.a', '.b', and '.c'`.
pub(crate) fn describe_extensions(extensions: &[&str]) -> String {
    let quoted: Vec<String> = extensions.iter().map(|e| format!("'{e}'")).collect();
    match quoted.as_slice() {
        [] => String::from("none"),
        [one] => one.clone(),
        [a, b] => format!("{a} and {b}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}
