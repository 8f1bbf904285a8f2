//! File-extension based language identifiers.
//!
//! Rules are scoped by language id (`"rust"`, `"python"`, ...). Hosts that know the language of
//! a buffer pass it directly; this table is for hosts that only have a path.

use std::path::Path;

/// Language id used when nothing more specific is known.
pub const PLAINTEXT_LANGUAGE_ID: &str = "plaintext";

const EXTENSIONS: &[(&str, &str)] = &[
    ("rs", "rust"),
    ("py", "python"),
    ("pyi", "python"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("jsx", "javascriptreact"),
    ("ts", "typescript"),
    ("mts", "typescript"),
    ("tsx", "typescriptreact"),
    ("go", "go"),
    ("c", "c"),
    ("h", "c"),
    ("cc", "cpp"),
    ("cpp", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("cs", "csharp"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("rb", "ruby"),
    ("php", "php"),
    ("swift", "swift"),
    ("sh", "shellscript"),
    ("bash", "shellscript"),
    ("md", "markdown"),
    ("markdown", "markdown"),
    ("json", "json"),
    ("jsonc", "jsonc"),
    ("toml", "toml"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("xml", "xml"),
    ("html", "html"),
    ("htm", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("less", "less"),
    ("sql", "sql"),
    ("lua", "lua"),
    ("txt", PLAINTEXT_LANGUAGE_ID),
];

/// Look up the language id for a file extension (without the leading dot, case-insensitive).
pub fn language_id_for_extension(extension: &str) -> Option<&'static str> {
    EXTENSIONS
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|(_, id)| *id)
}

/// Infer a language id from a path, falling back to [`PLAINTEXT_LANGUAGE_ID`].
pub fn language_id_for_path(path: impl AsRef<Path>) -> &'static str {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(language_id_for_extension)
        .unwrap_or(PLAINTEXT_LANGUAGE_ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(language_id_for_path("src/main.rs"), "rust");
        assert_eq!(language_id_for_path("README.MD"), "markdown");
        assert_eq!(language_id_for_path("a/b/c.tsx"), "typescriptreact");
    }

    #[test]
    fn test_unknown_or_missing_extension() {
        assert_eq!(language_id_for_path("Makefile"), PLAINTEXT_LANGUAGE_ID);
        assert_eq!(language_id_for_path("x.unknown"), PLAINTEXT_LANGUAGE_ID);
        assert_eq!(language_id_for_extension("unknown"), None);
    }
}
