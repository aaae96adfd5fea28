//! Confinement of caller-supplied paths to the working folder.

use crate::error::{DeckError, Result};
use std::path::{Component, Path, PathBuf};

/// Remove `.` and resolve `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                out.pop();
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Join `file_name` onto `base` and normalize the result.
///
/// Fails with [`DeckError::InvalidPath`] when the normalized path is not
/// strictly below `base`: parent-directory escapes, absolute paths elsewhere,
/// and paths naming `base` itself are all rejected. Nothing is read or
/// created, so symlinks inside `base` are not followed.
pub fn resolve_in_base(base: &Path, file_name: impl AsRef<Path>) -> Result<PathBuf> {
    let file_name = file_name.as_ref();
    let base = normalize(base);
    let resolved = normalize(&base.join(file_name));

    if resolved == base || !resolved.starts_with(&base) {
        return Err(DeckError::InvalidPath(file_name.display().to_string()));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BASE: &str = "/srv/decks";

    #[test]
    fn test_plain_names_resolve_inside() {
        let base = Path::new(BASE);
        assert_eq!(resolve_in_base(base, "q3.pptx").unwrap(), base.join("q3.pptx"));
        assert_eq!(
            resolve_in_base(base, "./img/../img/cat.png").unwrap(),
            base.join("img/cat.png")
        );
    }

    #[test]
    fn test_escapes_rejected() {
        let base = Path::new(BASE);
        for bad in ["../secret.pptx", "a/../../x", "/etc/passwd", "", ".", "img/.."] {
            let err = resolve_in_base(base, bad).unwrap_err();
            assert!(matches!(err, DeckError::InvalidPath(_)), "{bad}");
        }
    }

    #[test]
    fn test_sibling_prefix_is_not_inside() {
        let base = Path::new(BASE);
        assert!(resolve_in_base(base, "../decks2/x.pptx").is_err());
    }

    #[test]
    fn test_absolute_path_inside_base_allowed() {
        let base = Path::new(BASE);
        assert_eq!(
            resolve_in_base(base, "/srv/decks/out/final.pptx").unwrap(),
            base.join("out/final.pptx")
        );
    }

    fn segment() -> impl Strategy<Value = String> {
        prop_oneof![
            3 => "[a-z]{1,6}",
            1 => Just("..".to_string()),
            1 => Just(".".to_string()),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_resolved_paths_never_leave_base(segments in prop::collection::vec(segment(), 1..8)) {
            let base = Path::new(BASE);
            let relative = segments.join("/");

            // depth below base after each segment
            let mut depth: i64 = 0;
            let mut escaped = false;
            for s in &segments {
                match s.as_str() {
                    "." => {},
                    ".." => {
                        depth -= 1;
                        escaped |= depth < 0;
                    },
                    _ => depth += 1,
                }
            }

            match resolve_in_base(base, &relative) {
                Ok(path) => {
                    prop_assert!(path.starts_with(base));
                    prop_assert!(path != base);
                    prop_assert!(path.components().all(|c| !matches!(c, Component::ParentDir | Component::CurDir)));
                },
                Err(_) => prop_assert!(escaped || depth == 0),
            }
            if !escaped && depth > 0 {
                prop_assert!(resolve_in_base(base, &relative).is_ok());
            }
        }
    }
}
