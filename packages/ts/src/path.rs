// Posix path helpers
//
// All file names inside a `Program` are absolute posix paths, so module
// resolution and relative import generation only need string manipulation.

/// Collapses `.` and `..` segments and duplicate separators.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

pub fn dirname(path: &str) -> String {
    match path.rfind('/') {
        Some(0) => "/".to_string(),
        Some(i) => path[..i].to_string(),
        None => ".".to_string(),
    }
}

pub fn join(base: &str, segment: &str) -> String {
    if segment.starts_with('/') {
        return normalize(segment);
    }
    normalize(&format!("{}/{}", base, segment))
}

/// Resolves `segments` right to left against `base`, like `path.posix.resolve`.
pub fn resolve(base: &str, segments: &[&str]) -> String {
    let mut result = base.to_string();
    for segment in segments {
        result = join(&result, segment);
    }
    normalize(&result)
}

/// Relative path from directory `from` to `to`.
pub fn relative(from: &str, to: &str) -> String {
    let from = normalize(from);
    let to = normalize(to);
    let from_parts: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_parts: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();
    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let mut parts: Vec<&str> = Vec::new();
    for _ in common..from_parts.len() {
        parts.push("..");
    }
    parts.extend(&to_parts[common..]);
    parts.join("/")
}

/// Strips a `.d.ts`, `.ts` or `.js` extension.
pub fn strip_extension(path: &str) -> &str {
    for ext in [".d.ts", ".ts", ".js"] {
        if let Some(stripped) = path.strip_suffix(ext) {
            return stripped;
        }
    }
    path
}

/// Import specifier for `to_file` as seen from `from_file`.
pub fn relative_import(from_file: &str, to_file: &str) -> String {
    let rel = relative(&dirname(from_file), strip_extension(to_file));
    if rel.starts_with("..") {
        rel
    } else {
        format!("./{}", rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_normalize_dot_segments() {
        assert_eq!(normalize("/a/./b/../c//d"), "/a/c/d");
        assert_eq!(normalize("a/../../b"), "../b");
        assert_eq!(normalize("/.."), "/");
    }

    #[test]
    fn should_resolve_against_a_directory() {
        assert_eq!(resolve("/app/cmp", &["./tpl.html"]), "/app/cmp/tpl.html");
        assert_eq!(resolve("/app/cmp", &["../shared/x.css"]), "/app/shared/x.css");
        assert_eq!(resolve("/app", &["/abs.html"]), "/abs.html");
    }

    #[test]
    fn should_compute_relative_paths() {
        assert_eq!(relative("/app", "/app/cmp/a.ts"), "cmp/a.ts");
        assert_eq!(relative("/app/cmp", "/app/other/b.ts"), "../other/b.ts");
        assert_eq!(relative_import("/app/a.ts", "/app/b.ts"), "./b");
        assert_eq!(relative_import("/app/x/a.ts", "/app/r3_symbols.ts"), "../r3_symbols");
    }
}
