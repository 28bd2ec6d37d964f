//! Slash-path helpers shared by module, view and URL code.

/// Forward slashes only, no trailing slash (except a lone `/`), no `//`.
pub fn normalize(path: &str) -> String {
    let converted = if path == "/" {
        "/".to_string()
    } else {
        path.replace('\\', "/").trim_end_matches('/').to_string()
    };
    collapse_slashes(&converted)
}

/// Join segments with `/`, skipping empty segments and non-initial `/`.
pub fn concat<S: AsRef<str>>(segments: &[S]) -> String {
    let mut parts = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        let normalized = normalize(segment.as_ref());
        if normalized.is_empty() || (i > 0 && normalized == "/") {
            continue;
        }
        parts.push(normalized);
    }
    normalize(&parts.join("/"))
}

pub(crate) fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut previous_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !previous_slash {
                out.push(c);
            }
            previous_slash = true;
        } else {
            out.push(c);
            previous_slash = false;
        }
    }
    out
}
