//! Resource path resolution relative to a template location

/// Directory part of `location`, up to and including the last `/`
///
/// Empty when the location has no directory part.
pub fn template_root(location: &str) -> &str {
    match location.rfind('/') {
        Some(index) => &location[..=index],
        None => "",
    }
}

/// Resolve `relative` against the directory of `base`
///
/// Every `segment/../` pair is collapsed until none remain. Leading `../`
/// that has nothing left to cancel is kept, as is a trailing `..` without a
/// slash.
pub fn resolve_path(base: &str, relative: &str) -> String {
    let joined = format!("{}{}", template_root(base), relative);
    collapse_parent_segments(&joined)
}

fn collapse_parent_segments(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let last = segments.len().saturating_sub(1);
    let mut kept: Vec<&str> = Vec::with_capacity(segments.len());

    for (index, segment) in segments.into_iter().enumerate() {
        let cancels = segment == ".."
            && index < last
            && matches!(kept.last(), Some(prev) if !prev.is_empty() && *prev != "..");
        if cancels {
            kept.pop();
        } else {
            kept.push(segment);
        }
    }
    kept.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_root() {
        assert_eq!(template_root("templates/menu.xml"), "templates/");
        assert_eq!(template_root("/srv/a/b.xml"), "/srv/a/");
        assert_eq!(template_root("menu.xml"), "");
    }

    #[test]
    fn test_resolve_sibling() {
        assert_eq!(resolve_path("templates/menu.xml", "menu.css"), "templates/menu.css");
        assert_eq!(resolve_path("menu.xml", "menu.css"), "menu.css");
    }

    #[test]
    fn test_resolve_single_parent() {
        assert_eq!(
            resolve_path("app/templates/menu.xml", "../css/menu.css"),
            "app/css/menu.css"
        );
    }

    #[test]
    fn test_resolve_nested_parents_collapse_fully() {
        assert_eq!(
            resolve_path("a/b/c/menu.xml", "../../x/../y.js"),
            "a/y.js"
        );
        assert_eq!(resolve_path("a/b/t.xml", "../../lib.js"), "lib.js");
    }

    #[test]
    fn test_unmatched_parents_kept() {
        assert_eq!(resolve_path("t.xml", "../lib.js"), "../lib.js");
        assert_eq!(resolve_path("a/t.xml", "../../lib.js"), "../lib.js");
        assert_eq!(resolve_path("t.xml", "../../lib.js"), "../../lib.js");
        assert_eq!(resolve_path("a/t.xml", "b/.."), "a/b/..");
    }

    #[test]
    fn test_absolute_and_url_paths() {
        assert_eq!(resolve_path("/srv/tpl/t.xml", "../s.css"), "/srv/s.css");
        assert_eq!(
            resolve_path("http://host/tpl/t.xml", "../s.css"),
            "http://host/s.css"
        );
    }
}
