//! Path-only file classification. No content inspection.

/// The suffix after the last `.` of the file name, or an empty tag when there is none.
pub fn classify(path: &str) -> String {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    file_name
        .rsplit_once('.')
        .map(|(_, suffix)| suffix.to_string())
        .unwrap_or_default()
}

/// MIME-like type guessed from the file name, empty when unknown.
pub fn mime_type(path: &str) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_the_final_dot_segment() {
        assert_eq!(classify("a.b.c"), "c");
        assert_eq!(classify("lib/app.test.js"), "js");
        assert_eq!(classify(".gitignore"), "gitignore");
    }

    #[test]
    fn no_dot_means_empty_tag() {
        assert_eq!(classify("README"), "");
        assert_eq!(classify("v1.2/Makefile"), "");
    }

    #[test]
    fn mime_is_guessed_from_the_extension() {
        assert_eq!(mime_type("index.html"), "text/html");
        assert_eq!(mime_type("no-extension"), "");
    }
}
