//! Job definition: one user-requested video generation bound to its own
//! resources and cancellation scope.

mod options;
mod types;

pub use options::{EnhancementOptions, ImageFit, TransitionStyle};
pub use types::{ImageSource, JobId, JobRequest, JobStatus, SUPPORTED_IMAGE_EXTENSIONS};

/// Split input text into a title and body.
///
/// The first line is the title; the remainder is the body. Single-line input
/// serves as both.
pub fn split_title_content(text: &str) -> (String, String) {
    let trimmed = text.trim();
    match trimmed.split_once('\n') {
        Some((title, content)) => (title.trim().to_string(), content.trim().to_string()),
        None => (trimmed.to_string(), trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_single_line() {
        let (title, content) = split_title_content("Hello world");
        assert_eq!(title, "Hello world");
        assert_eq!(content, "Hello world");
    }

    #[test]
    fn test_split_multi_line() {
        let (title, content) = split_title_content("My Title\nFirst line.\nSecond line.");
        assert_eq!(title, "My Title");
        assert_eq!(content, "First line.\nSecond line.");
    }
}
