use std::path::Path;

/// Media type implied by the file's extension, if any.
pub fn media_type(path: &Path) -> Option<mime_guess::Mime> {
    mime_guess::from_path(path).first()
}

/// Accept only files whose extension maps to an `image/*` media type.
///
/// The file's bytes are never inspected, so a renamed file passes.
pub fn is_image(path: &Path) -> bool {
    media_type(path).map_or(false, |m| m.type_() == mime_guess::mime::IMAGE)
}
