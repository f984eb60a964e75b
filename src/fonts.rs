//! Font loading: an explicit font file, or the system sans-serif.

use crate::error::RenderError;
use fontdue::{Font, FontSettings};
use std::path::Path;
use tracing::debug;

/// Load the rendering font.
///
/// With `font_file` set the file is loaded directly; otherwise the system
/// font database is queried for a sans-serif face. Rendering text is
/// impossible without a font, so failure here is fatal to the run.
///
/// # Errors
/// Returns an error if the file cannot be read, no system sans-serif face
/// exists, or the face data is not a parseable font.
pub fn load(font_file: Option<&Path>) -> Result<Font, RenderError> {
    let data = match font_file {
        Some(path) => std::fs::read(path)
            .map_err(|e| RenderError::Font(format!("failed to read {}: {e}", path.display())))?,
        None => system_sans_serif()?,
    };

    Font::from_bytes(data.as_slice(), FontSettings::default()).map_err(|e| {
        RenderError::Font(format!("failed to parse font: {e}"))
    })
}

fn system_sans_serif() -> Result<Vec<u8>, RenderError> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    let query = fontdb::Query {
        families: &[fontdb::Family::SansSerif],
        ..fontdb::Query::default()
    };
    let id = db
        .query(&query)
        .ok_or_else(|| RenderError::Font("no system sans-serif font found".into()))?;

    if let Some(face) = db.face(id) {
        debug!("using system font {:?}", face.families.first());
    }

    db.with_face_data(id, |data, _index| data.to_vec())
        .ok_or_else(|| RenderError::Font("failed to read system font data".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_file_is_an_error() {
        let err = load(Some(Path::new("/nonexistent/font.ttf")));
        assert!(matches!(err, Err(RenderError::Font(_))));
    }

    #[test]
    fn test_non_font_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-font.ttf");
        std::fs::write(&path, b"definitely not sfnt data").unwrap();
        assert!(load(Some(&path)).is_err());
    }
}
