//! MIME type detection
//!
//! Magic-number sniffing via `infer`, with `mime_guess` extension lookup as
//! fallback. Only image and audio types are reported.

/// Guess MIME by inspecting bytes (magic numbers)
pub fn guess_mime_from_bytes(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|k| k.mime_type().to_string())
}

/// Guess MIME by file path or URL (extension-based)
pub fn guess_mime_from_path_or_url(path_or_url: &str) -> Option<String> {
    let without_query = path_or_url.split(['?', '#']).next()?;
    mime_guess::from_path(without_query)
        .first_raw()
        .filter(|m| m.starts_with("image/") || m.starts_with("audio/"))
        .map(str::to_string)
}

/// Combined guess: prefer bytes, fall back to extension, otherwise `fallback`
pub fn guess_mime(bytes: Option<&[u8]>, path_or_url: Option<&str>, fallback: &str) -> String {
    if let Some(b) = bytes
        && let Some(m) = guess_mime_from_bytes(b)
    {
        return m;
    }
    if let Some(p) = path_or_url
        && let Some(m) = guess_mime_from_path_or_url(p)
    {
        return m;
    }
    fallback.to_string()
}

/// File extension used when uploading audio of the given MIME type.
pub fn audio_extension(mime: &str) -> &'static str {
    match mime {
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/ogg" => "ogg",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
        "audio/flac" | "audio/x-flac" => "flac",
        "audio/webm" | "video/webm" => "webm",
        "audio/aac" => "aac",
        "audio/opus" => "opus",
        _ => "mp3",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime_from_path() {
        assert_eq!(
            guess_mime_from_path_or_url("photo.png"),
            Some("image/png".to_string())
        );
        assert_eq!(
            guess_mime_from_path_or_url("https://cdn.example.com/a/cat.JPG?v=2"),
            Some("image/jpeg".to_string())
        );
        assert_eq!(
            guess_mime_from_path_or_url("/tmp/recording.mp3#t=10"),
            Some("audio/mpeg".to_string())
        );
        assert_eq!(guess_mime_from_path_or_url("notes.unknown"), None);
        assert_eq!(guess_mime_from_path_or_url("report.pdf"), None);
        assert_eq!(guess_mime_from_path_or_url("https://example.com/image"), None);
    }

    #[test]
    fn test_guess_mime_prefers_bytes() {
        let png_bytes = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(
            guess_mime(Some(png_bytes), Some("file.jpg"), "image/jpeg"),
            "image/png"
        );
        assert_eq!(guess_mime(None, Some("clip.mp3"), "audio/wav"), "audio/mpeg");
        assert_eq!(guess_mime(Some(b"????"), None, "image/jpeg"), "image/jpeg");
    }

    #[test]
    fn test_audio_extension() {
        assert_eq!(audio_extension("audio/wav"), "wav");
        assert_eq!(audio_extension("audio/mpeg"), "mp3");
        assert_eq!(audio_extension("application/octet-stream"), "mp3");
    }
}
