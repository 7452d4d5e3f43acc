//! Shared key generation for storage backends.
//!
//! Keys are namespaced by the record id generated for one pipeline run:
//! `movies/{record_id}/cover.{ext}` and `movies/{record_id}/video.{ext}`.
//! Two submissions of the same title therefore never collide.

use uuid::Uuid;

/// Storage key for a cover image.
pub fn cover_key(record_id: Uuid, extension: &str) -> String {
    format!("movies/{}/cover.{}", record_id, extension)
}

/// Storage key for a video file.
pub fn video_key(record_id: Uuid, extension: &str) -> String {
    format!("movies/{}/video.{}", record_id, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_record_scoped() {
        let id = Uuid::new_v4();
        assert_eq!(cover_key(id, "jpg"), format!("movies/{}/cover.jpg", id));
        assert_eq!(video_key(id, "mkv"), format!("movies/{}/video.mkv", id));
    }

    #[test]
    fn distinct_records_never_collide() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_ne!(cover_key(a, "jpg"), cover_key(b, "jpg"));
    }
}
