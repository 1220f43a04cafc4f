//! Change fingerprints and collection ETags for the listing endpoint.
//!
//! Each resource folds the client-visible mutable fields into one
//! fingerprint string. The collection ETag is a 64-bit FNV-1a hash over the
//! fingerprints in lexicographic order, so two listings with the same
//! members produce the same tag regardless of enumeration order.

use std::hash::Hasher;

use fnv::FnvHasher;
use studygate_store::ResourceRecord;

/// `id|filename|title|lastModified` for one resource. Absent fields hash as
/// empty segments so a title appearing later still changes the fingerprint.
pub fn resource_fingerprint(record: &ResourceRecord) -> String {
    format!(
        "{}|{}|{}|{}",
        record.id,
        record.filename,
        record.title.as_deref().unwrap_or_default(),
        record.updated_at.as_deref().unwrap_or_default()
    )
}

/// Weak ETag for a whole listing: `W/"<16 hex digits>"`.
pub fn collection_etag(fingerprints: &[String]) -> String {
    let mut sorted: Vec<&str> = fingerprints.iter().map(String::as_str).collect();
    sorted.sort_unstable();

    let mut hasher = FnvHasher::default();
    for fingerprint in sorted {
        hasher.write(fingerprint.as_bytes());
        // Segment terminator, so member boundaries survive concatenation.
        hasher.write_u8(0);
    }
    format!("W/\"{:016x}\"", hasher.finish())
}

/// The hex digest inside one of our weak ETags. Tags in any other shape get
/// `None` and simply never match a cached snapshot.
pub fn etag_digest(etag: &str) -> Option<&str> {
    etag.trim()
        .strip_prefix("W/\"")?
        .strip_suffix('"')
        .filter(|digest| digest.len() == 16 && digest.bytes().all(|b| b.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, filename: &str, title: Option<&str>, updated: Option<&str>) -> ResourceRecord {
        ResourceRecord {
            id: id.into(),
            filename: filename.into(),
            title: title.map(Into::into),
            storage_key: Some(format!("sem1/{filename}")),
            content_type: Some("application/pdf".into()),
            course: None,
            semester: Some("sem1".into()),
            subject: Some("math".into()),
            unit: Some("unit1".into()),
            kind: Some("notes".into()),
            updated_at: updated.map(Into::into),
        }
    }

    #[test]
    fn fingerprint_folds_the_four_fields() {
        let fp = resource_fingerprint(&record(
            "res-1",
            "limits.pdf",
            Some("Limits"),
            Some("2024-05-01T10:00:00Z"),
        ));
        assert_eq!(fp, "res-1|limits.pdf|Limits|2024-05-01T10:00:00Z");

        let sparse = resource_fingerprint(&record("res-2", "sets.pdf", None, None));
        assert_eq!(sparse, "res-2|sets.pdf||");
    }

    #[test]
    fn etag_ignores_enumeration_order() {
        let a = resource_fingerprint(&record("res-1", "a.pdf", None, Some("t1")));
        let b = resource_fingerprint(&record("res-2", "b.pdf", None, Some("t2")));
        let c = resource_fingerprint(&record("res-3", "c.pdf", None, Some("t3")));

        let forward = collection_etag(&[a.clone(), b.clone(), c.clone()]);
        let shuffled = collection_etag(&[c, a, b]);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn etag_tracks_member_changes() {
        let original = vec![
            resource_fingerprint(&record("res-1", "a.pdf", None, Some("t1"))),
            resource_fingerprint(&record("res-2", "b.pdf", None, Some("t2"))),
        ];
        let touched = vec![
            resource_fingerprint(&record("res-1", "a.pdf", None, Some("t1"))),
            resource_fingerprint(&record("res-2", "b.pdf", None, Some("t9"))),
        ];
        assert_ne!(collection_etag(&original), collection_etag(&touched));
    }

    #[test]
    fn etag_has_the_weak_sixteen_hex_shape() {
        let etag = collection_etag(&["res-1|a.pdf||".to_string()]);
        assert!(etag.starts_with("W/\""));
        assert!(etag.ends_with('"'));
        assert_eq!(etag_digest(&etag).expect("digest").len(), 16);
    }

    #[test]
    fn digest_rejects_foreign_tags() {
        assert!(etag_digest("\"strong-etag\"").is_none());
        assert!(etag_digest("W/\"short\"").is_none());
        assert!(etag_digest("W/\"zzzzzzzzzzzzzzzz\"").is_none());
        assert_eq!(etag_digest("W/\"00c0ffee00c0ffee\""), Some("00c0ffee00c0ffee"));
    }

    #[test]
    fn empty_listing_still_hashes() {
        let empty = collection_etag(&[]);
        assert!(etag_digest(&empty).is_some());
        assert_ne!(empty, collection_etag(&["res-1|a.pdf||".to_string()]));
    }
}
