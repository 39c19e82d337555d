// Upload validation for the settings asset files (logo, favicon, meta image).

/// Asset slots the settings page may write. Each maps to one
/// `business_settings` key named `{slot}_path`.
pub const UPLOAD_KINDS: [&str; 3] = ["logo", "favicon", "meta_image"];

/// MIME allow-list. Anything else is rejected before touching disk.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    match mime {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    }
}

pub fn is_valid_kind(kind: &str) -> bool {
    UPLOAD_KINDS.contains(&kind)
}

/// Generated on-disk name: `{kind}_{unix_ts}.{ext}`.
pub fn upload_filename(kind: &str, unix_ts: i64, ext: &str) -> String {
    format!("{}_{}.{}", kind, unix_ts, ext)
}

/// Settings key the stored path is persisted under.
pub fn settings_key(kind: &str) -> String {
    format!("{}_path", kind)
}
