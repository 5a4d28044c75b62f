//! Receipt file storage.

use std::path::Path;

use time::OffsetDateTime;

use crate::{Error, endpoints};

/// The subdirectory of the upload directory that receipt files land in.
pub const RECEIPTS_SUBDIR: &str = "receipts";

/// Write an uploaded receipt to disk and return the URL path it is served at.
///
/// The stored name is the upload time plus a sanitized version of the
/// client's file name, which keeps concurrent uploads of the same file name
/// from clobbering each other.
///
/// # Errors
/// This function will return an [Error::StorageError] if the receipts
/// directory cannot be created or the file cannot be written.
pub fn save_receipt(
    original_file_name: &str,
    data: &[u8],
    upload_dir: &Path,
) -> Result<String, Error> {
    let stored_name = format!(
        "{}_{}",
        OffsetDateTime::now_utc().unix_timestamp_nanos(),
        sanitize_file_name(original_file_name)
    );

    let receipts_dir = upload_dir.join(RECEIPTS_SUBDIR);

    std::fs::create_dir_all(&receipts_dir)
        .inspect_err(|error| {
            tracing::error!("could not create receipts directory {receipts_dir:?}: {error}")
        })
        .map_err(|error| Error::StorageError(error.to_string()))?;

    let file_path = receipts_dir.join(&stored_name);

    std::fs::write(&file_path, data)
        .inspect_err(|error| tracing::error!("could not write receipt {file_path:?}: {error}"))
        .map_err(|error| Error::StorageError(error.to_string()))?;

    tracing::debug!("Stored receipt '{original_file_name}' ({} bytes)", data.len());

    Ok(format!(
        "{}/{RECEIPTS_SUBDIR}/{stored_name}",
        endpoints::UPLOADS
    ))
}

fn sanitize_file_name(file_name: &str) -> String {
    let sanitized: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        "receipt".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod receipt_tests {
    use super::{sanitize_file_name, save_receipt};

    #[test]
    fn sanitize_replaces_path_separators() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("receipt 1.png"), "receipt_1.png");
        assert_eq!(sanitize_file_name(""), "receipt");
    }

    #[test]
    fn save_receipt_writes_file_and_returns_url() {
        let upload_dir = std::env::temp_dir().join(format!(
            "spendlog_receipt_test_{}",
            std::process::id()
        ));

        let url = save_receipt("lunch.png", b"not really a png", &upload_dir)
            .expect("Could not save receipt");

        assert!(url.starts_with("/uploads/receipts/"));
        assert!(url.ends_with("lunch.png"));

        let stored_name = url.rsplit('/').next().unwrap();
        let stored_path = upload_dir.join("receipts").join(stored_name);
        let contents = std::fs::read(&stored_path).expect("Receipt file not written");
        assert_eq!(contents, b"not really a png");

        std::fs::remove_dir_all(&upload_dir).ok();
    }
}
