//! Request validation and object header construction.
//!
//! Limits follow the defaults of the Swift `constraints` middleware, which
//! Cloud Files enforces as well.

use std::collections::BTreeMap;

use http::HeaderMap;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};

use cloudfiles_model::InvalidArgument;

/// Prefix of user metadata headers on objects.
pub const OBJECT_META_PREFIX: &str = "x-object-meta-";

/// Largest single object (and therefore segment) the store accepts.
pub const MAX_SEGMENT_SIZE: u64 = 5 * 1024 * 1024 * 1024;

/// Most segments a static manifest may list.
pub const MAX_STATIC_SEGMENTS: usize = 1000;

/// Maximum length of a metadata key in bytes, excluding the header prefix.
const MAX_META_NAME_LEN: usize = 128;

/// Maximum length of a metadata value in bytes.
const MAX_META_VALUE_LEN: usize = 256;

/// Maximum number of metadata entries.
const MAX_META_COUNT: usize = 90;

/// Maximum total size of all metadata keys and values.
const MAX_META_OVERALL_SIZE: usize = 4096;

/// Validate user metadata against the store limits.
///
/// # Errors
///
/// Returns [`InvalidArgument`] naming the first violated limit.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use cloudfiles_transfer::validation::validate_metadata;
///
/// let mut meta = BTreeMap::new();
/// meta.insert("author".to_owned(), "Jamie".to_owned());
/// assert!(validate_metadata(&meta).is_ok());
/// ```
pub fn validate_metadata(metadata: &BTreeMap<String, String>) -> Result<(), InvalidArgument> {
    if metadata.len() > MAX_META_COUNT {
        return Err(InvalidArgument::new(format!(
            "at most {MAX_META_COUNT} metadata entries are allowed, got {}",
            metadata.len()
        )));
    }

    let mut total = 0;
    for (key, value) in metadata {
        if key.is_empty() {
            return Err(InvalidArgument::new("metadata keys must not be empty"));
        }
        if key.len() > MAX_META_NAME_LEN {
            return Err(InvalidArgument::new(format!(
                "metadata key {key:?} exceeds {MAX_META_NAME_LEN} bytes"
            )));
        }
        if value.len() > MAX_META_VALUE_LEN {
            return Err(InvalidArgument::new(format!(
                "metadata value for {key:?} exceeds {MAX_META_VALUE_LEN} bytes"
            )));
        }
        total += key.len() + value.len();
    }

    if total > MAX_META_OVERALL_SIZE {
        return Err(InvalidArgument::new(format!(
            "metadata must not exceed {MAX_META_OVERALL_SIZE} bytes in total, got {total}"
        )));
    }

    Ok(())
}

/// Validate a segment size.
///
/// # Errors
///
/// Returns [`InvalidArgument`] for zero or sizes above [`MAX_SEGMENT_SIZE`].
pub fn validate_part_size(part_size: u64) -> Result<(), InvalidArgument> {
    if part_size == 0 {
        return Err(InvalidArgument::new("partSize must be a positive integer"));
    }
    if part_size > MAX_SEGMENT_SIZE {
        return Err(InvalidArgument::new(format!(
            "partSize {part_size} exceeds the maximum segment size of {MAX_SEGMENT_SIZE} bytes"
        )));
    }
    Ok(())
}

/// Validate a concurrency bound.
///
/// # Errors
///
/// Returns [`InvalidArgument`] for zero.
pub fn validate_concurrency(concurrency: usize) -> Result<(), InvalidArgument> {
    if concurrency == 0 {
        return Err(InvalidArgument::new(
            "concurrency must be a positive integer",
        ));
    }
    Ok(())
}

/// Build the headers applied to the logical object: `X-Object-Meta-*`
/// entries plus an optional `Content-Type`.
///
/// # Errors
///
/// Returns [`InvalidArgument`] if the metadata breaks a store limit, two
/// keys differ only in case, or a key or value cannot be carried in an HTTP
/// header.
pub fn object_headers(
    metadata: &BTreeMap<String, String>,
    content_type: Option<&str>,
) -> Result<HeaderMap, InvalidArgument> {
    validate_metadata(metadata)?;

    let mut headers = HeaderMap::with_capacity(metadata.len() + 1);
    for (key, value) in metadata {
        let name = HeaderName::try_from(format!("{OBJECT_META_PREFIX}{}", key.to_ascii_lowercase()))
            .map_err(|_| InvalidArgument::new(format!("invalid metadata key {key:?}")))?;
        // header names are case-insensitive
        if headers.contains_key(&name) {
            return Err(InvalidArgument::new(format!(
                "metadata key {key:?} collides with another key differing only in case"
            )));
        }
        let value = HeaderValue::try_from(value.as_str())
            .map_err(|_| InvalidArgument::new(format!("invalid metadata value for {key:?}")))?;
        headers.insert(name, value);
    }

    if let Some(content_type) = content_type {
        let value = HeaderValue::try_from(content_type)
            .map_err(|_| InvalidArgument::new(format!("invalid content type {content_type:?}")))?;
        headers.insert(CONTENT_TYPE, value);
    }

    Ok(headers)
}
