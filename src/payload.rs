use crate::record::MediaAttachment;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Decoded submission payload.
///
/// Submissions arrive either as form-urlencoded request bodies (network
/// interception path) or as plain captured text (input-capture path); both
/// funnel through [`parse_submission`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionPayload {
    /// Normalized submission text.
    pub content: String,
    /// Remaining decoded form fields, if the payload was a form body.
    pub fields: BTreeMap<String, String>,
    /// Media descriptors carried in the payload, possibly empty.
    pub attachments: Vec<MediaAttachment>,
}

/// Form fields that carry the submission text, checked in order.
const CONTENT_FIELDS: [&str; 2] = ["message", "content"];

/// Form field that carries the attachment list as embedded JSON.
const ATTACHMENTS_FIELD: &str = "pictures";

/// Decodes a raw submission payload.
///
/// A payload that decodes as a form body with a known content field is treated
/// as one; anything else is taken verbatim as plain submission text. Malformed
/// attachment JSON degrades to an empty list, never an error.
pub fn parse_submission(raw: &[u8]) -> SubmissionPayload {
    let fields: BTreeMap<String, String> = url::form_urlencoded::parse(raw)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let content = CONTENT_FIELDS
        .iter()
        .find_map(|field| fields.get(*field))
        .map(|text| text.trim().to_string());

    match content {
        Some(content) => {
            let attachments = fields
                .get(ATTACHMENTS_FIELD)
                .map(|json| extract_attachments(json))
                .unwrap_or_default();
            SubmissionPayload {
                content,
                fields,
                attachments,
            }
        }
        None => SubmissionPayload {
            content: String::from_utf8_lossy(raw).trim().to_string(),
            fields: BTreeMap::new(),
            attachments: Vec::new(),
        },
    }
}

#[derive(Debug, Deserialize)]
struct RawPicture {
    #[serde(default)]
    img_src: String,
    #[serde(default)]
    img_width: u32,
    #[serde(default)]
    img_height: u32,
    #[serde(default)]
    img_size: u64,
}

/// Parses the embedded attachment array. Entries without a source URL are
/// dropped; a document that is not an array yields nothing.
pub fn extract_attachments(json: &str) -> Vec<MediaAttachment> {
    let pictures: Vec<RawPicture> = match serde_json::from_str(json) {
        Ok(pictures) => pictures,
        Err(_) => return Vec::new(),
    };
    pictures
        .into_iter()
        .enumerate()
        .filter(|(_, picture)| !picture.img_src.is_empty())
        .map(|(index, picture)| MediaAttachment {
            url: picture.img_src,
            width: picture.img_width,
            height: picture.img_height,
            bytes: picture.img_size,
            index,
        })
        .collect()
}

/// Reply-quotation lead-ins recognized by [`strip_reply_quote`].
const REPLY_MARKERS: [&str; 2] = ["回复", "reply"];

/// Strips a leading "reply-to-@name:" quotation prefix from confirmation
/// content, returning the quoted remainder.
///
/// Confirmations for threaded replies echo the original content wrapped in a
/// quotation (`回复 @name : text` or `reply @name: text`); the pending entry
/// only holds the bare text.
pub fn strip_reply_quote(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = REPLY_MARKERS.iter().find_map(|marker| {
        trimmed
            .get(..marker.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(marker))
            .map(|_| &trimmed[marker.len()..])
    }) else {
        return trimmed;
    };
    let Some(rest) = rest.trim_start().strip_prefix('@') else {
        return trimmed;
    };
    let Some(separator) = rest.find([':', '：']) else {
        return trimmed;
    };
    let (name, after) = rest.split_at(separator);
    if name.trim().is_empty() {
        return trimmed;
    }
    let mut chars = after.chars();
    chars.next();
    let quoted = chars.as_str().trim();
    if quoted.is_empty() {
        trimmed
    } else {
        quoted
    }
}

/// Normalizes confirmation content for the content-matching strategy.
pub fn normalize_confirmation(raw: &str) -> String {
    strip_reply_quote(raw).to_string()
}
