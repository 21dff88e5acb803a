//! Media path formatting at the export boundary.
//!
//! Internally paths stay as [`Path`]s. Only when a path is written into the
//! draft is it converted to the separator style the editor expects. JSON
//! escaping of backslashes is left to the serializer.

use std::path::Path;

use draftforge_common::PathStyle;

/// Render `path` as the editor expects it for `style`.
pub fn format_media_path(path: &Path, style: PathStyle) -> String {
    let raw = path.to_string_lossy();
    match style {
        PathStyle::Posix => collapse(&raw.replace('\\', "/"), '/', false),
        PathStyle::Windows => {
            let mut out = collapse(&raw.replace('/', "\\"), '\\', true);
            upper_drive_letter(&mut out);
            out
        }
    }
}

/// Collapse runs of `sep`. With `keep_unc`, a leading double separator survives.
fn collapse(input: &str, sep: char, keep_unc: bool) -> String {
    let mut out = String::with_capacity(input.len());
    let unc_prefix = keep_unc && input.starts_with(sep) && input[sep.len_utf8()..].starts_with(sep);
    if unc_prefix {
        out.push(sep);
    }
    let mut previous_sep = false;
    for c in input.chars() {
        if c == sep {
            if !previous_sep {
                out.push(c);
            }
            previous_sep = true;
        } else {
            out.push(c);
            previous_sep = false;
        }
    }
    out
}

fn upper_drive_letter(path: &mut String) {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_lowercase() {
        let upper = (bytes[0] as char).to_ascii_uppercase();
        path.replace_range(0..1, &upper.to_string());
    }
}
