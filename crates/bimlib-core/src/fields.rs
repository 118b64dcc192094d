// Metadata form fields and stored-file naming.
//
// The upload form carries free-text fields plus two comma-separated lists.
// Blank text fields fall back to fixed placeholders so every record has a
// displayable name, category and description.

use crate::format::ValidationError;

/// URL prefix under which stored files are served.
pub const UPLOADS_PREFIX: &str = "/uploads/";

pub const DEFAULT_NAME: &str = "Unnamed Model";
pub const DEFAULT_CATEGORY: &str = "Uncategorized";
pub const DEFAULT_DESCRIPTION: &str = "No description";

/// Longest client file name kept, in bytes. Leaves room for the
/// `<millis>-` prefix within the usual 255-byte file name limit.
pub const MAX_FILE_NAME_BYTES: usize = 200;

/// Multipart field carrying the model file on `POST /api/upload`.
pub const MODEL_FIELD: &str = "model";
/// Multipart field carrying the file on the record-less `POST /upload`.
pub const FILE_FIELD: &str = "file";

/// Text fields of an upload, as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelForm {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub materials: Option<String>,
    pub specifications: Option<String>,
}

/// Text fields of an upload after defaulting and list parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMetadata {
    pub name: String,
    pub category: String,
    pub description: String,
    pub materials: Vec<String>,
    pub specifications: Vec<String>,
}

impl ModelForm {
    /// Stores a text field by its multipart name. Returns false for names
    /// that are not part of the form.
    pub fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "category" => &mut self.category,
            "description" => &mut self.description,
            "materials" => &mut self.materials,
            "specifications" => &mut self.specifications,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Applies placeholders and splits the list fields.
    pub fn into_metadata(self) -> ModelMetadata {
        ModelMetadata {
            name: or_default(self.name, DEFAULT_NAME),
            category: or_default(self.category, DEFAULT_CATEGORY),
            description: or_default(self.description, DEFAULT_DESCRIPTION),
            materials: parse_list(self.materials.as_deref().unwrap_or_default()),
            specifications: parse_list(self.specifications.as_deref().unwrap_or_default()),
        }
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

/// Splits a comma-separated list, trimming items and dropping empty ones.
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reduces a client-supplied file name to its last path segment.
///
/// Browsers may send full paths (`C:\models\chair.glb`); only the final
/// component is kept. Names that end up empty, refer to a directory, or
/// exceed [`MAX_FILE_NAME_BYTES`] are rejected.
pub fn sanitize_file_name(name: &str) -> Result<String, ValidationError> {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if base.is_empty()
        || base == "."
        || base == ".."
        || base.contains('\0')
        || base.len() > MAX_FILE_NAME_BYTES
    {
        return Err(ValidationError::InvalidFileName(name.to_string()));
    }
    Ok(base.to_string())
}

/// Name under which a file is stored: `<millis>-<original>`.
pub fn stored_file_name(timestamp_millis: i64, original: &str) -> String {
    format!("{}-{}", timestamp_millis, original)
}

/// Public URL path of a stored file.
pub fn file_path_for(stored_name: &str) -> String {
    format!("{}{}", UPLOADS_PREFIX, stored_name)
}

/// Extracts the stored name from a record's `filePath`.
pub fn stored_name_from_path(file_path: &str) -> Option<&str> {
    file_path
        .strip_prefix(UPLOADS_PREFIX)
        .filter(|name| is_safe_stored_name(name))
}

/// True when `name` can be joined onto the blob directory without leaving it.
pub fn is_safe_stored_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
