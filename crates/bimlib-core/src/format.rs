//! Accepted model formats and upload validation rules.
//!
//! Both the upload client and the catalog service run these checks; the
//! service never trusts that the client already did.

use std::fmt;
use std::str::FromStr;

/// Default upper bound for a single model file (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Errors raised while validating a candidate upload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid file type. Please use GLB, OBJ, or FBX files.")]
    UnsupportedExtension(String),

    #[error("File too large. Maximum size is {}MB.", .max / (1024 * 1024))]
    TooLarge { size: u64, max: u64 },

    #[error("Invalid file name: '{0}'")]
    InvalidFileName(String),
}

/// A 3D model format accepted by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFormat {
    Glb,
    Obj,
    Fbx,
}

impl ModelFormat {
    pub const ALL: [ModelFormat; 3] = [ModelFormat::Glb, ModelFormat::Obj, ModelFormat::Fbx];

    /// Lowercase file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            ModelFormat::Glb => "glb",
            ModelFormat::Obj => "obj",
            ModelFormat::Fbx => "fbx",
        }
    }

    /// Content type used when serving a stored file of this format.
    pub fn content_type(self) -> &'static str {
        match self {
            ModelFormat::Glb => "model/gltf-binary",
            ModelFormat::Obj => "model/obj",
            ModelFormat::Fbx => "application/octet-stream",
        }
    }

    /// Resolves the format of a file from its name.
    pub fn from_file_name(file_name: &str) -> Result<Self, ValidationError> {
        file_extension(file_name).parse()
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ModelFormat {
    type Err = ValidationError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        let lower = ext.to_ascii_lowercase();
        ModelFormat::ALL
            .into_iter()
            .find(|format| format.extension() == lower)
            .ok_or_else(|| ValidationError::UnsupportedExtension(ext.to_string()))
    }
}

/// Returns the substring after the last `.`, or the whole name when there is
/// no dot.
pub fn file_extension(file_name: &str) -> &str {
    file_name.rsplit('.').next().unwrap_or(file_name)
}

/// Rejects files larger than `max` bytes.
pub fn check_size(size: u64, max: u64) -> Result<(), ValidationError> {
    if size > max {
        return Err(ValidationError::TooLarge { size, max });
    }
    Ok(())
}

/// Runs the extension and size checks in the order the upload client
/// reports them.
pub fn validate_upload(file_name: &str, size: u64, max: u64) -> Result<ModelFormat, ValidationError> {
    let format = ModelFormat::from_file_name(file_name)?;
    check_size(size, max)?;
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_after_last_dot() {
        assert_eq!(file_extension("chair.glb"), "glb");
        assert_eq!(file_extension("archive.tar.fbx"), "fbx");
        assert_eq!(file_extension("noext"), "noext");
        assert_eq!(file_extension("trailing."), "");
    }

    #[test]
    fn test_formats_case_insensitive() {
        assert_eq!(ModelFormat::from_file_name("CHAIR.GLB").unwrap(), ModelFormat::Glb);
        assert_eq!(ModelFormat::from_file_name("desk.Obj").unwrap(), ModelFormat::Obj);
        assert_eq!(ModelFormat::from_file_name("lamp.fbx").unwrap(), ModelFormat::Fbx);
    }

    #[test]
    fn test_rejects_unsupported_extension() {
        let err = ModelFormat::from_file_name("malware.exe").unwrap_err();
        assert_eq!(err, ValidationError::UnsupportedExtension("exe".to_string()));
        assert!(err.to_string().contains("GLB, OBJ, or FBX"));

        assert!(ModelFormat::from_file_name("glb").is_ok());
        assert!(ModelFormat::from_file_name("model.gltf").is_err());
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(check_size(DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_MAX_UPLOAD_BYTES).is_ok());

        let err = check_size(DEFAULT_MAX_UPLOAD_BYTES + 1, DEFAULT_MAX_UPLOAD_BYTES).unwrap_err();
        assert_eq!(err.to_string(), "File too large. Maximum size is 50MB.");
    }

    #[test]
    fn test_validate_upload_checks_type_first() {
        let err = validate_upload("big.exe", u64::MAX, 10).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedExtension(_)));

        let err = validate_upload("big.obj", 11, 10).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { size: 11, max: 10 }));

        assert_eq!(validate_upload("small.obj", 10, 10).unwrap(), ModelFormat::Obj);
    }

    #[test]
    fn test_content_types() {
        assert_eq!(ModelFormat::Glb.content_type(), "model/gltf-binary");
        assert_eq!(ModelFormat::Obj.to_string(), "obj");
    }
}
