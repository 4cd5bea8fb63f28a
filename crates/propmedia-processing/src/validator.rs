use propmedia_core::constants;

/// Validation errors for uploaded image files
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Unsupported content type: {content_type} (allowed: {allowed:?})")]
    UnsupportedContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

/// Image file validator
///
/// Runs before any storage or database I/O. Rejecting a file here guarantees
/// zero backend writes for it.
pub struct ImageValidator {
    max_file_size: usize,
    allowed_content_types: Vec<String>,
}

impl ImageValidator {
    pub fn new(max_file_size: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types,
        }
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate content type
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = content_type.to_lowercase();

        if !self
            .allowed_content_types
            .iter()
            .any(|ct| ct == &normalized)
        {
            return Err(ValidationError::UnsupportedContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Validate all aspects of a file
    pub fn validate(
        &self,
        filename: &str,
        content_type: &str,
        file_size: usize,
    ) -> Result<(), ValidationError> {
        if filename.trim().is_empty() {
            return Err(ValidationError::InvalidFilename(filename.to_string()));
        }
        self.validate_file_size(file_size)?;
        self.validate_content_type(content_type)?;
        Ok(())
    }
}

impl Default for ImageValidator {
    fn default() -> Self {
        Self::new(
            constants::MAX_IMAGE_FILE_SIZE,
            constants::ALLOWED_IMAGE_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_file_size_ok() {
        let validator = ImageValidator::default();
        assert!(validator.validate_file_size(5 * 1024 * 1024).is_ok());
    }

    #[test]
    fn test_validate_eleven_mb_rejected() {
        let validator = ImageValidator::default();
        let result = validator.validate("big.jpg", "image/jpeg", 11 * 1024 * 1024);
        assert!(matches!(
            result,
            Err(ValidationError::FileTooLarge { size, max })
                if size == 11 * 1024 * 1024 && max == 10 * 1024 * 1024
        ));
    }

    #[test]
    fn test_validate_file_size_empty() {
        let validator = ImageValidator::default();
        assert!(matches!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        ));
    }

    #[test]
    fn test_validate_content_type_ok() {
        let validator = ImageValidator::default();
        assert!(validator.validate_content_type("image/jpeg").is_ok());
        assert!(validator.validate_content_type("image/png").is_ok());
        assert!(validator.validate_content_type("image/webp").is_ok());
        // Non-standard but common alias
        assert!(validator.validate_content_type("image/jpg").is_ok());
        // Case insensitive
        assert!(validator.validate_content_type("IMAGE/PNG").is_ok());
    }

    #[test]
    fn test_validate_content_type_rejected() {
        let validator = ImageValidator::default();
        assert!(matches!(
            validator.validate_content_type("image/gif"),
            Err(ValidationError::UnsupportedContentType { .. })
        ));
        assert!(validator.validate_content_type("application/pdf").is_err());
    }

    #[test]
    fn test_validate_blank_filename_rejected() {
        let validator = ImageValidator::default();
        assert!(matches!(
            validator.validate("  ", "image/jpeg", 1024),
            Err(ValidationError::InvalidFilename(_))
        ));
    }

    #[test]
    fn test_validate_all_ok() {
        let validator = ImageValidator::default();
        assert!(validator.validate("front.jpg", "image/jpeg", 512 * 1024).is_ok());
    }
}
