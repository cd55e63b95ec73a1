use pdfsum_core::{AppError, UploadLimits};
use std::io::SeekFrom;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

/// Upload validation failures, in evaluation order
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("file is too small (minimum {min_kb} KB)")]
    TooSmall { size: u64, min_kb: u64 },

    #[error("file is too large (maximum {max_mb} MB)")]
    TooLarge { size: u64, max_mb: u64 },

    #[error("invalid file extension: {extension} (must be {allowed})")]
    InvalidExtension { extension: String, allowed: String },

    #[error("file is not a valid PDF (invalid magic number)")]
    InvalidMagic,

    #[error("failed to read file header: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Io(e) => AppError::Internal(format!("failed to read upload: {}", e)),
            other => AppError::InvalidInput(other.to_string()),
        }
    }
}

impl ValidationError {
    /// Which check rejected the upload.
    pub fn stage(&self) -> &'static str {
        match self {
            ValidationError::TooSmall { .. } | ValidationError::TooLarge { .. } => "size",
            ValidationError::InvalidExtension { .. } => "extension",
            ValidationError::InvalidMagic => "magic_number",
            ValidationError::Io(_) => "read",
        }
    }
}

/// PDF upload validator
///
/// Runs the size, extension and magic-number checks in that order. None of the
/// checks trust the client-declared MIME type.
#[derive(Debug, Clone)]
pub struct PdfValidator {
    limits: UploadLimits,
}

impl PdfValidator {
    pub fn new(limits: UploadLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    pub fn validate_size(&self, size: u64) -> Result<(), ValidationError> {
        if size < self.limits.min_file_size {
            return Err(ValidationError::TooSmall {
                size,
                min_kb: self.limits.min_file_size / 1024,
            });
        }

        if size > self.limits.max_file_size {
            return Err(ValidationError::TooLarge {
                size,
                max_mb: self.limits.max_file_size / 1024 / 1024,
            });
        }

        Ok(())
    }

    /// Case-insensitive match of the final extension against the allowed one.
    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        if !extension.eq_ignore_ascii_case(&self.limits.allowed_extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.limits.allowed_extension.clone(),
            });
        }

        Ok(())
    }

    /// Read the first four bytes and compare them to the PDF magic number.
    ///
    /// The reader is rewound to the start whatever the outcome, so the caller can
    /// copy the whole stream afterwards.
    pub async fn validate_magic<R>(&self, reader: &mut R) -> Result<(), ValidationError>
    where
        R: AsyncRead + AsyncSeek + Unpin,
    {
        let mut header = [0u8; 4];
        let read = reader.read_exact(&mut header).await;
        reader.seek(SeekFrom::Start(0)).await?;

        match read {
            Ok(_) if header == self.limits.magic => Ok(()),
            Ok(_) => Err(ValidationError::InvalidMagic),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(ValidationError::InvalidMagic)
            }
            Err(e) => Err(ValidationError::Io(e)),
        }
    }

    /// Run all checks in order, stopping at the first failure.
    pub async fn validate<R>(
        &self,
        filename: &str,
        declared_size: u64,
        reader: &mut R,
    ) -> Result<(), ValidationError>
    where
        R: AsyncRead + AsyncSeek + Unpin,
    {
        self.validate_size(declared_size)?;
        self.validate_extension(filename)?;
        self.validate_magic(reader).await?;

        tracing::debug!(
            filename = %filename,
            size_bytes = declared_size,
            "PDF upload passed validation"
        );

        Ok(())
    }
}

impl Default for PdfValidator {
    fn default() -> Self {
        Self::new(UploadLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn pdf_bytes(len: usize) -> Vec<u8> {
        let mut data = b"%PDF-1.7\n".to_vec();
        data.resize(len, b'x');
        data
    }

    #[test]
    fn test_validate_size_bounds() {
        let validator = PdfValidator::default();
        assert!(validator.validate_size(1024).is_ok());
        assert!(validator.validate_size(3 * 1024 * 1024).is_ok());

        let err = validator.validate_size(1023).unwrap_err();
        assert_eq!(err.to_string(), "file is too small (minimum 1 KB)");

        let err = validator.validate_size(3 * 1024 * 1024 + 1).unwrap_err();
        assert_eq!(err.to_string(), "file is too large (maximum 3 MB)");
        assert_eq!(err.stage(), "size");
    }

    #[test]
    fn test_validate_extension_case_insensitive() {
        let validator = PdfValidator::default();
        assert!(validator.validate_extension("report.pdf").is_ok());
        assert!(validator.validate_extension("REPORT.PDF").is_ok());
        assert!(validator.validate_extension("report.Pdf").is_ok());
    }

    #[test]
    fn test_validate_extension_rejects_others() {
        let validator = PdfValidator::default();

        let err = validator.validate_extension("report.docx").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid file extension: .docx (must be .pdf)"
        );

        let err = validator.validate_extension("report").unwrap_err();
        assert_eq!(err.to_string(), "invalid file extension:  (must be .pdf)");

        assert!(validator.validate_extension("report.pdf.exe").is_err());
    }

    #[tokio::test]
    async fn test_validate_magic_rewinds_on_success() {
        let validator = PdfValidator::default();
        let data = pdf_bytes(2048);
        let mut cursor = Cursor::new(data.clone());

        validator.validate_magic(&mut cursor).await.unwrap();

        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest, data);
    }

    #[tokio::test]
    async fn test_validate_magic_rewinds_on_failure() {
        let validator = PdfValidator::default();
        let data = vec![0x89, b'P', b'N', b'G', 0, 0, 0, 0];
        let mut cursor = Cursor::new(data);

        let err = validator.validate_magic(&mut cursor).await.unwrap_err();
        assert!(matches!(err, ValidationError::InvalidMagic));
        assert_eq!(
            err.to_string(),
            "file is not a valid PDF (invalid magic number)"
        );
        assert_eq!(cursor.position(), 0);
    }

    #[tokio::test]
    async fn test_short_stream_is_invalid_magic() {
        let validator = PdfValidator::default();
        let mut cursor = Cursor::new(b"%P".to_vec());
        assert!(matches!(
            validator.validate_magic(&mut cursor).await,
            Err(ValidationError::InvalidMagic)
        ));
    }

    #[tokio::test]
    async fn test_validate_runs_size_before_content() {
        let validator = PdfValidator::default();
        // Wrong magic and wrong extension, but size is checked first
        let mut cursor = Cursor::new(vec![0u8; 10]);
        let err = validator
            .validate("image.png", 10, &mut cursor)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "size");

        let mut cursor = Cursor::new(vec![0u8; 2048]);
        let err = validator
            .validate("image.png", 2048, &mut cursor)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "extension");

        let mut cursor = Cursor::new(vec![0u8; 2048]);
        let err = validator
            .validate("fake.pdf", 2048, &mut cursor)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "magic_number");
    }

    #[tokio::test]
    async fn test_validate_accepts_pdf() {
        let validator = PdfValidator::default();
        let data = pdf_bytes(4096);
        let mut cursor = Cursor::new(data);
        assert!(validator
            .validate("paper.PDF", 4096, &mut cursor)
            .await
            .is_ok());
    }
}
