//! File acceptance: the one uploaded file the dashboard works from.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::Path;
use storeviz_cli::FileFormat;

/// Label shown on the upload prompt
pub const UPLOAD_LABEL: &str = "Upload CSV or Excel file";
/// Shown while nothing has been uploaded
pub const NO_FILE_MESSAGE: &str = "Please upload a CSV or Excel file to begin.";

/// Raw bytes of an uploaded file plus the name it was uploaded under.
///
/// Replaced wholesale by the next upload; nothing else holds on to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, rejecting extensions other than `.csv` and `.xlsx`.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !is_accepted_extension(path) {
            return Err(eyre!(
                "Unsupported file type: {}. Accepted types: {}",
                path.display(),
                accepted_types()
            ));
        }
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        tracing::info!(file = %name, bytes = bytes.len(), "upload accepted");
        Ok(Self::from_bytes(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Format the loader will try. Anything that is not `.csv` goes to the spreadsheet parser.
    pub fn format(&self) -> FileFormat {
        match FileFormat::from_path(Path::new(&self.name)) {
            Some(FileFormat::Csv) => FileFormat::Csv,
            _ => FileFormat::Excel,
        }
    }
}

/// Accept one file from the upload prompt.
pub fn accept(path: &Path) -> Result<UploadedFile> {
    UploadedFile::from_path(path).inspect_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "upload rejected");
    })
}

/// True for the extensions the file picker allows.
pub fn is_accepted_extension(path: &Path) -> bool {
    FileFormat::from_path(path).is_some()
}

fn accepted_types() -> String {
    FileFormat::accepted_extensions()
        .iter()
        .map(|e| format!(".{e}"))
        .collect::<Vec<_>>()
        .join(", ")
}
