use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const MIME_UNKNOWN: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

/// A file the user picked, before it is validated.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub source: FileSource,
}

impl FileCandidate {
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            mime_type: mime_type.into(),
            source: FileSource::Memory(bytes),
        }
    }

    /// Reads size and name from the file system, the MIME type is guessed from
    /// the extension.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(ErrorKind::InvalidInput, "not a regular file"));
        }
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "file name is not valid UTF-8"))?
            .to_string();

        Ok(Self {
            mime_type: mime_from_name(&name).to_string(),
            name,
            size_bytes: metadata.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == MIME_PDF
    }

    pub async fn read_bytes(&self) -> io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => tokio::fs::read(path).await,
            FileSource::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }
}

pub fn mime_from_name(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => MIME_PDF,
        Some("docx") => MIME_DOCX,
        Some("doc") => "application/msword",
        Some("txt") => "text/plain",
        Some("rtf") => "application/rtf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => MIME_UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn mime_is_guessed_from_extension() {
        assert_eq!(mime_from_name("cv.PDF"), MIME_PDF);
        assert_eq!(mime_from_name("cv.docx"), MIME_DOCX);
        assert_eq!(mime_from_name("notes.txt"), "text/plain");
        assert_eq!(mime_from_name("README"), MIME_UNKNOWN);
    }

    #[test]
    fn from_path_reads_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jane_doe.pdf");
        fs::File::create(&path).unwrap().write_all(b"%PDF-1.7").unwrap();

        let candidate = FileCandidate::from_path(&path).unwrap();
        assert_eq!(candidate.name, "jane_doe.pdf");
        assert_eq!(candidate.size_bytes, 8);
        assert!(candidate.is_pdf());

        assert!(FileCandidate::from_path(dir.path()).is_err());
        assert!(FileCandidate::from_path(dir.path().join("missing.pdf")).is_err());
    }

    #[tokio::test]
    async fn read_bytes_from_both_sources() {
        let memory = FileCandidate::from_bytes("a.pdf", MIME_PDF, b"abc".to_vec());
        assert_eq!(memory.read_bytes().await.unwrap(), b"abc");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.docx");
        fs::write(&path, b"docx").unwrap();
        let on_disk = FileCandidate::from_path(&path).unwrap();
        assert_eq!(on_disk.read_bytes().await.unwrap(), b"docx");
    }
}
