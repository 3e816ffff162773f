use crate::commands::{CmdMessage, CmdResult};
use crate::encode::DocumentEncoder;
use crate::error::Result;
use crate::preprocess::preprocess;
use crate::store::EntryStore;
use std::fs;
use std::path::Path;

/// Encode the document and write it to `path`, replacing any existing file.
pub fn run(store: &EntryStore, encoder: &DocumentEncoder, path: &Path) -> Result<CmdResult> {
    let text = encoder.encode(&preprocess(store.entries()))?;
    save_to_file(path, &text)?;

    let mut result = CmdResult::default().with_paths(vec![path.to_path_buf()]);
    result.add_message(CmdMessage::success(format!("Saved {}", path.display())));
    Ok(result.with_document(text))
}

/// Write `text` as UTF-8 without a byte order mark.
pub fn save_to_file(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text.as_bytes())?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "saved document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entry;
    use tempfile::tempdir;

    #[test]
    fn writes_utf8_without_bom() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut store = EntryStore::new();
        store.add(Entry::user("name", "ünï")).unwrap();

        let result = run(&store, &DocumentEncoder::compact(), &path).unwrap();
        assert_eq!(result.paths, vec![path.clone()]);

        let bytes = fs::read(&path).unwrap();
        assert!(!bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
        assert_eq!(String::from_utf8(bytes).unwrap(), "{\"name\": \"ünï\"}");
    }

    #[test]
    fn empty_document_writes_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.json");
        run(&EntryStore::new(), &DocumentEncoder::indented(4), &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no/such/dir/out.json");
        assert!(matches!(
            run(&EntryStore::new(), &DocumentEncoder::compact(), &path),
            Err(crate::error::AssemblerError::Io(_))
        ));
    }
}
