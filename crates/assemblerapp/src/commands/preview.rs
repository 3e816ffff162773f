use crate::commands::CmdResult;
use crate::encode::DocumentEncoder;
use crate::error::Result;
use crate::preprocess::preprocess;
use crate::store::EntryStore;

/// Assemble and encode the document. An empty store previews as empty text.
pub fn run(store: &EntryStore, encoder: &DocumentEncoder) -> Result<CmdResult> {
    let document = preprocess(store.entries());
    let text = encoder.encode(&document)?;
    Ok(CmdResult::default().with_document(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entry;

    #[test]
    fn previews_document() {
        let mut store = EntryStore::new();
        store.add(Entry::user("a", 1i64)).unwrap();
        let result = run(&store, &DocumentEncoder::compact()).unwrap();
        assert_eq!(result.document.as_deref(), Some("{\"a\": 1}"));
    }

    #[test]
    fn empty_store_previews_empty_text() {
        let result = run(&EntryStore::new(), &DocumentEncoder::indented(4)).unwrap();
        assert_eq!(result.document.as_deref(), Some(""));
    }
}
