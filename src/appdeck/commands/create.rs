use crate::commands::{label, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{Collection, EntryDraft};
use crate::store::EntryStore;

/// Validates, then registers a new entry. Nothing is sent when validation fails.
pub async fn run<S: EntryStore + ?Sized>(
    store: &S,
    collection: Collection,
    draft: &EntryDraft,
) -> Result<CmdResult> {
    draft.validate()?;
    let created = store.create(collection, draft).await?;
    tracing::debug!(entry = %created.entry_ref(), "entry created");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Entry registered: {}",
        label(&created)
    )));
    result.affected_entries.push(created);
    Ok(result)
}
