use crate::commands::{label, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{EntryDraft, EntryRef};
use crate::store::EntryStore;

/// Replaces every editable field of an existing entry.
pub async fn run<S: EntryStore + ?Sized>(
    store: &S,
    target: &EntryRef,
    draft: &EntryDraft,
) -> Result<CmdResult> {
    draft.validate()?;
    let updated = store.replace(target, draft).await?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Entry updated: {}",
        label(&updated)
    )));
    result.affected_entries.push(updated);
    Ok(result)
}
