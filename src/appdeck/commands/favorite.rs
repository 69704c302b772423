use crate::commands::{label, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{EntryPatch, EntryRef};
use crate::store::EntryStore;

/// Flips the favorite flag. `current` skips the read when the caller already knows it.
pub async fn toggle<S: EntryStore + ?Sized>(
    store: &S,
    target: &EntryRef,
    current: Option<bool>,
) -> Result<CmdResult> {
    let current = match current {
        Some(flag) => flag,
        None => store.get(target).await?.is_favorite,
    };
    set(store, target, !current).await
}

pub async fn set<S: EntryStore + ?Sized>(
    store: &S,
    target: &EntryRef,
    is_favorite: bool,
) -> Result<CmdResult> {
    let updated = store.update(target, &EntryPatch::favorite(is_favorite)).await?;

    let mut result = CmdResult::default();
    let verb = if is_favorite {
        "Added to favorites"
    } else {
        "Removed from favorites"
    };
    result.add_message(CmdMessage::success(format!("{}: {}", verb, label(&updated))));
    result.affected_entries.push(updated);
    Ok(result)
}
