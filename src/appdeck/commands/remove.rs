use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::EntryRef;
use crate::store::EntryStore;

pub async fn run<S: EntryStore + ?Sized>(
    store: &S,
    target: &EntryRef,
    name: Option<&str>,
) -> Result<CmdResult> {
    store.delete(target).await?;

    let mut result = CmdResult::default();
    let label = name
        .filter(|n| !n.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| target.to_string());
    result.add_message(CmdMessage::success(format!("Entry deleted: {}", label)));
    Ok(result)
}
