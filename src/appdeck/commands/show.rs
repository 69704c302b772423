use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::EntryRef;
use crate::store::EntryStore;

pub async fn run<S: EntryStore + ?Sized>(store: &S, target: &EntryRef) -> Result<CmdResult> {
    let entry = store.get(target).await?;
    Ok(CmdResult::default().with_affected_entries(vec![entry]))
}
