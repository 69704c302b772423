use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{EntryPatch, EntryRef};
use crate::store::EntryStore;
use chrono::{DateTime, Utc};

/// Records a launch and returns the URL to open.
///
/// Usage tracking is best effort: a failed read counts from zero and a failed write is
/// only logged. The launch itself only fails when the URL is unknown and the entry
/// cannot be read.
pub async fn run<S: EntryStore + ?Sized>(
    store: &S,
    target: &EntryRef,
    known_url: Option<&str>,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let (url, usage_count) = match store.get(target).await {
        Ok(entry) => (
            known_url.map(str::to_string).unwrap_or(entry.url),
            entry.usage_count,
        ),
        Err(err) => match known_url {
            Some(url) => {
                tracing::warn!(entry = %target, error = %err, "could not read usage count");
                (url.to_string(), 0)
            }
            None => return Err(err),
        },
    };

    let mut result = CmdResult::default();
    match store
        .update(target, &EntryPatch::usage(usage_count + 1, now))
        .await
    {
        Ok(updated) => result.affected_entries.push(updated),
        Err(err) => tracing::warn!(entry = %target, error = %err, "usage not recorded"),
    }

    result.add_message(CmdMessage::info(format!("Opening {}", url)));
    result.launch_url = Some(url);
    Ok(result)
}
