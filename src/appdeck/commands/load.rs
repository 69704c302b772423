use crate::aggregate::aggregate_or_fallback;
use crate::arrange::{arrange, EntryFilter};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::render::FilterSummary;
use crate::store::{EntryStore, ListQuery};

pub async fn run<S: EntryStore + ?Sized>(
    store: &S,
    query: &ListQuery,
    filter: &EntryFilter,
) -> Result<CmdResult> {
    let aggregation = aggregate_or_fallback(store, query).await?;
    let mut result = CmdResult::default();

    if aggregation.fallback {
        result.add_message(CmdMessage::warning(
            "Only the general collection could be loaded",
        ));
    } else {
        for failure in &aggregation.failures {
            result.add_message(CmdMessage::warning(format!(
                "Could not load {}",
                failure
            )));
        }
    }

    let total = aggregation.entries.len();
    let listed = arrange(aggregation.entries, filter);
    let summary = FilterSummary {
        total,
        shown: listed.len(),
        search_term: filter.search_term().to_string(),
        category: filter.category_name().map(str::to_string),
    };

    Ok(result.with_listed_entries(listed).with_summary(summary))
}
