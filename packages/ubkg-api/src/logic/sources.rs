//! `/sources`

use serde_json::Value;

use super::{flatten_lists, query_column};
use crate::client::UbkgClient;
use crate::cypher::{Bindings, Fragment, Quote};
use crate::error::Result;

/// UBKG contexts a source can belong to.
pub const CONTEXTS: &[&str] = &["base_context", "data_distillery_context", "hubmap_sennet_context"];

/// Sources from the UBKGSOURCE ontology, filtered by SAB and context.
pub async fn sources(client: &UbkgClient, sabs: &[String], contexts: &[String]) -> Result<Vec<Value>> {
    let bindings = Bindings::new()
        .bind("sabfilter", Fragment::filter(" AND t.name IN", sabs, Quote::Single))
        .bind("contextfilter", Fragment::filter(" AND tContext.name IN", contexts, Quote::Single));
    let responses = query_column(client, "sources", "response", bindings).await?;
    let lists = responses
        .into_iter()
        .filter_map(|mut response| response.get_mut("sources").map(Value::take))
        .collect();
    Ok(flatten_lists(lists))
}
