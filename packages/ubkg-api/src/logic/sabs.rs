//! `/sabs/...`

use serde_json::Value;

use super::{flatten_lists, query_column, with_positions};
use crate::client::UbkgClient;
use crate::cypher::{Bindings, Fragment, Quote};
use crate::error::Result;
use crate::params::Pagination;

pub async fn sabs(client: &UbkgClient) -> Result<Vec<Value>> {
    let values = query_column(client, "sabs", "sabs", Bindings::new()).await?;
    Ok(flatten_lists(values))
}

/// Code counts per SAB, or for one SAB, each with its position.
pub async fn code_counts(client: &UbkgClient, sab: Option<&str>, page: Pagination) -> Result<Vec<Value>> {
    let sabs: Vec<String> = sab.map(str::to_string).into_iter().collect();
    let bindings = Bindings::new()
        .bind("sabfilter", Fragment::filter(" AND c.SAB IN", &sabs, Quote::Single))
        .bind("skip", Fragment::integer(page.skip))
        .bind("limit", Fragment::integer(page.limit));
    let values = query_column(client, "sabs_codes_counts", "sabs", bindings).await?;
    Ok(with_positions(flatten_lists(values), page.first_position()))
}

/// Codes of a SAB with concept and preferred term, each with its position.
pub async fn code_details(client: &UbkgClient, sab: &str, page: Pagination) -> Result<Vec<Value>> {
    let outputs = query_column(client, "sabs_codes_details", "output", page_bindings(sab, page)).await?;
    let codes = outputs
        .into_iter()
        .filter_map(|mut output| output.get_mut("codes").map(Value::take))
        .collect();
    Ok(with_positions(flatten_lists(codes), page.first_position()))
}

/// Term types used by a SAB: `{sab, term_types}`.
pub async fn term_types(client: &UbkgClient, sab: &str, page: Pagination) -> Result<Option<Value>> {
    let mut outputs = query_column(client, "sabs_term_types", "output", page_bindings(sab, page)).await?;
    Ok(outputs.pop())
}

fn page_bindings(sab: &str, page: Pagination) -> Bindings {
    Bindings::new()
        .bind("sab", Fragment::list(&[sab.to_string()], Quote::Double))
        .bind("skip", Fragment::integer(page.skip))
        .bind("limit", Fragment::integer(page.limit))
}
