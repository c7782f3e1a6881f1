//! `/codes/{code_id}/...`

use serde_json::Value;

use super::{query_column, query_models};
use crate::client::UbkgClient;
use crate::cypher::{Bindings, Fragment, Quote};
use crate::error::Result;
use crate::models::{CodesCodesObj, ConceptDetail};

/// Codes sharing a concept with `code_id`, optionally restricted to `sabs`.
pub async fn code_codes(client: &UbkgClient, code_id: &str, sabs: &[String]) -> Result<Vec<CodesCodesObj>> {
    let bindings = Bindings::new()
        .bind("code_id", Fragment::literal(code_id, Quote::Single))
        .bind("sabfilter", Fragment::filter(" AND c.SAB IN", sabs, Quote::Single));
    query_models(client, "codes_code_id_codes", bindings).await
}

pub async fn code_concepts(client: &UbkgClient, code_id: &str) -> Result<Vec<ConceptDetail>> {
    let bindings = Bindings::new().bind("code_id", Fragment::literal(code_id, Quote::Single));
    query_models(client, "codes_code_id_concepts", bindings).await
}

/// Terms of a code grouped by term type. One matching code yields its
/// object; several yield a list of objects.
pub async fn code_terms(client: &UbkgClient, code_id: &str, term_types: &[String]) -> Result<Option<Value>> {
    let bindings = Bindings::new()
        .bind("code_id", Fragment::literal(code_id, Quote::Single))
        .bind("termtype_filter", Fragment::filter(" AND TYPE(r) IN", term_types, Quote::Single));
    let mut responses = query_column(client, "codes_code_id_terms", "response", bindings).await?;
    Ok(match responses.len() {
        0 => None,
        1 => responses.pop(),
        _ => Some(Value::Array(responses)),
    })
}
