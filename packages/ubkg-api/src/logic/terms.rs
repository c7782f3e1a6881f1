//! `/terms/{term_id}/...`

use super::query_models;
use crate::client::UbkgClient;
use crate::cypher::{Bindings, Fragment, Quote};
use crate::error::Result;
use crate::models::{TermConcept, TermtypeCode};

pub async fn term_codes(client: &UbkgClient, term_id: &str) -> Result<Vec<TermtypeCode>> {
    let bindings = Bindings::new().bind("term_id", Fragment::literal(term_id, Quote::Double));
    query_models(client, "terms_term_id_codes", bindings).await
}

pub async fn term_concepts(client: &UbkgClient, term_id: &str) -> Result<Vec<TermConcept>> {
    let bindings = Bindings::new().bind("term_id", Fragment::literal(term_id, Quote::Double));
    query_models(client, "terms_term_id_concepts", bindings).await
}
