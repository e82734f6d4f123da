//! Paginated list helper
//!
//! Listing every Ingress or Service of a large cluster in one response is
//! expensive for the API server, so lists are fetched in pages and the
//! `continue` token followed until it runs out.

use kube::Api;
use kube::api::ListParams;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::debug;

/// Objects requested per page
pub const LIST_PAGE_SIZE: u32 = 500;

/// List all objects of an API, following continue tokens
///
/// # Errors
///
/// Returns the first Kubernetes API error encountered.
pub async fn list_all_paginated<K>(api: &Api<K>, mut list_params: ListParams) -> Result<Vec<K>, kube::Error>
where
    K: Clone + DeserializeOwned + Debug,
{
    list_params.limit = Some(LIST_PAGE_SIZE);

    let mut all_items = Vec::new();
    let mut page_count = 0;

    loop {
        page_count += 1;
        let result = api.list(&list_params).await?;

        let item_count = result.items.len();
        all_items.extend(result.items);

        debug!(
            page = page_count,
            items_in_page = item_count,
            total_items = all_items.len(),
            "Fetched page from Kubernetes API"
        );

        match result.metadata.continue_ {
            Some(token) if !token.is_empty() => list_params.continue_token = Some(token),
            _ => break,
        }
    }

    Ok(all_items)
}
