//! Page-number pagination over Management API list endpoints

use std::future::Future;

use auth0_core::Result;

/// One page of a list endpoint
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total reported by `include_totals=true`, when available
    pub total: Option<u32>,
}

/// Helper to collect all pages, starting at page 0.
///
/// Stops on a short or empty page, or once `total` items have been seen.
pub async fn collect_all_pages<T, F, Fut>(fetch_page: F, per_page: u32) -> Result<Vec<T>>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut all_items = Vec::new();
    let mut page = 0;

    loop {
        let response = fetch_page(page).await?;
        let received = response.items.len();
        all_items.extend(response.items);

        if received == 0 || received < per_page as usize {
            break;
        }
        if let Some(total) = response.total {
            if all_items.len() >= total as usize {
                break;
            }
        }

        page += 1;
    }

    Ok(all_items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collects_until_short_page() {
        let items = collect_all_pages(
            |page| async move {
                let items = match page {
                    0 => vec![1, 2],
                    1 => vec![3, 4],
                    _ => vec![5],
                };
                Ok(Page { items, total: None })
            },
            2,
        )
        .await
        .unwrap();
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_stops_at_total() {
        let items = collect_all_pages(
            |page| async move {
                Ok(Page {
                    items: vec![page * 2, page * 2 + 1],
                    total: Some(4),
                })
            },
            2,
        )
        .await
        .unwrap();
        assert_eq!(items, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_propagates_errors() {
        let result: Result<Vec<u32>> = collect_all_pages(
            |_| async { Err(auth0_core::Auth0Error::api(500, "boom")) },
            2,
        )
        .await;
        assert!(result.is_err());
    }
}
