// next_token pagination shared by the list operations

use awskeeper_core::ServiceError;
use std::future::Future;

/// Fetch pages until the service stops returning a continuation token.
///
/// `fetch_page` receives the token of the page to fetch (`None` for the first
/// page) and returns that page's names with the next token. An empty token
/// ends the listing the same way a missing one does.
pub(crate) async fn collect_pages<F, Fut>(mut fetch_page: F) -> Result<Vec<String>, ServiceError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<(Vec<String>, Option<String>), ServiceError>>,
{
    let mut names = Vec::new();
    let mut next_token = None;
    loop {
        let (page, token) = fetch_page(next_token.take()).await?;
        names.extend(page);
        match token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => return Ok(names),
        }
    }
}
