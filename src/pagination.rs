use reqwest::Method;
use serde_json::Value;

use crate::client::Client;
use crate::context::ClientContext;
use crate::descriptor::Operation;
use crate::error::{Result, UsageError};
use crate::path::Args;
use crate::transport::{Call, Target};

/// Query parameter selecting a page.
pub const PAGE: &str = "page";
/// Query parameter setting the page size.
pub const PAGE_SIZE: &str = "pageSize";

/// How a collection is fetched.
///
/// By default every page the server reports is fetched and the results concatenated in
/// order. Requesting a specific page turns following off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub follow_pages: bool,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            follow_pages: true,
            page: None,
            page_size: None,
        }
    }
}

impl Paging {
    /// Follow every page.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Only the first page, whatever the page count says.
    #[must_use]
    pub fn first_page() -> Self {
        Self {
            follow_pages: false,
            ..Self::default()
        }
    }

    /// Exactly page `page` (zero-based).
    #[must_use]
    pub fn page(page: u32) -> Self {
        Self {
            follow_pages: false,
            page: Some(page),
            page_size: None,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn validate(&self) -> std::result::Result<(), UsageError> {
        if self.follow_pages && self.page.is_some() {
            return Err(UsageError::ConflictingPagination);
        }
        Ok(())
    }
}

impl Client {
    /// Fetches a collection, following the page count header when asked to, and returns the
    /// raw items of every page in server order.
    #[instrument(skip(self, args, context))]
    pub(crate) async fn fetch_pages(
        &self,
        template: &'static str,
        mut args: Args,
        context: ClientContext,
        paging: Paging,
    ) -> Result<Vec<Value>> {
        paging.validate()?;
        if paging.follow_pages && args.contains(PAGE) {
            return Err(UsageError::ConflictingPagination.into());
        }
        if let Some(page_size) = paging.page_size {
            args.insert(PAGE_SIZE, page_size);
        }
        if let Some(page) = paging.page {
            args.insert(PAGE, page);
        }

        let page_call = |args: Args| {
            Call::new(
                Method::GET,
                Operation::GetMany,
                Target::Template(template),
                context.clone(),
            )
            .args(args)
        };

        let first = self.execute(page_call(args.clone())).await?;
        let mut items: Vec<Value> = first.json()?;

        if paging.follow_pages
            && let Some(page_count) = first.page_count()
            && page_count > 1
        {
            debug!(page_count, "multiple pages found, fetching the rest");
            for page in 1..page_count {
                let response = self
                    .execute(page_call(args.clone().with(PAGE, page)))
                    .await?;
                items.extend(response.json::<Vec<Value>>()?);
            }
        }

        trace!(count = items.len(), "collected items");
        Ok(items)
    }
}
