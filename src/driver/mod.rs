//! Page driver: the browsing capability consumed by the traversal engine.
//!
//! The engine never inspects markup; everything it knows about the site
//! arrives through this interface. The concrete implementation drives a
//! headless Chromium via chromiumoxide; tests script a mock instead.

pub mod browser;
pub mod pinboard;

use anyhow::Result;

use crate::config::SortStrategy;
use crate::engine::types::ItemStub;

/// Abstract browsing operations over the content-discovery site.
///
/// Every operation is individually blocking with a bounded timeout; a
/// timeout surfaces as an `Err` and is routed into the engine's failure
/// recovery, never propagated as fatal.
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    /// Open a fresh seed search view for the query
    async fn open_seed_view(&mut self, query: &str, sort: SortStrategy) -> Result<()>;

    /// Scroll the current view to trigger lazy loading; returns how many
    /// items became newly visible
    async fn load_more(&mut self) -> Result<usize>;

    /// Item stubs currently visible, deduplicated by image address
    async fn list_visible_items(&mut self) -> Result<Vec<ItemStub>>;

    /// Navigate to a detail view, structured interaction first, direct
    /// address load as fallback
    async fn navigate_to(&mut self, url: &str) -> Result<()>;

    /// Popularity score of the currently open detail view
    async fn current_item_score(&mut self) -> Result<u64>;

    /// Related-item recommendations of the currently open detail view
    async fn current_item_related_items(&mut self) -> Result<Vec<ItemStub>>;

    /// Tear the browser session down and bring up a fresh one
    async fn restart_session(&mut self) -> Result<()>;

    /// Close the browser session for good
    async fn close_session(&mut self) -> Result<()>;
}
