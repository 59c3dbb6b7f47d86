// tests/size_limits.rs
mod common;

use std::sync::Arc;

use common::{adapter, all_fixtures, config};
use universal_widget::registry::registered_sources;
use universal_widget::SizeClass;

#[tokio::test]
async fn no_collection_exceeds_its_size_budget() {
    let t = Arc::new(all_fixtures());
    let cfg = config();

    for id in registered_sources() {
        let src = adapter(id, &t);
        for size in SizeClass::ALL {
            let max = cfg.profile(size).max_items;
            // imdb shares the budget between two lists
            let budget = if id == "imdb" { max.div_ceil(2) } else { max };

            let data = src.fetch_data(size).await.unwrap_or_else(|e| panic!("{id}/{size}: {e}"));
            assert!(!data.is_empty(), "{id}/{size} fixture should not be empty");
            for c in &data.collections {
                assert!(
                    c.items.len() <= budget,
                    "{id}/{size}/{}: {} > {budget}",
                    c.key,
                    c.items.len()
                );
            }
        }
    }
}
