use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use matcher::DocumentMetadataProvider;
use rebuild::{DocumentRecord, DocumentSource, RebuildError};

/// Processing status of one submitted document, mirroring the lifecycle a
/// generation/ingestion pipeline would drive it through before it becomes
/// eligible for indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub project_name: String,
    pub code: String,
    pub status: OrderStatus,
}

/// In-process document store keyed by order id. Stands in for whatever
/// durable order/document table a real deployment has — the server only
/// ever reaches it through the [`DocumentMetadataProvider`] and
/// [`DocumentSource`] seams, so swapping this out for a real database
/// later touches nothing else.
#[derive(Default)]
pub struct OrderStore {
    orders: DashMap<u64, Order>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub fn get(&self, id: u64) -> Option<Order> {
        self.orders.get(&id).map(|r| r.clone())
    }
}

impl DocumentMetadataProvider for OrderStore {
    fn project_name(&self, doc_id: u64) -> Option<String> {
        self.orders.get(&doc_id).map(|o| o.project_name.clone())
    }
}

impl DocumentSource for OrderStore {
    fn fetch_batch(
        &self,
        after_id: u64,
        limit: usize,
        upto: Option<u64>,
    ) -> Result<Vec<DocumentRecord>, RebuildError> {
        let mut matches: Vec<Order> = self
            .orders
            .iter()
            .map(|r| r.value().clone())
            .filter(|o| {
                o.id > after_id
                    && upto.map_or(true, |u| o.id <= u)
                    && o.status == OrderStatus::Completed
            })
            .collect();
        matches.sort_by_key(|o| o.id);
        matches.truncate(limit);
        Ok(matches
            .into_iter()
            .map(|o| DocumentRecord { id: o.id, code: o.code })
            .collect())
    }

    fn high_water_mark(&self) -> Result<u64, RebuildError> {
        Ok(self.orders.iter().map(|r| r.id).max().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_name_is_looked_up_by_order_id() {
        let store = OrderStore::new();
        store.insert(Order { id: 1, project_name: "demo".into(), code: "x".into(), status: OrderStatus::Completed });
        assert_eq!(store.project_name(1), Some("demo".to_string()));
        assert_eq!(store.project_name(2), None);
    }

    #[test]
    fn fetch_batch_only_returns_completed_orders_in_range() {
        let store = OrderStore::new();
        store.insert(Order { id: 1, project_name: "a".into(), code: "x".into(), status: OrderStatus::Completed });
        store.insert(Order { id: 2, project_name: "b".into(), code: "y".into(), status: OrderStatus::Pending });
        store.insert(Order { id: 3, project_name: "c".into(), code: "z".into(), status: OrderStatus::Completed });

        let batch = store.fetch_batch(0, 10, None).unwrap();
        let ids: Vec<u64> = batch.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
