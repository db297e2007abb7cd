use async_trait::async_trait;
use crawlgraph::domain::models::change_event::{ChangeKind, LinkChangeEvent};
use crawlgraph::domain::models::link_relationship::LinkRelationship;
use crawlgraph::domain::models::subscription::Subscription;
use crawlgraph::domain::repositories::change_feed_repository::ChangeFeedRepository;
use crawlgraph::domain::repositories::link_relationship_repository::{
    LinkRelationshipRepository, RepositoryError,
};
use crawlgraph::domain::repositories::subscription_repository::SubscriptionRepository;
use sea_orm::DbErr;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

fn unavailable() -> RepositoryError {
    RepositoryError::Database(DbErr::Custom("store unavailable".to_string()))
}

#[derive(Default)]
struct FeedState {
    next_sequence: i64,
    events: Vec<(LinkChangeEvent, bool)>,
}

/// 内存中的爬取状态存储，每次写入都会追加一条变更事件
#[derive(Default)]
pub struct MemoryRelationshipStore {
    records: Mutex<HashMap<(String, String), LinkRelationship>>,
    feed: Mutex<FeedState>,
    unavailable: AtomicBool,
}

impl MemoryRelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn get(&self, crawl_id: &str, parent_url: &str) -> Option<LinkRelationship> {
        self.records
            .lock()
            .unwrap()
            .get(&(crawl_id.to_string(), parent_url.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn pending_events(&self) -> usize {
        self.feed
            .lock()
            .unwrap()
            .events
            .iter()
            .filter(|(_, acked)| !acked)
            .count()
    }

    fn append(&self, kind: ChangeKind, relationship: &LinkRelationship) {
        let mut feed = self.feed.lock().unwrap();
        feed.next_sequence += 1;
        let event = LinkChangeEvent {
            sequence: feed.next_sequence,
            kind,
            new_image: Some(relationship.clone()),
        };
        feed.events.push((event, false));
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LinkRelationshipRepository for MemoryRelationshipStore {
    async fn find(
        &self,
        crawl_id: &str,
        parent_url: &str,
    ) -> Result<Option<LinkRelationship>, RepositoryError> {
        self.check()?;
        Ok(self.get(crawl_id, parent_url))
    }

    async fn save(&self, relationship: &LinkRelationship) -> Result<(), RepositoryError> {
        self.check()?;
        let key = (
            relationship.crawl_id.clone(),
            relationship.parent_url.clone(),
        );
        let previous = self
            .records
            .lock()
            .unwrap()
            .insert(key, relationship.clone());
        let kind = if previous.is_some() {
            ChangeKind::Modify
        } else {
            ChangeKind::Insert
        };
        self.append(kind, relationship);
        Ok(())
    }

    async fn insert_if_absent(
        &self,
        relationship: &LinkRelationship,
    ) -> Result<bool, RepositoryError> {
        self.check()?;
        let key = (
            relationship.crawl_id.clone(),
            relationship.parent_url.clone(),
        );
        {
            let mut records = self.records.lock().unwrap();
            if records.contains_key(&key) {
                return Ok(false);
            }
            records.insert(key, relationship.clone());
        }
        self.append(ChangeKind::Insert, relationship);
        Ok(true)
    }
}

#[async_trait]
impl ChangeFeedRepository for MemoryRelationshipStore {
    async fn fetch_pending(&self, limit: u64) -> Result<Vec<LinkChangeEvent>, RepositoryError> {
        Ok(self
            .feed
            .lock()
            .unwrap()
            .events
            .iter()
            .filter(|(_, acked)| !acked)
            .take(limit as usize)
            .map(|(event, _)| event.clone())
            .collect())
    }

    async fn acknowledge(&self, sequence: i64) -> Result<(), RepositoryError> {
        let mut feed = self.feed.lock().unwrap();
        if let Some((_, acked)) = feed
            .events
            .iter_mut()
            .find(|(event, _)| event.sequence == sequence)
        {
            *acked = true;
        }
        Ok(())
    }
}

/// 内存中的订阅注册表
#[derive(Default)]
pub struct MemorySubscriptionStore {
    by_connection: Mutex<BTreeMap<String, Subscription>>,
    unavailable: AtomicBool,
}

impl MemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn connection_ids(&self) -> Vec<String> {
        self.by_connection.lock().unwrap().keys().cloned().collect()
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SubscriptionRepository for MemorySubscriptionStore {
    async fn put(&self, subscription: &Subscription) -> Result<(), RepositoryError> {
        self.check()?;
        self.by_connection
            .lock()
            .unwrap()
            .insert(subscription.connection_id.clone(), subscription.clone());
        Ok(())
    }

    async fn delete_by_connection_and_crawl(
        &self,
        connection_id: &str,
        crawl_id: &str,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        let mut by_connection = self.by_connection.lock().unwrap();
        if by_connection
            .get(connection_id)
            .is_some_and(|s| s.crawl_id == crawl_id)
        {
            by_connection.remove(connection_id);
        }
        Ok(())
    }

    async fn delete_by_connection(&self, connection_id: &str) -> Result<(), RepositoryError> {
        self.check()?;
        self.by_connection.lock().unwrap().remove(connection_id);
        Ok(())
    }

    async fn query_by_crawl_id_page(
        &self,
        crawl_id: &str,
        after: Option<String>,
        limit: u64,
    ) -> Result<Vec<Subscription>, RepositoryError> {
        self.check()?;
        Ok(self
            .by_connection
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.crawl_id == crawl_id)
            .filter(|s| after.as_ref().map_or(true, |a| s.connection_id > *a))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
