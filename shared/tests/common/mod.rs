// ============================================================================
// Test doubles for the pipeline
// ============================================================================
//
// In-memory replacements for PostgreSQL and Kafka so the ingress processor,
// the delivery loop and the HTTP router can be exercised without
// infrastructure.
//
// ============================================================================

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chatline_config::AuthConfig;
use chatline_db::{MessageStore, StoreError, StoreResult};
use chatline_shared::auth::TokenVerifier;
use chatline_shared::context::AppContext;
use chatline_shared::ingress::IngressProcessor;
use chatline_shared::kafka::{
    DeliveryReceipt, MessagePublisher, RecordSource, TransportError, TransportRecord,
};
use chatline_types::{Message, MessageStatus};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub const TOPIC: &str = "messages";

// ============================================================================
// Store
// ============================================================================

#[derive(Default)]
pub struct InMemoryStore {
    conversations: Mutex<HashSet<Uuid>>,
    messages: Mutex<Vec<Message>>,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
}

fn unavailable() -> StoreError {
    StoreError::Database {
        context: "in-memory store unavailable",
        source: sqlx::Error::PoolTimedOut,
    }
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn conversation_count(&self) -> usize {
        self.conversations.lock().unwrap().len()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    pub fn seed(&self, message: Message) {
        self.conversations
            .lock()
            .unwrap()
            .insert(message.conversation_id);
        self.messages.lock().unwrap().push(message);
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn upsert_conversation(&self, conversation_id: Uuid) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.conversations.lock().unwrap().insert(conversation_id);
        Ok(())
    }

    async fn insert_message(&self, message: &Message) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut messages = self.messages.lock().unwrap();
        let duplicate = messages.iter().any(|m| {
            m.conversation_id == message.conversation_id && m.message_id == message.message_id
        });
        if duplicate {
            return Err(StoreError::Database {
                context: "duplicate message",
                source: sqlx::Error::Protocol("unique violation".to_string()),
            });
        }
        messages.push(message.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        conversation_id: Uuid,
        message_id: Uuid,
        status: MessageStatus,
    ) -> StoreResult<u64> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut messages = self.messages.lock().unwrap();
        let mut updated = 0;
        for m in messages.iter_mut().filter(|m| {
            m.conversation_id == conversation_id && m.message_id == message_id
        }) {
            if m.status == status || m.status.can_transition_to(status) {
                m.status = status;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn list_messages(&self, conversation_id: Uuid, limit: u32) -> StoreResult<Vec<Message>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut found: Vec<Message> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        found.sort_by_key(|m| m.created_at);
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn ping(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

// ============================================================================
// Publisher
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishBehavior {
    Ack,
    Fail,
    /// Never acknowledge; only cancellation ends the wait
    Hang,
}

pub struct ScriptedPublisher {
    behavior: PublishBehavior,
    published: Mutex<Vec<(String, Vec<u8>)>>,
}

impl ScriptedPublisher {
    pub fn new(behavior: PublishBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            published: Mutex::new(Vec::new()),
        })
    }

    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagePublisher for ScriptedPublisher {
    async fn publish(
        &self,
        key: &str,
        payload: Vec<u8>,
        cancel: &CancellationToken,
    ) -> Result<DeliveryReceipt, TransportError> {
        match self.behavior {
            PublishBehavior::Ack => {
                let mut published = self.published.lock().unwrap();
                published.push((key.to_string(), payload));
                Ok(DeliveryReceipt {
                    partition: 0,
                    offset: published.len() as i64 - 1,
                })
            }
            PublishBehavior::Fail => Err(TransportError::Delivery("broker down".to_string())),
            PublishBehavior::Hang => {
                cancel.cancelled().await;
                Err(TransportError::Cancelled)
            }
        }
    }
}

// ============================================================================
// Broker: both ends of a single-partition topic over a channel
// ============================================================================

pub struct ChannelBroker {
    sender: mpsc::UnboundedSender<TransportRecord>,
    receiver: tokio::sync::Mutex<mpsc::UnboundedReceiver<TransportRecord>>,
    next_offset: AtomicI64,
    acknowledged: Mutex<Vec<i64>>,
}

impl ChannelBroker {
    pub fn new() -> Arc<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        Arc::new(Self {
            sender,
            receiver: tokio::sync::Mutex::new(receiver),
            next_offset: AtomicI64::new(0),
            acknowledged: Mutex::new(Vec::new()),
        })
    }

    /// Put a raw record on the topic, bypassing the publisher
    pub fn push_raw(&self, key: &str, payload: &[u8]) -> i64 {
        let offset = self.next_offset.fetch_add(1, Ordering::SeqCst);
        let _ = self.sender.send(TransportRecord {
            topic: TOPIC.to_string(),
            partition: 0,
            offset,
            key: Some(key.to_string()),
            payload: payload.to_vec(),
        });
        offset
    }

    pub fn acknowledged(&self) -> Vec<i64> {
        self.acknowledged.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagePublisher for ChannelBroker {
    async fn publish(
        &self,
        key: &str,
        payload: Vec<u8>,
        cancel: &CancellationToken,
    ) -> Result<DeliveryReceipt, TransportError> {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        let offset = self.push_raw(key, &payload);
        Ok(DeliveryReceipt {
            partition: 0,
            offset,
        })
    }
}

#[async_trait]
impl RecordSource for ChannelBroker {
    async fn read(
        &self,
        wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<TransportRecord>, TransportError> {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        let mut receiver = self.receiver.lock().await;
        tokio::select! {
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            _ = tokio::time::sleep(wait) => Ok(None),
            record = receiver.recv() => Ok(record),
        }
    }

    fn acknowledge(&self, record: &TransportRecord) -> Result<(), TransportError> {
        self.acknowledged.lock().unwrap().push(record.offset);
        Ok(())
    }
}

// ============================================================================
// Scripted source: replays a fixed list of read results, then cancels
// ============================================================================

pub struct ScriptedSource {
    reads: Mutex<VecDeque<Result<Option<TransportRecord>, TransportError>>>,
    acknowledged: Mutex<Vec<i64>>,
    reads_served: Mutex<usize>,
    done: CancellationToken,
}

impl ScriptedSource {
    pub fn new(
        reads: Vec<Result<Option<TransportRecord>, TransportError>>,
        done: CancellationToken,
    ) -> Self {
        Self {
            reads: Mutex::new(reads.into()),
            acknowledged: Mutex::new(Vec::new()),
            reads_served: Mutex::new(0),
            done,
        }
    }

    pub fn acknowledged(&self) -> Vec<i64> {
        self.acknowledged.lock().unwrap().clone()
    }

    pub fn reads_served(&self) -> usize {
        *self.reads_served.lock().unwrap()
    }
}

#[async_trait]
impl RecordSource for ScriptedSource {
    async fn read(
        &self,
        _wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<TransportRecord>, TransportError> {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        let next = self.reads.lock().unwrap().pop_front();
        match next {
            Some(result) => {
                *self.reads_served.lock().unwrap() += 1;
                result
            }
            None => {
                self.done.cancel();
                Err(TransportError::Cancelled)
            }
        }
    }

    fn acknowledge(&self, record: &TransportRecord) -> Result<(), TransportError> {
        self.acknowledged.lock().unwrap().push(record.offset);
        Ok(())
    }
}

pub fn record(offset: i64, payload: &[u8]) -> TransportRecord {
    TransportRecord {
        topic: TOPIC.to_string(),
        partition: 0,
        offset,
        key: None,
        payload: payload.to_vec(),
    }
}

// ============================================================================
// HTTP
// ============================================================================

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "router-test-secret".to_string(),
        jwt_issuer: "chatline".to_string(),
        jwt_audience: "chatline".to_string(),
    }
}

pub fn bearer() -> String {
    let token = TokenVerifier::new(&auth_config())
        .issue("alice", 3600)
        .expect("Failed to issue test token");
    format!("Bearer {token}")
}

pub fn app_context(
    publisher: Arc<dyn MessagePublisher>,
    store: Arc<dyn MessageStore>,
    publish_timeout: Duration,
) -> Arc<AppContext> {
    let ingress = Arc::new(IngressProcessor::new(
        publisher,
        publish_timeout,
        CancellationToken::new(),
    ));
    let verifier = Arc::new(TokenVerifier::new(&auth_config()));
    Arc::new(AppContext::new(ingress, store, verifier))
}
