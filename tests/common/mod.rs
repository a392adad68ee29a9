#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{Duration, Instant};

use voltport::entities::{Credential, Identity};
use voltport::gateway::{Ack, CollectionQuery, Created, Gateway, GatewayError, ResourceKind};
use voltport::notifications::Notifier;
use voltport::session::{AuthError, FederatedCredential, IdentityProvider, IssuedToken, SessionHandle, SessionStore};

pub const PASSWORD: &str = "Secret1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    List,
    Get,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub op: Op,
    pub kind: ResourceKind,
    pub query: Option<CollectionQuery>,
    pub id: Option<String>,
    pub payload: Option<Value>,
    pub authenticated: bool,
    pub at: Instant,
}

/// In-memory gateway recording every call.
///
/// Collections and search results are canned; delays let tests control the
/// order in which responses arrive.
#[derive(Default)]
pub struct MockGateway {
    calls: Mutex<Vec<Call>>,
    collections: Mutex<HashMap<ResourceKind, Vec<Value>>>,
    search_results: Mutex<HashMap<String, Vec<Value>>>,
    search_delays: Mutex<HashMap<String, Duration>>,
    mutation_delays: Mutex<VecDeque<Duration>>,
    failure: Mutex<Option<GatewayError>>,
    next_id: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_collection(&self, kind: ResourceKind, items: Vec<Value>) {
        self.collections.lock().unwrap().insert(kind, items);
    }

    pub fn set_search_results(&self, term: &str, items: Vec<Value>) {
        self.search_results.lock().unwrap().insert(term.to_string(), items);
    }

    /// Delay before answering a search for `term` ("" for the unfiltered listing)
    pub fn set_search_delay(&self, term: &str, delay: Duration) {
        self.search_delays.lock().unwrap().insert(term.to_string(), delay);
    }

    /// Queue delays consumed one per create/update/delete call
    pub fn push_mutation_delay(&self, delay: Duration) {
        self.mutation_delays.lock().unwrap().push_back(delay);
    }

    pub fn fail_with(&self, error: GatewayError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn recover(&self) {
        self.failure.lock().unwrap().take();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_of(&self, op: Op) -> Vec<Call> {
        self.calls().into_iter().filter(|call| call.op == op).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, op: Op, kind: ResourceKind, query: Option<&CollectionQuery>, id: Option<&str>, payload: Option<&Value>, authenticated: bool) {
        self.calls.lock().unwrap().push(Call {
            op,
            kind,
            query: query.cloned(),
            id: id.map(str::to_string),
            payload: payload.cloned(),
            authenticated,
            at: Instant::now(),
        });
    }

    fn check_failure(&self) -> Result<(), GatewayError> {
        match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn mutation_delay(&self) {
        let delay = self.mutation_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn entity_id(value: &Value) -> Option<String> {
    value
        .get("_id")
        .or_else(|| value.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl Gateway for MockGateway {
    async fn fetch_collection(
        &self,
        kind: ResourceKind,
        query: &CollectionQuery,
        credential: Option<&Credential>,
    ) -> Result<Vec<Value>, GatewayError> {
        self.record(Op::List, kind, Some(query), None, None, credential.is_some());

        let term = query.search.clone().unwrap_or_default();
        let delay = self.search_delays.lock().unwrap().get(&term).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_failure()?;

        let items = match &query.search {
            Some(term) => self.search_results.lock().unwrap().get(term).cloned(),
            None => self.collections.lock().unwrap().get(&kind).cloned(),
        };
        Ok(items.unwrap_or_default())
    }

    async fn fetch_one(
        &self,
        kind: ResourceKind,
        id: &str,
        credential: Option<&Credential>,
    ) -> Result<Value, GatewayError> {
        self.record(Op::Get, kind, None, Some(id), None, credential.is_some());
        self.check_failure()?;

        self.collections
            .lock()
            .unwrap()
            .get(&kind)
            .and_then(|items| items.iter().find(|item| entity_id(item).as_deref() == Some(id)).cloned())
            .ok_or_else(|| GatewayError::Rejected {
                status: Some(404),
                message: "Not found".to_string(),
            })
    }

    async fn create_entity(
        &self,
        kind: ResourceKind,
        payload: &Value,
        _credential: &Credential,
    ) -> Result<Created, GatewayError> {
        self.record(Op::Create, kind, None, None, Some(payload), true);
        self.mutation_delay().await;
        self.check_failure()?;

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Created {
            id: format!("new-{n}"),
        })
    }

    async fn update_entity(
        &self,
        kind: ResourceKind,
        id: &str,
        payload: &Value,
        _credential: &Credential,
    ) -> Result<Ack, GatewayError> {
        self.record(Op::Update, kind, None, Some(id), Some(payload), true);
        self.mutation_delay().await;
        self.check_failure()?;
        Ok(Ack)
    }

    async fn delete_entity(&self, kind: ResourceKind, id: &str, _credential: &Credential) -> Result<Ack, GatewayError> {
        self.record(Op::Delete, kind, None, Some(id), None, true);
        self.mutation_delay().await;
        self.check_failure()?;
        Ok(Ack)
    }
}

/// Identity provider accepting [`PASSWORD`] for any email
#[derive(Default)]
pub struct MockIdentityProvider {
    current: Mutex<Option<Identity>>,
    refresh_next: AtomicBool,
    reject_token: AtomicBool,
    pub provider_calls: AtomicUsize,
}

impl MockIdentityProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn signed_in(email: &str) -> Arc<Self> {
        let provider = Self::default();
        *provider.current.lock().unwrap() = Some(identity(email));
        Arc::new(provider)
    }

    /// The next `id_token` call reports a refresh
    pub fn refresh_on_next_token(&self) {
        self.refresh_next.store(true, Ordering::SeqCst);
    }

    /// `id_token` fails as if the refresh token was revoked
    pub fn revoke_tokens(&self) {
        self.reject_token.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.provider_calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.provider_calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn identity(email: &str) -> Identity {
    Identity {
        uid: format!("uid-{}", email.split('@').next().unwrap_or_default()),
        email: email.to_string(),
        display_name: None,
        photo_url: None,
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn create_account(&self, email: &str, _password: &str) -> Result<Identity, AuthError> {
        self.touch();
        if email.starts_with("taken") {
            return Err(AuthError::AlreadyInUse);
        }
        let created = identity(email);
        *self.current.lock().unwrap() = Some(created.clone());
        Ok(created)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.touch();
        if password != PASSWORD {
            return Err(AuthError::InvalidCredential);
        }
        let signed_in = identity(email);
        *self.current.lock().unwrap() = Some(signed_in.clone());
        Ok(signed_in)
    }

    async fn sign_in_with_federated(&self, _credential: &FederatedCredential) -> Result<Identity, AuthError> {
        self.touch();
        let signed_in = identity("federated@example.com");
        *self.current.lock().unwrap() = Some(signed_in.clone());
        Ok(signed_in)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.touch();
        self.current.lock().unwrap().take();
        Ok(())
    }

    async fn update_profile(&self, display_name: Option<&str>, photo_url: Option<&str>) -> Result<Identity, AuthError> {
        self.touch();
        let mut current = self.current.lock().unwrap();
        let identity = current.as_mut().ok_or(AuthError::NotSignedIn)?;
        if let Some(name) = display_name {
            identity.display_name = Some(name.to_string());
        }
        if let Some(url) = photo_url {
            identity.photo_url = Some(url.to_string());
        }
        Ok(identity.clone())
    }

    async fn id_token(&self) -> Result<IssuedToken, AuthError> {
        if self.reject_token.load(Ordering::SeqCst) {
            return Err(AuthError::InvalidCredential);
        }
        let uid = self
            .current
            .lock()
            .unwrap()
            .as_ref()
            .map(|identity| identity.uid.clone())
            .ok_or(AuthError::NotSignedIn)?;
        Ok(IssuedToken {
            credential: Credential::new(format!("token-{uid}")),
            refreshed: self.refresh_next.swap(false, Ordering::SeqCst),
        })
    }
}

/// Session restored from a provider already signed in as `email`
pub async fn signed_in_session(email: &str) -> (SessionStore, SessionHandle) {
    let store = SessionStore::new(MockIdentityProvider::signed_in(email), Notifier::new());
    store.restore().await;
    let handle = store.handle();
    (store, handle)
}

pub async fn signed_out_session() -> (SessionStore, SessionHandle) {
    let store = SessionStore::new(MockIdentityProvider::new(), Notifier::new());
    store.restore().await;
    let handle = store.handle();
    (store, handle)
}

pub fn product_json(id: &str, name: &str, available: u32, exporter: &str) -> Value {
    json!({
        "_id": id,
        "productName": name,
        "productImage": format!("https://img.example.com/{id}.png"),
        "price": 42000,
        "originCountry": "Norway",
        "rating": 4.5,
        "availableQuantity": available,
        "exporterEmail": exporter,
        "createdAt": "2025-03-01T10:00:00Z"
    })
}

pub fn import_json(id: &str, product_id: &str, quantity: u32, importer: &str) -> Value {
    json!({
        "_id": id,
        "productId": product_id,
        "productName": "Model 3",
        "productImage": "https://img.example.com/model3.png",
        "price": 39990,
        "originCountry": "USA",
        "rating": 4.7,
        "importedQuantity": quantity,
        "importerEmail": importer
    })
}
