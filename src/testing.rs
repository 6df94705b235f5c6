//! In-memory backends for unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::error::{BackendError, BackendResult};
use crate::identity::{DocumentList, DocumentQuery, Identity, IdentityBackend};
use crate::tracker::{
    parse_graph, AnalyticsBackend, AnalyticsPage, AnalyticsRecord, CreatedScript, GraphPoint,
    TrackEvent,
};

pub(crate) const GOOD_OAUTH_SECRET: &str = "good-secret";

/// Identity backend holding accounts, one session and script documents
#[derive(Default)]
pub(crate) struct FakeIdentity {
    accounts: Mutex<HashMap<String, (String, Identity)>>,
    session: Mutex<Option<Identity>>,
    documents: Mutex<Vec<serde_json::Value>>,
    account_failure: Mutex<Option<BackendError>>,
    calls: Mutex<Vec<String>>,
}

impl FakeIdentity {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_account(self: Arc<Self>, id: &str, email: &str, password: &str) -> Arc<Self> {
        let identity = Identity {
            id: id.to_string(),
            email: email.to_string(),
            name: String::new(),
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (password.to_string(), identity));
        self
    }

    pub(crate) fn sign_in(&self, email: &str) {
        let accounts = self.accounts.lock().unwrap();
        *self.session.lock().unwrap() = accounts.get(email).map(|(_, i)| i.clone());
    }

    pub(crate) fn fail_account_with(&self, err: BackendError) {
        *self.account_failure.lock().unwrap() = Some(err);
    }

    pub(crate) fn add_document(&self, doc: serde_json::Value) {
        self.documents.lock().unwrap().push(doc);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl IdentityBackend for FakeIdentity {
    async fn get_account(&self) -> BackendResult<Identity> {
        self.record("get_account");
        if let Some(err) = self.account_failure.lock().unwrap().take() {
            return Err(err);
        }
        self.session
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BackendError::api(401, "User (role: guests) missing scope (account)"))
    }

    async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> BackendResult<()> {
        self.record(format!("create_session:{}", email));
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some((stored, identity)) if stored == password => {
                *self.session.lock().unwrap() = Some(identity.clone());
                Ok(())
            }
            _ => Err(BackendError::Api {
                status: 401,
                code: Some("user_invalid_credentials".to_string()),
                message: "Invalid credentials. Please check the email and password.".to_string(),
            }),
        }
    }

    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> BackendResult<Identity> {
        self.record(format!("create_account:{}", email));
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(BackendError::Api {
                status: 409,
                code: Some("user_already_exists".to_string()),
                message: "A user with the same id, email, or phone already exists".to_string(),
            });
        }
        let identity = Identity {
            id: user_id.to_string(),
            email: email.to_string(),
            name: name.unwrap_or_default().to_string(),
        };
        accounts.insert(email.to_string(), (password.to_string(), identity.clone()));
        Ok(identity)
    }

    async fn delete_current_session(&self) -> BackendResult<()> {
        self.record("delete_session");
        match self.session.lock().unwrap().take() {
            Some(_) => Ok(()),
            None => Err(BackendError::api(401, "No session")),
        }
    }

    fn oauth_authorization_url(
        &self,
        provider: &str,
        success_url: &str,
        failure_url: &str,
    ) -> BackendResult<String> {
        Ok(format!(
            "https://identity.test/v1/account/tokens/oauth2/{}?success={}&failure={}",
            provider,
            urlencoding::encode(success_url),
            urlencoding::encode(failure_url)
        ))
    }

    async fn create_session_from_token(&self, user_id: &str, secret: &str) -> BackendResult<()> {
        self.record(format!("create_token_session:{}", user_id));
        if secret != GOOD_OAUTH_SECRET {
            return Err(BackendError::api(401, "Invalid token"));
        }
        let accounts = self.accounts.lock().unwrap();
        let identity = accounts
            .values()
            .map(|(_, i)| i)
            .find(|i| i.id == user_id)
            .cloned()
            .ok_or_else(|| BackendError::api(404, "User not found"))?;
        *self.session.lock().unwrap() = Some(identity);
        Ok(())
    }

    async fn create_recovery(&self, email: &str, redirect_url: &str) -> BackendResult<()> {
        self.record(format!("create_recovery:{}:{}", email, redirect_url));
        if self.accounts.lock().unwrap().contains_key(email) {
            Ok(())
        } else {
            Err(BackendError::api(404, "User with the requested ID could not be found."))
        }
    }

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[DocumentQuery],
    ) -> BackendResult<DocumentList> {
        self.record(format!("list_documents:{}:{}", database_id, collection_id));
        let documents: Vec<serde_json::Value> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|doc| queries.contains(&DocumentQuery::equal("userId", doc["userId"].clone())))
            .cloned()
            .collect();

        Ok(DocumentList {
            total: documents.len() as u64,
            documents,
        })
    }
}

/// Analytics backend with canned responses and optional gates that hold a
/// graph or table response until the test releases it
#[derive(Default)]
pub(crate) struct FakeTracker {
    identity: Option<Arc<FakeIdentity>>,
    records: Vec<AnalyticsRecord>,
    graphs: Mutex<HashMap<u32, serde_json::Value>>,
    gates: Mutex<HashMap<u32, oneshot::Receiver<()>>>,
    page_gates: Mutex<HashMap<u32, oneshot::Receiver<()>>>,
    failing: Mutex<bool>,
    next_id: Mutex<u32>,
    calls: Mutex<Vec<String>>,
}

impl FakeTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Created scripts are written as documents into this identity backend
    pub(crate) fn with_identity(mut self, identity: Arc<FakeIdentity>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub(crate) fn with_records(mut self, count: usize) -> Self {
        self.records = (0..count)
            .map(|i| AnalyticsRecord {
                script_id: Some("s-1".to_string()),
                ip_address: format!("203.0.113.{}", i),
                timestamp: "2025-03-04T10:00:00Z".to_string(),
                user_agent: "Mozilla/5.0".to_string(),
                city: None,
                latitude: None,
                longitude: None,
                page_views: Some(1),
            })
            .collect();
        self
    }

    pub(crate) fn with_graph(self, days: u32, body: serde_json::Value) -> Self {
        self.graphs.lock().unwrap().insert(days, body);
        self
    }

    /// Hold the next graph response for `days` until the returned sender fires
    pub(crate) fn gate(&self, days: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(days, rx);
        tx
    }

    /// Hold the next table response for `page` until the returned sender fires
    pub(crate) fn gate_page(&self, page: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.page_gates.lock().unwrap().insert(page, rx);
        tx
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failing(&self) -> BackendResult<()> {
        if *self.failing.lock().unwrap() {
            Err(BackendError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AnalyticsBackend for FakeTracker {
    async fn create_script(&self, owner_id: &str, name: &str) -> BackendResult<CreatedScript> {
        self.record(format!("create_script:{}:{}", owner_id, name));
        self.check_failing()?;

        let script_id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("script-{}", next)
        };
        let snippet = format!("<script src=\"https://t.test/{}.js\"></script>", script_id);

        if let Some(identity) = &self.identity {
            identity.add_document(serde_json::json!({
                "scriptId": script_id,
                "scriptName": name,
                "script": snippet,
                "userId": owner_id,
            }));
        }

        Ok(CreatedScript {
            script_id,
            snippet: Some(snippet),
            owner_id: owner_id.to_string(),
        })
    }

    async fn fetch_analytics(
        &self,
        script_id: &str,
        page: u32,
        limit: u32,
    ) -> BackendResult<AnalyticsPage> {
        self.record(format!("analytics:{}:{}:{}", script_id, page, limit));

        let gate = self.page_gates.lock().unwrap().remove(&page);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.check_failing()?;

        let start = (page.max(1) as usize - 1).saturating_mul(limit as usize);
        let documents = self
            .records
            .iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok(AnalyticsPage {
            documents,
            total: self.records.len() as u64,
        })
    }

    async fn fetch_graph(&self, script_id: &str, days: u32) -> BackendResult<Vec<GraphPoint>> {
        self.record(format!("graph:{}:{}", script_id, days));

        let gate = self.gates.lock().unwrap().remove(&days);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.check_failing()?;

        let body = self
            .graphs
            .lock()
            .unwrap()
            .get(&days)
            .cloned()
            .unwrap_or_else(|| serde_json::json!({ "graphData": [] }));

        parse_graph(body)
    }

    async fn track(&self, event: &TrackEvent) -> BackendResult<()> {
        self.record(format!("track:{}", event.script_id));
        self.check_failing()
    }
}
