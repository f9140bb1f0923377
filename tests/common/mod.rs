//! Shared test fixtures: an in-memory storage harness and a scripted
//! remote service.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tasksync::network::StaticNetworkMonitor;
use tasksync::remote::{RemoteError, RemoteResult, RemoteService, TodoDto};
use tasksync::storage::LocalStorage;
use tasksync::sync::SyncService;

/// Scripted in-memory stand-in for the remote task service.
///
/// Records every call, assigns `server-N` ids to uploads, and serves a
/// configurable list of remote changes. Individual endpoints can be made
/// to fail, and an artificial delay can be added to observe in-flight
/// passes.
pub struct MockRemote {
    state: StdMutex<MockState>,
    delay: StdMutex<Option<Duration>>,
}

#[derive(Default)]
struct MockState {
    next_id: u64,
    remote_changes: Vec<TodoDto>,
    fail_batch: bool,
    fail_delete: bool,
    calls: Vec<String>,
    batch_sizes: Vec<usize>,
    deleted: Vec<String>,
}

impl MockRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: StdMutex::new(MockState::default()),
            delay: StdMutex::new(None),
        })
    }

    /// Serve this record from the delta endpoint.
    pub fn add_remote_change(&self, dto: TodoDto) {
        self.state.lock().unwrap().remote_changes.push(dto);
    }

    /// Drop every scripted remote change.
    pub fn clear_remote_changes(&self) {
        self.state.lock().unwrap().remote_changes.clear();
    }

    /// Sleep this long inside every endpoint before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_batch(&self) {
        self.state.lock().unwrap().fail_batch = true;
    }

    pub fn fail_delete(&self) {
        self.state.lock().unwrap().fail_delete = true;
    }

    /// Names of every endpoint hit, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Payload size of each batch-upsert request.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.state.lock().unwrap().batch_sizes.clone()
    }

    /// Remote ids the client asked to delete.
    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn record(&self, call: &str) {
        self.state.lock().unwrap().calls.push(call.to_string());
    }

    fn assign_id(state: &mut MockState) -> String {
        state.next_id += 1;
        format!("server-{}", state.next_id)
    }
}

#[async_trait]
impl RemoteService for MockRemote {
    async fn list_todos(&self) -> RemoteResult<Vec<TodoDto>> {
        self.pause().await;
        self.record("list_todos");
        Ok(self.state.lock().unwrap().remote_changes.clone())
    }

    async fn get_todo(&self, id: &str) -> RemoteResult<TodoDto> {
        self.pause().await;
        self.record("get_todo");
        self.state
            .lock()
            .unwrap()
            .remote_changes
            .iter()
            .find(|dto| dto.id.as_deref() == Some(id))
            .cloned()
            .ok_or(RemoteError::Status {
                status: 404,
                body: String::new(),
            })
    }

    async fn create_todo(&self, todo: &TodoDto) -> RemoteResult<TodoDto> {
        self.pause().await;
        self.record("create_todo");
        let mut state = self.state.lock().unwrap();
        let mut created = todo.clone();
        created.id = Some(Self::assign_id(&mut state));
        Ok(created)
    }

    async fn update_todo(&self, id: &str, todo: &TodoDto) -> RemoteResult<TodoDto> {
        self.pause().await;
        self.record("update_todo");
        let mut updated = todo.clone();
        updated.id = Some(id.to_string());
        Ok(updated)
    }

    async fn patch_todo(&self, id: &str, todo: &TodoDto) -> RemoteResult<TodoDto> {
        self.pause().await;
        self.record("patch_todo");
        let mut patched = todo.clone();
        patched.id = Some(id.to_string());
        Ok(patched)
    }

    async fn delete_todo(&self, id: &str) -> RemoteResult<()> {
        self.pause().await;
        self.record("delete_todo");
        let mut state = self.state.lock().unwrap();
        if state.fail_delete {
            return Err(RemoteError::Status {
                status: 500,
                body: "delete refused".into(),
            });
        }
        state.deleted.push(id.to_string());
        Ok(())
    }

    async fn list_updated_since(&self, _since_millis: i64) -> RemoteResult<Vec<TodoDto>> {
        self.pause().await;
        self.record("list_updated_since");
        Ok(self.state.lock().unwrap().remote_changes.clone())
    }

    async fn sync_batch(&self, todos: &[TodoDto]) -> RemoteResult<Vec<TodoDto>> {
        self.pause().await;
        self.record("sync_batch");
        let mut state = self.state.lock().unwrap();
        state.batch_sizes.push(todos.len());
        if state.fail_batch {
            return Err(RemoteError::Status {
                status: 500,
                body: "batch refused".into(),
            });
        }
        Ok(todos
            .iter()
            .map(|todo| {
                let mut confirmed = todo.clone();
                if confirmed.id.is_none() {
                    confirmed.id = Some(Self::assign_id(&mut state));
                }
                confirmed
            })
            .collect())
    }
}

/// A sync service wired to in-memory storage, a scripted remote, and a
/// toggleable network monitor.
pub struct Harness {
    pub service: SyncService,
    pub remote: Arc<MockRemote>,
    pub network: Arc<StaticNetworkMonitor>,
    pub storage: Arc<Mutex<LocalStorage>>,
}

pub async fn harness(online: bool) -> Harness {
    let storage = Arc::new(Mutex::new(
        LocalStorage::in_memory().await.expect("in-memory db"),
    ));
    let remote = MockRemote::new();
    let network = Arc::new(StaticNetworkMonitor::new(online));
    let remote_dyn: Arc<dyn RemoteService> = remote.clone();
    let network_dyn: Arc<dyn tasksync::network::NetworkMonitor> = network.clone();
    let service = SyncService::new(Arc::clone(&storage), remote_dyn, network_dyn);
    Harness {
        service,
        remote,
        network,
        storage,
    }
}

/// A remote-side record for the delta endpoint.
pub fn remote_dto(id: &str, title: &str, updated_at: i64) -> TodoDto {
    TodoDto {
        id: Some(id.to_string()),
        local_id: None,
        user_id: None,
        title: title.to_string(),
        description: None,
        completed: false,
        priority: "NORMAL".to_string(),
        category: None,
        due_date: None,
        created_at: updated_at,
        updated_at,
        sync_status: "SYNCED".to_string(),
    }
}
