//! Shared test support: a scripted in-memory `DebuggerHost`.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

use resurrect::host::{DebuggerHost, EngineInfo, ProcessInfo, Severity};
use resurrect::{AppError, Result};

/// Scripted host double recording every call the core makes.
#[derive(Default)]
pub struct MockHost {
    processes: Mutex<Vec<ProcessInfo>>,
    engines: Mutex<Vec<EngineInfo>>,
    confirm_answer: AtomicBool,
    elevated: AtomicBool,
    workspace: Mutex<String>,
    /// Paths whose attach fails with `AccessDenied`.
    deny_attach: Mutex<HashSet<String>>,
    /// Paths whose attach fails with a generic host error.
    fail_attach: Mutex<HashMap<String, String>>,
    pub attach_calls: Mutex<Vec<(String, Option<Vec<Uuid>>)>>,
    pub confirm_calls: Mutex<Vec<String>>,
    pub notifications: Mutex<Vec<(String, Severity)>>,
    pub status_updates: Mutex<Vec<(String, bool)>>,
}

impl MockHost {
    pub fn new() -> Self {
        let host = Self::default();
        host.elevated.store(true, Ordering::SeqCst);
        host.confirm_answer.store(true, Ordering::SeqCst);
        *host.workspace.lock().unwrap() = "app.sln".into();
        host
    }

    pub fn add_process(&self, path: &str, is_being_debugged: bool) {
        self.processes.lock().unwrap().push(ProcessInfo {
            path: path.into(),
            is_being_debugged,
        });
    }

    pub fn add_engine(&self, id: Uuid, name: &str) {
        self.engines.lock().unwrap().push(EngineInfo {
            id,
            name: name.into(),
        });
    }

    pub fn set_confirm_answer(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }

    pub fn set_elevated(&self, elevated: bool) {
        self.elevated.store(elevated, Ordering::SeqCst);
    }

    pub fn deny_attach_for(&self, path: &str) {
        self.deny_attach.lock().unwrap().insert(path.to_lowercase());
    }

    pub fn fail_attach_for(&self, path: &str, detail: &str) {
        self.fail_attach
            .lock()
            .unwrap()
            .insert(path.to_lowercase(), detail.into());
    }

    pub fn attach_count(&self) -> usize {
        self.attach_calls.lock().unwrap().len()
    }
}

impl DebuggerHost for MockHost {
    fn enumerate_processes(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ProcessInfo>>> + Send + '_>> {
        let result = Ok(self.processes.lock().unwrap().clone());
        Box::pin(std::future::ready(result))
    }

    fn attach<'a>(
        &'a self,
        process: &'a ProcessInfo,
        engines: Option<&'a [Uuid]>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        let result = (|| {
            self.attach_calls
                .lock()
                .unwrap()
                .push((process.path.clone(), engines.map(<[Uuid]>::to_vec)));

            let key = process.path.to_lowercase();
            if self.deny_attach.lock().unwrap().contains(&key) {
                return Err(AppError::AccessDenied("attach denied".into()));
            }
            if let Some(detail) = self.fail_attach.lock().unwrap().get(&key) {
                return Err(AppError::Host(detail.clone()));
            }

            for live in self.processes.lock().unwrap().iter_mut() {
                if live.path.eq_ignore_ascii_case(&process.path) {
                    live.is_being_debugged = true;
                }
            }
            Ok(())
        })();
        Box::pin(std::future::ready(result))
    }

    fn known_engines(&self) -> Pin<Box<dyn Future<Output = Result<Vec<EngineInfo>>> + Send + '_>> {
        let result = Ok(self.engines.lock().unwrap().clone());
        Box::pin(std::future::ready(result))
    }

    fn confirm<'a>(
        &'a self,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        self.confirm_calls.lock().unwrap().push(message.into());
        let answer = self.confirm_answer.load(Ordering::SeqCst);
        Box::pin(std::future::ready(Ok(answer)))
    }

    fn notify<'a>(
        &'a self,
        message: &'a str,
        severity: Severity,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        self.notifications
            .lock()
            .unwrap()
            .push((message.into(), severity));
        Box::pin(std::future::ready(()))
    }

    fn update_status<'a>(
        &'a self,
        text: &'a str,
        enabled: bool,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        self.status_updates
            .lock()
            .unwrap()
            .push((text.into(), enabled));
        Box::pin(std::future::ready(()))
    }

    fn workspace_key(&self) -> String {
        self.workspace.lock().unwrap().clone()
    }

    fn has_elevated_privileges(&self) -> bool {
        self.elevated.load(Ordering::SeqCst)
    }
}

/// Route crate logs to the test harness; honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Poll `cond` every 10 ms until it holds or `timeout` elapses.
pub async fn wait_until<F: Fn() -> bool>(cond: F, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}
