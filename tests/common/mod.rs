//! Shared utilities for integration testing: a stateful mock admin socket.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

/// HAProxy 1.5 `show stat` columns.
const STAT_COLUMNS: &[&str] = &[
    "pxname", "svname", "qcur", "qmax", "scur", "smax", "slim", "stot", "bin", "bout", "dreq",
    "dresp", "ereq", "econ", "eresp", "wretr", "wredis", "status", "weight", "act", "bck",
    "chkfail", "chkdown", "lastchg", "downtime", "qlimit", "pid", "iid", "sid", "throttle",
    "lbtot", "tracked", "type", "rate", "rate_lim", "rate_max", "check_status", "check_code",
    "check_duration", "hrsp_1xx", "hrsp_2xx", "hrsp_3xx", "hrsp_4xx", "hrsp_5xx", "hrsp_other",
    "hanafail", "req_rate", "req_rate_max", "req_tot", "cli_abrt", "srv_abrt",
];

/// One server as the mock load balancer sees it.
#[derive(Debug, Clone)]
pub struct MockServer {
    pub backend: String,
    pub name: String,
    pub status: String,
    pub weight: u32,
    pub initial_weight: u32,
    pub sessions: u32,
}

impl MockServer {
    pub fn new(backend: &str, name: &str, status: &str, weight: u32) -> Self {
        Self {
            backend: backend.to_string(),
            name: name.to_string(),
            status: status.to_string(),
            weight,
            initial_weight: 1,
            sessions: 3,
        }
    }

    fn stat_line(&self) -> String {
        let mut fields = vec![String::new(); STAT_COLUMNS.len()];
        fields[0] = self.backend.clone();
        fields[1] = self.name.clone();
        fields[4] = self.sessions.to_string();
        fields[17] = self.status.clone();
        fields[18] = self.weight.to_string();
        fields.join(",")
    }
}

/// State shared between the mock socket task and the test.
#[derive(Debug, Default)]
pub struct MockState {
    pub servers: Vec<MockServer>,
    /// Every command line received, in order.
    pub received: Vec<String>,
}

impl MockState {
    pub fn server(&self, backend: &str, name: &str) -> Option<&MockServer> {
        self.servers
            .iter()
            .find(|s| s.backend == backend && s.name == name)
    }

    fn server_mut(&mut self, target: &str) -> Option<&mut MockServer> {
        let (backend, name) = target.split_once('/')?;
        self.servers
            .iter_mut()
            .find(|s| s.backend == backend && s.name == name)
    }

    fn show_stat(&self) -> String {
        let mut out = format!("# {},\n", STAT_COLUMNS.join(","));
        for backend in unique_backends(&self.servers) {
            out.push_str(&format!("{backend},FRONTEND,{}\n", ",".repeat(STAT_COLUMNS.len() - 3)));
            for server in self.servers.iter().filter(|s| s.backend == backend) {
                out.push_str(&server.stat_line());
                out.push('\n');
            }
        }
        out.push('\n');
        out
    }

    fn apply(&mut self, command: &str) -> String {
        let words: Vec<&str> = command.split_whitespace().collect();
        match words.as_slice() {
            ["show", "stat"] => self.show_stat(),
            ["get", "weight", target] => match self.server_mut(target) {
                Some(s) => format!("{} (initial {})\n", s.weight, s.initial_weight),
                None => "No such server.\n".to_string(),
            },
            ["set", "weight", target, value] => match self.server_mut(target) {
                Some(s) => {
                    s.weight = match value.strip_suffix('%') {
                        Some(pct) => pct.parse::<u32>().unwrap_or(0) * s.initial_weight / 100,
                        None => value.parse().unwrap_or(s.weight),
                    };
                    String::new()
                }
                None => "No such server.\n".to_string(),
            },
            ["enable", "server", target] => match self.server_mut(target) {
                Some(s) => {
                    s.status = "UP".to_string();
                    String::new()
                }
                None => "No such server.\n".to_string(),
            },
            ["disable", "server", target] => match self.server_mut(target) {
                Some(s) => {
                    s.status = "MAINT".to_string();
                    String::new()
                }
                None => "No such server.\n".to_string(),
            },
            ["shutdown", "sessions", "server", target] => match self.server_mut(target) {
                Some(s) => {
                    s.sessions = 0;
                    String::new()
                }
                None => "No such server.\n".to_string(),
            },
            _ => "Unknown command.\n".to_string(),
        }
    }
}

fn unique_backends(servers: &[MockServer]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for s in servers {
        if !seen.contains(&s.backend) {
            seen.push(s.backend.clone());
        }
    }
    seen
}

/// A running mock admin socket. Removes its socket file on drop.
pub struct MockAdminSocket {
    pub path: PathBuf,
    pub state: Arc<Mutex<MockState>>,
    task: tokio::task::JoinHandle<()>,
}

impl MockAdminSocket {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Command lines received so far.
    pub fn received(&self) -> Vec<String> {
        self.state.lock().unwrap().received.clone()
    }

    pub fn clear_received(&self) {
        self.state.lock().unwrap().received.clear();
    }

    pub fn server(&self, backend: &str, name: &str) -> MockServer {
        self.state
            .lock()
            .unwrap()
            .server(backend, name)
            .cloned()
            .expect("server exists in mock")
    }
}

impl Drop for MockAdminSocket {
    fn drop(&mut self) {
        self.task.abort();
        let _ = std::fs::remove_file(&self.path);
    }
}

/// A socket path under the temp dir that does not exist yet.
pub fn temp_socket_path() -> PathBuf {
    std::env::temp_dir().join(format!("hr-{}.sock", uuid::Uuid::new_v4()))
}

/// Start a mock admin socket serving `servers`.
///
/// Each connection reads one line, applies every `; `-separated command in
/// it, writes the concatenated responses and closes the stream.
pub async fn start_mock_admin_socket(servers: Vec<MockServer>) -> MockAdminSocket {
    let path = temp_socket_path();
    let listener = UnixListener::bind(&path).unwrap();
    let state = Arc::new(Mutex::new(MockState {
        servers,
        received: Vec::new(),
    }));

    let task_state = state.clone();
    let task = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let (read, mut write) = stream.into_split();
                    let mut line = String::new();
                    if BufReader::new(read).read_line(&mut line).await.is_err() {
                        continue;
                    }
                    let line = line.trim_end().to_string();

                    let response = {
                        let mut state = task_state.lock().unwrap();
                        state.received.push(line.clone());
                        line.split("; ")
                            .map(|command| state.apply(command))
                            .collect::<String>()
                    };

                    let _ = write.write_all(response.as_bytes()).await;
                    let _ = write.shutdown().await;
                }
                Err(_) => break,
            }
        }
    });

    MockAdminSocket { path, state, task }
}
