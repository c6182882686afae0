// src/balancer/mod.rs


/// Round-robin selector over a fixed, ordered pool of servers.
///
/// The cursor persists across calls and wraps modulo the pool size, so `N`
/// consecutive calls over `N` servers visit each exactly once in list order.
#[derive(Debug, Clone)]
pub struct RoundRobinBalancer {
    servers: Vec<String>,
    cursor: usize,
}

impl RoundRobinBalancer {
    pub fn new(servers: Vec<String>) -> Self {
        Self { servers, cursor: 0 }
    }

    /// Returns the next server in rotation, or `None` when the pool is empty.
    pub fn next_server(&mut self) -> Option<String> {
        if self.servers.is_empty() {
            return None;
        }

        let server = self.servers[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.servers.len();
        Some(server)
    }

    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
