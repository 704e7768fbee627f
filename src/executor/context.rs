use std::collections::HashMap;

pub const DEFAULT_RUNTIME: &str = "docker";
const MASK: &str = "********";

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteHost {
    /// `user@host` as understood by ssh.
    pub host: String,
    pub password: Option<String>,
}

/// Where and how a duplicacy command runs. Built once per operation and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    /// Explicit binary path; `None` leaves it to the locator.
    pub binary_path: Option<String>,
    pub repository: Option<String>,
    pub cache_dir: Option<String>,
    pub container: Option<String>,
    pub container_runtime: String,
    pub remote: Option<RemoteHost>,
    pub default_credential: Option<String>,
    pub entity_credentials: HashMap<String, String>,
    pub token_path: Option<String>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            binary_path: None,
            repository: None,
            cache_dir: None,
            container: None,
            container_runtime: DEFAULT_RUNTIME.to_string(),
            remote: None,
            default_credential: None,
            entity_credentials: HashMap::new(),
            token_path: None,
        }
    }
}

impl ExecutionContext {
    /// Directory to `cd` into before running. The cache directory wins over
    /// the repository path.
    pub fn working_directory(&self) -> Option<&str> {
        non_empty(self.cache_dir.as_deref()).or_else(|| non_empty(self.repository.as_deref()))
    }

    pub fn container(&self) -> Option<&str> {
        non_empty(self.container.as_deref())
    }

    pub fn remote(&self) -> Option<&RemoteHost> {
        self.remote.as_ref().filter(|r| !r.host.is_empty())
    }

    pub fn token_path(&self) -> Option<&str> {
        non_empty(self.token_path.as_deref())
    }

    /// Per-entity credential if one is registered under exactly this name,
    /// otherwise the default. An empty name always gets the default.
    pub fn credential_for(&self, entity: &str) -> Option<&str> {
        if !entity.is_empty() {
            if let Some(secret) = self.entity_credentials.get(entity) {
                return non_empty(Some(secret.as_str()));
            }
        }
        non_empty(self.default_credential.as_deref())
    }

    /// Copy with every secret masked, for printing composed commands.
    pub fn redacted(&self) -> Self {
        let mask = |s: &String| if s.is_empty() { String::new() } else { MASK.to_string() };
        Self {
            default_credential: self.default_credential.as_ref().map(mask),
            entity_credentials: self
                .entity_credentials
                .iter()
                .map(|(k, v)| (k.clone(), mask(v)))
                .collect(),
            remote: self.remote.as_ref().map(|r| RemoteHost {
                host: r.host.clone(),
                password: r.password.as_ref().map(mask),
            }),
            ..self.clone()
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.is_empty())
}

/// `my-storage` -> `MY_STORAGE`, the form duplicacy expects inside env var names.
pub fn env_name_fragment(entity: &str) -> String {
    entity.replace('-', "_").to_uppercase()
}
