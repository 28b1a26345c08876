//! Inserting one server entry into a host config without disturbing anything else.

use std::{fs, io, path::Path};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::lib::{
    errors::InstallError,
    fs::write_atomic,
    hosts::{HostConfigLocation, HostIdentity},
};

/// Top-level key holding server entries in every supported host config.
pub const MCP_SERVERS_KEY: &str = "mcpServers";

/// Launch descriptor a host application uses to start one server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ServerEntry {
    pub command: String,
    pub args: Vec<String>,
    /// Omitted entirely when no variables were supplied. Keys keep the order they were given in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Map<String, Value>>,
}

impl ServerEntry {
    pub fn new(command: impl Into<String>, args: Vec<String>, env: Map<String, Value>) -> Self {
        Self {
            command: command.into(),
            args,
            env: if env.is_empty() { None } else { Some(env) },
        }
    }
}

/// Why a host config document cannot take a server entry.
#[derive(Debug)]
pub enum DocumentError {
    Syntax(serde_json::Error),
    Serialize(serde_json::Error),
    RootNotObject,
    ServersNotObject,
}

impl DocumentError {
    fn into_install_error(self, host: HostIdentity, path: &Path) -> InstallError {
        let path = path.to_path_buf();
        match self {
            DocumentError::Syntax(source) => InstallError::ConfigParse { host, path, source },
            DocumentError::Serialize(err) => InstallError::ConfigWrite {
                host,
                path,
                source: io::Error::new(io::ErrorKind::InvalidData, err),
            },
            DocumentError::RootNotObject => InstallError::InvalidHostConfig {
                host,
                path,
                message: "the top-level JSON value is not an object".into(),
            },
            DocumentError::ServersNotObject => InstallError::InvalidHostConfig {
                host,
                path,
                message: format!("`{MCP_SERVERS_KEY}` is present but is not an object"),
            },
        }
    }
}

/// Host config held as an insertion-ordered JSON object so unknown keys survive untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfigDocument {
    root: Map<String, Value>,
}

impl HostConfigDocument {
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        match serde_json::from_str(text).map_err(DocumentError::Syntax)? {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(DocumentError::RootNotObject),
        }
    }

    /// Insert or replace the entry under `name`; every other key keeps its value and position.
    pub fn upsert_server(&mut self, name: &str, entry: &ServerEntry) -> Result<(), DocumentError> {
        let value = serde_json::to_value(entry).map_err(DocumentError::Serialize)?;
        let servers = self
            .root
            .entry(MCP_SERVERS_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(servers) = servers else {
            return Err(DocumentError::ServersNotObject);
        };
        servers.insert(name.to_string(), value);
        Ok(())
    }

    pub fn server(&self, name: &str) -> Option<&Value> {
        self.root
            .get(MCP_SERVERS_KEY)
            .and_then(Value::as_object)
            .and_then(|servers| servers.get(name))
    }

    /// Pretty-printed JSON with a trailing newline.
    pub fn to_pretty_string(&self) -> Result<String, DocumentError> {
        let mut text = serde_json::to_string_pretty(&self.root).map_err(DocumentError::Serialize)?;
        text.push('\n');
        Ok(text)
    }
}

/// Read the host config, set `server_name` to `entry`, and write the file back.
///
/// The file must already exist; nothing is written when reading or parsing fails.
pub fn merge_server_entry(
    location: &HostConfigLocation,
    server_name: &str,
    entry: &ServerEntry,
) -> Result<(), InstallError> {
    let path = location.file.as_path();
    let host = location.host;
    let text = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            InstallError::ConfigFileNotFound {
                host,
                path: path.to_path_buf(),
            }
        } else {
            InstallError::ConfigRead {
                host,
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let mut document =
        HostConfigDocument::parse(&text).map_err(|err| err.into_install_error(host, path))?;
    document
        .upsert_server(server_name, entry)
        .map_err(|err| err.into_install_error(host, path))?;
    let serialized = document
        .to_pretty_string()
        .map_err(|err| err.into_install_error(host, path))?;

    write_config(path, &serialized).map_err(|source| InstallError::ConfigWrite {
        host,
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        target: "mcp_installer::install",
        host = host.as_str(),
        path = %path.display(),
        server = server_name,
        command = %entry.command,
        "Wrote server entry to host config"
    );
    Ok(())
}

fn write_config(path: &Path, contents: &str) -> io::Result<()> {
    write_atomic(path, contents.as_bytes())
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use serde_json::json;
    use tempfile::{tempdir, TempDir};

    use super::*;

    fn location_in(temp: &TempDir) -> HostConfigLocation {
        HostConfigLocation {
            host: HostIdentity::Claude,
            dir: temp.path().to_path_buf(),
            file: temp.path().join("claude_desktop_config.json"),
        }
    }

    fn read_json(path: &PathBuf) -> Value {
        serde_json::from_str(&fs::read_to_string(path).expect("can read config"))
            .expect("config stays valid JSON")
    }

    fn entry(command: &str, args: &[&str]) -> ServerEntry {
        ServerEntry::new(
            command,
            args.iter().map(|arg| arg.to_string()).collect(),
            Map::new(),
        )
    }

    #[test]
    fn empty_env_is_omitted_from_serialized_entry() {
        let value = serde_json::to_value(entry("npx", &["pkg"])).expect("serializes");
        assert_eq!(value, json!({ "command": "npx", "args": ["pkg"] }));
    }

    #[test]
    fn env_values_are_written_verbatim() {
        let mut env = Map::new();
        env.insert("FOO".into(), json!("1"));
        env.insert("BAR".into(), json!(""));
        let text = serde_json::to_string(&ServerEntry::new("npx", vec![], env)).expect("serializes");
        assert_eq!(text, r#"{"command":"npx","args":[],"env":{"FOO":"1","BAR":""}}"#);
    }

    #[cfg(unix)]
    #[test]
    fn merge_through_symlinked_config_keeps_the_link() {
        let temp = tempdir().expect("can create temporary directory");
        let dotfiles = temp.path().join("dotfiles");
        let host_dir = temp.path().join("host");
        fs::create_dir_all(&dotfiles).expect("can create dotfiles dir");
        fs::create_dir_all(&host_dir).expect("can create host dir");
        let real = dotfiles.join("mcp.json");
        fs::write(&real, "{}").expect("can seed config");
        let link = host_dir.join("claude_desktop_config.json");
        std::os::unix::fs::symlink(&real, &link).expect("can create symlink");
        let location = HostConfigLocation {
            host: HostIdentity::Claude,
            dir: host_dir,
            file: link.clone(),
        };

        merge_server_entry(&location, "tool", &entry("npx", &["tool"])).expect("merge");

        let link_meta = fs::symlink_metadata(&link).expect("link still exists");
        assert!(link_meta.file_type().is_symlink(), "config symlink must survive the write");
        assert_eq!(
            read_json(&real)["mcpServers"]["tool"],
            json!({ "command": "npx", "args": ["tool"] })
        );
    }

    #[test]
    fn merge_preserves_unrelated_keys_and_servers() {
        let temp = tempdir().expect("can create temporary directory");
        let location = location_in(&temp);
        fs::write(
            &location.file,
            r#"{
  "theme": "dark",
  "mcpServers": {
    "existing": { "command": "uvx", "args": ["existing-server"], "disabled": true }
  },
  "globalShortcut": "Ctrl+Space"
}"#,
        )
        .expect("can seed config");

        merge_server_entry(&location, "fresh", &entry("npx", &["fresh-server"]))
            .expect("merge should succeed");

        let config = read_json(&location.file);
        assert_eq!(config["theme"], json!("dark"));
        assert_eq!(config["globalShortcut"], json!("Ctrl+Space"));
        assert_eq!(
            config["mcpServers"]["existing"],
            json!({ "command": "uvx", "args": ["existing-server"], "disabled": true })
        );
        assert_eq!(
            config["mcpServers"]["fresh"],
            json!({ "command": "npx", "args": ["fresh-server"] })
        );
        let keys = config
            .as_object()
            .expect("object")
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["theme", "mcpServers", "globalShortcut"]);
    }

    #[test]
    fn merge_replaces_entry_with_same_name_entirely() {
        let temp = tempdir().expect("can create temporary directory");
        let location = location_in(&temp);
        fs::write(
            &location.file,
            r#"{"mcpServers": {"tool": {"command": "node", "args": ["old.js"], "env": {"OLD": "1"}}}}"#,
        )
        .expect("can seed config");

        merge_server_entry(&location, "tool", &entry("npx", &["tool"]))
            .expect("merge should succeed");

        let config = read_json(&location.file);
        assert_eq!(config["mcpServers"]["tool"], json!({ "command": "npx", "args": ["tool"] }));
    }

    #[test]
    fn merge_creates_servers_object_when_absent() {
        let temp = tempdir().expect("can create temporary directory");
        let location = location_in(&temp);
        fs::write(&location.file, "{}").expect("can seed config");

        merge_server_entry(&location, "a", &entry("npx", &["a"])).expect("first merge");
        merge_server_entry(&location, "b", &entry("npx", &["b"])).expect("second merge");

        let config = read_json(&location.file);
        let servers = config["mcpServers"].as_object().expect("servers object");
        assert!(servers.contains_key("a") && servers.contains_key("b"));
    }

    #[test]
    fn missing_file_is_not_created() {
        let temp = tempdir().expect("can create temporary directory");
        let location = location_in(&temp);

        let error = merge_server_entry(&location, "tool", &entry("npx", &["tool"]))
            .expect_err("missing config must fail");

        assert!(matches!(error, InstallError::ConfigFileNotFound { .. }));
        assert!(!location.file.exists(), "merger must never create the file");
    }

    #[test]
    fn invalid_json_is_left_untouched() {
        let temp = tempdir().expect("can create temporary directory");
        let location = location_in(&temp);
        fs::write(&location.file, "{ not json").expect("can seed config");

        let error = merge_server_entry(&location, "tool", &entry("npx", &["tool"]))
            .expect_err("invalid JSON must fail");

        assert!(matches!(error, InstallError::ConfigParse { .. }));
        assert_eq!(
            fs::read_to_string(&location.file).expect("can read config"),
            "{ not json"
        );
    }

    #[test]
    fn non_object_servers_value_is_rejected() {
        let temp = tempdir().expect("can create temporary directory");
        let location = location_in(&temp);
        fs::write(&location.file, r#"{"mcpServers": []}"#).expect("can seed config");

        let error = merge_server_entry(&location, "tool", &entry("npx", &["tool"]))
            .expect_err("array servers must fail");

        assert!(matches!(error, InstallError::InvalidHostConfig { .. }), "{error:?}");
    }

    #[test]
    fn document_reports_stored_entry() {
        let mut document = HostConfigDocument::parse(r#"{"other": 1}"#).expect("valid document");
        document
            .upsert_server("tool", &entry("node", &["/pkg/index.js"]))
            .expect("upsert");
        assert_eq!(
            document.server("tool"),
            Some(&json!({ "command": "node", "args": ["/pkg/index.js"] }))
        );
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(matches!(
            HostConfigDocument::parse("[1, 2]"),
            Err(DocumentError::RootNotObject)
        ));
    }

    #[test]
    fn written_file_is_indented_json() {
        let temp = tempdir().expect("can create temporary directory");
        let location = location_in(&temp);
        fs::write(&location.file, "{}").expect("can seed config");

        merge_server_entry(&location, "tool", &entry("npx", &["tool"])).expect("merge");

        let text = fs::read_to_string(&location.file).expect("can read config");
        assert!(text.contains("\n  \"mcpServers\": {"), "text: {text}");
        assert!(text.ends_with("}\n"));
    }
}
