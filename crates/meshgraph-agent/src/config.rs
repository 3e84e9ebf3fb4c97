use anyhow::Result;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMode {
    StateFile(PathBuf),
    Mock,
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub sock_path: String,
    pub source: SourceMode,
}

pub fn parse_args() -> Result<AgentConfig> {
    parse_args_from(std::env::args_os().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<AgentConfig>
where
    I: IntoIterator<Item = OsString>,
{
    let mut sock_path = None;
    let mut state_file = None;
    let mut mock = false;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--socket" {
            let Some(path) = args.next() else {
                anyhow::bail!("--socket expects a path");
            };
            sock_path = Some(path.to_string_lossy().to_string());
        } else if arg == "--state-file" {
            let Some(path) = args.next() else {
                anyhow::bail!("--state-file expects a path");
            };
            state_file = Some(PathBuf::from(path));
        } else if arg == "--mock" {
            mock = true;
        } else {
            anyhow::bail!("unknown argument: {:?}", arg);
        }
    }

    if mock && state_file.is_some() {
        anyhow::bail!("--mock and --state-file are mutually exclusive");
    }

    let source = if mock {
        SourceMode::Mock
    } else {
        SourceMode::StateFile(state_file.unwrap_or_else(default_state_file))
    };

    Ok(AgentConfig {
        sock_path: sock_path.unwrap_or_else(runtime_sock_path),
        source,
    })
}

pub fn runtime_sock_path() -> String {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        format!("{dir}/meshgraph.sock")
    } else {
        "/tmp/meshgraph.sock".to_string()
    }
}

pub fn default_state_file() -> PathBuf {
    PathBuf::from("mesh_state.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn args(v: &[&str]) -> Vec<OsString> {
        v.iter().map(OsString::from).collect()
    }

    #[test]
    fn defaults_to_state_file_source() {
        let config = parse_args_from(Vec::<OsString>::new()).expect("config parsed");
        assert_eq!(config.source, SourceMode::StateFile(default_state_file()));
        assert!(config.sock_path.ends_with("meshgraph.sock"));
    }

    #[test]
    fn parses_mock_and_socket() {
        let config =
            parse_args_from(args(&["--mock", "--socket", "/tmp/x.sock"])).expect("config parsed");
        assert_eq!(config.source, SourceMode::Mock);
        assert_eq!(config.sock_path, "/tmp/x.sock");
    }

    #[test]
    fn rejects_conflicting_and_unknown_flags() {
        assert!(parse_args_from(args(&["--mock", "--state-file", "a.json"])).is_err());
        assert!(parse_args_from(args(&["--port", "5555"])).is_err());
        assert!(parse_args_from(args(&["--state-file"])).is_err());
    }
}
