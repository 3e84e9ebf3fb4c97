use meshgraph_core::MeshState;

/// What the poller hands to the frame loop.
#[derive(Debug, Clone)]
pub enum Incoming {
    Snapshot(MeshState),
    FetchFailed(String),
}

impl Incoming {
    pub fn failed(err: &anyhow::Error) -> Self {
        Self::FetchFailed(format!("{err:#}"))
    }
}
