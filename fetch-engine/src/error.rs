use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("unable to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("i/o error while running {program}: {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },

    #[error("{msg}")]
    Probe { url: String, msg: String },

    #[error("unable to parse metadata for {url}: {source}")]
    ProbeJson {
        url: String,
        source: serde_json::Error,
    },

    #[error("{msg}")]
    Fetch { url: String, msg: String },
}
