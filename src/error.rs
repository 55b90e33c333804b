use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepairError {
    #[error("JSON parsing error after repair: {0}. Content prefix: {1}")]
    Unparseable(#[source] serde_json::Error, String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize database: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ReplaceError {
    #[error("failed to read mapping table {path}: {source}")]
    MappingRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse mapping table {path}: {source}")]
    MappingParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read question source {path}: {source}")]
    SourceRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse question source {path}: {source}")]
    SourceParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("question source {path} is not a JSON object keyed by topic id")]
    SourceShape { path: String },
    #[error("key '{key}' not found in question source {path}")]
    MissingKey { key: String, path: String },
    #[error("key '{key}' in question source {path} is not a question list")]
    KeyNotList { key: String, path: String },
}
