/// Errors produced anywhere in the toolchain.
///
/// There is no recovery path: every variant is fatal to the current
/// operation and terminates the invoking binary with a nonzero exit code.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed JSON, a missing `extends` target, an `override` entry
    /// without `value`, `merge_lists` called on non-arrays, a duplicate
    /// config name, or an extend chain exceeding the depth cap.
    #[error("config error: {0}")]
    Config(String),

    /// A non-expected status code on a mutating orchestrator call, or a
    /// non-200 on a read performed during convergence polling.
    #[error("orchestrator http error: {0}")]
    Http(String),

    /// A missing input file, an unwritable output path, or any other I/O
    /// failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
