use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("failed to spawn a worker for {signal}: {source}")]
    Spawn {
        signal: &'static str,
        #[source]
        source: std::io::Error,
    },
}
