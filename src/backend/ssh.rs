/*!
SSH execution backend built on libssh2.

The `ssh2` API is synchronous; connects and command round-trips run on the
blocking thread pool so host tasks never stall the async runtime.
*/

use std::io::Read;
use std::net::TcpStream;
use std::sync::Arc;

use async_trait::async_trait;
use ssh2::Session;
use tokio::sync::Mutex;
use tracing::debug;

use super::core::{ConnectionParams, DeviceSession, ExecutionBackend, ExecutionError};

pub struct SshBackend;

impl SshBackend {
    pub fn new() -> Self {
        Self
    }

    fn connect_sync_inner(params: &ConnectionParams) -> Result<Session, ExecutionError> {
        let tcp = TcpStream::connect((params.address.as_str(), params.port))
            .map_err(|e| ExecutionError::Tcp(e.to_string()))?;
        let mut session = Session::new().map_err(|e| ExecutionError::Ssh(e.to_string()))?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| ExecutionError::Ssh(e.to_string()))?;
        if let (Some(username), Some(password)) = (&params.username, &params.password) {
            session
                .userauth_password(username, password)
                .map_err(|e| ExecutionError::Auth(e.to_string()))?;
        }
        if !session.authenticated() {
            return Err(ExecutionError::Auth("Authentication failed".to_string()));
        }
        Ok(session)
    }
}

impl Default for SshBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionBackend for SshBackend {
    async fn connect(
        &self,
        params: &ConnectionParams,
    ) -> Result<Box<dyn DeviceSession>, ExecutionError> {
        debug!(
            address = %params.address,
            port = params.port,
            platform = params.platform.as_str(),
            "opening SSH session"
        );
        let params = params.clone();
        let session = tokio::task::spawn_blocking(move || Self::connect_sync_inner(&params))
            .await
            .map_err(|e| ExecutionError::Async(e.to_string()))??;
        Ok(Box::new(SshSession {
            session: Arc::new(Mutex::new(session)),
        }))
    }
}

pub struct SshSession {
    session: Arc<Mutex<Session>>,
}

impl SshSession {
    fn execute_command_sync(session: &mut Session, command: &str) -> Result<String, ExecutionError> {
        let mut channel = session
            .channel_session()
            .map_err(|e| ExecutionError::Ssh(e.to_string()))?;
        channel
            .exec(command)
            .map_err(|e| ExecutionError::Command(e.to_string()))?;
        let mut output = String::new();
        channel
            .read_to_string(&mut output)
            .map_err(|e| ExecutionError::Command(e.to_string()))?;
        channel
            .wait_close()
            .map_err(|e| ExecutionError::Ssh(e.to_string()))?;
        Ok(output)
    }
}

#[async_trait]
impl DeviceSession for SshSession {
    async fn execute(&mut self, command: &str) -> Result<String, ExecutionError> {
        let command = command.to_string();
        let session_mutex = self.session.clone();
        tokio::task::spawn_blocking(move || {
            let mut session = session_mutex.blocking_lock();
            Self::execute_command_sync(&mut session, &command)
        })
        .await
        .map_err(|e| ExecutionError::Async(e.to_string()))?
    }

    async fn close(self: Box<Self>) -> Result<(), ExecutionError> {
        let session = self.session.lock().await;
        session
            .disconnect(Some(ssh2::DisconnectCode::ByApplication), "", None)
            .map_err(|e| ExecutionError::Ssh(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::core::Platform;
    use std::collections::HashMap;

    fn unreachable_params() -> ConnectionParams {
        ConnectionParams {
            address: "127.0.0.1".to_string(),
            // Nothing listens on the discard port in the test environment
            port: 9,
            username: Some("client".to_string()),
            password: Some("password".to_string()),
            platform: Platform::Generic,
            options: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_connect_refused_maps_to_tcp_error() {
        let backend = SshBackend::new();
        let err = backend.connect(&unreachable_params()).await.unwrap_err();
        assert!(matches!(err, ExecutionError::Tcp(_)), "got {:?}", err);
    }
}
