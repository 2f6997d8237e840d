//! Shared test fixtures: a scripted identity provider.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use myenergi::{IdentityProvider, MyenergiError, Result};

/// Identity provider that hands out a scripted sequence of tokens and
/// records how often it is consulted.
///
/// Each `check_token` call advances to the next scripted token (simulating
/// a refresh); the last token sticks once the script runs out.
pub struct ScriptedIdentity {
    tokens: VecDeque<String>,
    current: Option<String>,
    fail_authenticate: bool,
    authenticate_calls: Arc<AtomicUsize>,
    check_calls: Arc<AtomicUsize>,
}

impl ScriptedIdentity {
    pub fn new(tokens: &[&str]) -> Self {
        Self {
            tokens: tokens.iter().map(ToString::to_string).collect(),
            current: None,
            fail_authenticate: false,
            authenticate_calls: Arc::new(AtomicUsize::new(0)),
            check_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A provider whose `authenticate` always fails.
    pub fn failing() -> Self {
        let mut identity = Self::new(&[]);
        identity.fail_authenticate = true;
        identity
    }

    /// Counter handle surviving the move into the connection.
    pub fn authenticate_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.authenticate_calls)
    }

    /// Counter handle surviving the move into the connection.
    pub fn check_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.check_calls)
    }
}

#[async_trait]
impl IdentityProvider for ScriptedIdentity {
    async fn authenticate(&mut self) -> Result<()> {
        self.authenticate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_authenticate {
            return Err(MyenergiError::Identity(
                "scripted authentication failure".into(),
            ));
        }
        Ok(())
    }

    async fn check_token(&mut self) -> Result<()> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(next) = self.tokens.pop_front() {
            self.current = Some(next);
        }
        Ok(())
    }

    fn access_token(&self) -> Option<&str> {
        self.current.as_deref()
    }
}
