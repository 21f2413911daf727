/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Bounded-wait channel operations.
//!
//! Every send and receive in the system waits at most a configured bound.
//! Expiry is reported as a [`ChannelError`]; callers log it and abandon the
//! operation.  Nothing here retries.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;

/// Transient channel failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The channel stayed full for the whole wait bound.
    #[error("send timed out after {0:?} (channel full)")]
    SendTimeout(Duration),

    /// Nothing arrived within the wait bound.
    #[error("receive timed out after {0:?}")]
    ReceiveTimeout(Duration),

    /// The other side of the channel is gone.
    #[error("channel closed")]
    Closed,
}

/// Send `value`, waiting at most `bound` for capacity.
pub async fn send_bounded<T>(
    tx: &mpsc::Sender<T>,
    value: T,
    bound: Duration,
) -> Result<(), ChannelError> {
    tx.send_timeout(value, bound).await.map_err(|e| match e {
        SendTimeoutError::Timeout(_) => ChannelError::SendTimeout(bound),
        SendTimeoutError::Closed(_) => ChannelError::Closed,
    })
}

/// Receive one value, waiting at most `bound`.
pub async fn recv_bounded<T>(
    rx: &mut mpsc::Receiver<T>,
    bound: Duration,
) -> Result<T, ChannelError> {
    match tokio::time::timeout(bound, rx.recv()).await {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(ChannelError::Closed),
        Err(_) => Err(ChannelError::ReceiveTimeout(bound)),
    }
}
