//! SRP-6a client for the BLE Bluetooth Unlock handshake (C5, §4.5).
//!
//! spec.md is explicit that this should use a reviewed SRP implementation
//! rather than a hand-rolled one, so the math lives entirely in the `srp`
//! crate (RustCrypto); this module only drives the `BLE_UNLOCK` /
//! `BLE_UNLOCK_RESPONSE` frame exchange and the four-phase state machine
//! around it.
//!
//! Per §4.5's concurrency note, authentication is strictly sequential and
//! owns the only producer of `BLE_UNLOCK` frames for its lifetime; it
//! listens for responses on an all-frames subscription rather than a
//! per-frame-ID waiter, since `BLE_UNLOCK_RESPONSE` carries a phase byte,
//! not a frame ID.

use async_trait::async_trait;
use sha2::Sha256;
use srp::client::SrpClient as Srp6aClient;
use srp::groups::G_1024;
use thiserror::Error;
use tokio::time::{timeout, Duration, Instant};
use zeroize::Zeroizing;

use crate::constants::{SRP_EPHEMERAL_LEN, SRP_NONCE_LEN, SRP_PROOF_LEN, SRP_SALT_LEN, SRP_USERNAME};
use crate::dispatch::Registries;
use crate::error::XBeeError;
use crate::frame::ble_unlock::{BleUnlock, BleUnlockResponse};
use crate::frame::Frame;

/// Sink for the `BLE_UNLOCK` frames this handshake sends. Implemented by
/// whatever owns the write side of the open interface (§4.5:
/// authentication "is the only producer of BLE_UNLOCK frames on the
/// outbound path" for its lifetime).
#[async_trait]
pub trait FrameSink: Send {
    async fn send(&mut self, frame: Frame) -> Result<(), XBeeError>;
}

/// Material produced by a successful handshake (§4.5 "Outputs on
/// success"). The core hands this to an upper layer and does not use it
/// itself.
#[derive(Clone)]
pub struct SrpOutcome {
    pub key: [u8; 32],
    pub tx_nonce: [u8; 12],
    pub rx_nonce: [u8; 12],
}

impl std::fmt::Debug for SrpOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SrpOutcome").finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("server sent an unexpected phase {0}")]
    UnsolicitedPhase(u8),

    #[error("server reported error code 0x{0:02X}")]
    ErrorResponse(u8),

    #[error("response carried the wrong number of bytes for its phase")]
    BadPhaseLength,

    #[error("server proof did not match the expected value")]
    ServerProofMismatch,

    #[error("SRP computation failed: {0}")]
    Srp(String),

    #[error("server response not received within the timeout")]
    Timeout,

    #[error("listener channel closed before a response arrived")]
    Closed,

    #[error("transport error: {0}")]
    Transport(#[from] XBeeError),
}

/// Run the full INIT → PHASE_2 → PHASE_3 → PHASE_4 → DONE handshake
/// (§4.5's state table) against `sink`/`registries`, using `timeout` as
/// the per-phase response ceiling.
pub async fn authenticate<S: FrameSink>(
    sink: &mut S,
    registries: &Registries,
    password: &[u8],
    response_timeout: Duration,
) -> Result<SrpOutcome, AuthError> {
    let client = Srp6aClient::<Sha256>::new(&G_1024);

    let a_priv = Zeroizing::new(random_ephemeral());
    let a_pub = client.compute_public_ephemeral(&a_priv);

    let (listener_id, mut responses) = registries.add_packet_listener(None).await;
    let result = run_handshake(
        &client,
        sink,
        &mut responses,
        &a_priv,
        &a_pub,
        password,
        response_timeout,
    )
    .await;
    registries.remove_packet_listener(listener_id).await;
    result
}

async fn run_handshake<S: FrameSink>(
    client: &Srp6aClient<'_, Sha256>,
    sink: &mut S,
    responses: &mut tokio::sync::mpsc::Receiver<Frame>,
    a_priv: &[u8],
    a_pub: &[u8],
    password: &[u8],
    response_timeout: Duration,
) -> Result<SrpOutcome, AuthError> {
    // INIT: send phase 1 with the client ephemeral.
    sink.send(Frame::BleUnlock(BleUnlock {
        phase: 1,
        data: a_pub.to_vec(),
    }))
    .await?;

    // PHASE_2: await salt ‖ B.
    let phase2 = await_response(responses, response_timeout).await?;
    let (salt, b_pub) = expect_phase(phase2, 2, SRP_SALT_LEN + SRP_EPHEMERAL_LEN)
        .map(|data| (data[..SRP_SALT_LEN].to_vec(), data[SRP_SALT_LEN..].to_vec()))?;

    let verifier = client
        .process_reply(a_priv, SRP_USERNAME.as_bytes(), password, &salt, &b_pub)
        .map_err(|e| AuthError::Srp(format!("{e:?}")))?;
    let m1 = verifier.proof().to_vec();

    // PHASE_3: send the client proof M1.
    sink.send(Frame::BleUnlock(BleUnlock { phase: 3, data: m1 }))
        .await?;

    // PHASE_4: await M2 ‖ txNonce ‖ rxNonce.
    let phase4 = await_response(responses, response_timeout).await?;
    let expected_len = SRP_PROOF_LEN + 2 * SRP_NONCE_LEN;
    let data = expect_phase(phase4, 4, expected_len)?;
    let (m2, rest) = data.split_at(SRP_PROOF_LEN);
    let (tx_nonce, rx_nonce) = rest.split_at(SRP_NONCE_LEN);

    verifier
        .verify_server(m2)
        .map_err(|_| AuthError::ServerProofMismatch)?;

    let key_material = verifier.key();
    let mut key = [0u8; 32];
    let copy_len = key.len().min(key_material.len());
    key[..copy_len].copy_from_slice(&key_material[..copy_len]);

    let mut tx_nonce_arr = [0u8; 12];
    let mut rx_nonce_arr = [0u8; 12];
    tx_nonce_arr.copy_from_slice(tx_nonce);
    rx_nonce_arr.copy_from_slice(rx_nonce);

    Ok(SrpOutcome {
        key,
        tx_nonce: tx_nonce_arr,
        rx_nonce: rx_nonce_arr,
    })
}

fn expect_phase(response: BleUnlockResponse, phase: u8, expected_len: usize) -> Result<Vec<u8>, AuthError> {
    match response {
        BleUnlockResponse::Error { code } => Err(AuthError::ErrorResponse(code)),
        BleUnlockResponse::Phase { phase: got, data } if got != phase => {
            Err(AuthError::UnsolicitedPhase(got))
        }
        BleUnlockResponse::Phase { data, .. } if data.len() != expected_len => {
            Err(AuthError::BadPhaseLength)
        }
        BleUnlockResponse::Phase { data, .. } => Ok(data),
    }
}

async fn await_response(
    responses: &mut tokio::sync::mpsc::Receiver<Frame>,
    response_timeout: Duration,
) -> Result<BleUnlockResponse, AuthError> {
    let deadline = Instant::now() + response_timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(AuthError::Timeout);
        }
        match timeout(remaining, responses.recv()).await {
            Ok(Some(Frame::BleUnlockResponse(resp))) => return Ok(resp),
            Ok(Some(_other)) => continue,
            Ok(None) => return Err(AuthError::Closed),
            Err(_) => return Err(AuthError::Timeout),
        }
    }
}

fn random_ephemeral() -> Vec<u8> {
    use rand::RngCore;
    let mut bytes = vec![0u8; SRP_EPHEMERAL_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex as AsyncMutex;

    struct RecordingSink {
        sent: Arc<AsyncMutex<Vec<Frame>>>,
    }

    #[async_trait]
    impl FrameSink for RecordingSink {
        async fn send(&mut self, frame: Frame) -> Result<(), XBeeError> {
            self.sent.lock().await.push(frame);
            Ok(())
        }
    }

    #[tokio::test]
    async fn times_out_when_the_server_never_replies() {
        let registries = Registries::default();
        let sent = Arc::new(AsyncMutex::new(Vec::new()));
        let mut sink = RecordingSink { sent: sent.clone() };

        let result = authenticate(
            &mut sink,
            &registries,
            b"password",
            Duration::from_millis(50),
        )
        .await;

        assert!(matches!(result, Err(AuthError::Timeout)));
        assert_eq!(sent.lock().await.len(), 1, "phase 1 BLE_UNLOCK should still have been sent");
    }

    #[tokio::test]
    async fn phase_0_error_response_aborts_the_handshake() {
        let registries = Arc::new(Registries::default());
        let registries_for_task = registries.clone();

        let auth = tokio::spawn(async move {
            let mut sink = RecordingSink {
                sent: Arc::new(AsyncMutex::new(Vec::new())),
            };
            authenticate(
                &mut sink,
                &registries_for_task,
                b"password",
                Duration::from_secs(1),
            )
            .await
        });

        // Give the handshake a moment to register its listener before the
        // error response is dispatched.
        tokio::time::sleep(Duration::from_millis(10)).await;
        registries
            .dispatch(&Frame::BleUnlockResponse(BleUnlockResponse::Error { code: 0x02 }))
            .await;

        let result = auth.await.unwrap();
        assert!(matches!(result, Err(AuthError::ErrorResponse(0x02))));
    }
}
