//! One request/reply cycle: send, await ACK, read reply, check BCC, ACK back.

use tracing::{debug, warn};

use super::error::{Crt571Error, Result};
use super::protocol::{bcc, verify_bcc};
use super::transport::{Transport, read_until_idle, write_all};
use super::types::{ACK, MAX_WIRE_LEN, NAK};

/// What to do when a reply's BCC does not match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// NAK the reply and fail with `ChecksumMismatch`.
    #[default]
    Strict,
    /// Log the mismatch and accept the reply anyway.
    Lenient,
}

/// Exchange phases, reported when a cycle fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Sending,
    AwaitingAck,
    AwaitingReply,
    AckingReply,
}

/// Run one exchange and return the raw reply (STX through BCC).
///
/// Strictly sequential; the caller must not start another exchange on the
/// same transport until this returns.
pub fn exchange<T: Transport + ?Sized>(transport: &mut T, request: &[u8], policy: ChecksumPolicy) -> Result<Vec<u8>> {
    let mut phase = Phase::Sending;
    let result = run(transport, request, policy, &mut phase);
    if let Err(e) = &result {
        debug!("Exchange failed while {phase:?}: {e}");
    }
    result
}

fn run<T: Transport + ?Sized>(
    transport: &mut T,
    request: &[u8],
    policy: ChecksumPolicy,
    phase: &mut Phase,
) -> Result<Vec<u8>> {
    write_all(transport, request)?;

    *phase = Phase::AwaitingAck;
    // ACK and reply may arrive coalesced in one read.
    let mut received = read_until_idle(transport, MAX_WIRE_LEN + 1)?;
    match received.first() {
        Some(&ACK) => debug!("ACK received"),
        other => {
            let received = other.copied();
            return Err(Crt571Error::NoAck { received });
        }
    }

    *phase = Phase::AwaitingReply;
    let reply = if received.len() > 1 {
        received.remove(0);
        received
    } else {
        read_until_idle(transport, MAX_WIRE_LEN)?
    };
    debug!("Reply ({} bytes): {reply:02X?}", reply.len());

    let Some((&actual, body)) = reply.split_last() else {
        return Err(Crt571Error::TruncatedFrame {
            expected: 2,
            actual: 0,
        });
    };

    if !verify_bcc(actual, body) {
        let expected = bcc(body);
        match policy {
            ChecksumPolicy::Strict => {
                write_all(transport, &[NAK])?;
                // The device answers NAK by resending; drop it so the line is clean.
                let resent = read_until_idle(transport, MAX_WIRE_LEN)?;
                debug!("Discarded {} bytes after NAK", resent.len());
                return Err(Crt571Error::ChecksumMismatch { expected, actual });
            }
            ChecksumPolicy::Lenient => {
                warn!("BCC response check fail: frame carries {actual:#04X}, computed {expected:#04X}");
            }
        }
    } else {
        debug!("BCC response check success");
    }

    *phase = Phase::AckingReply;
    write_all(transport, &[ACK])?;

    Ok(reply)
}
