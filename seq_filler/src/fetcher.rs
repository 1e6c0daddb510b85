// src/fetcher.rs

use std::thread;

use tracing::{debug, warn};

use crate::api_handler::{LookupTransport, TransportError};
use crate::config::RetryPolicy;
use crate::error::FetchError;
use crate::html::{extract_seq_block, sequence_from_block};
use crate::models::SequenceResult;

/// Anything that can turn a coordinate string into a sequence.
///
/// `Err` is reserved for unexpected failures; an unreachable service or an empty answer
/// is a normal `SequenceResult`.
pub trait SequenceFetcher {
    fn fetch(&mut self, coordinate: &str) -> Result<SequenceResult, FetchError>;
}

/// Direct HTTP strategy: form POST, HTML scrape, inline retry.
pub struct HttpSequenceFetcher<T: LookupTransport> {
    transport: T,
    policy: RetryPolicy,
}

enum Attempt {
    Found(String),
    Blank,
    MissingBlock,
    Failed(TransportError),
    BadStatus(u16),
}

impl<T: LookupTransport> HttpSequenceFetcher<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn attempt(&self, coordinate: &str) -> Attempt {
        match self.transport.post_lookup(coordinate) {
            Err(e) => Attempt::Failed(e),
            Ok(resp) if resp.status != 200 => Attempt::BadStatus(resp.status),
            Ok(resp) => match extract_seq_block(&resp.body) {
                None => Attempt::MissingBlock,
                Some(block) => match sequence_from_block(&block) {
                    Some(seq) => Attempt::Found(seq),
                    None => Attempt::Blank,
                },
            },
        }
    }
}

impl<T: LookupTransport> SequenceFetcher for HttpSequenceFetcher<T> {
    fn fetch(&mut self, coordinate: &str) -> Result<SequenceResult, FetchError> {
        let budget = self.policy.max_attempts.max(1);
        let mut last = SequenceResult::TransportFailure;

        for attempt in 1..=budget {
            let retries_left = attempt < budget;
            let pause = match self.attempt(coordinate) {
                Attempt::Found(seq) => {
                    debug!("{}: {} nt on attempt {}", coordinate, seq.len(), attempt);
                    return Ok(SequenceResult::Sequence(seq));
                }
                Attempt::Blank => {
                    debug!("{}: sequence block present but empty", coordinate);
                    return Ok(SequenceResult::Empty);
                }
                Attempt::MissingBlock => {
                    warn!(
                        "{}: no sequence block in response (attempt {}/{})",
                        coordinate, attempt, budget
                    );
                    last = SequenceResult::Empty;
                    self.policy.empty_backoff
                }
                Attempt::BadStatus(status) => {
                    warn!(
                        "{}: HTTP {} (attempt {}/{})",
                        coordinate, status, attempt, budget
                    );
                    last = SequenceResult::TransportFailure;
                    self.policy.error_backoff
                }
                Attempt::Failed(TransportError::Timeout) => {
                    warn!("{}: timed out (attempt {}/{})", coordinate, attempt, budget);
                    last = SequenceResult::TransportFailure;
                    self.policy.timeout_backoff
                }
                Attempt::Failed(e) => {
                    warn!("{}: {} (attempt {}/{})", coordinate, e, attempt, budget);
                    last = SequenceResult::TransportFailure;
                    self.policy.error_backoff
                }
            };
            if retries_left && !pause.is_zero() {
                thread::sleep(pause);
            }
        }

        warn!("{}: giving up after {} attempts", coordinate, budget);
        Ok(last)
    }
}
