//! Hash-chained audit log of contract events.
//!
//! Every event the engine emits is appended here. Each record's digest
//! covers the previous digest, its own sequence number, and the JSON form
//! of the event, so rewriting or dropping any record breaks every digest
//! after it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use swaplock_types::constants::{AUDIT_GENESIS_DIGEST, DEFAULT_AUDIT_CAPACITY};
use swaplock_types::{ContractEvent, EventDigest, Result, SwaplockError};

const DOMAIN_TAG: &[u8] = b"swaplock:audit:v1:";

/// One entry in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: ContractEvent,
    /// Digest of the record before this one (genesis for the first).
    pub previous: EventDigest,
    pub digest: EventDigest,
}

/// Append-only event log.
#[derive(Debug, Clone)]
pub struct AuditLog {
    records: Vec<AuditRecord>,
    head: EventDigest,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::with_capacity(DEFAULT_AUDIT_CAPACITY),
            head: EventDigest(AUDIT_GENESIS_DIGEST),
        }
    }

    /// Append `event` and return the new record.
    ///
    /// The log is unchanged if the event cannot be serialized.
    ///
    /// # Errors
    /// Returns [`SwaplockError::Serialization`] if the event cannot be
    /// encoded as JSON.
    pub fn append(&mut self, event: ContractEvent) -> Result<&AuditRecord> {
        let sequence = self.records.len() as u64;
        let digest = chain_digest(&self.head, sequence, &event)?;

        tracing::debug!(
            kind = event.kind(),
            sequence,
            digest = %digest.short(),
            "Audit record appended"
        );

        self.records.push(AuditRecord {
            sequence,
            recorded_at: Utc::now(),
            event,
            previous: self.head,
            digest,
        });
        self.head = digest;

        let last = self.records.len() - 1;
        Ok(&self.records[last])
    }

    /// Recompute every digest from genesis.
    ///
    /// # Errors
    /// Returns [`SwaplockError::Internal`] naming the first record whose
    /// link or digest does not match.
    pub fn verify_chain(&self) -> Result<()> {
        let mut previous = EventDigest(AUDIT_GENESIS_DIGEST);
        for (index, record) in self.records.iter().enumerate() {
            let sequence = index as u64;
            if record.sequence != sequence || record.previous != previous {
                return Err(SwaplockError::Internal(format!(
                    "audit record {sequence} is not linked to its predecessor"
                )));
            }
            let expected = chain_digest(&previous, sequence, &record.event)?;
            if record.digest != expected {
                return Err(SwaplockError::Internal(format!(
                    "audit record {sequence} digest mismatch"
                )));
            }
            previous = record.digest;
        }
        if previous != self.head {
            return Err(SwaplockError::Internal("audit head mismatch".into()));
        }
        Ok(())
    }

    /// Digest of the latest record, or the genesis digest when empty.
    #[must_use]
    pub fn head(&self) -> EventDigest {
        self.head
    }

    #[must_use]
    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// Events in emission order.
    pub fn events(&self) -> impl Iterator<Item = &ContractEvent> + '_ {
        self.records.iter().map(|record| &record.event)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn chain_digest(
    previous: &EventDigest,
    sequence: u64,
    event: &ContractEvent,
) -> Result<EventDigest> {
    let body = serde_json::to_vec(event)?;
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_TAG);
    hasher.update(previous.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(&body);
    Ok(EventDigest(hasher.finalize().into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use swaplock_types::{Address, VenueChanged};

    fn venue_changed(byte: u8) -> ContractEvent {
        ContractEvent::VenueChanged(VenueChanged {
            previous: Address::ZERO,
            current: Address::repeat_byte(byte),
        })
    }

    #[test]
    fn empty_log_has_genesis_head() {
        let log = AuditLog::new();
        assert!(log.is_empty());
        assert_eq!(log.head(), EventDigest(AUDIT_GENESIS_DIGEST));
        assert!(log.verify_chain().is_ok());
    }

    #[test]
    fn records_link_to_predecessor() {
        let mut log = AuditLog::new();
        let first = log.append(venue_changed(1)).unwrap().digest;
        let second = log.append(venue_changed(2)).unwrap().clone();

        assert_eq!(second.sequence, 1);
        assert_eq!(second.previous, first);
        assert_eq!(log.head(), second.digest);
        assert!(log.verify_chain().is_ok());
    }

    #[test]
    fn same_event_twice_gets_distinct_digests() {
        let mut log = AuditLog::new();
        let a = log.append(venue_changed(1)).unwrap().digest;
        let b = log.append(venue_changed(1)).unwrap().digest;
        assert_ne!(a, b);
    }

    #[test]
    fn tampered_event_breaks_chain() {
        let mut log = AuditLog::new();
        log.append(venue_changed(1)).unwrap();
        log.append(venue_changed(2)).unwrap();

        log.records[0].event = venue_changed(9);
        assert!(log.verify_chain().is_err());
    }

    #[test]
    fn dropped_record_breaks_chain() {
        let mut log = AuditLog::new();
        log.append(venue_changed(1)).unwrap();
        log.append(venue_changed(2)).unwrap();
        log.append(venue_changed(3)).unwrap();

        log.records.remove(1);
        assert!(log.verify_chain().is_err());
    }

    #[test]
    fn events_iterate_in_order() {
        let mut log = AuditLog::new();
        log.append(venue_changed(1)).unwrap();
        log.append(venue_changed(2)).unwrap();

        let kinds: Vec<_> = log.events().map(ContractEvent::kind).collect();
        assert_eq!(kinds, vec!["VENUE_CHANGED", "VENUE_CHANGED"]);
        assert_eq!(log.len(), 2);
    }
}
