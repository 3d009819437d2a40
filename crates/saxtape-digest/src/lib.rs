//! Infoset digest of a document event stream.
//!
//! [`DigestReceiver`] folds a domain-separated BLAKE3 hash over the events
//! that carry infoset meaning: namespace prefix mappings, element starts
//! with their ordered attributes, character data, processing instructions,
//! and comments. End events, ignorable whitespace, skipped entities, and
//! document boundaries contribute nothing, so the digest changes exactly
//! when the document's content changes, not when its event framing does.
//!
//! Replay a recorded tape into a `DigestReceiver` to get a 32-byte cache
//! validity token for the recording.

use saxtape_types::{Attributes, Name, ReceiveError, XmlReceiver};

const DOMAIN: &str = "saxtape-infoset-v1";

// One code byte per contributing event kind, NUL-terminated fields after it.
const ELEMENT_CODE: u8 = 0x01;
const ATTRIBUTE_CODE: u8 = 0x02;
const TEXT_CODE: u8 = 0x03;
const PI_CODE: u8 = 0x07;
const NAMESPACE_CODE: u8 = 0x0A;
const COMMENT_CODE: u8 = 0x0B;

const SEPARATOR: u8 = 0;

/// A 32-byte infoset digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Receiver that accumulates the infoset digest of the stream driven into
/// it. Drive a whole document (or a subtree) through it, then call
/// [`finish`](DigestReceiver::finish).
#[derive(Debug)]
pub struct DigestReceiver {
    hasher: blake3::Hasher,
}

impl DigestReceiver {
    pub fn new() -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(DOMAIN.as_bytes());
        hasher.update(&[SEPARATOR]);
        Self { hasher }
    }

    /// The digest of everything received so far.
    pub fn finish(&self) -> Digest {
        Digest(*self.hasher.finalize().as_bytes())
    }

    fn field(&mut self, value: &str) {
        self.hasher.update(value.as_bytes());
        self.hasher.update(&[SEPARATOR]);
    }

    fn clark_name(&mut self, name: Name<'_>) {
        // {uri}local: prefix choice does not affect the infoset.
        self.field(&name.clark());
    }
}

impl Default for DigestReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlReceiver for DigestReceiver {
    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<(), ReceiveError> {
        self.hasher.update(&[NAMESPACE_CODE]);
        self.field(prefix);
        self.field(uri);
        Ok(())
    }

    fn start_element(&mut self, name: Name<'_>, attributes: &Attributes) -> Result<(), ReceiveError> {
        self.hasher.update(&[ELEMENT_CODE]);
        self.clark_name(name);
        self.hasher
            .update(&(attributes.len() as u32).to_be_bytes());
        for attribute in attributes {
            self.hasher.update(&[ATTRIBUTE_CODE]);
            self.clark_name(Name::new(&attribute.uri, &attribute.local, &attribute.qname));
            self.field(&attribute.value);
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.hasher.update(&[TEXT_CODE]);
        self.field(text);
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), ReceiveError> {
        self.hasher.update(&[PI_CODE]);
        self.field(target);
        self.field(data);
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), ReceiveError> {
        self.hasher.update(&[COMMENT_CODE]);
        self.field(text);
        Ok(())
    }
}
