#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use sizeguard::{EncodeError, EncodeOptions, Encoder, Value};
use sizeguard_json_pack::Opaque;

/// Stands in for a huge string: reports a length without holding the bytes.
pub struct SizedBlob(pub u64);

impl Opaque for SizedBlob {
    fn type_name(&self) -> &str {
        "SizedBlob"
    }

    fn fallback(&self) -> String {
        panic!("SizedBlob({}) must never be rendered", self.0)
    }

    fn fallback_len(&self) -> u64 {
        self.0
    }
}

pub fn blob(len: u64) -> Value {
    Value::Opaque(Arc::new(SizedBlob(len)))
}

/// Backend double that counts calls and records the options it received.
#[derive(Default)]
pub struct Recording {
    calls: AtomicUsize,
    options: Mutex<Vec<EncodeOptions>>,
    fail_with: Option<EncodeError>,
}

impl Recording {
    pub fn failing(err: EncodeError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_options(&self) -> Vec<EncodeOptions> {
        self.options.lock().unwrap().clone()
    }
}

impl Encoder for Recording {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn encode(&self, _value: &Value, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.options.lock().unwrap().push(options.clone());
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(b"recorded".to_vec()),
        }
    }
}

/// Fast-backend double that fails the test if it is ever called at or
/// above `limit`.
pub struct Tripwire {
    pub limit: u64,
    calls: AtomicUsize,
}

impl Tripwire {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Encoder for Tripwire {
    fn name(&self) -> &'static str {
        "tripwire"
    }

    fn encode(&self, value: &Value, _options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let size = sizeguard::estimate(value).map(|e| e.total).unwrap_or(u64::MAX);
        assert!(
            size < self.limit,
            "fast backend called with {size} bytes (limit {})",
            self.limit
        );
        Ok(b"fast".to_vec())
    }
}
