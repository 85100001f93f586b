pub(crate) use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicU64;

// f64 atomic built on AtomicU64 bit patterns, since std provides
// no floating point atomics.

pub(crate) struct AtomicF64 {
    storage: AtomicU64,
}

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self {
            storage: AtomicU64::new(value.to_bits()),
        }
    }
    pub fn store(&self, value: f64, ordering: Ordering) {
        self.storage.store(value.to_bits(), ordering)
    }
    pub fn load(&self, ordering: Ordering) -> f64 {
        f64::from_bits(self.storage.load(ordering))
    }
}

#[test]
fn test_atomic_f64() {
    let v = AtomicF64::new(1.5);
    assert_eq!(v.load(Ordering::Relaxed), 1.5);
    v.store(-2.25, Ordering::Relaxed);
    assert_eq!(v.load(Ordering::Relaxed), -2.25);
}
