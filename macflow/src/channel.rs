//! Handshake signals.
//!
//! A transfer on a valid/ready channel happens in a cycle where the producer drives `valid` and the consumer drives
//! `ready`. A valid/consume channel has no ready signal: the producer moves on regardless, and `consume` only
//! acknowledges that the consumer took the word presented in that cycle.

/// Valid/ready channel's forward signals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Valid<V> {
    /// Inner data
    pub inner: V,

    /// Valid bit
    pub valid: bool,
}

impl<V> Valid<V> {
    /// Creates a new signal.
    pub fn new(valid: bool, inner: V) -> Self { Self { inner, valid } }

    /// Creates a valid signal.
    pub fn valid(inner: V) -> Self { Self::new(true, inner) }

    /// Returns the data if valid.
    pub fn into_option(self) -> Option<V> { self.valid.then_some(self.inner) }

    /// Returns `true` if the data is transferred in this cycle.
    pub fn fire(&self, ready: Ready) -> bool { self.valid && ready.ready }

    /// Ands the valid bit with `gate`.
    pub fn gate(self, gate: bool) -> Self { Self { valid: self.valid && gate, ..self } }
}

impl<V: Default> Valid<V> {
    /// Creates an invalid signal.
    pub fn invalid() -> Self { Self::new(false, V::default()) }
}

/// Ready signal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Ready {
    /// Ready bit
    pub ready: bool,
}

impl Ready {
    /// Creates a new signal.
    pub fn new(ready: bool) -> Self { Self { ready } }
}

/// Consume signal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Consume {
    /// Consume bit
    pub consume: bool,
}

impl Consume {
    /// Creates a new signal.
    pub fn new(consume: bool) -> Self { Self { consume } }

    /// Returns `true` if the word presented on `output` is taken in this cycle.
    pub fn takes<V>(&self, output: &Valid<V>) -> bool { output.valid && self.consume }
}
