use rand::Rng;

/**
    Default width of the range machine identifier groups are sampled from.
*/
pub const DEFAULT_SEED: u32 = 16384;

/**
    Source of machine identifiers for new sessions.

    The identifier emulates a device's hardware address: six groups of two
    upper-case hex digits, no separators. It is not a secret and needs no
    cryptographic strength.
*/
pub trait MachineIdGenerator {
    fn generate(&self) -> String;
}

/**
    Random identifiers. Each group is the leading two hex digits of an
    integer drawn from `16..16 + seed`.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomMachineId {
    seed: u32,
}

impl RandomMachineId {
    pub fn new(seed: u32) -> Self {
        Self { seed: seed.max(1) }
    }
}

impl Default for RandomMachineId {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl MachineIdGenerator for RandomMachineId {
    fn generate(&self) -> String {
        let mut rng = rand::rng();
        let mut guid = String::with_capacity(12);
        for _ in 0..6 {
            let n = rng.random_range(16..16u32.saturating_add(self.seed));
            // n >= 16, so there are always at least two hex digits
            guid.push_str(&format!("{n:X}")[..2]);
        }
        guid
    }
}

/**
    Always returns the same identifier. Useful for tests and for reusing
    an identifier known to the store.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedMachineId(pub String);

impl MachineIdGenerator for FixedMachineId {
    fn generate(&self) -> String {
        self.0.clone()
    }
}
