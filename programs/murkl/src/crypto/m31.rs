//! Mersenne-31 field elements and their degree-4 extension
//!
//! Only the representation is needed on-chain: hash-to-field reduction for
//! identifier/password derivation and canonical-form checks for transcript
//! values. Arithmetic lives with the (external) prover.

/// The Mersenne prime 2^31 - 1.
pub const M31_PRIME: u32 = 0x7fff_ffff;

/// Element of the M31 field, always stored reduced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct M31(u32);

impl M31 {
    pub const ZERO: M31 = M31(0);

    /// Reduce an arbitrary u32 into the field.
    #[inline]
    pub fn new(value: u32) -> Self {
        M31(value % M31_PRIME)
    }

    /// Reduce the first four little-endian bytes of a digest.
    #[inline]
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        let mut limb = [0u8; 4];
        limb.copy_from_slice(&digest[..4]);
        Self::new(u32::from_le_bytes(limb))
    }

    #[inline]
    pub fn value(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl From<M31> for u32 {
    fn from(value: M31) -> u32 {
        value.0
    }
}

/// Size of an encoded QM31 value in bytes.
pub const QM31_LEN: usize = 16;

/// Degree-4 extension element, four raw M31 limbs.
///
/// Limbs are kept exactly as they appear on the wire so that the codec stays
/// lossless; `is_canonical` tells whether every limb is reduced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct QM31(pub [u32; 4]);

impl QM31 {
    pub const ZERO: QM31 = QM31([0; 4]);

    pub fn from_le_bytes(bytes: &[u8; QM31_LEN]) -> Self {
        let mut limbs = [0u32; 4];
        for (limb, chunk) in limbs.iter_mut().zip(bytes.chunks_exact(4)) {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(chunk);
            *limb = u32::from_le_bytes(raw);
        }
        QM31(limbs)
    }

    pub fn to_le_bytes(&self) -> [u8; QM31_LEN] {
        let mut out = [0u8; QM31_LEN];
        for (chunk, limb) in out.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&limb.to_le_bytes());
        }
        out
    }

    /// Every limb is strictly below the modulus.
    pub fn is_canonical(&self) -> bool {
        self.0.iter().all(|&limb| limb < M31_PRIME)
    }
}
