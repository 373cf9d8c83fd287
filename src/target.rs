use {super::*, primitive_types::U256};

/// The 256-bit share target, displayed as 64 zero-padded hex chars. A hash
/// qualifies when, read as a big-endian integer, it does not exceed this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, DeserializeFromStr, SerializeDisplay)]
pub struct Target(U256);

impl Target {
    pub const MAX: Self = Target(U256::MAX);

    /// Derives the target from a pool difficulty the way the difficulty-1
    /// constant is conventionally scaled:
    /// `trunc((0xffff0000 * 2^192 + 1) / d - 1 + 0.5)`, clamped to
    /// 2^256 - 1. The intermediate arithmetic is IEEE-754 double, so the
    /// `+ 0.5` rounds exactly as the conventional derivation does.
    /// Difficulty zero means every hash qualifies.
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let difficulty = difficulty.value();

        if difficulty == 0.0 {
            return Self::MAX;
        }

        let numerator = 0xffff0000u64 as f64 * 2f64.powi(192) + 1.0;

        Target(u256_from_f64(numerator / difficulty - 1.0 + 0.5))
    }

    pub fn is_met_by(&self, hash: &[u8; 32]) -> bool {
        let mut big_endian = *hash;
        big_endian.reverse();

        U256::from_big_endian(&big_endian) <= self.0
    }

    /// The target as the hardware's TARGET bank wants it: eight 32-bit
    /// words, least significant first.
    pub(crate) fn to_le_words(&self) -> [u32; 8] {
        let bytes = self.0.to_big_endian();
        let mut words = [0u32; 8];

        for (i, word) in words.iter_mut().enumerate() {
            *word = BigEndian::read_u32(&bytes[32 - 4 * (i + 1)..32 - 4 * i]);
        }

        words
    }
}

/// Truncates a finite non-negative double to a U256, clamping overflow.
fn u256_from_f64(value: f64) -> U256 {
    if !value.is_finite() || value < 1.0 {
        return U256::zero();
    }

    let bits = value.to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as i64 - 1075;
    let mantissa = U256::from((bits & ((1u64 << 52) - 1)) | (1u64 << 52));

    if exponent <= 0 {
        // value >= 1.0 bounds the shift well inside the mantissa width
        mantissa >> (-exponent) as usize
    } else if mantissa.bits() as i64 + exponent > 256 {
        U256::MAX
    } else {
        mantissa << exponent as usize
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0.to_big_endian()))
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ensure!(s.len() == 64, "target hex must be 64 chars");

        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;

        Ok(Target(U256::from_big_endian(&bytes)))
    }
}
