use super::*;

/// A pool- or client-chosen byte string spliced into the coinbase,
/// carried as hex on the wire. May be empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub struct Extranonce(Vec<u8>);

impl Extranonce {
    /// Packs a counter little-endian into a fixed width field, high bytes
    /// zero.
    pub fn pack(value: u32, size: usize) -> Self {
        let mut bytes = vec![0u8; size];

        for (i, byte) in bytes.iter_mut().enumerate().take(4) {
            *byte = (value >> (8 * i)) as u8;
        }

        Self(bytes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl Display for Extranonce {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Extranonce {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(hex::decode(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let extranonce = serde_json::from_str::<Extranonce>(r#""abcd""#).unwrap();
        assert_eq!(extranonce.len(), 2);
        assert_eq!(extranonce.to_hex(), "abcd");
        assert_eq!(serde_json::to_string(&extranonce).unwrap(), r#""abcd""#);
    }

    #[test]
    fn empty_is_fine() {
        let extranonce = "".parse::<Extranonce>().unwrap();
        assert!(extranonce.is_empty());
        assert_eq!(extranonce.to_string(), "");
    }

    #[test]
    fn rejects_bad_hex() {
        assert!("abc".parse::<Extranonce>().is_err());
        assert!("zz".parse::<Extranonce>().is_err());
    }

    #[test]
    fn pack_is_little_endian_with_zero_padding() {
        assert_eq!(Extranonce::pack(0, 4).to_hex(), "00000000");
        assert_eq!(Extranonce::pack(1, 4).to_hex(), "01000000");
        assert_eq!(Extranonce::pack(0xdead_beef, 4).to_hex(), "efbeadde");
        assert_eq!(Extranonce::pack(7, 8).to_hex(), "0700000000000000");
        assert_eq!(Extranonce::pack(0x0102, 2).to_hex(), "0201");
    }
}
