use super::*;

/// Previous block hash. The wire swaps the bytes of every 4 byte word;
/// stored here in the order the block header wants, so building the
/// header is a straight copy.
#[derive(Debug, Clone, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct PrevHash([u8; 32]);

impl PrevHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for PrevHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ensure!(s.len() == 64, "prevhash hex must be 64 chars");

        let mut wire = [0u8; 32];
        hex::decode_to_slice(s, &mut wire)?;

        Ok(PrevHash(swap_each_word(wire)))
    }
}

impl Display for PrevHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(swap_each_word(self.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn case(wire: &str, header_order: &str) {
        let prevhash = wire.parse::<PrevHash>().unwrap();

        assert_eq!(hex::encode(prevhash.as_bytes()), header_order);
        assert_eq!(prevhash.to_string(), wire);

        let serialized = serde_json::to_string(&prevhash).unwrap();
        assert_eq!(serialized, format!("\"{wire}\""));
        assert_eq!(
            serde_json::from_str::<PrevHash>(&serialized).unwrap(),
            prevhash
        );
    }

    #[test]
    fn block_123456_prevhash() {
        case(
            "3ac400955224c625ad00510bf9b92cf824fd72dabc96a44700000b6000000000",
            "9500c43a25c624520b5100adf82cb9f9da72fd2447a496bc600b000000000000",
        );
    }

    #[test]
    fn another_prevhash() {
        case(
            "4d16b6f85af6e2198f44ae2a6de67f78487ae5611b77c6c0440b921e00000000",
            "f8b6164d19e2f65a2aae448f787fe66d61e57a48c0c6771b1e920b4400000000",
        );
    }

    #[test]
    fn rejects_wrong_length_and_bad_hex() {
        assert!("abcd".parse::<PrevHash>().is_err());
        assert!(
            "zz16b6f85af6e2198f44ae2a6de67f78487ae5611b77c6c0440b921e00000000"
                .parse::<PrevHash>()
                .is_err()
        );
    }
}
