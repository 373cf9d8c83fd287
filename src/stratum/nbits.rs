use super::*;

/// Compact network difficulty as a 4 byte big-endian hex word. Only ever
/// copied into the header; shares are judged against the pool target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct Nbits(u32);

impl FromStr for Nbits {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let nbits = u32::from_str_radix(s, 16)
            .with_context(|| format!("invalid nbits hex string `{s}`"))?;

        Ok(Nbits(nbits))
    }
}

impl Display for Nbits {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl From<Nbits> for u32 {
    fn from(nbits: Nbits) -> u32 {
        nbits.0
    }
}

impl From<u32> for Nbits {
    fn from(nbits: u32) -> Nbits {
        Nbits(nbits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        assert_eq!("1a6a93b3".parse::<Nbits>().unwrap(), Nbits(0x1a6a93b3));
        assert_eq!(Nbits(0x1a6a93b3).to_string(), "1a6a93b3");
    }
}
