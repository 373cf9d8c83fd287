use super::*;

/// Header nonce, submitted as the big-endian hex of its little-endian
/// header packing, i.e. plain `{:08x}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct Nonce(u32);

impl FromStr for Nonce {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let nonce = u32::from_str_radix(s, 16)
            .with_context(|| format!("invalid nonce hex string `{s}`"))?;

        Ok(Nonce(nonce))
    }
}

impl Display for Nonce {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl From<Nonce> for u32 {
    fn from(nonce: Nonce) -> u32 {
        nonce.0
    }
}

impl From<u32> for Nonce {
    fn from(nonce: u32) -> Nonce {
        Nonce(nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        assert_eq!(Nonce::from(u32::MAX).to_string(), "ffffffff");
        assert_eq!("ffffffff".parse::<Nonce>().unwrap(), Nonce::from(u32::MAX));

        assert_eq!(Nonce::from(0).to_string(), "00000000");
        assert_eq!("00000000".parse::<Nonce>().unwrap(), Nonce::from(0));
    }

    #[test]
    fn golden_nonce_renders_byte_reversed_from_header_order() {
        assert_eq!(Nonce::from(2436437219).to_string(), "913914e3");
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<Nonce>().is_err());
        assert!("0x1".parse::<Nonce>().is_err());
        assert!("zzzzzzzz".parse::<Nonce>().is_err());
    }
}
