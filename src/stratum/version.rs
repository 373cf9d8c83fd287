use super::*;

/// Block version as a 4 byte big-endian hex word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct Version(u32);

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let version = u32::from_str_radix(s, 16)
            .with_context(|| format!("invalid version hex string `{s}`"))?;

        Ok(Version(version))
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl From<Version> for u32 {
    fn from(version: Version) -> u32 {
        version.0
    }
}

impl From<u32> for Version {
    fn from(version: u32) -> Version {
        Version(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        assert_eq!("00000001".parse::<Version>().unwrap(), Version(1));
        assert_eq!(Version(1).to_string(), "00000001");
        assert_eq!("20000000".parse::<Version>().unwrap(), Version(0x2000_0000));
    }
}
