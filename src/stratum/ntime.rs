use super::*;

/// Block timestamp as a 4 byte big-endian hex word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, DeserializeFromStr, SerializeDisplay)]
pub struct Ntime(u32);

impl FromStr for Ntime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ntime = u32::from_str_radix(s, 16)
            .with_context(|| format!("invalid ntime hex string `{s}`"))?;

        Ok(Ntime(ntime))
    }
}

impl Display for Ntime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl From<Ntime> for u32 {
    fn from(ntime: Ntime) -> u32 {
        ntime.0
    }
}

impl From<u32> for Ntime {
    fn from(ntime: u32) -> Ntime {
        Ntime(ntime)
    }
}
