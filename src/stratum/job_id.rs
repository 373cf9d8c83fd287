use {super::*, std::convert::Infallible};

/// Opaque server-assigned job identifier; echoed back verbatim in
/// mining.submit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub struct JobId(String);

impl FromStr for JobId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.into()))
    }
}

impl Display for JobId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let id = serde_json::from_str::<JobId>(r#""1d987a1338""#).unwrap();
        assert_eq!(id, JobId::from("1d987a1338"));
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""1d987a1338""#);
    }
}
