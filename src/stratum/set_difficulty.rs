use super::*;

/// The single-element params of mining.set_difficulty.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SetDifficulty(Difficulty);

impl SetDifficulty {
    pub fn difficulty(self) -> Difficulty {
        self.0
    }
}

impl Serialize for SetDifficulty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(1))?;
        seq.serialize_element(&self.0)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for SetDifficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (difficulty,) = <(Difficulty,)>::deserialize(deserializer)?;
        Ok(SetDifficulty(difficulty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_param() {
        let parsed = serde_json::from_str::<SetDifficulty>("[32768]").unwrap();
        assert_eq!(parsed.difficulty().value(), 32768.0);
    }

    #[test]
    fn wrong_arity_rejected() {
        assert!(serde_json::from_str::<SetDifficulty>("[]").is_err());
        assert!(serde_json::from_str::<SetDifficulty>("[1,2]").is_err());
    }
}
