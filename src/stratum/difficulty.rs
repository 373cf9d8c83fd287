use super::*;

/// Pool difficulty as carried by mining.set_difficulty. Finite and
/// non-negative; zero is legal and maps to the all-ones target.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Difficulty(f64);

impl Difficulty {
    pub fn new(value: f64) -> Result<Self> {
        ensure!(
            value.is_finite() && value >= 0.0,
            "difficulty must be finite and non-negative, got {value}"
        );

        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Difficulty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract() == 0.0 && self.0 <= u64::MAX as f64 {
            serializer.serialize_u64(self.0 as u64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Int(u64),
            Float(f64),
        }

        let value = match Wire::deserialize(deserializer)? {
            Wire::Int(value) => value as f64,
            Wire::Float(value) => value,
        };

        Difficulty::new(value).map_err(|err| de::Error::custom(err.to_string()))
    }
}
