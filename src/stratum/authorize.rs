use super::*;

/// The [username, password] params of mining.authorize.
#[derive(Debug, PartialEq)]
pub struct Authorize {
    pub username: String,
    pub password: String,
}

impl Serialize for Authorize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.username)?;
        seq.serialize_element(&self.password)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Authorize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (username, password) = <(String, String)>::deserialize(deserializer)?;
        Ok(Authorize { username, password })
    }
}
