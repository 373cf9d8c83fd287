use super::*;

/// The [user_agent] params of mining.subscribe.
#[derive(Debug, PartialEq)]
pub struct Subscribe {
    pub user_agent: String,
}

impl Serialize for Subscribe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(1))?;
        seq.serialize_element(&self.user_agent)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Subscribe {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (user_agent,) = <(String,)>::deserialize(deserializer)?;
        Ok(Subscribe { user_agent })
    }
}

/// The reply to mining.subscribe:
/// `[[[method, id], ...], extranonce1, extranonce2_size]`.
#[derive(Debug, PartialEq, Clone)]
pub struct SubscribeResult {
    pub subscriptions: Vec<(String, String)>,
    pub extranonce1: Extranonce,
    pub extranonce2_size: usize,
}

impl SubscribeResult {
    /// The session identifier, taken from the mining.notify subscription
    /// pair, falling back to the last pair listed.
    pub fn subscription_id(&self) -> Option<&str> {
        self.subscriptions
            .iter()
            .find(|(method, _)| method == "mining.notify")
            .or_else(|| self.subscriptions.last())
            .map(|(_, id)| id.as_str())
    }
}

impl Serialize for SubscribeResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&self.subscriptions)?;
        seq.serialize_element(&self.extranonce1)?;
        seq.serialize_element(&self.extranonce2_size)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for SubscribeResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (subscriptions, extranonce1, extranonce2_size) =
            <(Vec<(String, String)>, Extranonce, usize)>::deserialize(deserializer)?;

        Ok(SubscribeResult {
            subscriptions,
            extranonce1,
            extranonce2_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_serializes_as_single_param() {
        let subscribe = Subscribe {
            user_agent: USER_AGENT.into(),
        };

        assert_eq!(
            serde_json::to_value(&subscribe).unwrap(),
            serde_json::json!(["pyrite/0.1.0"])
        );
    }

    #[test]
    fn result_roundtrip() {
        let json = r#"
            [
              [
                ["mining.set_difficulty","b4b6693b72a50c7116db18d6497cac52"],
                ["mining.notify","ae6812eb4cd7735a302a8a9dd95cf71f"]
              ],
              "08000002",
              4
            ]
        "#;

        let parsed = serde_json::from_str::<SubscribeResult>(json).unwrap();

        assert_eq!(parsed.extranonce1, "08000002".parse().unwrap());
        assert_eq!(parsed.extranonce2_size, 4);
        assert_eq!(
            parsed.subscription_id(),
            Some("ae6812eb4cd7735a302a8a9dd95cf71f")
        );

        let serialized = serde_json::to_string(&parsed).unwrap();
        assert_eq!(
            serde_json::from_str::<SubscribeResult>(&serialized).unwrap(),
            parsed
        );
    }

    #[test]
    fn subscription_id_falls_back_to_last_pair() {
        let parsed = serde_json::from_str::<SubscribeResult>(
            r#"[[["mining.set_difficulty","deadbeef"]],"",8]"#,
        )
        .unwrap();

        assert_eq!(parsed.subscription_id(), Some("deadbeef"));

        let empty = serde_json::from_str::<SubscribeResult>(r#"[[],"",8]"#).unwrap();
        assert_eq!(empty.subscription_id(), None);
    }

    #[test]
    fn malformed_results_rejected() {
        assert!(serde_json::from_str::<SubscribeResult>(r#"[[],""]"#).is_err());
        assert!(serde_json::from_str::<SubscribeResult>(r#"["",8]"#).is_err());
    }
}
