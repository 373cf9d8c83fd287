use super::*;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Display)]
#[serde(untagged)]
pub enum Id {
    Null,
    Number(u64),
    String(String),
}

/// One line of the wire protocol. Stratum notifications come with
/// `id: null`, which the JSON-RPC spec says should be an absent field;
/// both spellings normalize to `Notification`.
#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Message {
    Request {
        id: Id,
        method: String,
        params: Value,
    },
    Response {
        id: Id,
        result: Option<Value>,
        error: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none", rename = "reject-reason")]
        reject_reason: Option<String>,
    },
    Notification {
        method: String,
        params: Value,
    },
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;

        let has_method = value.get("method").is_some();
        let null_id = value.get("id").is_none_or(|id| id.is_null());

        if value.get("result").is_some()
            || value.get("error").is_some()
            || value.get("reject-reason").is_some()
        {
            #[derive(Deserialize)]
            struct Reply {
                id: Id,
                result: Option<Value>,
                error: Option<Value>,
                #[serde(rename = "reject-reason")]
                reject_reason: Option<String>,
            }

            let reply = Reply::deserialize(value).map_err(de::Error::custom)?;

            Ok(Message::Response {
                id: reply.id,
                result: reply.result,
                error: reply.error,
                reject_reason: reply.reject_reason,
            })
        } else if has_method && null_id {
            let method = value
                .get("method")
                .and_then(Value::as_str)
                .ok_or_else(|| de::Error::custom("method must be a string"))?
                .into();

            let params = value
                .get("params")
                .cloned()
                .ok_or_else(|| de::Error::missing_field("params"))?;

            Ok(Message::Notification { method, params })
        } else if has_method {
            #[derive(Deserialize)]
            struct Request {
                id: Id,
                method: String,
                params: Value,
            }

            let request = Request::deserialize(value).map_err(de::Error::custom)?;

            Ok(Message::Request {
                id: request.id,
                method: request.method,
                params: request.params,
            })
        } else {
            Err(de::Error::custom("unrecognized message shape"))
        }
    }
}
