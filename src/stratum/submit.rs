use super::*;

/// The [worker, job_id, extranonce2, ntime, nonce] params of
/// mining.submit.
#[derive(Debug, PartialEq, Clone)]
pub struct Submit {
    pub worker_name: String,
    pub job_id: JobId,
    pub extranonce2: Extranonce,
    pub ntime: Ntime,
    pub nonce: Nonce,
}

impl Serialize for Submit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(5))?;
        seq.serialize_element(&self.worker_name)?;
        seq.serialize_element(&self.job_id)?;
        seq.serialize_element(&self.extranonce2)?;
        seq.serialize_element(&self.ntime)?;
        seq.serialize_element(&self.nonce)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Submit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (worker_name, job_id, extranonce2, ntime, nonce) =
            <(String, JobId, Extranonce, Ntime, Nonce)>::deserialize(deserializer)?;

        Ok(Submit {
            worker_name,
            job_id,
            extranonce2,
            ntime,
            nonce,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn golden_share_wire_shape() {
        let submit = Submit {
            worker_name: "tester".into(),
            job_id: "1d987a1338".into(),
            extranonce2: "00000000".parse().unwrap(),
            ntime: "4dcbc8a6".parse().unwrap(),
            nonce: Nonce::from(2436437219),
        };

        assert_eq!(
            serde_json::to_value(&submit).unwrap(),
            serde_json::json!(["tester", "1d987a1338", "00000000", "4dcbc8a6", "913914e3"])
        );
    }
}
