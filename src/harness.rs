use {
    super::*,
    futures::{SinkExt, StreamExt},
    tokio::io::{AsyncRead, DuplexStream},
    tokio_util::codec::{FramedRead, FramedWrite, LinesCodec},
};

pub(crate) const GOLDEN_NONCE: u32 = 2_436_437_219;

// The canned session: the subscribe reply hands out an empty extranonce1
// and a 4 byte extranonce2, so the zero extranonce2 byte-for-byte
// completes the canonical block 123,456 coinbase.
const SUBSCRIBE_RESULT: &str = r#"[[["mining.set_difficulty","1"],["mining.notify","1"]],"",4]"#;

const SET_DIFFICULTY: &str = r#"{"id":null,"method":"mining.set_difficulty","params":[32768]}"#;

const NOTIFY: &str = r#"{"id":null,"method":"mining.notify","params":["1d987a1338","3ac400955224c625ad00510bf9b92cf824fd72dabc96a44700000b6000000000","01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff0704b3936a1a017cffffffff01403d522a01000000434104563053b8900762f3d3e8725012d617d177e3c4af3275c3265a1908b434e0df91ec75603d0d8955ef040e5f68d5c36989efe21a59f4ef94a5cc95c99794a84492ac","",["b4839c227eb12a4682ef507024a44066d1b54b2a224cf4765bdd46b35a42d0e3","ff55ad590268952712d3586af4f4619eb5f280ed671e2a7dca766076994e19ff","d8adfb1856bc923a6da4e83914013405334915d4ece1eb36d09cef8119850ea4","ce28b22ba91639d5ae35d0f7a17e02b422fa251c372cb600daf62b7f3df0bdbd"],"00000001","1a6a93b3","4dcbc8a6",true]}"#;

/// Runs the `-t` harness against every software backend, plus the
/// hardware when it was explicitly selected.
pub(crate) async fn run_all(options: &Options) -> Result {
    for backend in options.test_backends() {
        info!("Testing the {backend:?} backend offline");
        run(hasher::build(backend, options.fpga_address()?)?).await?;
        info!("{backend:?} backend produced the golden share");
    }

    Ok(())
}

/// Replays a canned pool session through the full dispatch path over an
/// in-memory stream and checks the first submitted share against the
/// known-good tuple.
pub(crate) async fn run(hasher: Arc<dyn Hasher>) -> Result {
    let (near, far) = tokio::io::duplex(MAX_MESSAGE_SIZE);

    let mut client = Client::new(ClientConfig {
        address: "offline".into(),
        username: "tester".into(),
        password: None,
        user_agent: USER_AGENT.into(),
        timeout: Duration::from_secs(10),
    });

    let events = client.connect_stream(near);

    let pool = tokio::spawn(pool_script(far));

    let accepted = Miner::new(client, hasher, 1, Mode::ShareFound)
        .with_nonce_start(GOLDEN_NONCE - 5)
        .serve(events, CancellationToken::new())
        .await?;

    ensure!(accepted == 1, "expected one accepted share, got {accepted}");

    let submit = pool.await??;

    ensure!(
        submit == serde_json::json!(["tester", "1d987a1338", "00000000", "4dcbc8a6", "913914e3"]),
        "golden share mismatch: {submit}"
    );

    Ok(())
}

/// The pool's side of the conversation: answer the handshake, hand out
/// the canonical job, and return the params of the submit that comes
/// back.
async fn pool_script(stream: DuplexStream) -> Result<Value> {
    let (reader, writer) = tokio::io::split(stream);
    let mut reader = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_MESSAGE_SIZE));
    let mut writer = FramedWrite::new(writer, LinesCodec::new());

    let (id, _) = expect_request(&mut reader, "mining.subscribe").await?;
    writer
        .send(format!(
            r#"{{"id":{},"result":{SUBSCRIBE_RESULT},"error":null}}"#,
            serde_json::to_string(&id)?,
        ))
        .await?;

    let (id, _) = expect_request(&mut reader, "mining.authorize").await?;
    writer
        .send(format!(
            r#"{{"id":{},"result":true,"error":null}}"#,
            serde_json::to_string(&id)?,
        ))
        .await?;

    writer.send(SET_DIFFICULTY.to_string()).await?;
    writer.send(NOTIFY.to_string()).await?;

    let (id, params) = expect_request(&mut reader, "mining.submit").await?;
    writer
        .send(format!(
            r#"{{"id":{},"result":true,"error":null}}"#,
            serde_json::to_string(&id)?,
        ))
        .await?;

    Ok(params)
}

async fn expect_request<R>(
    reader: &mut FramedRead<R, LinesCodec>,
    method: &str,
) -> Result<(Id, Value)>
where
    R: AsyncRead + Unpin,
{
    let line = reader
        .next()
        .await
        .ok_or_else(|| anyhow!("stream closed while waiting for {method}"))??;

    match serde_json::from_str::<Message>(&line)? {
        Message::Request {
            id,
            method: got,
            params,
        } if got == method => Ok((id, params)),
        message => bail!("expected {method}, got {message:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn library_backend_produces_the_golden_share() {
        run(hasher::build(Backend::Library, 0).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reference_backend_produces_the_golden_share() {
        run(hasher::build(Backend::Reference, 0).unwrap())
            .await
            .unwrap();
    }
}
