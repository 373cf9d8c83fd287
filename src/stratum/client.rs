use {
    super::*,
    futures::{SinkExt, StreamExt},
    super::error::{ChannelRecvSnafu, IoSnafu, SerializationSnafu, TimeoutSnafu},
    tokio::{
        io::{AsyncRead, AsyncWrite},
        net::TcpStream,
    },
    tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError},
};

pub type Result<T = (), E = ClientError> = std::result::Result<T, E>;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub address: String,
    pub username: String,
    pub password: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub enum Event {
    Notify(Notify),
    SetDifficulty(Difficulty),
    Disconnected,
}

pub type EventReceiver = broadcast::Receiver<Event>;

#[derive(Debug, PartialEq)]
pub enum SubmitOutcome {
    Accepted,
    Rejected { reason: Option<String> },
}

/// Request issuer half of the transport. All socket traffic goes through
/// the connection actor, so no lock is ever held across I/O and a share
/// submission can never deadlock against reply dispatch.
#[derive(Clone)]
pub struct Client {
    pub config: Arc<ClientConfig>,
    tx: mpsc::Sender<Command>,
    events: broadcast::Sender<Event>,
}

enum Command {
    Request {
        method: &'static str,
        params: Value,
        tx: oneshot::Sender<Result<Message>>,
    },
    Disconnect,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        let (tx, _) = mpsc::channel(1);
        let (events, _) = broadcast::channel(64);

        Self {
            config: Arc::new(config),
            tx,
            events,
        }
    }

    /// Connects over TCP and starts the connection actor.
    pub async fn connect(&mut self) -> Result<EventReceiver> {
        let stream = tokio::time::timeout(
            self.config.timeout,
            TcpStream::connect(&self.config.address),
        )
        .await;
        let stream = snafu::ResultExt::context(stream, TimeoutSnafu)?;
        let stream = snafu::ResultExt::context(stream, IoSnafu)?;

        let (reader, writer) = stream.into_split();

        Ok(self.spawn(reader, writer))
    }

    /// Starts the actor over an arbitrary byte stream. The offline test
    /// harness drives the full dispatch path through an in-memory duplex.
    pub fn connect_stream<S>(&mut self, stream: S) -> EventReceiver
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        self.spawn(reader, writer)
    }

    fn spawn<R, W>(&mut self, reader: R, writer: W) -> EventReceiver
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let (tx, rx) = mpsc::channel(32);
        self.tx = tx;

        let connection = Connection::new(reader, writer, rx, self.events.clone());

        tokio::spawn(connection.run());

        self.events.subscribe()
    }

    pub async fn disconnect(&self) {
        let _ = self.tx.send(Command::Disconnect).await;
    }

    async fn request(&self, method: &'static str, params: Value) -> Result<Message> {
        let (tx, rx) = oneshot::channel();

        self.tx
            .send(Command::Request { method, params, tx })
            .await
            .map_err(|_| ClientError::NotConnected)?;

        snafu::ResultExt::context(rx.await, ChannelRecvSnafu)?
    }

    pub async fn subscribe(&self) -> Result<SubscribeResult> {
        let params = snafu::ResultExt::context(
            serde_json::to_value(Subscribe {
                user_agent: self.config.user_agent.clone(),
            }),
            SerializationSnafu,
        )?;

        match self.request("mining.subscribe", params).await? {
            Message::Response {
                result: Some(result),
                error: None,
                ..
            } => snafu::ResultExt::context(serde_json::from_value(result), SerializationSnafu),
            Message::Response {
                error: Some(error), ..
            } => Err(ClientError::Protocol {
                message: format!("mining.subscribe refused: {error}"),
            }),
            message => Err(ClientError::Protocol {
                message: format!("malformed mining.subscribe reply: {message:?}"),
            }),
        }
    }

    /// Authorizes the configured worker. Anything but `result: true` is
    /// fatal.
    pub async fn authorize(&self) -> Result {
        let params = snafu::ResultExt::context(
            serde_json::to_value(Authorize {
                username: self.config.username.clone(),
                password: self.config.password.clone().unwrap_or_default(),
            }),
            SerializationSnafu,
        )?;

        match self.request("mining.authorize", params).await? {
            Message::Response {
                result: Some(Value::Bool(true)),
                error: None,
                ..
            } => Ok(()),
            Message::Response { .. } => Err(ClientError::AuthenticationFailed),
            message => Err(ClientError::Protocol {
                message: format!("malformed mining.authorize reply: {message:?}"),
            }),
        }
    }

    /// Submits one share. A refusal is an outcome, not an error; the
    /// session keeps mining.
    pub async fn submit(&self, submit: Submit) -> Result<SubmitOutcome> {
        let params = snafu::ResultExt::context(serde_json::to_value(&submit), SerializationSnafu)?;

        match self.request("mining.submit", params).await? {
            Message::Response {
                result: Some(Value::Bool(true)),
                error: None,
                reject_reason: None,
                ..
            } => Ok(SubmitOutcome::Accepted),
            Message::Response {
                error,
                reject_reason,
                ..
            } => Ok(SubmitOutcome::Rejected {
                reason: reject_reason.or_else(|| error.map(|error| error.to_string())),
            }),
            message => Err(ClientError::Protocol {
                message: format!("malformed mining.submit reply: {message:?}"),
            }),
        }
    }
}

/// Owns the socket, the id counter, and the outstanding-request table.
/// Because it is the sole writer, wire order always matches id order.
struct Connection<R, W> {
    reader: FramedRead<R, LinesCodec>,
    writer: FramedWrite<W, LinesCodec>,
    rx: mpsc::Receiver<Command>,
    events: broadcast::Sender<Event>,
    next_id: u64,
    requests: BTreeMap<u64, Message>,
    pending: BTreeMap<u64, oneshot::Sender<Result<Message>>>,
}

impl<R, W> Connection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    fn new(reader: R, writer: W, rx: mpsc::Receiver<Command>, events: broadcast::Sender<Event>) -> Self {
        Self {
            reader: FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_MESSAGE_SIZE)),
            writer: FramedWrite::new(writer, LinesCodec::new()),
            rx,
            events,
            next_id: 1,
            requests: BTreeMap::new(),
            pending: BTreeMap::new(),
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(Command::Request { method, params, tx }) => {
                        if let Err(err) = self.transmit(method, params, tx).await {
                            error!("failed to send request: {err}");
                            break;
                        }
                    }
                    Some(Command::Disconnect) | None => break,
                },

                frame = self.reader.next() => match frame {
                    Some(Ok(line)) => self.handle_line(&line),
                    Some(Err(err)) => {
                        error!("read error: {err}");
                        break;
                    }
                    None => {
                        info!("connection closed by pool");
                        break;
                    }
                },
            }
        }

        for (_, tx) in std::mem::take(&mut self.pending) {
            let _ = tx.send(Err(ClientError::NotConnected));
        }

        let _ = self.events.send(Event::Disconnected);
    }

    async fn transmit(
        &mut self,
        method: &'static str,
        params: Value,
        tx: oneshot::Sender<Result<Message>>,
    ) -> Result {
        let id = self.next_id;
        self.next_id += 1;

        let message = Message::Request {
            id: Id::Number(id),
            method: method.into(),
            params,
        };

        let frame = match serde_json::to_string(&message) {
            Ok(frame) => frame,
            Err(err) => {
                let _ = tx.send(Err(ClientError::Serialization { source: err }));
                return Ok(());
            }
        };

        trace!("> {frame}");

        if let Err(err) = self.writer.send(frame).await {
            let _ = tx.send(Err(codec_error(err)));
            return Err(ClientError::NotConnected);
        }

        // Sent requests are recorded for the life of the session; replies
        // are matched against them but never evict the original.
        self.requests.insert(id, message);
        self.pending.insert(id, tx);

        Ok(())
    }

    fn handle_line(&mut self, line: &str) {
        trace!("< {line}");

        let message = match serde_json::from_str::<Message>(line) {
            Ok(message) => message,
            Err(err) => {
                warn!("skipping unparseable line {line:?}: {err}");
                return;
            }
        };

        match message {
            Message::Response {
                id: Id::Number(id),
                result,
                error,
                reject_reason,
            } => match self.pending.remove(&id) {
                Some(tx) => {
                    let _ = tx.send(Ok(Message::Response {
                        id: Id::Number(id),
                        result,
                        error,
                        reject_reason,
                    }));
                }
                None => match self.requests.get(&id) {
                    Some(request) => warn!("discarding duplicate reply to {request:?}"),
                    None => warn!("discarding reply to unknown request id {id}"),
                },
            },
            Message::Response { id, .. } => {
                warn!("discarding reply with unusable id {id}");
            }
            Message::Notification { method, params } => self.notification(&method, params),
            Message::Request { method, params, .. } => {
                warn!("ignoring unexpected request `{method}` from pool with params {params}");
            }
        }
    }

    fn notification(&self, method: &str, params: Value) {
        match method {
            "mining.notify" => match serde_json::from_value::<Notify>(params) {
                Ok(notify) => {
                    let _ = self.events.send(Event::Notify(notify));
                }
                Err(err) => warn!("malformed mining.notify: {err}"),
            },
            "mining.set_difficulty" => match serde_json::from_value::<SetDifficulty>(params) {
                Ok(set_difficulty) => {
                    let _ = self
                        .events
                        .send(Event::SetDifficulty(set_difficulty.difficulty()));
                }
                Err(err) => warn!("malformed mining.set_difficulty: {err}"),
            },
            method => warn!("ignoring unknown notification `{method}`"),
        }
    }
}

fn codec_error(err: LinesCodecError) -> ClientError {
    match err {
        LinesCodecError::Io(source) => ClientError::Io { source },
        LinesCodecError::MaxLineLengthExceeded => ClientError::Protocol {
            message: "line exceeds maximum message size".into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig {
            address: "offline".into(),
            username: "tester.worker".into(),
            password: Some("x".into()),
            user_agent: USER_AGENT.into(),
            timeout: Duration::from_secs(1),
        }
    }

    struct FakePool {
        reader: FramedRead<tokio::io::ReadHalf<tokio::io::DuplexStream>, LinesCodec>,
        writer: FramedWrite<tokio::io::WriteHalf<tokio::io::DuplexStream>, LinesCodec>,
    }

    fn wired() -> (Client, EventReceiver, FakePool) {
        let (near, far) = tokio::io::duplex(MAX_MESSAGE_SIZE);

        let mut client = Client::new(config());
        let events = client.connect_stream(near);

        let (reader, writer) = tokio::io::split(far);

        (
            client,
            events,
            FakePool {
                reader: FramedRead::new(reader, LinesCodec::new()),
                writer: FramedWrite::new(writer, LinesCodec::new()),
            },
        )
    }

    impl FakePool {
        async fn recv(&mut self) -> Value {
            let line = self.reader.next().await.unwrap().unwrap();
            serde_json::from_str(&line).unwrap()
        }

        async fn send(&mut self, line: impl Into<String>) {
            self.writer.send(line.into()).await.unwrap();
        }
    }

    #[tokio::test]
    async fn request_ids_start_at_one_and_increase_with_wire_order() {
        let (client, _events, mut pool) = wired();

        let task = tokio::spawn({
            let client = client.clone();
            async move { client.subscribe().await }
        });

        let request = pool.recv().await;
        assert_eq!(request["id"], 1);
        assert_eq!(request["method"], "mining.subscribe");
        assert_eq!(request["params"], serde_json::json!([USER_AGENT]));

        pool.send(r#"{"id":1,"result":[[["mining.notify","a"]],"00",4],"error":null}"#)
            .await;

        let subscribe = task.await.unwrap().unwrap();
        assert_eq!(subscribe.extranonce2_size, 4);

        let task = tokio::spawn({
            let client = client.clone();
            async move { client.authorize().await }
        });

        let request = pool.recv().await;
        assert_eq!(request["id"], 2);
        assert_eq!(request["method"], "mining.authorize");
        assert_eq!(
            request["params"],
            serde_json::json!(["tester.worker", "x"])
        );

        pool.send(r#"{"id":2,"result":true,"error":null}"#).await;

        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn authorization_refusal_is_fatal() {
        let (client, _events, mut pool) = wired();

        let task = tokio::spawn({
            let client = client.clone();
            async move { client.authorize().await }
        });

        pool.recv().await;
        pool.send(r#"{"id":1,"result":false,"error":null}"#).await;

        assert!(matches!(
            task.await.unwrap(),
            Err(ClientError::AuthenticationFailed)
        ));
    }

    #[tokio::test]
    async fn rejected_share_is_an_outcome_not_an_error() {
        let (client, _events, mut pool) = wired();

        let submit = Submit {
            worker_name: "tester.worker".into(),
            job_id: "1".into(),
            extranonce2: "00000000".parse().unwrap(),
            ntime: "4dcbc8a6".parse().unwrap(),
            nonce: Nonce::from(1),
        };

        let task = tokio::spawn({
            let client = client.clone();
            async move { client.submit(submit).await }
        });

        pool.recv().await;
        pool.send(r#"{"id":1,"result":false,"error":null,"reject-reason":"Stale"}"#)
            .await;

        assert_eq!(
            task.await.unwrap().unwrap(),
            SubmitOutcome::Rejected {
                reason: Some("Stale".into())
            }
        );
    }

    #[tokio::test]
    async fn notifications_fan_out_as_events() {
        let (_client, mut events, mut pool) = wired();

        pool.send(r#"{"id":null,"method":"mining.set_difficulty","params":[32768]}"#)
            .await;

        match events.recv().await.unwrap() {
            Event::SetDifficulty(difficulty) => assert_eq!(difficulty.value(), 32768.0),
            event => panic!("unexpected event: {event:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped_without_dropping_the_connection() {
        let (_client, mut events, mut pool) = wired();

        pool.send("this is not json").await;
        pool.send(r#"{"id":null,"method":"mining.set_difficulty","params":["bogus"]}"#)
            .await;
        pool.send(r#"{"id":null,"method":"mining.set_difficulty","params":[8]}"#)
            .await;

        match events.recv().await.unwrap() {
            Event::SetDifficulty(difficulty) => assert_eq!(difficulty.value(), 8.0),
            event => panic!("unexpected event: {event:?}"),
        }
    }

    #[tokio::test]
    async fn pool_hangup_announces_disconnect() {
        let (_client, mut events, pool) = wired();

        drop(pool);

        assert!(matches!(events.recv().await.unwrap(), Event::Disconnected));
    }
}
