use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Mine until the connection drops or we are told to stop.
    Continuous,
    /// Exit after the first accepted share; the offline harness runs this.
    ShareFound,
}

/// Binds transport events to subscription state and the search workers.
pub(crate) struct Miner {
    client: Client,
    subscription: Subscription,
    hasher: Arc<dyn Hasher>,
    cores: usize,
    nonce_start: u32,
    mode: Mode,
    current: Option<Arc<Job>>,
    workers: JoinSet<()>,
    share_tx: mpsc::Sender<Share>,
    share_rx: mpsc::Receiver<Share>,
    accepted: u64,
    rejected: u64,
}

impl Miner {
    pub(crate) fn new(client: Client, hasher: Arc<dyn Hasher>, cores: usize, mode: Mode) -> Self {
        let (share_tx, share_rx) = mpsc::channel(256);

        Self {
            client,
            subscription: Subscription::default(),
            hasher,
            cores: cores.max(1),
            nonce_start: 0,
            mode,
            current: None,
            workers: JoinSet::new(),
            share_tx,
            share_rx,
            accepted: 0,
            rejected: 0,
        }
    }

    pub(crate) fn with_nonce_start(mut self, nonce_start: u32) -> Self {
        self.nonce_start = nonce_start;
        self
    }

    /// Runs the subscribe/authorize handshake, then mines until the
    /// connection drops or the token cancels. Returns the accepted share
    /// count.
    pub(crate) async fn serve(
        mut self,
        events: EventReceiver,
        cancel: CancellationToken,
    ) -> Result<u64> {
        let subscribe = self
            .client
            .subscribe()
            .await
            .context("mining.subscribe failed")?;

        self.subscription.set_subscription(&subscribe)?;

        info!(
            "Subscribed: id={}, extranonce1={}, extranonce2_size={}",
            self.subscription.subscription_id().unwrap_or("?"),
            subscribe.extranonce1,
            subscribe.extranonce2_size,
        );

        self.client
            .authorize()
            .await
            .context("mining.authorize failed")?;

        self.subscription
            .set_worker_name(&self.client.config.username)?;

        info!("Authorized as {}", self.client.config.username);

        let result = self.event_loop(events, cancel).await;

        if let Some(job) = self.current.take() {
            job.stop();
        }

        // Unblock any worker parked on a full share channel, then drain.
        self.share_rx.close();
        while self.workers.join_next().await.is_some() {}

        self.client.disconnect().await;

        result.map(|()| self.accepted)
    }

    async fn event_loop(&mut self, mut events: EventReceiver, cancel: CancellationToken) -> Result {
        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!("Shutting down after {} accepted, {} rejected shares", self.accepted, self.rejected);
                    return Ok(());
                }

                event = events.recv() => match event {
                    Ok(Event::Notify(notify)) => self.handle_notify(notify)?,
                    Ok(Event::SetDifficulty(difficulty)) => {
                        self.subscription.set_difficulty(difficulty);
                        info!("Difficulty now {difficulty}; applies to future jobs");
                    }
                    Ok(Event::Disconnected) => bail!("connection to pool lost"),
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        warn!("event stream lagged, {count} messages dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => bail!("event stream closed"),
                },

                Some(share) = self.share_rx.recv() => {
                    if self.submit(share).await? && self.mode == Mode::ShareFound {
                        info!("Share accepted, exiting");
                        return Ok(());
                    }
                }
            }
        }
    }

    fn handle_notify(&mut self, notify: Notify) -> Result {
        info!(
            "New job: job_id={}, clean_jobs={}",
            notify.job_id, notify.clean_jobs
        );

        // The outgoing job is stopped before its replacement starts. A
        // worker may still deliver one last share from the old job; it is
        // forwarded anyway and the pool rejects it if stale.
        if let Some(job) = self.current.take() {
            job.stop();
        }

        let job = Arc::new(self.subscription.create_job(notify)?);

        for index in 0..self.cores {
            let job = job.clone();
            let hasher = self.hasher.clone();
            let share_tx = self.share_tx.clone();
            let nonce_start = self.nonce_start.wrapping_add(index as u32);
            let nonce_stride = self.cores as u32;

            self.workers.spawn_blocking(move || {
                for share in job.mine(hasher.as_ref(), nonce_start, nonce_stride) {
                    match share {
                        Ok(share) => {
                            if share_tx.blocking_send(share).is_err() {
                                return;
                            }
                        }
                        Err(err) => {
                            error!("search failed: {err:#}; waiting for the next job");
                            break;
                        }
                    }
                }

                info!(
                    "Job {} wound down after {} hashes at {}",
                    job.job_id,
                    job.hashes(),
                    job.hashrate(),
                );
            });
        }

        self.current = Some(job);

        Ok(())
    }

    async fn submit(&mut self, share: Share) -> Result<bool> {
        let Some(worker_name) = self.subscription.worker_name() else {
            bail!("share found before authorization completed");
        };

        info!(
            "Found share: job_id={}, extranonce2={}, ntime={}, nonce={}",
            share.job_id, share.extranonce2, share.ntime, share.nonce,
        );

        let submit = Submit {
            worker_name: worker_name.into(),
            job_id: share.job_id,
            extranonce2: share.extranonce2,
            ntime: share.ntime,
            nonce: share.nonce,
        };

        debug!("Submitting {submit:?}");

        match self
            .client
            .submit(submit)
            .await
            .context("mining.submit failed")?
        {
            SubmitOutcome::Accepted => {
                self.accepted += 1;
                info!("Accepted shares: {}", self.accepted);
                Ok(true)
            }
            SubmitOutcome::Rejected { reason } => {
                self.rejected += 1;
                warn!(
                    "Share rejected: {}",
                    reason.as_deref().unwrap_or("no reason given")
                );
                Ok(false)
            }
        }
    }
}
