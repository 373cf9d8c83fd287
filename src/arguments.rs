use super::*;

#[derive(Debug, Parser)]
#[command(version, about = "CPU and FPGA Bitcoin miner speaking Stratum v1")]
pub(crate) struct Arguments {
    #[command(flatten)]
    pub(crate) options: Options,
}

impl Arguments {
    pub(crate) fn run(self) -> Result {
        if self.options.test {
            return Runtime::new()?.block_on(harness::run_all(&self.options));
        }

        let (username, password) = self.options.credentials()?;

        let url = self
            .options
            .url
            .clone()
            .ok_or_else(|| anyhow!("stratum url required (-o)"))?;

        let address = resolve_endpoint(&url)?;
        let hasher = hasher::build(self.options.backend(), self.options.fpga_address()?)?;
        let cores = self.options.cores();

        if self.options.background {
            // Detach before the runtime spins up its worker threads.
            nix::unistd::daemon(false, false).context("failed to daemonize")?;
        }

        Runtime::new()?.block_on(async {
            let config = ClientConfig {
                address,
                username,
                password,
                user_agent: USER_AGENT.into(),
                timeout: Duration::from_secs(10),
            };

            let mut client = Client::new(config);

            info!("Connecting to {url} as {}", client.config.username);

            let events = client.connect().await?;

            let cancel = CancellationToken::new();

            let shutdown = cancel.clone();
            tokio::spawn(async move {
                let _ = ctrl_c().await;
                info!("Interrupt received, shutting down");
                shutdown.cancel();
            });

            let accepted = Miner::new(client, hasher, cores, Mode::Continuous)
                .serve(events, cancel)
                .await?;

            info!("Session closed with {accepted} accepted shares");

            Ok(())
        })
    }
}
