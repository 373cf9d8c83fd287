use super::*;

/// Everything the pool hands the miner across the subscribe/authorize
/// handshake, plus the target derived from the latest difficulty. Jobs
/// snapshot this state at creation; later difficulty changes only affect
/// future jobs.
#[derive(Debug, Default)]
pub(crate) struct Subscription {
    subscription_id: Option<String>,
    extranonce1: Option<Extranonce>,
    extranonce2_size: Option<usize>,
    worker_name: Option<String>,
    difficulty: Option<Difficulty>,
    target: Option<Target>,
}

impl Subscription {
    pub(crate) fn set_subscription(&mut self, result: &SubscribeResult) -> Result {
        ensure!(
            self.subscription_id.is_none(),
            "already subscribed as {:?}",
            self.subscription_id
        );

        let subscription_id = result
            .subscription_id()
            .ok_or_else(|| anyhow!("subscribe reply carries no subscription pairs"))?;

        self.subscription_id = Some(subscription_id.into());
        self.extranonce1 = Some(result.extranonce1.clone());
        self.extranonce2_size = Some(result.extranonce2_size);

        Ok(())
    }

    pub(crate) fn set_worker_name(&mut self, worker_name: &str) -> Result {
        if let Some(existing) = &self.worker_name {
            bail!("already authorized as {existing} (requested {worker_name})");
        }

        self.worker_name = Some(worker_name.into());

        Ok(())
    }

    pub(crate) fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = Some(difficulty);
        self.target = Some(Target::from_difficulty(difficulty));
    }

    pub(crate) fn subscription_id(&self) -> Option<&str> {
        self.subscription_id.as_deref()
    }

    pub(crate) fn worker_name(&self) -> Option<&str> {
        self.worker_name.as_deref()
    }

    pub(crate) fn extranonce1(&self) -> Option<&Extranonce> {
        self.extranonce1.as_ref()
    }

    pub(crate) fn extranonce2_size(&self) -> Option<usize> {
        self.extranonce2_size
    }

    /// Until the pool retargets us, every hash qualifies; the pool will
    /// judge early shares however it likes.
    pub(crate) fn target(&self) -> Target {
        self.target.unwrap_or(Target::MAX)
    }

    pub(crate) fn create_job(&self, notify: Notify) -> Result<Job> {
        let (Some(extranonce1), Some(extranonce2_size)) =
            (&self.extranonce1, self.extranonce2_size)
        else {
            bail!("cannot create job before mining.subscribe completes");
        };

        Ok(Job::new(
            notify,
            self.target(),
            extranonce1.clone(),
            extranonce2_size,
        ))
    }
}
