use super::*;

/// Upper bound of the extranonce2 sweep. Values pack little-endian into
/// the extranonce2 field, so the sweep is bounded well below the field's
/// capacity for every size the pool can assign.
pub(crate) const EXTRANONCE2_SPACE: u32 = 0x7fff_ffff;

/// A unit of work from mining.notify, frozen together with the target and
/// extranonce layout the subscription held when it arrived.
#[derive(Debug)]
pub(crate) struct Job {
    pub(crate) job_id: JobId,
    pub(crate) prevhash: PrevHash,
    pub(crate) coinb1: String,
    pub(crate) coinb2: String,
    pub(crate) merkle_branches: Vec<MerkleNode>,
    pub(crate) version: Version,
    pub(crate) nbits: Nbits,
    pub(crate) ntime: Ntime,
    pub(crate) target: Target,
    pub(crate) extranonce1: Extranonce,
    pub(crate) extranonce2_size: usize,
    stop: CancellationToken,
    hashes: AtomicU64,
    busy_micros: AtomicU64,
}

/// One winning tuple, rendered the way mining.submit wants it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Share {
    pub(crate) job_id: JobId,
    pub(crate) extranonce2: Extranonce,
    pub(crate) ntime: Ntime,
    pub(crate) nonce: Nonce,
}

impl Job {
    pub(crate) fn new(
        notify: Notify,
        target: Target,
        extranonce1: Extranonce,
        extranonce2_size: usize,
    ) -> Self {
        Self {
            job_id: notify.job_id,
            prevhash: notify.prevhash,
            coinb1: notify.coinb1,
            coinb2: notify.coinb2,
            merkle_branches: notify.merkle_branches,
            version: notify.version,
            nbits: notify.nbits,
            ntime: notify.ntime,
            target,
            extranonce1,
            extranonce2_size,
            stop: CancellationToken::new(),
            hashes: AtomicU64::new(0),
            busy_micros: AtomicU64::new(0),
        }
    }

    /// Asks the search to wind down after its current hash. Cooperative
    /// and idempotent; safe from any thread.
    pub(crate) fn stop(&self) {
        self.stop.cancel();
    }

    pub(crate) fn hashes(&self) -> u64 {
        self.hashes.load(Ordering::Relaxed)
    }

    /// Attempts per second of search time, zero before any time accrues.
    pub(crate) fn hashrate(&self) -> HashRate {
        let micros = self.busy_micros.load(Ordering::Relaxed);

        if micros == 0 {
            return HashRate::ZERO;
        }

        HashRate(self.hashes() as f64 / (micros as f64 / 1e6))
    }

    /// Lazily walks the extranonce2 × nonce space, yielding every tuple
    /// that meets the target. Ends on stop() or exhaustion. Workers that
    /// split the nonce space pass distinct starts and a common stride.
    pub(crate) fn mine<'a>(
        &'a self,
        hasher: &'a dyn Hasher,
        nonce_start: u32,
        nonce_stride: u32,
    ) -> Mine<'a> {
        Mine {
            job: self,
            hasher,
            nonce_start,
            nonce_stride: nonce_stride.max(1),
            extranonce2: 0,
            nonce: nonce_start,
            done: false,
        }
    }
}

pub(crate) struct Mine<'a> {
    job: &'a Job,
    hasher: &'a dyn Hasher,
    nonce_start: u32,
    nonce_stride: u32,
    extranonce2: u32,
    nonce: u32,
    done: bool,
}

impl Mine<'_> {
    fn step(&mut self) -> Result<Option<Share>> {
        loop {
            if self.done || self.job.stop.is_cancelled() {
                self.done = true;
                return Ok(None);
            }

            let extranonce2 = Extranonce::pack(self.extranonce2, self.job.extranonce2_size);

            let merkle_root = merkle_root(
                &self.job.coinb1,
                &self.job.coinb2,
                &self.job.extranonce1,
                &extranonce2,
                &self.job.merkle_branches,
            )?;

            let prefix = header_prefix(
                self.job.version,
                &self.job.prevhash,
                &merkle_root,
                self.job.ntime,
                self.job.nbits,
            );

            let started = Instant::now();

            let outcome = self.hasher.search(
                &prefix,
                &self.job.target,
                self.nonce,
                self.nonce_stride,
                &self.job.stop,
            );

            self.job
                .busy_micros
                .fetch_add(started.elapsed().as_micros() as u64, Ordering::Relaxed);

            match outcome? {
                Search::Found { nonce, hashes } => {
                    self.job.hashes.fetch_add(hashes, Ordering::Relaxed);

                    if self.hasher.resumable() {
                        match nonce.checked_add(self.nonce_stride) {
                            Some(next) => self.nonce = next,
                            None => self.advance_extranonce2(),
                        }
                    } else {
                        self.advance_extranonce2();
                    }

                    return Ok(Some(Share {
                        job_id: self.job.job_id.clone(),
                        extranonce2,
                        ntime: self.job.ntime,
                        nonce: Nonce::from(nonce),
                    }));
                }
                Search::Exhausted { hashes } => {
                    self.job.hashes.fetch_add(hashes, Ordering::Relaxed);
                    self.advance_extranonce2();
                }
                Search::Stopped { hashes } => {
                    self.job.hashes.fetch_add(hashes, Ordering::Relaxed);
                    self.done = true;
                    return Ok(None);
                }
            }
        }
    }

    fn advance_extranonce2(&mut self) {
        self.extranonce2 += 1;
        self.nonce = self.nonce_start;

        if self.extranonce2 >= EXTRANONCE2_SPACE {
            self.done = true;
        }
    }
}

impl Iterator for Mine<'_> {
    type Item = Result<Share>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.step() {
            Ok(Some(share)) => Some(Ok(share)),
            Ok(None) => None,
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
