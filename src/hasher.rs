use super::*;

/// Which double-SHA-256 implementation drives the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub(crate) enum Backend {
    /// Pick the best available software engine.
    #[default]
    Auto,
    /// The bitcoin-hashes library.
    Library,
    /// The in-crate compression pipeline, bit-for-bit the hardware's
    /// algorithm.
    Reference,
    /// The memory-mapped hardware hasher.
    Fpga,
}

/// What a search over one nonce range came back with, with the attempts
/// charged to telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Search {
    Found { nonce: u32, hashes: u64 },
    Exhausted { hashes: u64 },
    Stopped { hashes: u64 },
}

pub(crate) trait Hasher: Send + Sync {
    /// Scans nonces for a header hash at or below the target. Observes the
    /// stop handle at least once per hash (software) or per poll cycle
    /// (hardware); stopping never interrupts a hash in progress.
    fn search(
        &self,
        prefix: &[u8; HEADER_PREFIX_LEN],
        target: &Target,
        nonce_start: u32,
        nonce_stride: u32,
        stop: &CancellationToken,
    ) -> Result<Search>;

    /// Whether a search can pick up mid-range after a find. The hardware
    /// always scans the full nonce space from zero, so a find there moves
    /// the engine to the next extranonce2 instead.
    fn resumable(&self) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Engine {
    Library,
    Reference,
}

pub(crate) struct SoftwareHasher {
    engine: Engine,
}

impl SoftwareHasher {
    pub(crate) fn new(engine: Engine) -> Self {
        Self { engine }
    }

    fn digest(&self, header: &[u8; HEADER_LEN]) -> [u8; 32] {
        match self.engine {
            Engine::Library => sha256d(header),
            Engine::Reference => sha256::sha256d_reference(header),
        }
    }
}

impl Hasher for SoftwareHasher {
    fn search(
        &self,
        prefix: &[u8; HEADER_PREFIX_LEN],
        target: &Target,
        nonce_start: u32,
        nonce_stride: u32,
        stop: &CancellationToken,
    ) -> Result<Search> {
        let stride = u64::from(nonce_stride.max(1));
        let mut nonce = u64::from(nonce_start);
        let mut hashes = 0;

        let started = Instant::now();
        let mut last_log = started;

        while nonce < u64::from(u32::MAX) {
            if stop.is_cancelled() {
                return Ok(Search::Stopped { hashes });
            }

            let candidate = header(prefix, nonce as u32);
            hashes += 1;

            if target.is_met_by(&self.digest(&candidate)) {
                return Ok(Search::Found {
                    nonce: nonce as u32,
                    hashes,
                });
            }

            nonce += stride;

            if hashes % 100_000 == 0 && last_log.elapsed() >= Duration::from_secs(5) {
                let rate = hashes as f64 / started.elapsed().as_secs_f64().max(1e-6);
                info!("Hashrate: {}", HashRate(rate));
                last_log = Instant::now();
            }
        }

        Ok(Search::Exhausted { hashes })
    }

    fn resumable(&self) -> bool {
        true
    }
}

/// Resolves the CLI backend selection. The hardware base address comes in
/// from the caller; nothing below the CLI knows the default.
pub(crate) fn build(backend: Backend, fpga_address: usize) -> Result<Arc<dyn Hasher>> {
    match backend {
        Backend::Auto | Backend::Library => Ok(Arc::new(SoftwareHasher::new(Engine::Library))),
        Backend::Reference => Ok(Arc::new(SoftwareHasher::new(Engine::Reference))),
        Backend::Fpga => Ok(Arc::new(FpgaHasher::map(fpga_address)?)),
    }
}
