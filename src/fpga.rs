use {
    super::*,
    nix::{
        fcntl::{OFlag, open},
        sys::{
            mman::{MapFlags, ProtFlags, mmap, munmap},
            stat::Mode,
        },
    },
    std::{ffi::c_void, num::NonZeroUsize, os::fd::OwnedFd, ptr::NonNull},
};

// Register banks, as byte offsets from the accelerator base address.
const CTRL_BANK: usize = 0x000;
const MID_STATE_BANK: usize = 0x400;
const RESIDUAL_DATA_BANK: usize = 0x800;
const TARGET_BANK: usize = 0xc00;
const MAP_LEN: usize = 0x1000;

// Control registers, as byte offsets within the control bank.
const RESET: usize = 0x00;
const START: usize = 0x04;
const STATUS: usize = 0x08;
const NONCE: usize = 0x0c;
const ABORT: usize = 0x10;
const COUNT: usize = 0x14;

const STATUS_BUSY: u32 = 0;
const STATUS_FOUND: u32 = 1;
const STATUS_EXHAUSTED: u32 = 2;

const POLL_INTERVAL: Duration = Duration::from_micros(100);
const POLL_TIMEOUT: Duration = Duration::from_secs(900);

/// Word-granular access to the accelerator's register window.
pub(crate) trait FpgaIo {
    fn read(&self, offset: usize) -> u32;
    fn write(&self, offset: usize, value: u32);
}

/// /dev/mem mapping of the accelerator's register window. All access goes
/// through volatile word reads and writes.
pub(crate) struct Mmio {
    base: NonNull<u32>,
    _fd: OwnedFd,
}

// The mapping stays valid for the life of the value and is only ever
// dereferenced word-aligned inside the window.
unsafe impl Send for Mmio {}
unsafe impl Sync for Mmio {}

impl Mmio {
    pub(crate) fn map(address: usize) -> Result<Self> {
        let fd = open("/dev/mem", OFlag::O_RDWR | OFlag::O_SYNC, Mode::empty())
            .context("failed to open /dev/mem")?;

        let base = unsafe {
            mmap(
                None,
                const { NonZeroUsize::new(MAP_LEN).unwrap() },
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                &fd,
                address as i64,
            )
        }
        .with_context(|| format!("failed to map hasher registers at {address:#x}"))?;

        Ok(Self {
            base: base.cast(),
            _fd: fd,
        })
    }
}

impl FpgaIo for Mmio {
    fn read(&self, offset: usize) -> u32 {
        unsafe { self.base.as_ptr().byte_add(offset).read_volatile() }
    }

    fn write(&self, offset: usize, value: u32) {
        unsafe { self.base.as_ptr().byte_add(offset).write_volatile(value) }
    }
}

impl Drop for Mmio {
    fn drop(&mut self) {
        let _ = unsafe { munmap(self.base.cast::<c_void>(), MAP_LEN) };
    }
}

/// Drives the register protocol: compute the mid-state in software, load
/// the four banks, start, poll, and either collect the winning nonce or
/// abort.
pub(crate) struct FpgaHasher<IO> {
    io: IO,
    // one search at a time; the registers are a single shared resource
    lock: Mutex<()>,
}

impl FpgaHasher<Mmio> {
    pub(crate) fn map(address: usize) -> Result<Self> {
        Ok(Self::new(Mmio::map(address)?))
    }
}

impl<IO: FpgaIo> FpgaHasher<IO> {
    pub(crate) fn new(io: IO) -> Self {
        Self {
            io,
            lock: Mutex::new(()),
        }
    }

    fn load(&self, prefix: &[u8; HEADER_PREFIX_LEN], target: &Target) {
        let mut first_block = [0u8; 64];
        first_block.copy_from_slice(&prefix[..64]);

        for (i, word) in sha256::midstate(&first_block).into_iter().enumerate() {
            self.io.write(MID_STATE_BANK + 4 * i, word);
        }

        // Header bytes 64..76: merkle root tail, ntime, nbits.
        for (i, chunk) in prefix[64..].chunks_exact(4).enumerate() {
            self.io.write(RESIDUAL_DATA_BANK + 4 * i, BigEndian::read_u32(chunk));
        }

        for (i, word) in target.to_le_words().into_iter().enumerate() {
            self.io.write(TARGET_BANK + 4 * i, word);
        }
    }
}

impl<IO: FpgaIo + Send + Sync> Hasher for FpgaHasher<IO> {
    fn search(
        &self,
        prefix: &[u8; HEADER_PREFIX_LEN],
        target: &Target,
        _nonce_start: u32,
        _nonce_stride: u32,
        stop: &CancellationToken,
    ) -> Result<Search> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("hasher lock poisoned"))?;

        self.load(prefix, target);
        self.io.write(CTRL_BANK + START, 1);

        let started = Instant::now();

        loop {
            if stop.is_cancelled() {
                self.io.write(CTRL_BANK + ABORT, 1);
                let hashes = u64::from(self.io.read(CTRL_BANK + COUNT));
                self.io.write(CTRL_BANK + RESET, 1);
                return Ok(Search::Stopped { hashes });
            }

            match self.io.read(CTRL_BANK + STATUS) {
                STATUS_BUSY => {
                    if started.elapsed() > POLL_TIMEOUT {
                        self.io.write(CTRL_BANK + ABORT, 1);
                        self.io.write(CTRL_BANK + RESET, 1);
                        bail!("hasher stuck busy for {POLL_TIMEOUT:?}, abandoning job");
                    }

                    thread::sleep(POLL_INTERVAL);
                }
                STATUS_FOUND => {
                    let nonce = self.io.read(CTRL_BANK + NONCE);
                    let hashes = u64::from(self.io.read(CTRL_BANK + COUNT));
                    return Ok(Search::Found { nonce, hashes });
                }
                STATUS_EXHAUSTED => {
                    // The hardware burned the entire nonce space.
                    return Ok(Search::Exhausted { hashes: 1 << 32 });
                }
                status => {
                    self.io.write(CTRL_BANK + RESET, 1);
                    bail!("hasher returned unknown status {status}, abandoning job");
                }
            }
        }
    }

    fn resumable(&self) -> bool {
        false
    }
}
