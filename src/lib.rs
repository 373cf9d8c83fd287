use {
    anyhow::{Context, Error, anyhow, bail, ensure},
    arguments::Arguments,
    byteorder::{BigEndian, ByteOrder, LittleEndian},
    clap::Parser,
    derive_more::Display,
    endpoint::resolve_endpoint,
    fpga::FpgaHasher,
    hasher::{Backend, Engine, Hasher, Search, SoftwareHasher},
    hashrate::HashRate,
    header::{HEADER_LEN, HEADER_PREFIX_LEN, header, header_prefix, swap_each_word},
    job::{Job, Share},
    merkle::{MerkleNode, merkle_root},
    miner::{Miner, Mode},
    options::Options,
    serde::{
        Deserialize, Serialize, Serializer,
        de::{self, Deserializer},
        ser::SerializeSeq,
    },
    serde_json::Value,
    serde_with::{DeserializeFromStr, SerializeDisplay},
    sha256::sha256d,
    std::{
        collections::BTreeMap,
        fmt::{self, Display, Formatter},
        process,
        str::FromStr,
        sync::{
            Arc, Mutex,
            atomic::{AtomicU64, Ordering},
        },
        thread,
        time::{Duration, Instant},
    },
    stratum::{
        Authorize, Client, ClientConfig, Difficulty, Event, EventReceiver, Extranonce, Id, JobId,
        Message, Nbits, Nonce, Notify, Ntime, PrevHash, SetDifficulty, Submit, SubmitOutcome,
        Subscribe, SubscribeResult, Version,
    },
    subscription::Subscription,
    target::Target,
    tokio::{
        runtime::Runtime,
        signal::ctrl_c,
        sync::{broadcast, mpsc, oneshot},
        task::JoinSet,
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, trace, warn},
    tracing_subscriber::EnvFilter,
};

mod arguments;
mod endpoint;
mod fpga;
mod harness;
mod hasher;
mod hashrate;
mod header;
mod job;
mod merkle;
mod miner;
mod options;
mod sha256;
mod stratum;
mod subscription;
mod target;

pub const USER_AGENT: &str = "pyrite/0.1.0";
pub const DEFAULT_PORT: u16 = 9333;
pub const MAX_MESSAGE_SIZE: usize = 32 * 1024;

type Result<T = (), E = Error> = std::result::Result<T, E>;

pub fn main() {
    let arguments = Arguments::parse();

    tracing_subscriber::fmt()
        .with_env_filter(arguments.options.env_filter())
        .init();

    match arguments.run() {
        Err(err) => {
            error!("error: {err:#}");
            process::exit(1);
        }
        Ok(()) => {
            process::exit(0);
        }
    }
}
