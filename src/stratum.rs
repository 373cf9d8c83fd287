use super::*;

pub use {
    authorize::Authorize,
    client::{Client, ClientConfig, Event, EventReceiver, SubmitOutcome},
    difficulty::Difficulty,
    error::ClientError,
    extranonce::Extranonce,
    job_id::JobId,
    message::{Id, Message},
    nbits::Nbits,
    nonce::Nonce,
    notify::Notify,
    ntime::Ntime,
    prevhash::PrevHash,
    set_difficulty::SetDifficulty,
    submit::Submit,
    subscribe::{Subscribe, SubscribeResult},
    version::Version,
};

mod authorize;
mod client;
mod difficulty;
mod error;
mod extranonce;
mod job_id;
mod message;
mod nbits;
mod nonce;
mod notify;
mod ntime;
mod prevhash;
mod set_difficulty;
mod submit;
mod subscribe;
mod version;
