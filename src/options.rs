use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Options {
    #[arg(
        short = 'o',
        long,
        help = "Stratum server <URL>, e.g. stratum+tcp://pool.example:3333. Port defaults to 9333."
    )]
    pub(crate) url: Option<String>,
    #[arg(short = 'u', long = "user", help = "Mining server <USERNAME>.")]
    pub(crate) username: Option<String>,
    #[arg(short = 'p', long = "pass", help = "Mining server <PASSWORD>.")]
    pub(crate) password: Option<String>,
    #[arg(
        short = 'O',
        long,
        value_name = "USERNAME:PASSWORD",
        help = "Colon separated username and password."
    )]
    pub(crate) userpass: Option<String>,
    #[arg(
        short = 'i',
        long = "impl",
        value_enum,
        help = "Double SHA-256 backend."
    )]
    pub(crate) backend: Option<Backend>,
    #[arg(long, help = "Number of parallel search workers.")]
    pub(crate) cores: Option<usize>,
    #[arg(
        long,
        default_value = "0x43c00000",
        help = "Physical base address of the hardware hasher registers."
    )]
    pub(crate) fpga_address: String,
    #[arg(short = 'B', long, help = "Run in the background as a daemon.")]
    pub(crate) background: bool,
    #[arg(short = 'q', long, help = "Suppress all output except errors.")]
    pub(crate) quiet: bool,
    #[arg(short = 'P', long, help = "Show all JSON-RPC chatter.")]
    pub(crate) dump_protocol: bool,
    #[arg(short = 'd', long, help = "Show extra debug information.")]
    pub(crate) debug: bool,
    #[arg(
        short = 't',
        long,
        help = "Run the offline test harness against the software backends."
    )]
    pub(crate) test: bool,
}

impl Options {
    /// Splits -O, or falls back to -u/-p. Mixing the two is a usage
    /// error.
    pub(crate) fn credentials(&self) -> Result<(String, Option<String>)> {
        if let Some(userpass) = &self.userpass {
            ensure!(
                self.username.is_none() && self.password.is_none(),
                "-O/--userpass may not be combined with -u/--user or -p/--pass"
            );

            let (username, password) = userpass
                .split_once(':')
                .ok_or_else(|| anyhow!("could not parse USERNAME:PASSWORD from -O/--userpass"))?;

            return Ok((username.into(), Some(password.into())));
        }

        Ok((
            self.username.clone().unwrap_or_default(),
            self.password.clone(),
        ))
    }

    pub(crate) fn backend(&self) -> Backend {
        self.backend.unwrap_or_default()
    }

    /// The hardware path owns the registers, so it always runs a single
    /// worker.
    pub(crate) fn cores(&self) -> usize {
        match self.backend() {
            Backend::Fpga => 1,
            _ => self.cores.unwrap_or(1).max(1),
        }
    }

    pub(crate) fn fpga_address(&self) -> Result<usize> {
        let hex = self
            .fpga_address
            .strip_prefix("0x")
            .unwrap_or(&self.fpga_address);

        usize::from_str_radix(hex, 16)
            .with_context(|| format!("invalid fpga address `{}`", self.fpga_address))
    }

    pub(crate) fn test_backends(&self) -> Vec<Backend> {
        let mut backends = vec![Backend::Library, Backend::Reference];

        if self.backend() == Backend::Fpga {
            backends.push(Backend::Fpga);
        }

        backends
    }

    pub(crate) fn env_filter(&self) -> EnvFilter {
        let mut directives = if self.quiet {
            "pyrite=error"
        } else if self.debug {
            "pyrite=debug"
        } else {
            "pyrite=info"
        }
        .to_string();

        if self.dump_protocol && !self.quiet {
            directives.push_str(",pyrite::stratum::client=trace");
        }

        EnvFilter::new(directives)
    }
}
