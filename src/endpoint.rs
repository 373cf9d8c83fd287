use super::*;

/// Turns a stratum URL into a `host:port` pair suitable for a TCP connect.
/// The scheme is optional and the port defaults to 9333.
pub(crate) fn resolve_endpoint(url: &str) -> Result<String> {
    let stripped = url
        .strip_prefix("stratum+tcp://")
        .or_else(|| url.strip_prefix("stratum://"))
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    ensure!(!stripped.is_empty(), "empty stratum endpoint `{url}`");
    ensure!(
        !stripped.contains('/'),
        "unexpected path in stratum endpoint `{url}`"
    );

    match stripped.rsplit_once(':') {
        Some((host, port)) => {
            ensure!(!host.is_empty(), "missing host in stratum endpoint `{url}`");

            let port = port
                .parse::<u16>()
                .with_context(|| format!("invalid port in stratum endpoint `{url}`"))?;

            Ok(format!("{host}:{port}"))
        }
        None => Ok(format!("{stripped}:{DEFAULT_PORT}")),
    }
}
