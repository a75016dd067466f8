use anyhow::{Context, Result};
use clap::Parser;

use schedule_diary::{
    auth::jwt::{JwtKeys, encode_token, make_access_claims},
    config::AppConfig,
};

/// Signs a bearer token for local testing against the schedule API.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Owner id placed in the token subject
    owner_id: i32,
    /// Lifetime in seconds (defaults to APP_AUTH__TOKEN_TTL_SECS)
    #[arg(long)]
    ttl: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::from_env()?;

    let ttl = cli.ttl.unwrap_or(cfg.auth.token_ttl_secs);
    let ttl = usize::try_from(ttl).context("ttl does not fit in usize")?;
    let keys = JwtKeys::from_secret(cfg.auth.jwt_secret.as_bytes());
    let token = encode_token(&keys, &make_access_claims(cli.owner_id, ttl))
        .map_err(|err| anyhow::anyhow!("token encoding failed: {err}"))?;

    println!("Bearer {token}");
    Ok(())
}
