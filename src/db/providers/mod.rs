mod postgres;
mod registry;
mod sqlite;

use std::sync::Arc;

pub use registry::{DbProvider, DbProviderId, DbProviders};

use self::{postgres::PostgresDbProvider, sqlite::SqliteDbProvider};

/// Registry holding every backend the schedule store can run on.
pub fn default_registry() -> anyhow::Result<DbProviders> {
    DbProviders::new()
        .with_provider(Arc::new(PostgresDbProvider))?
        .with_provider(Arc::new(SqliteDbProvider))
}

#[cfg(test)]
mod tests {
    use super::{DbProviderId, default_registry};

    #[test]
    fn default_registry_routes_both_schemes() {
        let providers = default_registry().expect("registry should build");

        for (url, expected) in [
            ("postgres://localhost/schedule", DbProviderId::Postgres),
            ("postgresql://localhost/schedule", DbProviderId::Postgres),
            ("  POSTGRES://host/db", DbProviderId::Postgres),
            ("sqlite::memory:", DbProviderId::Sqlite),
            ("sqlite://./schedule.db?mode=rwc", DbProviderId::Sqlite),
        ] {
            let provider = providers
                .provider_for_url(url)
                .unwrap_or_else(|err| panic!("{url} should resolve: {err}"));
            assert_eq!(provider.id(), expected, "{url}");
        }
    }
}
