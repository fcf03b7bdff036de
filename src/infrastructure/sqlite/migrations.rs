use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS templates (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            trigger_kinds TEXT NOT NULL,
            action_kinds TEXT NOT NULL,
            param_mapping TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS subscriptions (
            id TEXT PRIMARY KEY,
            owner TEXT NOT NULL,
            template_id TEXT NOT NULL,
            combine TEXT NOT NULL,
            action_consts TEXT NOT NULL,
            triggers TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS bundles (
            id TEXT PRIMARY KEY,
            entries TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS agents (
            address TEXT PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS positions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner TEXT NOT NULL,
            collateral_token TEXT NOT NULL,
            collateral_amount TEXT NOT NULL,
            debt_token TEXT NOT NULL,
            debt_amount TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS balances (
            account TEXT NOT NULL,
            token TEXT NOT NULL,
            amount TEXT NOT NULL,
            PRIMARY KEY (account, token)
        );

        CREATE TABLE IF NOT EXISTS prices (
            token TEXT PRIMARY KEY,
            usd REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS flash_loans (
            token TEXT PRIMARY KEY,
            amount TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_subscriptions_owner ON subscriptions(owner);
        CREATE INDEX IF NOT EXISTS idx_positions_owner ON positions(owner);
        ",
    )
    .map_err(|e| format!("Migration failed: {e}"))
}
