//! SQL schema for the MyDuka SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL CHECK (role IN ('merchant', 'admin', 'clerk')),
    merchant_id   INTEGER REFERENCES users(id),   -- NULL for merchants
    active        INTEGER NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS stores (
    id          INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    location    TEXT NOT NULL,
    merchant_id INTEGER NOT NULL REFERENCES users(id),
    created_at  TEXT NOT NULL,
    UNIQUE (merchant_id, name)
);

-- Money columns hold decimal strings, never floats.
CREATE TABLE IF NOT EXISTS inventory (
    id                INTEGER PRIMARY KEY,
    product_name      TEXT NOT NULL,
    quantity_received INTEGER NOT NULL,
    quantity_in_stock INTEGER NOT NULL CHECK (quantity_in_stock >= 0),
    quantity_spoilt   INTEGER NOT NULL DEFAULT 0,
    buying_price      TEXT NOT NULL,
    selling_price     TEXT NOT NULL,
    payment_status    TEXT NOT NULL DEFAULT 'unpaid',
    supplier          TEXT,
    store_id          INTEGER NOT NULL REFERENCES stores(id),
    admin_id          INTEGER NOT NULL REFERENCES users(id),
    created_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS clerk_inventory (
    clerk_id     INTEGER NOT NULL REFERENCES users(id)     ON DELETE CASCADE,
    inventory_id INTEGER NOT NULL REFERENCES inventory(id) ON DELETE CASCADE,
    PRIMARY KEY (clerk_id, inventory_id)
);

-- Sale and restock movements. Stock changes and ledger rows are always
-- written in the same transaction.
CREATE TABLE IF NOT EXISTS ledger (
    id           INTEGER PRIMARY KEY,
    inventory_id INTEGER NOT NULL REFERENCES inventory(id),
    kind         TEXT NOT NULL CHECK (kind IN ('sale', 'restock')),
    quantity     INTEGER NOT NULL CHECK (quantity > 0),
    unit_price   TEXT NOT NULL,
    total_price  TEXT NOT NULL,
    recorded_by  INTEGER NOT NULL REFERENCES users(id),
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS supply_requests (
    id           INTEGER PRIMARY KEY,
    inventory_id INTEGER NOT NULL REFERENCES inventory(id) ON DELETE CASCADE,
    requested_by INTEGER NOT NULL REFERENCES users(id),
    quantity     INTEGER NOT NULL CHECK (quantity > 0),
    status       TEXT NOT NULL DEFAULT 'pending',
    decided_by   INTEGER REFERENCES users(id),
    decided_at   TEXT,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS payments (
    id           INTEGER PRIMARY KEY,
    inventory_id INTEGER NOT NULL REFERENCES inventory(id),
    status       TEXT NOT NULL,
    amount       TEXT NOT NULL,
    processed_by INTEGER NOT NULL REFERENCES users(id),
    created_at   TEXT NOT NULL
);

-- History of generated reports. Never read back into later totals.
CREATE TABLE IF NOT EXISTS reports (
    id                   INTEGER PRIMARY KEY,
    kind                 TEXT NOT NULL CHECK (kind IN ('sales', 'stock')),
    store_id             INTEGER NOT NULL REFERENCES stores(id) ON DELETE CASCADE,
    period               TEXT,
    total_sales          TEXT,
    total_stock          INTEGER,
    best_selling_product TEXT,
    generated_by         INTEGER NOT NULL REFERENCES users(id),
    created_at           TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS inventory_store_idx  ON inventory(store_id);
CREATE INDEX IF NOT EXISTS ledger_item_idx      ON ledger(inventory_id, kind);
CREATE INDEX IF NOT EXISTS ledger_created_idx   ON ledger(created_at);
CREATE INDEX IF NOT EXISTS supply_item_idx      ON supply_requests(inventory_id);
CREATE INDEX IF NOT EXISTS reports_store_idx    ON reports(store_id);

PRAGMA user_version = 1;
";
