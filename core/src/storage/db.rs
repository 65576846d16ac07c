use crate::ledger::access::ControllerRole;
use crate::storage::{AccountState, LedgerStore, LedgerWrite};
use anyhow::{Context, Result};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options, WriteBatch};
use shade_account::AccountId;
use shade_privacy::{FieldElement, Nullifier};
use std::path::Path;
use std::sync::Arc;
use wincode::{SchemaRead, SchemaWrite};

const CF_ACCOUNTS: &str = "accounts";
const CF_NULLIFIERS: &str = "nullifiers";
const CF_ROLES: &str = "roles";

/// On-disk account value
#[derive(Debug, Clone, Copy, PartialEq, Eq, SchemaRead, SchemaWrite)]
struct AccountRecord {
    public_balance: u128,
    /// Canonical little-endian field encoding
    private_commitment: [u8; 32],
}

impl From<&AccountState> for AccountRecord {
    fn from(state: &AccountState) -> Self {
        Self {
            public_balance: state.public_balance,
            private_commitment: *state.private_commitment.as_bytes(),
        }
    }
}

impl TryFrom<AccountRecord> for AccountState {
    type Error = anyhow::Error;

    fn try_from(record: AccountRecord) -> Result<Self> {
        Ok(Self {
            public_balance: record.public_balance,
            private_commitment: FieldElement::from_le_bytes(record.private_commitment)
                .context("stored commitment is not a field element")?,
        })
    }
}

/// A thread-safe wrapper around RocksDB.
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
}

impl RocksDbStore {
    /// Opens the database at the specified path, creating it if missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = vec![
            ColumnFamilyDescriptor::new(CF_ACCOUNTS, Options::default()),
            ColumnFamilyDescriptor::new(CF_NULLIFIERS, Options::default()),
            ColumnFamilyDescriptor::new(CF_ROLES, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, families)
            .map_err(|e| anyhow::anyhow!("Failed to open RocksDB: {}", e))?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .with_context(|| format!("{} CF missing", name))
    }
}

impl LedgerStore for RocksDbStore {
    fn get_account(&self, id: &AccountId) -> Result<Option<AccountState>> {
        let cf = self.cf(CF_ACCOUNTS)?;

        // Key is the 32-byte AccountId directly
        match self.db.get_cf(cf, id.0)? {
            Some(bytes) => {
                let record: AccountRecord = wincode::deserialize(&bytes)?;
                Ok(Some(record.try_into()?))
            }
            None => Ok(None),
        }
    }

    /// Account update and nullifier land in one WriteBatch
    fn commit(&self, write: &LedgerWrite) -> Result<()> {
        let mut batch = WriteBatch::default();

        let cf_accounts = self.cf(CF_ACCOUNTS)?;
        let bytes = wincode::serialize(&AccountRecord::from(&write.state))?;
        batch.put_cf(cf_accounts, write.account.0, bytes);

        if let Some(nullifier) = &write.nullifier {
            let cf_nullifiers = self.cf(CF_NULLIFIERS)?;
            batch.put_cf(cf_nullifiers, nullifier.as_bytes(), []);
        }

        self.db.write(batch)?;
        Ok(())
    }

    fn nullifiers(&self) -> Result<Vec<Nullifier>> {
        let cf = self.cf(CF_NULLIFIERS)?;

        let mut nullifiers = Vec::new();
        let iter = self.db.iterator_cf(cf, rocksdb::IteratorMode::Start);

        for item in iter {
            let (key, _) = item?;
            let bytes: [u8; 32] = key
                .as_ref()
                .try_into()
                .context("invalid nullifier length")?;
            let field =
                FieldElement::from_le_bytes(bytes).context("stored nullifier is not a field element")?;
            nullifiers.push(Nullifier(field));
        }

        Ok(nullifiers)
    }

    fn roles(&self) -> Result<Vec<(ControllerRole, AccountId)>> {
        let cf = self.cf(CF_ROLES)?;

        let mut roles = Vec::new();
        for role in ControllerRole::ALL {
            if let Some(bytes) = self.db.get_cf(cf, role.key())? {
                let holder: [u8; 32] = bytes
                    .as_slice()
                    .try_into()
                    .context("invalid role holder length")?;
                roles.push((role, AccountId(holder)));
            }
        }

        Ok(roles)
    }

    fn put_role(&self, role: ControllerRole, holder: Option<AccountId>) -> Result<()> {
        let cf = self.cf(CF_ROLES)?;
        match holder {
            Some(holder) => self.db.put_cf(cf, role.key(), holder.0)?,
            None => self.db.delete_cf(cf, role.key())?,
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        for name in [CF_ACCOUNTS, CF_NULLIFIERS, CF_ROLES] {
            self.db
                .flush_cf(self.cf(name)?)
                .with_context(|| format!("Failed to flush {}", name))?;
        }
        Ok(())
    }
}
