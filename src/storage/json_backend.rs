use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::BankError;
use crate::ledger::Ledger;
use crate::utils::{app_data_dir, ensure_dir};

use super::StorageBackend;

const STORE_FILE: &str = "bank.json";
const TMP_SUFFIX: &str = "tmp";
const BACKUP_SUFFIX: &str = "bak";

/// Snapshot store backed by a single pretty-printed JSON file. Saves stage to
/// a temporary sibling and rename into place, so a failed write never
/// corrupts the previous snapshot; the prior snapshot is kept as `.bak`.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Creates a store rooted at the given directory, defaulting to the
    /// application data directory.
    pub fn new(root: Option<PathBuf>) -> Result<Self, BankError> {
        let root = root.unwrap_or_else(app_data_dir);
        ensure_dir(&root)?;
        Ok(Self {
            path: root.join(STORE_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for JsonStore {
    fn load(&self) -> Result<Ledger, BankError> {
        if !self.path.exists() {
            return Ok(Ledger::new());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| BankError::CorruptStore(err.to_string()))
    }

    fn save(&self, ledger: &Ledger) -> Result<(), BankError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(ledger)?;
        if self.path.exists() {
            fs::copy(&self.path, suffixed_path(&self.path, BACKUP_SUFFIX))?;
        }
        let tmp = suffixed_path(&self.path, TMP_SUFFIX);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn suffixed_path(path: &Path, suffix: &str) -> PathBuf {
    let mut staged = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, suffix),
        None => suffix.to_string(),
    };
    staged.set_extension(ext);
    staged
}

fn write_file(path: &Path, data: &str) -> Result<(), BankError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
