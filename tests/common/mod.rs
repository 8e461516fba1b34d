use std::path::Path;

use bank_core::session::Session;
use bank_core::storage::JsonStore;

pub fn open_session(root: &Path) -> Session {
    let store = JsonStore::new(Some(root.to_path_buf())).expect("json store");
    Session::open(Box::new(store)).expect("open session")
}
