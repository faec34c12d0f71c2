use queuelens::jobs::{SnapshotAssembler, SnapshotConfig};
use queuelens::store::MemoryStore;
use serde_json::Value;

pub const PREFIX: &str = "arq:result:";
pub const QUEUE: &str = "arq:queue";

#[allow(dead_code)]
pub fn setup_store() -> (MemoryStore, SnapshotAssembler<MemoryStore>) {
    setup_store_with(SnapshotConfig::default())
}

#[allow(dead_code)]
pub fn setup_store_with(cfg: SnapshotConfig) -> (MemoryStore, SnapshotAssembler<MemoryStore>) {
    let store = MemoryStore::new();
    let assembler = SnapshotAssembler::new(store.clone(), cfg);
    (store, assembler)
}

#[allow(dead_code)]
pub fn put_record(store: &MemoryStore, job_id: &str, record: Value) {
    let blob = serde_json::to_vec(&record).expect("record serializes");
    store.put(&format!("{PREFIX}{job_id}"), blob);
}
