use meshgraph_core::NodeId;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

pub const HOST_ID: &str = "host";
pub const GATEWAY_ID: &str = "gateway";

pub fn host_id() -> NodeId {
    NodeId::new(HOST_ID)
}

pub fn gateway_id() -> NodeId {
    NodeId::new(GATEWAY_ID)
}

pub fn sensing_id(raw: &str) -> NodeId {
    NodeId(format!("node-{raw}"))
}

/// Relays are numbered from 1.
pub fn relay_id(index: u32) -> NodeId {
    NodeId(format!("relay-{index}"))
}

pub fn stable_u32(s: &str) -> u32 {
    let mut h = std::collections::hash_map::DefaultHasher::new();
    s.hash(&mut h);
    (h.finish() & 0xFFFF_FFFF) as u32
}

// "2" sorts before "10"; non-numeric ids fall back to lexical order after numeric ones.
pub fn cmp_raw_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
