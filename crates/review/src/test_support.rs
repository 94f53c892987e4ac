use common::models::{Side, Signal, SignalId, SignalStatus};

pub fn signal(id: i64, status: SignalStatus) -> Signal {
    Signal {
        id: SignalId(id),
        symbol: "BTCUSDT".to_string(),
        side: Side::Buy,
        entry: 64000.0,
        sl: 63000.0,
        tp: Some(66000.0),
        qty: Some(0.01),
        ttl_sec: None,
        status,
        created_at: None,
        ts: None,
        ctx_json: None,
    }
}
