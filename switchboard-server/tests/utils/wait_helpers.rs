use anyhow::{Result, bail};
use std::time::{Duration, Instant};
use switchboard_server::{RoomHandle, RoomRegistry, RoomSnapshot};

const POLL_MS: u64 = 10;

/// Poll the registry until `check` holds.
pub async fn wait_for_registry(
    registry: &RoomRegistry,
    timeout_ms: u64,
    check: impl Fn(&RoomRegistry) -> bool,
) -> Result<()> {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        if check(registry) {
            return Ok(());
        }
        if Instant::now() >= deadline {
            bail!("Registry condition not met within {} ms", timeout_ms);
        }
        tokio::time::sleep(Duration::from_millis(POLL_MS)).await;
    }
}

/// Poll a room's members until `check` holds and return the matching snapshot.
pub async fn wait_for_members(
    room: &RoomHandle,
    timeout_ms: u64,
    check: impl Fn(&RoomSnapshot) -> bool,
) -> Result<RoomSnapshot> {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        let snapshot = room.snapshot().await?;
        if check(&snapshot) {
            return Ok(snapshot);
        }
        if Instant::now() >= deadline {
            bail!("Room {} never reached the expected members: {:?}", room.room_id(), snapshot);
        }
        tokio::time::sleep(Duration::from_millis(POLL_MS)).await;
    }
}
