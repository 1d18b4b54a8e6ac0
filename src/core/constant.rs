use std::time::Duration;

/// Capacity of each client's outbound mailbox.
pub const MAILBOX_CAPACITY: usize = 256;

/// Capacity of the hub's command channel.
pub const HUB_CHAN_CAPACITY: usize = 100;

/// Maximum inbound frame size accepted from a peer.
pub const MAX_FRAME_SIZE: usize = 32 * 1024;

/// Idle read deadline; refreshed by keepalive acknowledgments.
pub const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Deadline for a single outbound write, data or ping.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Keepalive cadence; 9/10 of the read deadline so a ping always
/// precedes the peer's read timeout.
pub const PING_PERIOD: Duration = Duration::from_secs(54);

pub const STATUS_ACTIVE: &str = "active";
