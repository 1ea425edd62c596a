/// Number of entries shown per ranked listing when no limit is given.
pub const DEFAULT_LIMIT: i64 = 20;

/// journald unit queried when no capture file is given.
pub const DEFAULT_UNIT: &str = "ssh";

/// Relative directory the snapshots are written to.
pub const DEFAULT_OUT_DIR: &str = "ssh-result";

pub const JOINT_ARTIFACT: &str = "ip_user.json";
pub const IP_ARTIFACT: &str = "ip.json";
pub const USER_ARTIFACT: &str = "user.json";

/// Width the key column is padded to in console listings.
pub const LABEL_WIDTH: usize = 30;
