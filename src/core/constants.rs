//! Physical constants and system parameters

/// Minimum number of anchors for a unique 2D fix
pub const MIN_ANCHORS: usize = 3;

/// Normal-matrix determinants below this magnitude are treated as singular
pub const SINGULAR_DETERMINANT_THRESHOLD: f64 = 1e-10;

/// Reference RSSI at 1 m (dBm)
pub const DEFAULT_P_TX_DBM: f64 = -40.0;

/// Indoor path-loss exponent
pub const DEFAULT_PATH_LOSS_EXPONENT: f64 = 2.5;

/// Shadowing standard deviation (dB)
pub const DEFAULT_NOISE_STD_DEV_DB: f64 = 4.0;

/// Side length of the square simulation field (meters)
pub const DEFAULT_FIELD_SIZE_M: f64 = 100.0;

/// Port the prediction service listens on unless configured otherwise
pub const DEFAULT_PORT: u16 = 3001;
