pub mod app_config;
pub mod environment;

pub use app_config::AppConfig;
pub use environment::{
    get_database_filename, get_environment, initialize_logging_system, load_environment_variables,
    Environment, EnvironmentConfig,
};

/// 金額・距離など浮動小数点フィールドの上限値（合計時のオーバーフロー防止）
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;
